//! # RPC Client Service
//!
//! Query dispatcher and submission driver. Implements [`QueryApi`] and
//! [`SubmissionApi`] over any [`RpcTransport`].
//!
//! ## Listing flow
//!
//! ```text
//! filter.validate() → limit check → cursor binding check
//!        → transport.call(method, params)
//!        → page normalization → state resolution → Page<T>
//! ```
//!
//! Nothing is retried here. A submission that fails in transit has an
//! unknown outcome and resending it could duplicate it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::application::resolver::StateResolver;
use crate::config::{ConfigError, RpcClientConfig};
use crate::domain::errors::{
    classify_broadcast_error, classify_query_error, classify_submission_error,
};
use crate::domain::filters::{
    BalanceScope, EventHandleScope, FieldScope, StateScope, TransactionOrderScope,
};
use crate::domain::pagination::{PageContext, PageItem, PageView};
use crate::domain::params::{
    BroadcastTxParams, ExecuteRawTransactionParams, GetBalanceParams, GetBalancesParams,
    GetEventsByEventHandleParams, GetFieldStatesParams, GetModuleAbiParams, GetObjectStatesParams,
    GetStatesParams, GetTransactionsByHashParams, GetTransactionsByOrderParams,
    IndexerQueryParams, ListFieldStatesParams, ListStatesParams, QueryInscriptionsParams,
    QueryUtxosParams, RepairIndexerParams, TxBcsParams,
};
use crate::domain::state::{IndexerObjectStateView, ObjectStateView, StateKvView};
use crate::domain::transaction::{validate_bitcoin_hex, DryRunResponseView, ExecuteResponseView};
use crate::domain::value_objects::{validate_address, validate_type_tag};
use crate::domain::views::{EventView, IndexerEventView};
use crate::domain::{
    AccessPath, BalanceInfoView, BroadcastOptions, EventFilter, EventOptions, ExecuteOptions,
    ExecutionOutcome, FieldEntry, IndexedState, InscriptionFilter, ModuleAbiView, ObjectId,
    ObjectStateFilter, Page, PageCursor, PageLimit, QueryFilter, QueryOptions, RawTransaction,
    RepairScope, RepairType, RequestId, ResolvedEvent, RpcClientError, RpcMethod,
    SimulationOutcome, StateChangeSetView, StateOptions, StateSlot, SubmissionReceipt,
    SubmissionState, SyncStateFilter, TransactionFilter, TransactionWithInfoView, TransportError,
    TxHash, TxSubmission, UtxoFilter,
};
use crate::ports::{LayoutDecoder, QueryApi, RpcTransport, SubmissionApi};

/// Outcome of a wait bounded by a deadline and a cancel signal.
enum Bounded<T> {
    Done(T),
    Elapsed,
    Cancelled,
}

async fn bounded<F, C>(
    fut: F,
    deadline: tokio::time::Instant,
    cancel: Pin<&mut C>,
) -> Bounded<F::Output>
where
    F: Future,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel => Bounded::Cancelled,
        res = tokio::time::timeout_at(deadline, fut) => match res {
            Ok(output) => Bounded::Done(output),
            Err(_) => Bounded::Elapsed,
        },
    }
}

/// RPC query and submission client.
pub struct RpcClientService<T: RpcTransport> {
    config: RpcClientConfig,
    transport: Arc<T>,
    decoder: Option<Arc<dyn LayoutDecoder>>,
}

impl<T: RpcTransport> RpcClientService<T> {
    pub fn new(config: RpcClientConfig, transport: Arc<T>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            decoder: None,
        })
    }

    /// Adds a local decoder for states the server returns undecoded.
    pub fn with_decoder(mut self, decoder: Arc<dyn LayoutDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn resolver(&self, method: RpcMethod, decode: bool) -> StateResolver<'_> {
        StateResolver::new(method.name(), decode, self.decoder.as_deref())
    }

    fn effective_limit(&self, limit: Option<PageLimit>) -> Result<Option<PageLimit>, RpcClientError> {
        match limit {
            Some(limit) if limit.get() > self.config.max_page_size => {
                Err(RpcClientError::MalformedRequest(format!(
                    "limit {} exceeds maximum page size {}",
                    limit, self.config.max_page_size
                )))
            }
            Some(limit) => Ok(Some(limit)),
            None => self.config.default_page_size.map(PageLimit::new).transpose(),
        }
    }

    /// Sends one call and decodes its result.
    async fn dispatch<P, R, C>(
        &self,
        method: RpcMethod,
        params: &P,
        classify: C,
    ) -> Result<R, RpcClientError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
        C: FnOnce(TransportError) -> RpcClientError + Send,
    {
        let params = serde_json::to_value(params).map_err(|e| {
            RpcClientError::MalformedRequest(format!("cannot encode params: {}", e))
        })?;
        let request_id = RequestId::new();
        let started = Instant::now();

        debug!(
            request_id = %request_id,
            method = method.name(),
            endpoint = self.transport.endpoint(),
            "dispatching request"
        );

        match self.transport.call(method.name(), params).await {
            Ok(value) => {
                debug!(
                    request_id = %request_id,
                    method = method.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "response received"
                );
                serde_json::from_value(value)
                    .map_err(|e| RpcClientError::unexpected(method.name(), e.to_string()))
            }
            Err(err) => {
                debug!(
                    request_id = %request_id,
                    method = method.name(),
                    error = %err,
                    "request failed"
                );
                Err(classify(err))
            }
        }
    }

    /// Plain dispatch for point reads.
    async fn read<P, R>(&self, method: RpcMethod, params: &P) -> Result<R, RpcClientError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        self.dispatch(method, params, RpcClientError::Transport).await
    }

    /// One page of a listing: validation, cursor binding, normalization.
    async fn fetch_page<F, P, V, B>(
        &self,
        filter: &F,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
        build: B,
    ) -> Result<Page<V>, RpcClientError>
    where
        F: QueryFilter,
        P: Serialize + Send + Sync,
        V: DeserializeOwned + PageItem + Send,
        B: FnOnce(Option<Value>, Option<String>) -> P + Send,
    {
        filter.validate()?;
        let method = RpcMethod::for_listing(F::RESOURCE);
        let ctx = PageContext {
            method: method.name(),
            resource: F::RESOURCE,
            descending,
            digest: filter.digest(),
            cursor,
            limit: self.effective_limit(limit)?,
        };
        let params = build(ctx.wire_cursor()?, ctx.wire_limit());
        let had_cursor = cursor.is_some();

        let view: PageView<V> = self
            .dispatch(method, &params, |e| {
                classify_query_error(e, F::RESOURCE, had_cursor)
            })
            .await?;
        ctx.normalize(view)
    }

    fn check_slot_count(
        method: RpcMethod,
        expected: usize,
        actual: usize,
    ) -> Result<(), RpcClientError> {
        if expected != actual {
            return Err(RpcClientError::unexpected(
                method.name(),
                format!("expected {} slots, got {}", expected, actual),
            ));
        }
        Ok(())
    }

    fn resolve_slots(
        &self,
        method: RpcMethod,
        options: StateOptions,
        views: Vec<Option<ObjectStateView>>,
    ) -> Result<Vec<StateSlot>, RpcClientError> {
        let resolver = self.resolver(method, options.decode);
        views
            .into_iter()
            .map(|view| match view {
                Some(view) => resolver.resolve_state(view).map(StateSlot::Present),
                None => Ok(StateSlot::Absent),
            })
            .collect()
    }

    fn resolve_indexed(
        &self,
        method: RpcMethod,
        decode: bool,
        page: Page<IndexerObjectStateView>,
    ) -> Result<Page<IndexedState>, RpcClientError> {
        let resolver = self.resolver(method, decode);
        page.try_map(|view| {
            Ok(IndexedState {
                indexer_id: view.indexer_id,
                state: resolver.resolve_state(view.state)?,
            })
        })
    }

    fn resolve_fields(
        &self,
        method: RpcMethod,
        decode: bool,
        page: Page<StateKvView>,
    ) -> Result<Page<FieldEntry>, RpcClientError> {
        let resolver = self.resolver(method, decode);
        page.try_map(|kv| {
            Ok(FieldEntry {
                field_key: kv.field_key,
                state: resolver.resolve_state(kv.state)?,
            })
        })
    }

    /// Blocking execute with caller-controlled cancellation.
    ///
    /// Cancelling stops the local wait only. Before execute returns, the
    /// transaction may still run and the error reports an unknown outcome.
    /// During the indexer wait, the known outcome is returned unindexed.
    pub async fn execute_raw_transaction_until<C>(
        &self,
        tx: RawTransaction,
        options: ExecuteOptions,
        cancel: C,
    ) -> Result<ExecutionOutcome, RpcClientError>
    where
        C: Future<Output = ()> + Send,
    {
        options.validate()?;
        let mut submission = TxSubmission::new(tx);
        let tx_hash = submission.tx_hash().clone();
        let params = ExecuteRawTransactionParams {
            tx_bcs_hex: submission.transaction().to_hex(),
            tx_option: Some(options.tx_options),
        };

        let started = tokio::time::Instant::now();
        let deadline = started + options.timeout;
        tokio::pin!(cancel);

        submission.advance(SubmissionState::Submitted)?;
        info!(
            tx_hash = %tx_hash,
            timeout_ms = options.timeout.as_millis() as u64,
            wait_for_indexing = options.wait_for_indexing,
            "executing transaction"
        );

        let execute = self.dispatch::<_, ExecuteResponseView, _>(
            RpcMethod::ExecuteRawTransaction,
            &params,
            |e| classify_submission_error(e, Some(tx_hash.as_str())),
        );
        let view = match bounded(execute, deadline, cancel.as_mut()).await {
            // The request timeout fired before the execute budget did.
            Bounded::Done(Err(RpcClientError::Transport(TransportError::Timeout(_))))
            | Bounded::Elapsed => {
                submission.advance(SubmissionState::TimedOut)?;
                warn!(tx_hash = %tx_hash, "execute timed out, outcome unknown");
                return Err(RpcClientError::SubmissionTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited: started.elapsed(),
                });
            }
            Bounded::Done(result) => result?,
            Bounded::Cancelled => {
                warn!(tx_hash = %tx_hash, "execute wait cancelled, outcome unknown");
                return Err(RpcClientError::WaitCancelled {
                    tx_hash: tx_hash.to_string(),
                });
            }
        };

        let mut outcome = ExecutionOutcome::from(view);
        if outcome.tx_hash != tx_hash {
            warn!(
                local = %tx_hash,
                server = %outcome.tx_hash,
                "server tx hash differs from local hash"
            );
        }

        // Execution is already terminal here; a failed indexer wait only
        // leaves `indexed` unset.
        if options.wait_for_indexing {
            submission.advance(SubmissionState::Pending)?;
            let poll = self.wait_until_indexed(&outcome.tx_hash, options.poll_interval);
            match bounded(poll, deadline, cancel.as_mut()).await {
                Bounded::Done(Ok(())) => outcome.indexed = true,
                Bounded::Done(Err(err)) => {
                    warn!(tx_hash = %outcome.tx_hash, error = %err, "indexer poll failed");
                }
                Bounded::Elapsed => {
                    warn!(
                        tx_hash = %outcome.tx_hash,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "indexer wait timed out"
                    );
                }
                Bounded::Cancelled => {
                    warn!(tx_hash = %outcome.tx_hash, "indexer wait cancelled");
                }
            }
        }

        submission.advance(outcome.state())?;
        info!(
            tx_hash = %outcome.tx_hash,
            tx_order = outcome.tx_order,
            gas_used = outcome.gas_used,
            status = %outcome.status,
            "transaction finished"
        );
        Ok(outcome)
    }

    async fn lookup_transactions(
        &self,
        tx_hashes: &[TxHash],
    ) -> Result<Vec<Option<TransactionWithInfoView>>, RpcClientError> {
        if tx_hashes.is_empty() {
            return Ok(Vec::new());
        }
        let params = GetTransactionsByHashParams { tx_hashes };
        let found: Vec<Option<TransactionWithInfoView>> =
            self.read(RpcMethod::GetTransactionsByHash, &params).await?;
        Self::check_slot_count(RpcMethod::GetTransactionsByHash, tx_hashes.len(), found.len())?;
        Ok(found)
    }

    async fn wait_until_indexed(
        &self,
        tx_hash: &TxHash,
        poll_interval: std::time::Duration,
    ) -> Result<(), RpcClientError> {
        loop {
            let found = self
                .lookup_transactions(std::slice::from_ref(tx_hash))
                .await?;
            if matches!(found.first(), Some(Some(_))) {
                return Ok(());
            }
            debug!(tx_hash = %tx_hash, "transaction not indexed yet");
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[async_trait]
impl<T: RpcTransport + 'static> QueryApi for RpcClientService<T> {
    async fn query_inscriptions(
        &self,
        filter: &InscriptionFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<IndexedState>, RpcClientError> {
        let page = self
            .fetch_page(filter, cursor, limit, descending, |cursor, limit| {
                QueryInscriptionsParams {
                    filter,
                    cursor,
                    limit,
                    descending_order: Some(descending),
                }
            })
            .await?;
        // The indexer always ships decoded inscriptions.
        self.resolve_indexed(RpcMethod::QueryInscriptions, true, page)
    }

    async fn query_utxos(
        &self,
        filter: &UtxoFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<IndexedState>, RpcClientError> {
        let page = self
            .fetch_page(filter, cursor, limit, descending, |cursor, limit| {
                QueryUtxosParams {
                    filter,
                    cursor,
                    limit,
                    descending_order: Some(descending),
                }
            })
            .await?;
        self.resolve_indexed(RpcMethod::QueryUtxos, true, page)
    }

    async fn get_balances(
        &self,
        owner: &str,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
    ) -> Result<Page<BalanceInfoView>, RpcClientError> {
        let scope = BalanceScope { owner };
        self.fetch_page(&scope, cursor, limit, false, |cursor, limit| {
            GetBalancesParams {
                owner,
                cursor,
                limit,
            }
        })
        .await
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<ResolvedEvent>, RpcClientError> {
        let page: Page<IndexerEventView> = self
            .fetch_page(
                filter,
                cursor,
                limit,
                options.descending_order,
                |cursor, limit| IndexerQueryParams {
                    filter,
                    cursor,
                    limit,
                    query_option: Some(options),
                },
            )
            .await?;
        let resolver = self.resolver(RpcMethod::QueryEvents, options.decode);
        page.try_map(|view| resolver.resolve_indexer_event(view))
    }

    async fn get_events_by_event_handle(
        &self,
        event_handle_type: &str,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
        options: EventOptions,
    ) -> Result<Page<ResolvedEvent>, RpcClientError> {
        let scope = EventHandleScope { event_handle_type };
        let page: Page<EventView> = self
            .fetch_page(&scope, cursor, limit, descending, |cursor, limit| {
                GetEventsByEventHandleParams {
                    event_handle_type,
                    cursor,
                    limit,
                    descending_order: Some(descending),
                    event_options: Some(options),
                }
            })
            .await?;
        let resolver = self.resolver(RpcMethod::GetEventsByEventHandle, options.decode);
        page.try_map(|view| resolver.resolve_event(view))
    }

    async fn query_object_states(
        &self,
        filter: &ObjectStateFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<IndexedState>, RpcClientError> {
        let page = self
            .fetch_page(
                filter,
                cursor,
                limit,
                options.descending_order,
                |cursor, limit| IndexerQueryParams {
                    filter,
                    cursor,
                    limit,
                    query_option: Some(options),
                },
            )
            .await?;
        self.resolve_indexed(RpcMethod::QueryObjectStates, options.decode, page)
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<TransactionWithInfoView>, RpcClientError> {
        self.fetch_page(
            filter,
            cursor,
            limit,
            options.descending_order,
            |cursor, limit| IndexerQueryParams {
                filter,
                cursor,
                limit,
                query_option: Some(options),
            },
        )
        .await
    }

    async fn get_transactions_by_order(
        &self,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        descending: bool,
    ) -> Result<Page<TransactionWithInfoView>, RpcClientError> {
        self.fetch_page(
            &TransactionOrderScope,
            cursor,
            limit,
            descending,
            |cursor, limit| GetTransactionsByOrderParams {
                cursor,
                limit,
                descending_order: Some(descending),
            },
        )
        .await
    }

    async fn sync_states(
        &self,
        filter: &SyncStateFilter,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: QueryOptions,
    ) -> Result<Page<StateChangeSetView>, RpcClientError> {
        self.fetch_page(
            filter,
            cursor,
            limit,
            options.descending_order,
            |cursor, limit| IndexerQueryParams {
                filter,
                cursor,
                limit,
                query_option: Some(options),
            },
        )
        .await
    }

    async fn list_states(
        &self,
        access_path: &AccessPath,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: StateOptions,
    ) -> Result<Page<FieldEntry>, RpcClientError> {
        let scope = StateScope { access_path };
        let page = self
            .fetch_page(&scope, cursor, limit, false, |cursor, limit| {
                ListStatesParams {
                    access_path: access_path.to_string(),
                    cursor,
                    limit,
                    state_option: Some(options),
                }
            })
            .await?;
        self.resolve_fields(RpcMethod::ListStates, options.decode, page)
    }

    async fn list_field_states(
        &self,
        object_id: &ObjectId,
        cursor: Option<&PageCursor>,
        limit: Option<PageLimit>,
        options: StateOptions,
    ) -> Result<Page<FieldEntry>, RpcClientError> {
        let scope = FieldScope { object_id };
        let page = self
            .fetch_page(&scope, cursor, limit, false, |cursor, limit| {
                ListFieldStatesParams {
                    object_id,
                    cursor,
                    limit,
                    state_option: Some(options),
                }
            })
            .await?;
        self.resolve_fields(RpcMethod::ListFieldStates, options.decode, page)
    }

    async fn get_states(
        &self,
        access_path: &AccessPath,
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError> {
        access_path.validate()?;
        if let AccessPath::Fields { keys, .. } = access_path {
            if keys.is_empty() {
                return Err(RpcClientError::MalformedRequest(format!(
                    "access path {} names no field keys; use list_states",
                    access_path
                )));
            }
        }
        let params = GetStatesParams {
            access_path: access_path.to_string(),
            state_option: Some(options),
        };
        let views: Vec<Option<ObjectStateView>> = self.read(RpcMethod::GetStates, &params).await?;
        if let Some(expected) = access_path.expected_slots() {
            Self::check_slot_count(RpcMethod::GetStates, expected, views.len())?;
        }
        self.resolve_slots(RpcMethod::GetStates, options, views)
    }

    async fn get_field_states(
        &self,
        object_id: &ObjectId,
        field_keys: &[String],
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError> {
        if field_keys.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = field_keys.iter().find(|k| k.is_empty()) {
            return Err(RpcClientError::MalformedRequest(format!(
                "invalid field key '{}'",
                bad
            )));
        }
        let params = GetFieldStatesParams {
            object_id,
            field_key: field_keys,
            state_option: Some(options),
        };
        let views: Vec<Option<ObjectStateView>> =
            self.read(RpcMethod::GetFieldStates, &params).await?;
        Self::check_slot_count(RpcMethod::GetFieldStates, field_keys.len(), views.len())?;
        self.resolve_slots(RpcMethod::GetFieldStates, options, views)
    }

    async fn get_object_states(
        &self,
        object_ids: &[ObjectId],
        options: StateOptions,
    ) -> Result<Vec<StateSlot>, RpcClientError> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = GetObjectStatesParams {
            object_ids,
            state_option: Some(options),
        };
        let views: Vec<Option<ObjectStateView>> =
            self.read(RpcMethod::GetObjectStates, &params).await?;
        Self::check_slot_count(RpcMethod::GetObjectStates, object_ids.len(), views.len())?;
        self.resolve_slots(RpcMethod::GetObjectStates, options, views)
    }

    async fn get_transactions_by_hash(
        &self,
        tx_hashes: &[TxHash],
    ) -> Result<Vec<Option<TransactionWithInfoView>>, RpcClientError> {
        self.lookup_transactions(tx_hashes).await
    }

    async fn get_balance(
        &self,
        owner: &str,
        coin_type: &str,
    ) -> Result<BalanceInfoView, RpcClientError> {
        validate_address("owner", owner)?;
        validate_type_tag("coin_type", coin_type)?;
        self.read(RpcMethod::GetBalance, &GetBalanceParams { owner, coin_type })
            .await
    }

    async fn get_module_abi(
        &self,
        module_addr: &str,
        module_name: &str,
    ) -> Result<Option<ModuleAbiView>, RpcClientError> {
        validate_address("module_addr", module_addr)?;
        if module_name.is_empty() {
            return Err(RpcClientError::MalformedRequest(
                "module_name must not be empty".into(),
            ));
        }
        self.read(
            RpcMethod::GetModuleAbi,
            &GetModuleAbiParams {
                module_addr,
                module_name,
            },
        )
        .await
    }

    async fn repair_indexer(
        &self,
        repair_type: RepairType,
        scope: &RepairScope,
    ) -> Result<(), RpcClientError> {
        scope.validate()?;
        let params = RepairIndexerParams {
            repair_type,
            repair_params: scope,
        };
        let _: Value = self.read(RpcMethod::RepairIndexer, &params).await?;
        info!(repair_type = ?repair_type, scope = ?scope, "indexer repair requested");
        Ok(())
    }
}

#[async_trait]
impl<T: RpcTransport + 'static> SubmissionApi for RpcClientService<T> {
    async fn dry_run(&self, tx: &RawTransaction) -> Result<SimulationOutcome, RpcClientError> {
        let mut submission = TxSubmission::new(tx.clone());
        let tx_hash = submission.tx_hash().clone();
        let params = TxBcsParams {
            tx_bcs_hex: tx.to_hex(),
        };

        let view: DryRunResponseView = self
            .dispatch(RpcMethod::DryRunRawTransaction, &params, |e| {
                classify_submission_error(e, Some(tx_hash.as_str()))
            })
            .await?;
        submission.advance(SubmissionState::Simulated)?;

        debug!(
            tx_hash = %tx_hash,
            status = %view.raw_output.status,
            gas_used = view.raw_output.gas_used,
            "dry run finished"
        );
        Ok(SimulationOutcome {
            tx_hash,
            status: view.raw_output.status,
            gas_used: view.raw_output.gas_used,
            vm_error: view.vm_error_info,
            state: submission.state(),
        })
    }

    async fn send_raw_transaction(
        &self,
        tx: RawTransaction,
    ) -> Result<SubmissionReceipt, RpcClientError> {
        let mut submission = TxSubmission::new(tx);
        let local_hash = submission.tx_hash().clone();
        let params = TxBcsParams {
            tx_bcs_hex: submission.transaction().to_hex(),
        };

        let tx_hash: TxHash = self
            .dispatch(RpcMethod::SendRawTransaction, &params, |e| {
                classify_submission_error(e, Some(local_hash.as_str()))
            })
            .await?;
        submission.advance(SubmissionState::Submitted)?;

        if tx_hash != local_hash {
            warn!(
                local = %local_hash,
                server = %tx_hash,
                "server tx hash differs from local hash"
            );
        }
        info!(tx_hash = %tx_hash, "transaction submitted");

        Ok(SubmissionReceipt {
            tx_hash,
            local_hash,
            state: submission.state(),
        })
    }

    async fn execute_raw_transaction(
        &self,
        tx: RawTransaction,
        options: ExecuteOptions,
    ) -> Result<ExecutionOutcome, RpcClientError> {
        self.execute_raw_transaction_until(tx, options, std::future::pending::<()>())
            .await
    }

    async fn broadcast_tx(
        &self,
        hex: &str,
        options: BroadcastOptions,
    ) -> Result<String, RpcClientError> {
        validate_bitcoin_hex(hex)?;
        options.validate()?;
        let params = BroadcastTxParams {
            hex,
            maxfeerate: options.maxfeerate,
            maxburnamount: options.maxburnamount,
        };

        let txid: String = self
            .dispatch(RpcMethod::BroadcastTx, &params, classify_broadcast_error)
            .await?;
        info!(txid = %txid, "bitcoin transaction broadcast");
        Ok(txid)
    }
}
