//! Transaction execution: submit, await inclusion, then collect the
//! correlated events into an immutable `TransactionRecord`.
//!
//! ```text
//! ContractCall
//!     | eth_sendTransaction (bound signer)
//!     v
//! tx hash --poll eth_getTransactionReceipt (caller deadline)--> receipt
//!     | eth_blockNumber -> [head - window, head]
//!     v
//! eth_getLogs per EventKind -> find_by_transaction -> decode
//!     |
//!     v
//! TransactionRecord
//! ```

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;
use tracing::{debug, info, warn};

use crate::context::ClientContext;
use crate::contracts::{ContractEvent, DecodedEvent, EventKind};
use crate::correlator::{count_matches, find_by_transaction};
use crate::error::{ExecutionError, Result};
use crate::rpc::types::{LogFilter, TransactionReceipt, TransactionRequest};
use crate::transport::{ChainTransport, TransportError};

/// An ABI-encoded state-changing call against one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub data: Bytes,
    /// Solidity signature, used in logs and errors
    pub label: &'static str,
}

impl ContractCall {
    pub fn new<C: SolCall>(to: Address, call: &C) -> Self {
        Self {
            to,
            data: Bytes::from(call.abi_encode()),
            label: C::SIGNATURE,
        }
    }
}

/// Per-call overrides of the context's execution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Deadline for the inclusion wait
    pub confirmation_timeout: Option<Duration>,
    /// Blocks behind the head searched for events
    pub event_window: Option<u64>,
}

impl ExecuteOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }

    pub fn with_event_window(mut self, blocks: u64) -> Self {
        self.event_window = Some(blocks);
        self
    }
}

/// Inclusive block range searched for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    pub from_block: u64,
    pub to_block: u64,
}

/// Confirmed transaction plus the events correlated to it. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    tx_hash: B256,
    block_number: u64,
    window: BlockWindow,
    events: Vec<DecodedEvent>,
}

impl TransactionRecord {
    pub(crate) fn new(
        tx_hash: B256,
        block_number: u64,
        window: BlockWindow,
        events: Vec<DecodedEvent>,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            window,
            events,
        }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn window(&self) -> BlockWindow {
        self.window
    }

    pub fn events(&self) -> &[DecodedEvent] {
        &self.events
    }

    /// The correlated event of type `E`, if it was emitted.
    pub fn optional<E: ContractEvent>(&self) -> Option<&E> {
        self.events.iter().find_map(E::extract)
    }

    /// The correlated event of type `E`, or `EventNotFound` naming the searched window.
    pub fn required<E: ContractEvent>(&self) -> Result<&E> {
        self.optional::<E>().ok_or(ExecutionError::EventNotFound {
            event: E::KIND.name(),
            tx_hash: self.tx_hash,
            from_block: self.window.from_block,
            to_block: self.window.to_block,
        })
    }
}

/// Runs calls through the node on behalf of the context's signer.
pub struct TransactionExecutor<'a, T> {
    ctx: &'a ClientContext<T>,
}

impl<'a, T: ChainTransport> TransactionExecutor<'a, T> {
    pub fn new(ctx: &'a ClientContext<T>) -> Self {
        Self { ctx }
    }

    /// Submit, await inclusion, and collect events of `kinds` emitted by the transaction.
    pub async fn execute(
        &self,
        call: &ContractCall,
        kinds: &[EventKind],
        options: &ExecuteOptions,
    ) -> Result<TransactionRecord> {
        let tx_hash = self.submit(call).await?;
        self.resolve(tx_hash, call.to, kinds, options).await
    }

    /// Send the call from the bound signer and return its hash.
    pub async fn submit(&self, call: &ContractCall) -> Result<B256> {
        let selector = call.data.get(..4).map(hex::encode).unwrap_or_default();
        debug!(
            "Submitting {} (selector=0x{}) to {} from {}",
            call.label,
            selector,
            call.to,
            self.ctx.signer()
        );

        let request = TransactionRequest {
            from: self.ctx.signer(),
            to: call.to,
            data: call.data.clone(),
        };

        let tx_hash = self
            .ctx
            .transport()
            .send_transaction(request)
            .await
            .map_err(|e| match e {
                TransportError::Rpc { code, message } => ExecutionError::SubmissionRejected(
                    format!("{} rejected ({}): {}", call.label, code, message),
                ),
                other => ExecutionError::UpstreamUnavailable(other.to_string()),
            })?;

        info!("Submitted {}: tx_hash={}", call.label, tx_hash);
        Ok(tx_hash)
    }

    /// Resolve an already-submitted transaction. Safe to repeat with a wider window.
    ///
    /// Node failures from here on are reported as `Unresolved` with the hash.
    pub async fn resolve(
        &self,
        tx_hash: B256,
        emitter: Address,
        kinds: &[EventKind],
        options: &ExecuteOptions,
    ) -> Result<TransactionRecord> {
        let receipt = self.await_inclusion(tx_hash, options).await?;

        if !receipt.succeeded() {
            return Err(ExecutionError::SubmissionRejected(format!(
                "transaction {} reverted in block {}",
                tx_hash,
                receipt.block()
            )));
        }

        self.collect(tx_hash, receipt.block(), emitter, kinds, options)
            .await
            .map_err(|e| e.after_submission(tx_hash))
    }

    /// Suspend until the node reports a receipt, bounded by the effective deadline.
    pub async fn await_inclusion(
        &self,
        tx_hash: B256,
        options: &ExecuteOptions,
    ) -> Result<TransactionReceipt> {
        let deadline = options
            .confirmation_timeout
            .or(self.ctx.settings().confirmation_timeout);

        let receipt = match deadline {
            Some(limit) => tokio::time::timeout(limit, self.poll_receipt(tx_hash))
                .await
                .map_err(|_| ExecutionError::Timeout {
                    tx_hash,
                    waited: limit,
                })?,
            None => self.poll_receipt(tx_hash).await,
        }
        .map_err(|e| e.after_submission(tx_hash))?;

        info!(
            "Transaction {} included in block {}",
            tx_hash,
            receipt.block()
        );
        Ok(receipt)
    }

    async fn collect(
        &self,
        tx_hash: B256,
        included_at: u64,
        emitter: Address,
        kinds: &[EventKind],
        options: &ExecuteOptions,
    ) -> Result<TransactionRecord> {
        let window = self.event_window(included_at, options).await?;

        let mut events = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if let Some(event) = self.correlate(tx_hash, emitter, *kind, window).await? {
                events.push(event);
            }
        }

        Ok(TransactionRecord::new(tx_hash, included_at, window, events))
    }

    async fn poll_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let interval = self.ctx.settings().poll_interval;
        let mut attempt: u64 = 0;

        loop {
            if let Some(receipt) = self.ctx.transport().transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            attempt += 1;
            debug!("Transaction {} not yet included, attempt {}", tx_hash, attempt);
            tokio::time::sleep(interval).await;
        }
    }

    async fn event_window(&self, included_at: u64, options: &ExecuteOptions) -> Result<BlockWindow> {
        let span = options
            .event_window
            .unwrap_or(self.ctx.settings().event_window_blocks);
        let head = self.ctx.transport().block_number().await?.max(included_at);

        Ok(BlockWindow {
            from_block: head.saturating_sub(span),
            to_block: head,
        })
    }

    async fn correlate(
        &self,
        tx_hash: B256,
        emitter: Address,
        kind: EventKind,
        window: BlockWindow,
    ) -> Result<Option<DecodedEvent>> {
        let filter = LogFilter {
            address: emitter,
            topic0: kind.signature_hash(),
            from_block: window.from_block,
            to_block: window.to_block,
        };

        let logs = self.ctx.transport().logs(&filter).await?;
        debug!(
            "Queried {} logs: blocks {}..={}, {} candidates",
            kind.name(),
            window.from_block,
            window.to_block,
            logs.len()
        );

        let matches = count_matches(&logs, &tx_hash);
        if matches > 1 {
            warn!(
                "{} {} events correlate to {}, using the first",
                matches,
                kind.name(),
                tx_hash
            );
        }

        find_by_transaction(&logs, &tx_hash)
            .map(|log| kind.decode(log))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{IDice, IERC20};
    use crate::mock::{test_context, MockNode, ScriptedTx, DICE, SIGNER};
    use alloy_primitives::U256;
    use alloy_sol_types::SolEvent;

    fn created(id: u64) -> IDice::GameCreated {
        IDice::GameCreated {
            id: U256::from(id),
            creator: SIGNER,
            betAmount: U256::from(1000),
            timestamp: U256::from(1_700_000_000u64),
        }
    }

    fn create_call() -> ContractCall {
        ContractCall::new(DICE, &IDice::createGameCall { bet: U256::from(1000) })
    }

    #[tokio::test]
    async fn test_execute_collects_correlated_event() {
        let ctx = test_context(MockNode::new());
        ctx.transport()
            .script(ScriptedTx::included().emit(DICE, &created(7)));

        let record = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap();

        assert_eq!(record.events().len(), 1);
        assert_eq!(record.required::<IDice::GameCreated>().unwrap(), &created(7));
        assert!(record.optional::<IDice::GameEnded>().is_none());

        let submissions = ctx.transport().submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].from, SIGNER);
        assert_eq!(submissions[0].to, DICE);
        assert_eq!(submissions[0].data, create_call().data);
    }

    #[tokio::test]
    async fn test_foreign_events_are_ignored() {
        let node = MockNode::new();
        node.push_foreign_log(DICE, &created(1));
        node.script(ScriptedTx::included().emit(DICE, &created(2)));
        node.push_foreign_log(DICE, &created(3));
        let ctx = test_context(node);

        let record = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap();

        assert_eq!(record.required::<IDice::GameCreated>().unwrap().id, U256::from(2));
    }

    #[tokio::test]
    async fn test_events_from_other_contracts_are_ignored() {
        let other = Address::repeat_byte(0xee);
        let ctx = test_context(MockNode::new());
        ctx.transport()
            .script(ScriptedTx::included().emit(other, &created(9)));

        let err = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap()
            .required::<IDice::GameCreated>()
            .map(|_| ())
            .unwrap_err();

        assert!(matches!(err, ExecutionError::EventNotFound { .. }));
    }

    #[tokio::test]
    async fn test_event_outside_window_then_wider_retry() {
        let ctx = test_context(MockNode::new());
        ctx.transport()
            .script(ScriptedTx::included().emit(DICE, &created(4)).then_mine(30));

        let executor = ctx.executor();
        let tx_hash = executor.submit(&create_call()).await.unwrap();

        let narrow = executor
            .resolve(tx_hash, DICE, &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap();
        let err = narrow.required::<IDice::GameCreated>().unwrap_err();
        assert!(err.is_retryable());
        match err {
            ExecutionError::EventNotFound {
                event,
                tx_hash: missing,
                from_block,
                to_block,
            } => {
                assert_eq!(event, "GameCreated");
                assert_eq!(missing, tx_hash);
                assert_eq!(to_block - from_block, 20);
            }
            other => panic!("expected EventNotFound, got {:?}", other),
        }

        let wide = executor
            .resolve(
                tx_hash,
                DICE,
                &[EventKind::GameCreated],
                &ExecuteOptions::default().with_event_window(50),
            )
            .await
            .unwrap();
        assert_eq!(wide.required::<IDice::GameCreated>().unwrap(), &created(4));
        // Resolving never resubmits
        assert_eq!(ctx.transport().submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_rpc_rejection_is_submission_rejected() {
        let ctx = test_context(MockNode::new());
        ctx.transport()
            .script(ScriptedTx::rejected("insufficient allowance"));

        let err = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap_err();

        match err {
            ExecutionError::SubmissionRejected(msg) => {
                assert!(msg.contains("insufficient allowance"), "{}", msg)
            }
            other => panic!("expected SubmissionRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_submission_rejected() {
        let ctx = test_context(MockNode::new());
        ctx.transport().script(ScriptedTx::reverted());

        let err = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::SubmissionRejected(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_unavailable() {
        let ctx = test_context(MockNode::new());
        ctx.transport().set_offline(true);

        let err = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failure_after_submission_keeps_hash() {
        let ctx = test_context(MockNode::new());
        ctx.transport()
            .script(ScriptedTx::included().emit(DICE, &created(5)));

        let executor = ctx.executor();
        let tx_hash = executor.submit(&create_call()).await.unwrap();
        ctx.transport().set_offline(true);

        let err = executor
            .resolve(tx_hash, DICE, &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        match err {
            ExecutionError::Unresolved { tx_hash: pending, .. } => assert_eq!(pending, tx_hash),
            other => panic!("expected Unresolved, got {:?}", other),
        }

        ctx.transport().set_offline(false);
        let record = executor
            .resolve(tx_hash, DICE, &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap();
        assert_eq!(record.required::<IDice::GameCreated>().unwrap(), &created(5));
        assert_eq!(ctx.transport().submissions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inclusion_deadline_is_timeout() {
        let ctx = test_context(MockNode::new());
        ctx.transport().script(ScriptedTx::never_included());

        let started = tokio::time::Instant::now();
        let err = ctx
            .executor()
            .execute(
                &create_call(),
                &[EventKind::GameCreated],
                &ExecuteOptions::default().with_timeout(Duration::from_secs(30)),
            )
            .await
            .unwrap_err();

        match err {
            ExecutionError::Timeout { waited, .. } => assert_eq!(waited, Duration::from_secs(30)),
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_malformed_log_is_reported() {
        let ctx = test_context(MockNode::new());
        // A Transfer body under the GameCreated topic
        ctx.transport().script(ScriptedTx::included().emit_raw(
            DICE,
            vec![EventKind::GameCreated.signature_hash()],
            IERC20::Transfer {
                from: SIGNER,
                to: DICE,
                value: U256::from(1),
            }
            .encode_data(),
        ));

        let err = ctx
            .executor()
            .execute(&create_call(), &[EventKind::GameCreated], &ExecuteOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::MalformedEvent { .. }));
    }
}
