//! Sequential batch submission.
//!
//! Every step is signed before anything is sent, so a signer that refuses
//! stops the batch with nothing on chain. Steps are then sent and confirmed
//! strictly in order. Each later step is re-signed against a blockhash
//! fetched once the previous step is confirmed, and the first failure
//! aborts the batch.

use std::fmt;
use std::sync::Arc;

use mintforge_sdk::client::{ClientError, RpcConnection};
use mintforge_sdk::wallet::{WalletError, WalletSigner};
use serde::Serialize;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use super::builder::{BatchStep, StepKind, TransactionBatch};
use super::events::{EventHub, StepEvent, StepStatus};
use super::metrics::LaunchMetrics;

/// A confirmed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReceipt {
    /// What the step did.
    pub kind: StepKind,
    /// Transaction signature (base58 encoded).
    pub signature: String,
    /// Slot the transaction landed in.
    pub slot: u64,
}

/// Why a step failed.
#[derive(Debug)]
pub enum SubmitFailure {
    /// Blockhash, send or confirmation failed.
    Client(ClientError),
    /// Signing failed.
    Wallet(WalletError),
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(e) => write!(f, "{}", e),
            Self::Wallet(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Wallet(e) => Some(e),
        }
    }
}

/// A batch that stopped before completing.
#[derive(Debug, thiserror::Error)]
#[error("step {index} ({step}) failed: {source}")]
pub struct SubmitError {
    /// Failing step.
    pub step: StepKind,
    /// Zero-based index of the failing step.
    pub index: usize,
    /// Steps confirmed before the failure.
    pub completed: Vec<StepReceipt>,
    /// Cause.
    pub source: SubmitFailure,
}

/// Signs and submits batches for one wallet.
pub struct BatchSubmitter<'a, C, W: ?Sized> {
    connection: &'a C,
    wallet: &'a W,
    events: Option<Arc<EventHub>>,
    metrics: Option<Arc<LaunchMetrics>>,
}

impl<'a, C, W> BatchSubmitter<'a, C, W>
where
    C: RpcConnection,
    W: WalletSigner + ?Sized,
{
    /// Creates a submitter.
    #[must_use]
    pub fn new(connection: &'a C, wallet: &'a W) -> Self {
        Self {
            connection,
            wallet,
            events: None,
            metrics: None,
        }
    }

    /// Publishes step events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventHub>) -> Self {
        self.events = Some(events);
        self
    }

    /// Records transactions in `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<LaunchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Submits every step of `batch` in order.
    ///
    /// # Errors
    ///
    /// Returns the failing step together with the receipts of the steps
    /// that were already confirmed.
    pub async fn submit_batch(
        &self,
        batch: &TransactionBatch,
    ) -> Result<Vec<StepReceipt>, SubmitError> {
        let kinds = batch.kinds();
        let Some(&first_kind) = kinds.first() else {
            return Ok(Vec::new());
        };
        let total = kinds.len();

        let blockhash = self
            .connection
            .get_latest_blockhash()
            .await
            .map_err(|e| self.fail(first_kind, 0, total, Vec::new(), SubmitFailure::Client(e)))?;
        debug!("Signing {} steps against blockhash {}", total, blockhash);

        let signed = batch.sign(self.wallet, blockhash).map_err(|(index, e)| {
            let kind = kinds.get(index).copied().unwrap_or(first_kind);
            self.fail(kind, index, total, Vec::new(), SubmitFailure::Wallet(e))
        })?;

        let mut receipts = Vec::with_capacity(total);
        for (index, (step, presigned)) in batch.steps().iter().zip(signed).enumerate() {
            let transaction = if index == 0 {
                presigned.transaction
            } else {
                match self.resign(step).await {
                    Ok(transaction) => transaction,
                    Err(failure) => {
                        return Err(self.fail(step.kind, index, total, receipts, failure));
                    }
                }
            };

            match self.submit_step(step.kind, &transaction, index, total).await {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => {
                    let failure = SubmitFailure::Client(e);
                    return Err(self.fail(step.kind, index, total, receipts, failure));
                }
            }
        }

        info!("Batch of {} steps confirmed", total);
        Ok(receipts)
    }

    /// Signs `step` against a fresh blockhash.
    async fn resign(&self, step: &BatchStep) -> Result<Transaction, SubmitFailure> {
        let blockhash = self
            .connection
            .get_latest_blockhash()
            .await
            .map_err(SubmitFailure::Client)?;
        debug!("Re-signing {} against blockhash {}", step.kind, blockhash);

        step.sign(self.wallet, blockhash).map_err(SubmitFailure::Wallet)
    }

    async fn submit_step(
        &self,
        kind: StepKind,
        transaction: &Transaction,
        index: usize,
        total: usize,
    ) -> Result<StepReceipt, ClientError> {
        self.publish(kind, index, total, StepStatus::Sending);
        info!("{}", kind.sending_message());

        let signature = self.connection.send_transaction(transaction).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_submission();
        }
        debug!("Sent {} as {}", kind, signature);

        let slot = self.connection.confirm_transaction(&signature).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_confirmed();
        }

        let signature = signature.to_string();
        info!(
            "{} signature={} slot={}",
            kind.success_message(),
            signature,
            slot
        );
        self.publish(
            kind,
            index,
            total,
            StepStatus::Confirmed {
                signature: signature.clone(),
                slot,
            },
        );

        Ok(StepReceipt {
            kind,
            signature,
            slot,
        })
    }

    fn fail(
        &self,
        step: StepKind,
        index: usize,
        total: usize,
        completed: Vec<StepReceipt>,
        source: SubmitFailure,
    ) -> SubmitError {
        warn!("Step {} ({}) failed: {}", index, step, source);
        if let Some(metrics) = &self.metrics {
            metrics.record_failure();
        }
        self.publish(
            step,
            index,
            total,
            StepStatus::Failed {
                error: source.to_string(),
            },
        );

        SubmitError {
            step,
            index,
            completed,
            source,
        }
    }

    fn publish(&self, step: StepKind, index: usize, total: usize, status: StepStatus) {
        if let Some(events) = &self.events {
            events.publish(StepEvent::new(step, index, total, status));
        }
    }
}

#[cfg(test)]
mod tests {
    use mintforge_sdk::instructions::transfer;
    use mintforge_sdk::KeypairWallet;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::builder::BatchStep;
    use crate::test_utils::{DisconnectedWallet, MockCall, MockConnection};

    fn batch(payer: &Pubkey, kinds: &[StepKind]) -> TransactionBatch {
        kinds
            .iter()
            .map(|kind| {
                BatchStep::new(
                    *kind,
                    vec![transfer(payer, &Pubkey::new_unique(), 1)],
                    Vec::new(),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    const MARKET_STEPS: [StepKind; 3] = [
        StepKind::CreateMints,
        StepKind::CreateVaults,
        StepKind::CreateMarket,
    ];

    #[tokio::test]
    async fn test_submit_batch_in_order() {
        let connection = MockConnection::new();
        let wallet = KeypairWallet::new(Keypair::new());
        let batch = batch(&wallet.pubkey(), &MARKET_STEPS);

        let receipts = BatchSubmitter::new(&connection, &wallet)
            .submit_batch(&batch)
            .await
            .expect("submitted");

        assert_eq!(
            receipts.iter().map(|r| r.kind).collect::<Vec<_>>(),
            MARKET_STEPS.to_vec()
        );
        assert_eq!(
            connection.calls(),
            vec![
                MockCall::Blockhash,
                MockCall::Send,
                MockCall::Confirm,
                MockCall::Blockhash,
                MockCall::Send,
                MockCall::Confirm,
                MockCall::Blockhash,
                MockCall::Send,
                MockCall::Confirm,
            ]
        );

        let sent = connection.sent();
        assert_eq!(receipts[2].signature, sent[2].signatures[0].to_string());
        assert!(sent.iter().all(Transaction::is_signed));
    }

    #[tokio::test]
    async fn test_submit_batch_refreshes_blockhash_per_step() {
        let connection = MockConnection::new();
        let wallet = KeypairWallet::new(Keypair::new());
        let batch = batch(&wallet.pubkey(), &MARKET_STEPS);

        BatchSubmitter::new(&connection, &wallet)
            .submit_batch(&batch)
            .await
            .expect("submitted");

        // one blockhash for the up-front signing pass, then one per later step
        let blockhashes = connection.blockhashes();
        assert_eq!(blockhashes.len(), 3);

        let used: Vec<_> = connection
            .sent()
            .iter()
            .map(|tx| tx.message.recent_blockhash)
            .collect();
        assert_eq!(used, blockhashes);
    }

    #[tokio::test]
    async fn test_submit_batch_aborts_on_send_failure() {
        let connection = MockConnection::new().fail_send_at(1);
        let wallet = KeypairWallet::new(Keypair::new());
        let batch = batch(&wallet.pubkey(), &MARKET_STEPS);
        let metrics = Arc::new(LaunchMetrics::new());

        let err = BatchSubmitter::new(&connection, &wallet)
            .with_metrics(Arc::clone(&metrics))
            .submit_batch(&batch)
            .await
            .expect_err("second step fails");

        assert_eq!(err.step, StepKind::CreateVaults);
        assert_eq!(err.index, 1);
        assert_eq!(err.completed.len(), 1);
        assert!(matches!(err.source, SubmitFailure::Client(ClientError::Rpc { .. })));

        // the market step is never sent
        assert_eq!(connection.sent().len(), 1);
        assert_eq!(metrics.transactions_confirmed(), 1);
        assert_eq!(metrics.transactions_failed(), 1);
    }

    #[tokio::test]
    async fn test_submit_batch_aborts_on_confirm_failure() {
        let connection = MockConnection::new().fail_confirm_at(0);
        let wallet = KeypairWallet::new(Keypair::new());
        let batch = batch(&wallet.pubkey(), &MARKET_STEPS);

        let err = BatchSubmitter::new(&connection, &wallet)
            .submit_batch(&batch)
            .await
            .expect_err("first step fails");

        assert_eq!(err.step, StepKind::CreateMints);
        assert!(err.completed.is_empty());
        assert_eq!(
            connection.calls(),
            vec![MockCall::Blockhash, MockCall::Send, MockCall::Confirm]
        );
    }

    #[tokio::test]
    async fn test_submit_batch_events() {
        let connection = MockConnection::new().fail_send_at(2);
        let wallet = KeypairWallet::new(Keypair::new());
        let batch = batch(&wallet.pubkey(), &MARKET_STEPS);
        let hub = Arc::new(EventHub::new());
        let stream = hub.subscribe();

        let result = BatchSubmitter::new(&connection, &wallet)
            .with_events(Arc::clone(&hub))
            .submit_batch(&batch)
            .await;
        assert!(result.is_err());
        drop(hub);

        let events: Vec<StepEvent> = stream.collect().await;
        let summary: Vec<(usize, bool)> = events
            .iter()
            .map(|e| (e.index, matches!(e.status, StepStatus::Confirmed { .. })))
            .collect();
        assert_eq!(
            summary,
            vec![(0, false), (0, true), (1, false), (1, true), (2, false), (2, false)]
        );
        assert!(matches!(
            events.last().map(|e| &e.status),
            Some(StepStatus::Failed { .. })
        ));
        assert!(events.iter().all(|e| e.total == 3));
    }

    #[tokio::test]
    async fn test_submit_empty_batch() {
        let connection = MockConnection::new();
        let wallet = KeypairWallet::new(Keypair::new());

        let receipts = BatchSubmitter::new(&connection, &wallet)
            .submit_batch(&TransactionBatch::new())
            .await
            .expect("nothing to do");
        assert!(receipts.is_empty());
        assert!(connection.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_batch_signing_failure_sends_nothing() {
        let connection = MockConnection::new();
        let wallet = DisconnectedWallet(Pubkey::new_unique());
        let batch = batch(&wallet.0, &[StepKind::CreateToken]);

        let err = BatchSubmitter::new(&connection, &wallet)
            .submit_batch(&batch)
            .await
            .expect_err("wallet refuses");

        assert!(matches!(
            err.source,
            SubmitFailure::Wallet(WalletError::NotConnected)
        ));
        assert_eq!(connection.calls(), vec![MockCall::Blockhash]);
        assert!(err.to_string().starts_with("step 0 (create_token) failed"));
    }
}
