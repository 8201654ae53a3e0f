//! Launcher service.
//!
//! Orchestrates validation, rent lookup, transaction building and
//! submission for market and token creation.

use std::sync::Arc;

use mintforge_sdk::client::{ClientError, RpcConnection};
use mintforge_sdk::programs::MINT_SIZE;
use mintforge_sdk::types::market::parse_pubkey;
use mintforge_sdk::wallet::WalletSigner;
use mintforge_sdk::{
    LotSizes, MarketAccountSizes, MarketCreationRequest, MintInfo, MintSource, QueueLengths,
    SdkError, TokenAccountSummary, TokenCreationRequest,
};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};

use super::builder::{MarketTransactionBuilder, NewMint, ResolvedMints};
use super::config::{ConfigError, FeeSchedule, LauncherConfig};
use super::events::{EventHub, StepEvent};
use super::metrics::LaunchMetrics;
use super::rent::{CostEstimate, RentSchedule};
use super::submitter::{BatchSubmitter, StepReceipt, SubmitError};
use super::token::TokenTransactionBuilder;

/// Launcher errors.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request failed validation. Nothing was sent.
    #[error("invalid request: {0}")]
    Validation(#[from] SdkError),

    /// Wallet cannot sign.
    #[error("wallet not connected")]
    WalletNotConnected,

    /// Mints missing or not SPL mints.
    #[error("invalid mints: {0}")]
    InvalidMints(String),

    /// RPC read failed before anything was sent.
    #[error("rpc error: {0}")]
    Client(#[from] ClientError),

    /// A batch step failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// A batch confirmed without producing a receipt.
    #[error("batch produced no receipts")]
    NoReceipts,
}

/// A created market.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCreated {
    /// Market state account.
    pub market: Pubkey,
    /// Base mint.
    pub base_mint: Pubkey,
    /// Quote mint.
    pub quote_mint: Pubkey,
    /// Base vault.
    pub base_vault: Pubkey,
    /// Quote vault.
    pub quote_vault: Pubkey,
    /// Request queue.
    pub request_queue: Pubkey,
    /// Event queue.
    pub event_queue: Pubkey,
    /// Bids.
    pub bids: Pubkey,
    /// Asks.
    pub asks: Pubkey,
    /// Owner of both vaults.
    pub vault_signer: Pubkey,
    /// Nonce that derives the vault signer.
    pub vault_signer_nonce: u64,
    /// Lot sizes.
    pub lot_sizes: LotSizes,
    /// Lamports spent on rent and fees.
    pub lamports_spent: u64,
    /// Confirmed steps in order.
    pub receipts: Vec<StepReceipt>,
}

/// A created token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreated {
    /// New mint.
    pub mint: Pubkey,
    /// Wallet's token account holding the initial supply.
    pub token_account: Pubkey,
    /// Metadata account.
    pub metadata: Pubkey,
    /// Initial supply in atoms.
    pub supply_atoms: u64,
    /// Lamports spent on rent and fees.
    pub lamports_spent: u64,
    /// Confirmed transaction.
    pub receipt: StepReceipt,
}

/// Creates markets and tokens for one wallet on one cluster.
pub struct Launcher<C, W> {
    /// Cluster connection.
    connection: Arc<C>,

    /// Fee payer.
    wallet: Arc<W>,

    /// Configuration.
    config: LauncherConfig,

    /// Dex program.
    program_id: Pubkey,

    /// Platform fee destination.
    fee_destination: Option<Pubkey>,

    /// Platform fees in lamports.
    fees: FeeSchedule,

    /// Metrics.
    metrics: Arc<LaunchMetrics>,

    /// Step event fan-out.
    events: Arc<EventHub>,
}

impl<C, W> Launcher<C, W>
where
    C: RpcConnection,
    W: WalletSigner,
{
    /// Creates a new launcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        connection: Arc<C>,
        wallet: Arc<W>,
        config: LauncherConfig,
    ) -> Result<Self, LaunchError> {
        config.validate()?;
        let program_id = config.dex_program()?;
        let fee_destination = config.fee_destination()?;
        let fees = config.fee_schedule()?;

        info!(
            "Launcher ready on {} (dex program {})",
            config.cluster, program_id
        );

        Ok(Self {
            connection,
            wallet,
            config,
            program_id,
            fee_destination,
            fees,
            metrics: Arc::new(LaunchMetrics::new()),
            events: Arc::new(EventHub::new()),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Returns the dex program.
    #[must_use]
    pub const fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<LaunchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Subscribes to step events of all later submissions.
    pub fn subscribe(&self) -> UnboundedReceiverStream<StepEvent> {
        self.events.subscribe()
    }

    /// Explorer link for a transaction on the configured cluster.
    #[must_use]
    pub fn explorer_url(&self, signature: &str) -> String {
        self.config.cluster.explorer_tx_url(signature)
    }

    /// Estimates the rent and fees of a market.
    ///
    /// # Errors
    ///
    /// Returns an error if a length is out of range or an RPC call fails.
    pub async fn estimate_market_costs(
        &self,
        lengths: QueueLengths,
        create_mints: bool,
    ) -> Result<CostEstimate, LaunchError> {
        let sizes = MarketAccountSizes::compute(&lengths)?;
        let rent = RentSchedule::fetch(self.connection.as_ref(), &sizes, create_mints).await?;

        Ok(CostEstimate {
            sizes,
            rent,
            platform_fee: self.market_fee(),
        })
    }

    /// Creates a market.
    ///
    /// Validates the request, resolves the mints, then submits
    /// `CreateMints` (new mints only), `CreateVaults` and `CreateMarket`
    /// in order.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `InvalidMints` before anything is sent, and
    /// `Submit` with the confirmed steps if a transaction fails.
    pub async fn create_market(
        &self,
        request: &MarketCreationRequest,
    ) -> Result<MarketCreated, LaunchError> {
        self.ensure_connected()?;
        let sizes = request.validate()?;

        let mints = self.resolve_mints(&request.mints).await?;
        debug!(
            "Resolved mints base={} quote={} new={}",
            mints.base_mint(),
            mints.quote_mint(),
            mints.creates_mints()
        );

        let rent =
            RentSchedule::fetch(self.connection.as_ref(), &sizes, mints.creates_mints()).await?;

        let mut builder = MarketTransactionBuilder::new(self.program_id, self.wallet.pubkey(), rent);
        if let Some(destination) = self.fee_destination {
            builder = builder.with_platform_fee(destination, self.fees.market_create);
        }

        let plan = builder.build_market_transactions(request, mints)?;
        info!(
            "Creating market {} in {} steps",
            plan.accounts.market,
            plan.batch.len()
        );

        let receipts = self.submitter().submit_batch(&plan.batch).await?;

        let lamports_spent = plan.rent_lamports.saturating_add(plan.platform_fee);
        self.metrics.record_market(lamports_spent);
        info!("Market {} created", plan.accounts.market);

        Ok(MarketCreated {
            market: plan.accounts.market,
            base_mint: plan.accounts.base_mint,
            quote_mint: plan.accounts.quote_mint,
            base_vault: plan.accounts.base_vault,
            quote_vault: plan.accounts.quote_vault,
            request_queue: plan.accounts.request_queue,
            event_queue: plan.accounts.event_queue,
            bids: plan.accounts.bids,
            asks: plan.accounts.asks,
            vault_signer: plan.vault_signer,
            vault_signer_nonce: plan.vault_signer_nonce,
            lot_sizes: plan.lot_sizes,
            lamports_spent,
            receipts,
        })
    }

    /// Creates a token with metadata and mints the initial supply to the
    /// wallet.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before anything is sent, and `Submit` if the
    /// transaction fails.
    pub async fn create_token(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<TokenCreated, LaunchError> {
        self.ensure_connected()?;
        request.validate()?;
        request.supply_atoms()?;

        let mint_rent = self
            .connection
            .get_minimum_balance_for_rent_exemption(MINT_SIZE)
            .await?;

        let plan = self
            .token_builder()
            .build_create_token(request, mint_rent)?;
        info!("Creating token {} ({})", request.symbol, plan.mint);

        let mut receipts = self.submitter().submit_batch(&plan.batch).await?;
        let receipt = receipts
            .pop()
            .ok_or(LaunchError::NoReceipts)?;

        let lamports_spent = mint_rent.saturating_add(plan.platform_fee);
        self.metrics.record_token(lamports_spent);

        Ok(TokenCreated {
            mint: plan.mint,
            token_account: plan.token_account,
            metadata: plan.metadata,
            supply_atoms: plan.supply_atoms,
            lamports_spent,
            receipt,
        })
    }

    /// Removes the delegate of one of the wallet's token accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet cannot sign or the transaction fails.
    pub async fn revoke_delegate(
        &self,
        token_account: &Pubkey,
    ) -> Result<StepReceipt, LaunchError> {
        self.ensure_connected()?;
        let batch = self.token_builder().build_revoke_delegate(token_account);
        self.submit_single(&batch).await
    }

    /// Permanently clears the mint authority of a mint the wallet controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet cannot sign or the transaction fails.
    pub async fn revoke_mint_authority(&self, mint: &Pubkey) -> Result<StepReceipt, LaunchError> {
        self.ensure_connected()?;
        let batch = self.token_builder().build_revoke_mint_authority(mint);
        self.submit_single(&batch).await
    }

    /// Permanently clears the freeze authority of a mint the wallet controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet cannot sign or the transaction fails.
    pub async fn revoke_freeze_authority(
        &self,
        mint: &Pubkey,
    ) -> Result<StepReceipt, LaunchError> {
        self.ensure_connected()?;
        let batch = self.token_builder().build_revoke_freeze_authority(mint);
        self.submit_single(&batch).await
    }

    /// Lists the wallet's SPL token accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    pub async fn token_accounts(&self) -> Result<Vec<TokenAccountSummary>, LaunchError> {
        Ok(self
            .connection
            .get_token_accounts_by_owner(&self.wallet.pubkey())
            .await?)
    }

    fn ensure_connected(&self) -> Result<(), LaunchError> {
        if self.wallet.is_connected() {
            Ok(())
        } else {
            Err(LaunchError::WalletNotConnected)
        }
    }

    fn market_fee(&self) -> u64 {
        self.fee_destination.map_or(0, |_| self.fees.market_create)
    }

    fn token_builder(&self) -> TokenTransactionBuilder {
        let builder = TokenTransactionBuilder::new(self.wallet.pubkey());
        match self.fee_destination {
            Some(destination) => builder.with_fees(destination, self.fees),
            None => builder,
        }
    }

    fn submitter(&self) -> BatchSubmitter<'_, C, W> {
        BatchSubmitter::new(self.connection.as_ref(), self.wallet.as_ref())
            .with_events(Arc::clone(&self.events))
            .with_metrics(Arc::clone(&self.metrics))
    }

    async fn submit_single(
        &self,
        batch: &super::builder::TransactionBatch,
    ) -> Result<StepReceipt, LaunchError> {
        let mut receipts = self.submitter().submit_batch(batch).await?;
        receipts.pop().ok_or(LaunchError::NoReceipts)
    }

    async fn resolve_mints(&self, source: &MintSource) -> Result<ResolvedMints, LaunchError> {
        match source {
            MintSource::Existing {
                base_mint,
                quote_mint,
            } => {
                let base = parse_pubkey(base_mint)?;
                let quote = parse_pubkey(quote_mint)?;
                if base == quote {
                    return Err(LaunchError::InvalidMints(
                        "base and quote mints must differ".to_string(),
                    ));
                }

                Ok(ResolvedMints::Existing {
                    base: self.fetch_mint("base", base).await?,
                    quote: self.fetch_mint("quote", quote).await?,
                })
            }
            MintSource::New {
                base_decimals,
                quote_decimals,
                base_authority,
                quote_authority,
            } => Ok(ResolvedMints::New {
                base: NewMint::generate(*base_decimals, parse_pubkey(base_authority)?),
                quote: NewMint::generate(*quote_decimals, parse_pubkey(quote_authority)?),
            }),
        }
    }

    async fn fetch_mint(&self, side: &str, address: Pubkey) -> Result<MintInfo, LaunchError> {
        let account = match self.connection.get_account_info(&address).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                return Err(LaunchError::InvalidMints(format!(
                    "{} mint {} not found",
                    side, address
                )))
            }
            // the node answered but could not serve the account as a mint
            Err(
                e @ (ClientError::Rpc { .. }
                | ClientError::Encoding(_)
                | ClientError::Deserialization(_)),
            ) => {
                return Err(LaunchError::InvalidMints(format!(
                    "{} mint {} could not be read: {}",
                    side, address, e
                )))
            }
            Err(e) => return Err(e.into()),
        };

        MintInfo::unpack(address, &account).map_err(|e| LaunchError::InvalidMints(e.to_string()))
    }
}
