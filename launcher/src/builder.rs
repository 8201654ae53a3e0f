//! Transaction building for market creation.
//!
//! A market needs more accounts than fit in one transaction, so creation is
//! split into ordered steps: mints (optional), vaults, then the market state,
//! queues and order book with `InitializeMarket`. Every step carries the
//! fresh keypairs of the accounts it allocates.

use std::fmt;

use mintforge_sdk::instructions::{
    create_account, derive_vault_signer, initialize_account, initialize_mint, transfer,
    InitializeMarketBuilder, MarketAccounts,
};
use mintforge_sdk::programs::{MINT_SIZE, TOKEN_ACCOUNT_SIZE, TOKEN_PROGRAM_ID};
use mintforge_sdk::wallet::{WalletError, WalletSigner};
use mintforge_sdk::{
    LotSizes, MarketAccountSizes, MarketCreationRequest, MintInfo, SdkError,
};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use super::rent::RentSchedule;

/// What a batch step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Allocate and initialize the base and quote mints.
    CreateMints,
    /// Allocate and initialize the market's token vaults.
    CreateVaults,
    /// Allocate the market accounts and initialize the market.
    CreateMarket,
    /// Create a token with metadata and initial supply.
    CreateToken,
    /// Change or clear an authority.
    UpdateAuthority,
}

impl StepKind {
    /// Message shown while the step's transaction is in flight.
    #[must_use]
    pub const fn sending_message(&self) -> &'static str {
        match self {
            Self::CreateMints => "Creating mints.",
            Self::CreateVaults => "Creating vaults.",
            Self::CreateMarket => "Creating market.",
            Self::CreateToken => "Creating token.",
            Self::UpdateAuthority => "Updating authority.",
        }
    }

    /// Message shown once the step's transaction is confirmed.
    #[must_use]
    pub const fn success_message(&self) -> &'static str {
        match self {
            Self::CreateMints => "Created mints successfully.",
            Self::CreateVaults => "Created vaults successfully.",
            Self::CreateMarket => "Created market successfully.",
            Self::CreateToken => "Created token successfully.",
            Self::UpdateAuthority => "Updated authority successfully.",
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateMints => "create_mints",
            Self::CreateVaults => "create_vaults",
            Self::CreateMarket => "create_market",
            Self::CreateToken => "create_token",
            Self::UpdateAuthority => "update_authority",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transaction of a batch, before signing.
#[derive(Debug)]
pub struct BatchStep {
    /// What the step does.
    pub kind: StepKind,
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Keypairs of the accounts the step allocates. The wallet signs
    /// separately as fee payer.
    pub signers: Vec<Keypair>,
}

impl BatchStep {
    /// Creates a step.
    #[must_use]
    pub fn new(kind: StepKind, instructions: Vec<Instruction>, signers: Vec<Keypair>) -> Self {
        Self {
            kind,
            instructions,
            signers,
        }
    }

    /// Public keys of the step's own signers.
    #[must_use]
    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(Keypair::pubkey).collect()
    }

    /// Builds and signs the step's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a signer fails or a required signature is missing.
    pub fn sign<W>(&self, wallet: &W, blockhash: Hash) -> Result<Transaction, WalletError>
    where
        W: WalletSigner + ?Sized,
    {
        let payer = wallet.pubkey();
        let message = Message::new_with_blockhash(&self.instructions, Some(&payer), &blockhash);
        let mut transaction = Transaction::new_unsigned(message);

        let signers: Vec<&Keypair> = self.signers.iter().collect();
        transaction
            .try_partial_sign(&signers, blockhash)
            .map_err(|e| WalletError::Signing(format!("{}: {}", self.kind, e)))?;
        wallet.sign_transaction(&mut transaction)?;

        if !transaction.is_signed() {
            return Err(WalletError::Signing(format!(
                "{}: missing required signatures",
                self.kind
            )));
        }

        Ok(transaction)
    }
}

/// A signed step ready for submission.
#[derive(Debug, Clone)]
pub struct SignedStep {
    /// What the step does.
    pub kind: StepKind,
    /// Fully signed transaction.
    pub transaction: Transaction,
}

/// Ordered steps submitted one after another.
#[derive(Debug, Default)]
pub struct TransactionBatch {
    steps: Vec<BatchStep>,
}

impl TransactionBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn push(&mut self, step: BatchStep) {
        self.steps.push(step);
    }

    /// Returns the steps.
    #[must_use]
    pub fn steps(&self) -> &[BatchStep] {
        &self.steps
    }

    /// Returns the step kinds in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|step| step.kind).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the batch has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Signs every step against the same blockhash.
    ///
    /// # Errors
    ///
    /// Returns the failing step's kind and the signing error.
    pub fn sign<W>(&self, wallet: &W, blockhash: Hash) -> Result<Vec<SignedStep>, (usize, WalletError)>
    where
        W: WalletSigner + ?Sized,
    {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.sign(wallet, blockhash)
                    .map(|transaction| SignedStep {
                        kind: step.kind,
                        transaction,
                    })
                    .map_err(|e| (index, e))
            })
            .collect()
    }
}

impl From<Vec<BatchStep>> for TransactionBatch {
    fn from(steps: Vec<BatchStep>) -> Self {
        Self { steps }
    }
}

/// A mint allocated as part of the market batch.
#[derive(Debug)]
pub struct NewMint {
    /// Keypair of the mint account.
    pub keypair: Keypair,
    /// Mint decimals.
    pub decimals: u8,
    /// Mint authority.
    pub authority: Pubkey,
}

impl NewMint {
    /// Generates a fresh mint keypair.
    #[must_use]
    pub fn generate(decimals: u8, authority: Pubkey) -> Self {
        Self {
            keypair: Keypair::new(),
            decimals,
            authority,
        }
    }
}

/// Base and quote mints, either fetched from the cluster or to be created.
#[derive(Debug)]
pub enum ResolvedMints {
    /// Mints that already exist.
    Existing {
        /// Base mint.
        base: MintInfo,
        /// Quote mint.
        quote: MintInfo,
    },
    /// Mints created by the batch's first step.
    New {
        /// Base mint.
        base: NewMint,
        /// Quote mint.
        quote: NewMint,
    },
}

impl ResolvedMints {
    /// Returns true if the batch must create the mints.
    #[must_use]
    pub const fn creates_mints(&self) -> bool {
        matches!(self, Self::New { .. })
    }

    /// Base mint address.
    #[must_use]
    pub fn base_mint(&self) -> Pubkey {
        match self {
            Self::Existing { base, .. } => base.address,
            Self::New { base, .. } => base.keypair.pubkey(),
        }
    }

    /// Quote mint address.
    #[must_use]
    pub fn quote_mint(&self) -> Pubkey {
        match self {
            Self::Existing { quote, .. } => quote.address,
            Self::New { quote, .. } => quote.keypair.pubkey(),
        }
    }

    /// Base mint decimals.
    #[must_use]
    pub fn base_decimals(&self) -> u8 {
        match self {
            Self::Existing { base, .. } => base.decimals,
            Self::New { base, .. } => base.decimals,
        }
    }

    /// Quote mint decimals.
    #[must_use]
    pub fn quote_decimals(&self) -> u8 {
        match self {
            Self::Existing { quote, .. } => quote.decimals,
            Self::New { quote, .. } => quote.decimals,
        }
    }
}

/// Fresh keypairs for every account a market allocates.
#[derive(Debug)]
pub struct MarketKeys {
    /// Market state account.
    pub market: Keypair,
    /// Request queue.
    pub request_queue: Keypair,
    /// Event queue.
    pub event_queue: Keypair,
    /// Bids.
    pub bids: Keypair,
    /// Asks.
    pub asks: Keypair,
    /// Base vault.
    pub base_vault: Keypair,
    /// Quote vault.
    pub quote_vault: Keypair,
}

impl MarketKeys {
    /// Generates fresh keypairs.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            market: Keypair::new(),
            request_queue: Keypair::new(),
            event_queue: Keypair::new(),
            bids: Keypair::new(),
            asks: Keypair::new(),
            base_vault: Keypair::new(),
            quote_vault: Keypair::new(),
        }
    }
}

/// A market batch together with the addresses it creates.
#[derive(Debug)]
pub struct MarketPlan {
    /// Steps to submit.
    pub batch: TransactionBatch,
    /// Accounts passed to `InitializeMarket`.
    pub accounts: MarketAccounts,
    /// Owner of both vaults.
    pub vault_signer: Pubkey,
    /// Nonce that derives the vault signer.
    pub vault_signer_nonce: u64,
    /// Lot sizes passed to `InitializeMarket`.
    pub lot_sizes: LotSizes,
    /// Account sizes in bytes.
    pub sizes: MarketAccountSizes,
    /// Lamports locked as rent.
    pub rent_lamports: u64,
    /// Platform fee in lamports.
    pub platform_fee: u64,
}

/// Builds the ordered transactions that create a market.
#[derive(Debug, Clone)]
pub struct MarketTransactionBuilder {
    program_id: Pubkey,
    payer: Pubkey,
    rent: RentSchedule,
    platform_fee: Option<(Pubkey, u64)>,
}

impl MarketTransactionBuilder {
    /// Creates a builder for the given dex program and fee payer.
    #[must_use]
    pub fn new(program_id: Pubkey, payer: Pubkey, rent: RentSchedule) -> Self {
        Self {
            program_id,
            payer,
            rent,
            platform_fee: None,
        }
    }

    /// Adds a platform fee transfer to the vault step. Zero disables it.
    #[must_use]
    pub fn with_platform_fee(mut self, destination: Pubkey, lamports: u64) -> Self {
        self.platform_fee = (lamports > 0).then_some((destination, lamports));
        self
    }

    /// Returns the dex program.
    #[must_use]
    pub const fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Builds the market batch.
    ///
    /// Produces `CreateMints` (only for new mints), `CreateVaults` and
    /// `CreateMarket`, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the rent schedule was
    /// looked up for other account sizes, a lot size is not representable,
    /// or no vault signer nonce exists.
    pub fn build_market_transactions(
        &self,
        request: &MarketCreationRequest,
        mints: ResolvedMints,
    ) -> Result<MarketPlan, SdkError> {
        let sizes = request.validate()?;
        if !self.rent.covers(&sizes) {
            return Err(SdkError::RentSizeMismatch);
        }

        let lot_sizes = LotSizes::compute(
            mints.base_decimals(),
            mints.quote_decimals(),
            request.lot_size,
            request.tick_size,
        )?;

        if mints.creates_mints() && self.rent.mint == 0 {
            return Err(SdkError::InvalidAmount(
                "rent schedule has no mint rent".to_string(),
            ));
        }

        let keys = MarketKeys::generate();
        let (vault_signer, vault_signer_nonce) =
            derive_vault_signer(&self.program_id, &keys.market.pubkey())?;

        let accounts = MarketAccounts {
            market: keys.market.pubkey(),
            request_queue: keys.request_queue.pubkey(),
            event_queue: keys.event_queue.pubkey(),
            bids: keys.bids.pubkey(),
            asks: keys.asks.pubkey(),
            base_vault: keys.base_vault.pubkey(),
            quote_vault: keys.quote_vault.pubkey(),
            base_mint: mints.base_mint(),
            quote_mint: mints.quote_mint(),
        };

        let mut batch = TransactionBatch::new();

        if let ResolvedMints::New { base, quote } = mints {
            batch.push(self.mints_step(base, quote));
        }

        batch.push(self.vaults_step(&accounts, &vault_signer, keys.base_vault, keys.quote_vault));

        let market_ix = InitializeMarketBuilder::new(self.program_id)
            .accounts(accounts)
            .base_lot_size(lot_sizes.base_lot_size)
            .quote_lot_size(lot_sizes.quote_lot_size)
            .vault_signer_nonce(vault_signer_nonce)
            .build()?;

        let market_signers = vec![
            keys.market,
            keys.request_queue,
            keys.event_queue,
            keys.bids,
            keys.asks,
        ];
        batch.push(self.market_step(&sizes, market_signers, market_ix));

        Ok(MarketPlan {
            batch,
            accounts,
            vault_signer,
            vault_signer_nonce,
            lot_sizes,
            sizes,
            rent_lamports: self.rent.market_total(),
            platform_fee: self.platform_fee.map_or(0, |(_, lamports)| lamports),
        })
    }

    fn mints_step(&self, base: NewMint, quote: NewMint) -> BatchStep {
        let mut instructions = Vec::with_capacity(4);
        for mint in [&base, &quote] {
            let address = mint.keypair.pubkey();
            instructions.push(create_account(
                &self.payer,
                &address,
                self.rent.mint,
                MINT_SIZE as u64,
                &TOKEN_PROGRAM_ID,
            ));
            instructions.push(initialize_mint(&address, mint.decimals, &mint.authority, None));
        }

        BatchStep::new(
            StepKind::CreateMints,
            instructions,
            vec![base.keypair, quote.keypair],
        )
    }

    fn vaults_step(
        &self,
        accounts: &MarketAccounts,
        vault_signer: &Pubkey,
        base_vault: Keypair,
        quote_vault: Keypair,
    ) -> BatchStep {
        let mut instructions = Vec::with_capacity(5);

        if let Some((destination, lamports)) = self.platform_fee {
            instructions.push(transfer(&self.payer, &destination, lamports));
        }

        for vault in [&accounts.base_vault, &accounts.quote_vault] {
            instructions.push(create_account(
                &self.payer,
                vault,
                self.rent.vault,
                TOKEN_ACCOUNT_SIZE as u64,
                &TOKEN_PROGRAM_ID,
            ));
        }
        instructions.push(initialize_account(
            &accounts.base_vault,
            &accounts.base_mint,
            vault_signer,
        ));
        instructions.push(initialize_account(
            &accounts.quote_vault,
            &accounts.quote_mint,
            vault_signer,
        ));

        BatchStep::new(
            StepKind::CreateVaults,
            instructions,
            vec![base_vault, quote_vault],
        )
    }

    fn market_step(
        &self,
        sizes: &MarketAccountSizes,
        signers: Vec<Keypair>,
        initialize: Instruction,
    ) -> BatchStep {
        let allocations = [
            (sizes.market, self.rent.market),
            (sizes.request_queue, self.rent.request_queue),
            (sizes.event_queue, self.rent.event_queue),
            (sizes.orderbook, self.rent.orderbook),
            (sizes.orderbook, self.rent.orderbook),
        ];

        let mut instructions: Vec<Instruction> = signers
            .iter()
            .zip(allocations)
            .map(|(keypair, (space, lamports))| {
                create_account(
                    &self.payer,
                    &keypair.pubkey(),
                    lamports,
                    space as u64,
                    &self.program_id,
                )
            })
            .collect();
        instructions.push(initialize);

        BatchStep::new(StepKind::CreateMarket, instructions, signers)
    }
}
