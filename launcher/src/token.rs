//! Transaction building for token creation and authority changes.

use mintforge_sdk::instructions::{
    create_account, create_associated_token_account, create_metadata_account_v3, initialize_mint,
    mint_to, revoke, set_authority, transfer, AuthorityType, DataV2, MetadataAccounts,
};
use mintforge_sdk::programs::{MINT_SIZE, TOKEN_PROGRAM_ID};
use mintforge_sdk::{AuthorityOptions, SdkError, TokenCreationRequest};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use super::builder::{BatchStep, StepKind, TransactionBatch};
use super::config::FeeSchedule;

/// A token batch together with the addresses it creates.
#[derive(Debug)]
pub struct TokenPlan {
    /// Single `CreateToken` step.
    pub batch: TransactionBatch,
    /// New mint.
    pub mint: Pubkey,
    /// Wallet's associated token account holding the initial supply.
    pub token_account: Pubkey,
    /// Metadata account.
    pub metadata: Pubkey,
    /// Initial supply in atoms.
    pub supply_atoms: u64,
    /// Platform fee in lamports.
    pub platform_fee: u64,
}

/// Builds token creation and authority transactions for one wallet.
#[derive(Debug, Clone)]
pub struct TokenTransactionBuilder {
    payer: Pubkey,
    fee_destination: Option<Pubkey>,
    fees: FeeSchedule,
}

impl TokenTransactionBuilder {
    /// Creates a builder without platform fees.
    #[must_use]
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            fee_destination: None,
            fees: FeeSchedule::default(),
        }
    }

    /// Charges platform fees to `destination`.
    #[must_use]
    pub fn with_fees(mut self, destination: Pubkey, fees: FeeSchedule) -> Self {
        self.fee_destination = Some(destination);
        self.fees = fees;
        self
    }

    /// Platform fee for a token with the given authority options.
    ///
    /// Zero when no fee destination is configured.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::Overflow` if the fee exceeds `u64`.
    pub fn fee_lamports(&self, options: &AuthorityOptions) -> Result<u64, SdkError> {
        if self.fee_destination.is_none() {
            return Ok(0);
        }
        self.fees
            .authority_option
            .checked_mul(u64::from(options.enabled_count()))
            .and_then(|options_fee| options_fee.checked_add(self.fees.token_create))
            .ok_or(SdkError::Overflow)
    }

    /// Builds the single transaction that creates a token.
    ///
    /// # Errors
    ///
    /// Returns an error if metadata is too long or the supply overflows.
    pub fn build_create_token(
        &self,
        request: &TokenCreationRequest,
        mint_rent: u64,
    ) -> Result<TokenPlan, SdkError> {
        request.validate()?;
        let supply_atoms = request.supply_atoms()?;
        let platform_fee = self.fee_lamports(&request.authorities)?;

        let mint_keypair = Keypair::new();
        let mint = mint_keypair.pubkey();
        let freeze_authority = request.authorities.freeze.then_some(&self.payer);

        let mut instructions = Vec::with_capacity(7);

        if let Some(destination) = self.fee_destination.filter(|_| platform_fee > 0) {
            instructions.push(transfer(&self.payer, &destination, platform_fee));
        }

        instructions.push(create_account(
            &self.payer,
            &mint,
            mint_rent,
            MINT_SIZE as u64,
            &TOKEN_PROGRAM_ID,
        ));
        instructions.push(initialize_mint(
            &mint,
            request.decimals,
            &self.payer,
            freeze_authority,
        ));

        let (create_ata, token_account) =
            create_associated_token_account(&self.payer, &self.payer, &mint);
        instructions.push(create_ata);
        instructions.push(mint_to(&mint, &token_account, &self.payer, supply_atoms));

        let (create_metadata, metadata) = create_metadata_account_v3(
            &MetadataAccounts {
                mint,
                mint_authority: self.payer,
                payer: self.payer,
                update_authority: self.payer,
            },
            DataV2::fungible(&request.name, &request.symbol, &request.uri),
            request.authorities.update,
        )?;
        instructions.push(create_metadata);

        if !request.authorities.mint {
            instructions.push(set_authority(
                &mint,
                None,
                AuthorityType::MintTokens,
                &self.payer,
            ));
        }

        let step = BatchStep::new(StepKind::CreateToken, instructions, vec![mint_keypair]);

        Ok(TokenPlan {
            batch: TransactionBatch::from(vec![step]),
            mint,
            token_account,
            metadata,
            supply_atoms,
            platform_fee,
        })
    }

    /// Builds a transaction that removes the delegate of a token account.
    #[must_use]
    pub fn build_revoke_delegate(&self, token_account: &Pubkey) -> TransactionBatch {
        self.authority_batch(revoke(token_account, &self.payer))
    }

    /// Builds a transaction that permanently clears a mint's mint authority.
    #[must_use]
    pub fn build_revoke_mint_authority(&self, mint: &Pubkey) -> TransactionBatch {
        self.authority_batch(set_authority(
            mint,
            None,
            AuthorityType::MintTokens,
            &self.payer,
        ))
    }

    /// Builds a transaction that permanently clears a mint's freeze authority.
    #[must_use]
    pub fn build_revoke_freeze_authority(&self, mint: &Pubkey) -> TransactionBatch {
        self.authority_batch(set_authority(
            mint,
            None,
            AuthorityType::FreezeAccount,
            &self.payer,
        ))
    }

    fn authority_batch(&self, instruction: Instruction) -> TransactionBatch {
        TransactionBatch::from(vec![BatchStep::new(
            StepKind::UpdateAuthority,
            vec![instruction],
            Vec::new(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use mintforge_sdk::instructions::derive_metadata_address;
    use mintforge_sdk::programs::{
        ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    };
    use mintforge_sdk::{KeypairWallet, WalletSigner};
    use solana_sdk::hash::Hash;

    use super::*;

    const SOL: u64 = 1_000_000_000;

    fn request(options: AuthorityOptions) -> TokenCreationRequest {
        TokenCreationRequest {
            name: "Kitty".to_string(),
            symbol: "KIT".to_string(),
            uri: "https://example.com/kit.json".to_string(),
            decimals: 6,
            supply: 1_000_000,
            authorities: options,
        }
    }

    fn fees() -> FeeSchedule {
        FeeSchedule {
            token_create: SOL / 2,
            market_create: 2 * SOL,
            authority_option: SOL / 10,
        }
    }

    fn program_ids(plan: &TokenPlan) -> Vec<Pubkey> {
        plan.batch.steps()[0]
            .instructions
            .iter()
            .map(|ix| ix.program_id)
            .collect()
    }

    #[test]
    fn test_fee_lamports() {
        let builder = TokenTransactionBuilder::new(Pubkey::new_unique())
            .with_fees(Pubkey::new_unique(), fees());

        let none = AuthorityOptions::default();
        let all = AuthorityOptions {
            freeze: true,
            mint: true,
            update: true,
        };

        assert_eq!(builder.fee_lamports(&none).expect("fee"), SOL / 2);
        assert_eq!(builder.fee_lamports(&all).expect("fee"), 800_000_000);
    }

    #[test]
    fn test_fee_lamports_without_destination() {
        let builder = TokenTransactionBuilder::new(Pubkey::new_unique());
        let all = AuthorityOptions {
            freeze: true,
            mint: true,
            update: true,
        };
        assert_eq!(builder.fee_lamports(&all).expect("fee"), 0);
    }

    #[test]
    fn test_create_token_instruction_order() {
        let payer = Pubkey::new_unique();
        let builder = TokenTransactionBuilder::new(payer).with_fees(Pubkey::new_unique(), fees());

        let plan = builder
            .build_create_token(&request(AuthorityOptions::default()), 1_461_600)
            .expect("plan");

        assert_eq!(
            program_ids(&plan),
            vec![
                SYSTEM_PROGRAM_ID,
                SYSTEM_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                ASSOCIATED_TOKEN_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                TOKEN_METADATA_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
            ]
        );
        assert_eq!(plan.supply_atoms, 1_000_000_000_000);
        assert_eq!(plan.metadata, derive_metadata_address(&plan.mint));
        assert_eq!(plan.platform_fee, SOL / 2);

        let step = &plan.batch.steps()[0];
        assert_eq!(step.kind, StepKind::CreateToken);
        assert_eq!(step.signer_pubkeys(), vec![plan.mint]);
    }

    #[test]
    fn test_create_token_keeps_authorities() {
        let payer = Pubkey::new_unique();
        let options = AuthorityOptions {
            freeze: true,
            mint: true,
            update: true,
        };

        let plan = TokenTransactionBuilder::new(payer)
            .build_create_token(&request(options), 1_461_600)
            .expect("plan");

        let instructions = &plan.batch.steps()[0].instructions;
        // no fee transfer, no trailing SetAuthority
        assert_eq!(instructions.len(), 5);

        let init_mint = &instructions[1];
        assert_eq!(init_mint.data[34], 1);
        assert_eq!(&init_mint.data[35..67], payer.as_ref());

        // is_mutable is the second to last payload byte
        let metadata = &instructions[4];
        let mutable = metadata.data[metadata.data.len() - 2];
        assert_eq!(mutable, 1);
    }

    #[test]
    fn test_create_token_drops_authorities() {
        let payer = Pubkey::new_unique();
        let plan = TokenTransactionBuilder::new(payer)
            .build_create_token(&request(AuthorityOptions::default()), 1_461_600)
            .expect("plan");

        let instructions = &plan.batch.steps()[0].instructions;
        assert_eq!(instructions.len(), 6);

        let init_mint = &instructions[1];
        assert_eq!(init_mint.data.len(), 35);
        assert_eq!(init_mint.data[34], 0);

        let revoke_mint = &instructions[5];
        assert_eq!(revoke_mint.data, vec![6, 0, 0]);
    }

    #[test]
    fn test_create_token_rejects_long_symbol() {
        let mut req = request(AuthorityOptions::default());
        req.symbol = "TOOLONGSYMBOL".to_string();

        let result = TokenTransactionBuilder::new(Pubkey::new_unique()).build_create_token(&req, 1);
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("metadata symbol exceeds 10 bytes".to_string())
        );
    }

    #[test]
    fn test_create_token_supply_overflow() {
        let mut req = request(AuthorityOptions::default());
        req.supply = u64::MAX;

        let result = TokenTransactionBuilder::new(Pubkey::new_unique()).build_create_token(&req, 1);
        assert!(matches!(result, Err(SdkError::Overflow)));
    }

    #[test]
    fn test_create_token_signs() {
        let wallet = KeypairWallet::new(Keypair::new());
        let plan = TokenTransactionBuilder::new(wallet.pubkey())
            .build_create_token(&request(AuthorityOptions::default()), 1_461_600)
            .expect("plan");

        let signed = plan
            .batch
            .sign(&wallet, Hash::new_unique())
            .expect("signed");
        assert_eq!(signed.len(), 1);
        assert!(signed[0].transaction.is_signed());
    }

    #[test]
    fn test_authority_batches() {
        let payer = Pubkey::new_unique();
        let target = Pubkey::new_unique();
        let builder = TokenTransactionBuilder::new(payer);

        let delegate = builder.build_revoke_delegate(&target);
        assert_eq!(delegate.kinds(), vec![StepKind::UpdateAuthority]);
        assert_eq!(delegate.steps()[0].instructions[0].data, vec![5]);

        let mint = builder.build_revoke_mint_authority(&target);
        assert_eq!(mint.steps()[0].instructions[0].data, vec![6, 0, 0]);

        let freeze = builder.build_revoke_freeze_authority(&target);
        assert_eq!(freeze.steps()[0].instructions[0].data, vec![6, 1, 0]);
        assert!(freeze.steps()[0].signers.is_empty());
    }
}
