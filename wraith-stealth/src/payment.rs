//! Stealth payment construction (sender side).
//!
//! Building a payment is pure: it produces the transfer instructions, the
//! stealth address and the breadcrumb, but never broadcasts anything.
//!
//! Funds always move to the request's settlement account. The derived
//! stealth address travels with the payment as a receipt that only the
//! recipient can later tie back to their meta-address.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use zeroize::Zeroize;

use wraith_core::constants::{MEMO_PROGRAM_ID, SEED_SIZE, SYSTEM_PROGRAM_ID};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{Breadcrumb, BreadcrumbRecord, LedgerAddress, MetaAddress, StealthAddress};
use wraith_crypto::{
    compute_shared_secret, derive_dh_keypair, derive_stealth_address, validate_public_key,
    validate_spend_public_key,
};

// ═══════════════════════════════════════════════════════════════════════════════
// INSTRUCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// A ledger instruction produced by the payment builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransferInstruction {
    /// Native value transfer.
    Transfer {
        /// Transfer program id
        program: LedgerAddress,
        /// Paying account
        from: LedgerAddress,
        /// Receiving account
        to: LedgerAddress,
        /// Amount in the ledger's smallest unit
        amount: u64,
    },
    /// Memo annotation carrying the breadcrumb.
    Memo {
        /// Memo program id
        program: LedgerAddress,
        /// Account that signs the memo
        signer: LedgerAddress,
        /// Opaque memo payload
        #[serde(with = "hex")]
        data: Vec<u8>,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the sender supplies to pay a meta-address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Recipient's published meta-address
    pub recipient: MetaAddress,
    /// Amount in the ledger's smallest unit
    pub amount: u64,
    /// Paying account
    pub sender: LedgerAddress,
    /// Account the funds actually settle into
    pub settlement: LedgerAddress,
}

impl PaymentRequest {
    /// Validates the request before any key material is generated.
    ///
    /// Any problem with the recipient's keys is reported as
    /// `InvalidMetaAddress`, so no instruction is ever built for them.
    pub fn validate(&self) -> Result<()> {
        self.recipient.validate()?;
        validate_public_key(self.recipient.scan_public_key.as_bytes())
            .map_err(|e| WraithError::InvalidMetaAddress(format!("scan key: {}", e)))?;
        validate_spend_public_key(&self.recipient.spend_public_key)
            .map_err(|e| WraithError::InvalidMetaAddress(format!("spend key: {}", e)))?;

        if self.amount == 0 {
            return Err(WraithError::ValidationError("amount must be positive".into()));
        }
        if self.settlement == self.sender {
            return Err(WraithError::ValidationError(
                "settlement account must differ from sender".into(),
            ));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A built stealth payment, ready to hand to a broadcaster.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealthPayment {
    /// Instructions in submission order: transfer, then memo
    pub instructions: Vec<TransferInstruction>,
    /// One-time address derived for the recipient
    pub stealth_address: StealthAddress,
    /// Ephemeral public key published in the memo
    pub breadcrumb: Breadcrumb,
    /// Amount transferred
    pub amount: u64,
    /// Optional local label (never sent on-chain)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl StealthPayment {
    /// Builds the record an indexer would later return for this payment.
    pub fn to_record(&self, tx_ref: impl Into<String>, timestamp: u64) -> BreadcrumbRecord {
        BreadcrumbRecord::new(
            self.breadcrumb.to_base58(),
            self.stealth_address.to_base58(),
            tx_ref,
        )
        .with_timestamp(timestamp)
    }

    /// Returns the memo payload attached to the transfer.
    pub fn memo_data(&self) -> Vec<u8> {
        self.breadcrumb.to_memo()
    }
}

/// Builds a stealth payment with a fresh OS-random ephemeral key.
pub fn build_stealth_payment(request: &PaymentRequest) -> Result<StealthPayment> {
    let mut seed = [0u8; SEED_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    let payment = build_stealth_payment_with_seed(request, &seed);
    seed.zeroize();
    payment
}

/// Builds a stealth payment from a caller-supplied ephemeral seed.
///
/// Reusing a seed across payments links them; this exists for fixtures.
#[instrument(skip(request, ephemeral_seed), fields(amount = request.amount))]
pub fn build_stealth_payment_with_seed(
    request: &PaymentRequest,
    ephemeral_seed: &[u8; SEED_SIZE],
) -> Result<StealthPayment> {
    request.validate()?;

    let ephemeral = derive_dh_keypair(ephemeral_seed);
    let shared = compute_shared_secret(
        &ephemeral.secret,
        request.recipient.scan_public_key.as_bytes(),
    )?;
    let stealth_address = derive_stealth_address(&shared, &request.recipient.spend_public_key);
    let breadcrumb = Breadcrumb::new(ephemeral.public);

    let instructions = vec![
        TransferInstruction::Transfer {
            program: LedgerAddress::from_base58(SYSTEM_PROGRAM_ID)?,
            from: request.sender,
            to: request.settlement,
            amount: request.amount,
        },
        TransferInstruction::Memo {
            program: LedgerAddress::from_base58(MEMO_PROGRAM_ID)?,
            signer: request.sender,
            data: breadcrumb.to_memo(),
        },
    ];

    debug!(stealth = %stealth_address, breadcrumb = %breadcrumb.to_base58(), "built stealth payment");

    Ok(StealthPayment {
        instructions,
        stealth_address,
        breadcrumb,
        amount: request.amount,
        label: None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Fluent builder for [`StealthPayment`].
#[derive(Default)]
pub struct StealthPaymentBuilder {
    recipient: Option<MetaAddress>,
    amount: Option<u64>,
    sender: Option<LedgerAddress>,
    settlement: Option<LedgerAddress>,
    label: Option<String>,
}

impl StealthPaymentBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipient meta-address.
    pub fn recipient(mut self, meta_address: MetaAddress) -> Self {
        self.recipient = Some(meta_address);
        self
    }

    /// Sets the amount.
    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the paying account.
    pub fn sender(mut self, sender: LedgerAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the settlement account.
    pub fn settlement(mut self, settlement: LedgerAddress) -> Self {
        self.settlement = Some(settlement);
        self
    }

    /// Attaches a local label to the built payment.
    pub fn memo_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Assembles the request without building.
    pub fn into_request(self) -> Result<(PaymentRequest, Option<String>)> {
        let recipient = self
            .recipient
            .ok_or_else(|| WraithError::ValidationError("recipient meta-address is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| WraithError::ValidationError("amount is required".into()))?;
        let sender = self
            .sender
            .ok_or_else(|| WraithError::ValidationError("sender is required".into()))?;
        let settlement = self
            .settlement
            .ok_or_else(|| WraithError::ValidationError("settlement account is required".into()))?;

        Ok((
            PaymentRequest {
                recipient,
                amount,
                sender,
                settlement,
            },
            self.label,
        ))
    }

    /// Builds the payment with a fresh ephemeral key.
    pub fn build(self) -> Result<StealthPayment> {
        let (request, label) = self.into_request()?;
        let mut payment = build_stealth_payment(&request)?;
        payment.label = label;
        Ok(payment)
    }
}
