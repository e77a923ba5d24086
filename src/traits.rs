//! Collaborator abstractions for settlement.
//!
//! The receiver never owns balances. Everything it reads or mutates lives in
//! an external ledger, a swap venue, a staking protocol or the execution host,
//! and each of those is reached through one of the traits below. Production
//! code uses the alloy-backed adapters in [`crate::providers`]; tests use the
//! in-memory [`SimulatedChain`](crate::testing::SimulatedChain), which can
//! inject failures at any step.
//!
//! # Example: a verifier that accepts everything
//!
//! ```rust,ignore
//! use cctp_hook_receiver::traits::MessageVerifier;
//! use alloy_primitives::Bytes;
//!
//! struct AcceptAll;
//!
//! #[async_trait::async_trait]
//! impl MessageVerifier for AcceptAll {
//!     async fn receive_message(&self, _message: &Bytes, _attestation: &Bytes) -> Result<bool> {
//!         Ok(true)
//!     }
//! }
//! ```

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::error::Result;

/// Verifies an attested CCTP message and mints the transferred USDC.
///
/// On success the transferred amount is credited to the receiver's custody
/// account as a side effect.
#[async_trait]
pub trait MessageVerifier: Send + Sync {
    /// Submits `message` with its `attestation` for verification.
    ///
    /// Returns `false` when the attestation is rejected without an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the verification call itself fails.
    async fn receive_message(&self, message: &Bytes, attestation: &Bytes) -> Result<bool>;
}

/// Standard fungible-token operations used by the receiver.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Address of the token contract
    fn address(&self) -> Address;

    async fn balance_of(&self, account: Address) -> Result<U256>;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Sets `spender`'s allowance over `owner`'s tokens to `amount`.
    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<()>;

    /// Moves `amount` from `from` to `to`, acting as `from`.
    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<()>;
}

/// Exchanges an ERC-20 for the chain's native asset.
///
/// The venue's reported output is never trusted; callers measure the native
/// balance of `to` before and after.
#[async_trait]
pub trait SwapVenue: Send + Sync {
    /// Address that must hold an allowance over the input token
    fn address(&self) -> Address;

    /// Swaps exactly `amount_in` of `path[0]` along `path`, sending native
    /// proceeds to `to`.
    ///
    /// `sender` is the account the input tokens are pulled from.
    async fn swap_exact_tokens_for_native(
        &self,
        sender: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: U256,
    ) -> Result<()>;
}

/// A liquid-staking protocol whose derivative is itself a token.
#[async_trait]
pub trait StakingProtocol: TokenLedger {
    /// Stakes `amount` of the native asset held by `from`, crediting
    /// derivative tokens to `from`.
    async fn submit(&self, from: Address, amount: U256, referral: Address) -> Result<()>;
}

/// Opaque marker returned by [`ExecutionHost::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checkpoint(pub U256);

/// The platform the receiver executes against.
///
/// Besides chain-level reads, the host provides the transactional boundary
/// that makes a settlement all-or-nothing: every effect made through any
/// collaborator after [`checkpoint`](ExecutionHost::checkpoint) is undone by
/// [`revert_to`](ExecutionHost::revert_to).
#[async_trait]
pub trait ExecutionHost: Send + Sync {
    /// Native asset balance of `account`
    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Current block timestamp in seconds
    async fn timestamp(&self) -> Result<u64>;

    /// Opens a journal checkpoint.
    async fn checkpoint(&self) -> Result<Checkpoint>;

    /// Discards every effect recorded since `checkpoint`.
    async fn revert_to(&self, checkpoint: Checkpoint) -> Result<()>;

    /// Keeps every effect recorded since `checkpoint`.
    async fn commit(&self, checkpoint: Checkpoint) -> Result<()>;
}
