use alloy_primitives::{Address, Bytes, U256};
use bon::Builder;
use tracing::{error, info, warn, Instrument};

use super::config::HookConfig;
use super::executor::HookExecutor;
use super::guard::ReentrancyGuard;
use crate::error::{ReceiverError, Result};
use crate::protocol::{DomainId, HookPayload, SettlementOutcome, SettlementRecord};
use crate::spans;
use crate::traits::{ExecutionHost, MessageVerifier, StakingProtocol, SwapVenue, TokenLedger};

/// CCTP settlement receiver
///
/// Accepts an attested CCTP message, has the message transmitter mint the
/// transferred USDC into `custody`, and, when hook data is attached, swaps
/// the USDC for the native asset, stakes it and delivers the staking
/// derivative to the hook recipient.
///
/// Every call to [`receive_usdc`](Self::receive_usdc) runs inside a single
/// host checkpoint: it either commits all of its effects or none of them.
/// Calls do not overlap; a nested call made while one is in flight fails with
/// [`ReceiverError::Reentrancy`].
///
/// # Example
///
/// ```rust,ignore
/// use cctp_hook_receiver::{CctpReceiver, HookConfig};
/// use cctp_hook_receiver::testing::SimulatedChain;
///
/// let chain = SimulatedChain::new();
/// let receiver = CctpReceiver::builder()
///     .custody(chain.custody())
///     .message_transmitter(chain.message_transmitter())
///     .usdc(chain.usdc())
///     .swap_venue(chain.swap_venue())
///     .staking(chain.staking())
///     .host(chain.host())
///     .config(HookConfig::new(chain.swap_path()))
///     .build();
///
/// let outcome = receiver.receive_usdc(&hook_data, &message, &attestation).await?;
/// ```
#[derive(Builder)]
pub struct CctpReceiver<M, T, S, L, H> {
    /// Account that holds minted USDC and acts in every collaborator call
    custody: Address,
    message_transmitter: M,
    usdc: T,
    swap_venue: S,
    staking: L,
    host: H,
    config: HookConfig,
    #[builder(skip)]
    guard: ReentrancyGuard,
}

impl<M, T, S, L, H> CctpReceiver<M, T, S, L, H>
where
    M: MessageVerifier,
    T: TokenLedger,
    S: SwapVenue,
    L: StakingProtocol,
    H: ExecutionHost,
{
    pub fn custody(&self) -> Address {
        self.custody
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Returns whether a settlement is currently in flight
    pub fn is_settling(&self) -> bool {
        self.guard.is_entered()
    }

    /// Validates the fields and encodes them in the configured layout.
    ///
    /// # Errors
    ///
    /// - [`ReceiverError::InvalidAmount`] if `amount` is zero
    /// - [`ReceiverError::InvalidRecipient`] if `recipient` is the zero address
    pub fn build_hook_data(
        &self,
        amount: U256,
        recipient: Address,
        source_domain: u32,
    ) -> Result<Bytes> {
        let payload = HookPayload::new(amount, recipient, source_domain)?;
        Ok(payload.encode_with(self.config.encoding))
    }

    /// Settles an attested CCTP transfer.
    ///
    /// # Arguments
    ///
    /// * `hook_data` - Instruction payload; empty to leave the USDC in custody
    /// * `message` - The attested CCTP message bytes
    /// * `attestation` - Circle's attestation signature over `message`
    ///
    /// # Returns
    ///
    /// [`SettlementOutcome::Custodied`] for empty hook data, otherwise
    /// [`SettlementOutcome::Completed`] carrying the emitted record.
    ///
    /// # Errors
    ///
    /// Any error leaves no effect behind: the host checkpoint is reverted,
    /// including the USDC mint.
    ///
    /// - [`ReceiverError::Reentrancy`] if a settlement is already in flight
    /// - [`ReceiverError::VerificationFailed`] if the attestation is rejected
    /// - [`ReceiverError::MalformedPayload`], [`ReceiverError::InvalidAmount`],
    ///   [`ReceiverError::InvalidRecipient`] for bad hook data
    /// - [`ReceiverError::HookExecutionFailed`] if the swap, stake or delivery fails
    /// - [`ReceiverError::Journal`] if the host cannot checkpoint, commit or revert
    pub async fn receive_usdc(
        &self,
        hook_data: &Bytes,
        message: &Bytes,
        attestation: &Bytes,
    ) -> Result<SettlementOutcome> {
        let _entered = self.guard.enter().inspect_err(|_| {
            warn!(
                custody = %self.custody,
                event = "reentrant_settlement_refused"
            );
        })?;

        let span = spans::receive_usdc(
            &self.custody,
            hook_data.len(),
            message.len(),
            attestation.len(),
        );

        async {
            let result = self.settle_atomically(hook_data, message, attestation).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn settle_atomically(
        &self,
        hook_data: &Bytes,
        message: &Bytes,
        attestation: &Bytes,
    ) -> Result<SettlementOutcome> {
        let checkpoint = self.host.checkpoint().await?;
        info!(checkpoint = %checkpoint.0, event = "settlement_started");

        match self.settle(hook_data, message, attestation).await {
            Ok(outcome) => {
                self.host.commit(checkpoint).await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(revert_error) = self.host.revert_to(checkpoint).await {
                    error!(
                        error = %e,
                        revert_error = %revert_error,
                        event = "settlement_revert_failed"
                    );
                    return Err(ReceiverError::Journal(format!(
                        "reverting after '{e}' failed: {revert_error}"
                    )));
                }
                error!(
                    error = %e,
                    error_kind = e.kind(),
                    event = "settlement_reverted"
                );
                Err(e)
            }
        }
    }

    async fn settle(
        &self,
        hook_data: &Bytes,
        message: &Bytes,
        attestation: &Bytes,
    ) -> Result<SettlementOutcome> {
        let custody_before = self.usdc.balance_of(self.custody).await?;
        self.verify(message, attestation).await?;
        let custody_after = self.usdc.balance_of(self.custody).await?;
        let credited = custody_after.saturating_sub(custody_before);

        info!(
            credited = %credited,
            custody_balance = %custody_after,
            event = "verification_succeeded"
        );

        if hook_data.is_empty() {
            info!(credited = %credited, event = "settlement_custodied");
            return Ok(SettlementOutcome::Custodied { credited });
        }

        let payload = HookPayload::decode_with(hook_data, self.config.encoding)?;
        payload.validate()?;

        info!(
            amount = %payload.amount(),
            recipient = %payload.recipient(),
            source_domain = %DomainId::describe(payload.source_domain()),
            encoding = %self.config.encoding,
            event = "hook_decoded"
        );

        let final_amount = HookExecutor::new(
            self.custody,
            &self.usdc,
            &self.swap_venue,
            &self.staking,
            &self.host,
            &self.config,
        )
        .execute(&payload)
        .await?;

        let record = SettlementRecord::new(payload.recipient(), final_amount, hook_data.clone());

        info!(
            recipient = %record.recipient(),
            final_amount = %record.final_amount(),
            event = "settlement_completed"
        );

        Ok(SettlementOutcome::Completed(record))
    }

    async fn verify(&self, message: &Bytes, attestation: &Bytes) -> Result<()> {
        match self
            .message_transmitter
            .receive_message(message, attestation)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(ReceiverError::VerificationFailed {
                reason: "message transmitter rejected the attestation".to_string(),
            }),
            Err(e) => Err(ReceiverError::VerificationFailed {
                reason: e.to_string(),
            }),
        }
    }
}
