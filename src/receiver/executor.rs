use alloy_primitives::{Address, U256};
use tracing::{debug, info, Instrument};

use super::config::HookConfig;
use crate::error::{HookStage, ReceiverError, Result};
use crate::protocol::HookPayload;
use crate::spans;
use crate::traits::{ExecutionHost, StakingProtocol, SwapVenue, TokenLedger};

/// Swap-then-stake hook
///
/// Converts custodied USDC into the staking derivative and delivers it to the
/// hook recipient. Neither the venue nor the staking protocol is trusted to
/// report what it produced: swap proceeds are the custody account's native
/// balance delta, and the delivered amount is its derivative balance delta.
///
/// The executor makes no attempt to undo partial work. It runs inside the
/// checkpoint opened by [`CctpReceiver`](super::CctpReceiver), which reverts
/// everything if any step fails.
pub struct HookExecutor<'a, T, S, L, H> {
    custody: Address,
    usdc: &'a T,
    swap_venue: &'a S,
    staking: &'a L,
    host: &'a H,
    config: &'a HookConfig,
}

impl<'a, T, S, L, H> HookExecutor<'a, T, S, L, H>
where
    T: TokenLedger,
    S: SwapVenue,
    L: StakingProtocol,
    H: ExecutionHost,
{
    pub fn new(
        custody: Address,
        usdc: &'a T,
        swap_venue: &'a S,
        staking: &'a L,
        host: &'a H,
        config: &'a HookConfig,
    ) -> Self {
        Self {
            custody,
            usdc,
            swap_venue,
            staking,
            host,
            config,
        }
    }

    /// Runs the hook for `payload` and returns the derivative amount delivered.
    ///
    /// # Errors
    ///
    /// - [`ReceiverError::InvalidAmount`] / [`ReceiverError::InvalidRecipient`]
    ///   if the payload is invalid
    /// - [`ReceiverError::InvalidConfig`] if the swap path is unusable
    /// - [`ReceiverError::HookExecutionFailed`] naming the failed step otherwise
    pub async fn execute(&self, payload: &HookPayload) -> Result<U256> {
        payload.validate()?;
        self.config.validate(self.usdc.address())?;

        let span = spans::execute_hook(
            &payload.recipient(),
            &payload.amount(),
            payload.source_domain(),
        );

        async {
            let result = self.run(payload).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, payload: &HookPayload) -> Result<U256> {
        let stake_balance_before = self
            .staking
            .balance_of(self.custody)
            .await
            .map_err(|e| ReceiverError::hook(HookStage::BalanceQuery, e))?;

        self.ensure_allowance(payload.amount()).await?;
        let proceeds = self.swap(payload.amount()).await?;
        self.stake(proceeds).await?;

        let stake_balance_after = self
            .staking
            .balance_of(self.custody)
            .await
            .map_err(|e| ReceiverError::hook(HookStage::BalanceQuery, e))?;

        let final_amount = stake_balance_after
            .checked_sub(stake_balance_before)
            .filter(|delta| !delta.is_zero())
            .ok_or_else(|| {
                ReceiverError::hook(
                    HookStage::Stake,
                    format!(
                        "derivative balance went from {stake_balance_before} to {stake_balance_after}"
                    ),
                )
            })?;

        debug!(
            stake_balance_before = %stake_balance_before,
            stake_balance_after = %stake_balance_after,
            final_amount = %final_amount,
            event = "derivative_delta_measured"
        );

        self.deliver(payload.recipient(), final_amount).await?;

        info!(
            recipient = %payload.recipient(),
            amount_in = %payload.amount(),
            proceeds = %proceeds,
            final_amount = %final_amount,
            event = "hook_executed"
        );

        Ok(final_amount)
    }

    async fn ensure_allowance(&self, amount: U256) -> Result<()> {
        let spender = self.swap_venue.address();
        let current = self
            .usdc
            .allowance(self.custody, spender)
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Approve, e))?;

        if current >= amount {
            debug!(
                spender = %spender,
                allowance = %current,
                event = "allowance_sufficient"
            );
            return Ok(());
        }

        self.usdc
            .approve(self.custody, spender, amount)
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Approve, e))?;

        debug!(
            spender = %spender,
            previous_allowance = %current,
            allowance = %amount,
            event = "allowance_granted"
        );
        Ok(())
    }

    async fn swap(&self, amount_in: U256) -> Result<U256> {
        let floor = self.config.min_output.floor();
        let now = self
            .host
            .timestamp()
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Swap, e))?;
        let deadline = U256::from(now.saturating_add(self.config.swap_deadline_secs));

        let native_before = self.native_balance().await?;

        self.swap_venue
            .swap_exact_tokens_for_native(
                self.custody,
                amount_in,
                floor,
                &self.config.swap_path,
                self.custody,
                deadline,
            )
            .instrument(spans::swap(
                &self.swap_venue.address(),
                &amount_in,
                &floor,
                self.config.swap_path.len(),
            ))
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Swap, e))?;

        let native_after = self.native_balance().await?;

        let proceeds = native_after.checked_sub(native_before).ok_or_else(|| {
            ReceiverError::hook(
                HookStage::Swap,
                format!("native balance fell from {native_before} to {native_after}"),
            )
        })?;
        if proceeds.is_zero() {
            return Err(ReceiverError::hook(
                HookStage::Swap,
                "swap produced no native proceeds",
            ));
        }
        if proceeds < floor {
            return Err(ReceiverError::hook(
                HookStage::Swap,
                format!("proceeds {proceeds} below minimum output {floor}"),
            ));
        }

        info!(
            amount_in = %amount_in,
            proceeds = %proceeds,
            deadline = %deadline,
            event = "swap_completed"
        );
        Ok(proceeds)
    }

    async fn stake(&self, amount: U256) -> Result<()> {
        self.staking
            .submit(self.custody, amount, self.config.referral)
            .instrument(spans::stake(&self.staking.address(), &amount))
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Stake, e))?;

        info!(amount = %amount, event = "stake_completed");
        Ok(())
    }

    async fn deliver(&self, recipient: Address, amount: U256) -> Result<()> {
        self.staking
            .transfer(self.custody, recipient, amount)
            .instrument(spans::deliver(&self.staking.address(), &recipient, &amount))
            .await
            .map_err(|e| ReceiverError::hook(HookStage::Deliver, e))?;

        info!(
            recipient = %recipient,
            amount = %amount,
            event = "derivative_delivered"
        );
        Ok(())
    }

    async fn native_balance(&self) -> Result<U256> {
        self.host
            .native_balance(self.custody)
            .await
            .map_err(|e| ReceiverError::hook(HookStage::BalanceQuery, e))
    }
}
