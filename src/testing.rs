//! In-memory collaborators for testing settlement
//!
//! [`SimulatedChain`] models just enough of an EVM chain to drive a
//! settlement end to end: a USDC ledger, a message transmitter that mints on
//! accepted attestations, a swap venue paying out the native asset at a fixed
//! rate, a staking protocol minting a derivative token, and a host with a
//! snapshot journal. Each collaborator is exposed as a cheap handle sharing
//! the same state.
//!
//! Any step can be made to fail with [`SimulatedChain::fail_at`], and every
//! collaborator call is logged (outside the journal, so reverted calls stay
//! visible) for assertions.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ReceiverError, Result};
use crate::traits::{
    Checkpoint, ExecutionHost, MessageVerifier, StakingProtocol, SwapVenue, TokenLedger,
};

/// Simulated USDC contract address
pub const SIM_USDC: Address = Address::repeat_byte(0x01);
/// Simulated wrapped native token, last hop of the swap path
pub const SIM_WRAPPED_NATIVE: Address = Address::repeat_byte(0x02);
/// Simulated swap router
pub const SIM_SWAP_VENUE: Address = Address::repeat_byte(0x03);
/// Simulated staking protocol and derivative token
pub const SIM_STAKING: Address = Address::repeat_byte(0x04);
/// Default custody account
pub const SIM_CUSTODY: Address = Address::repeat_byte(0xcc);
/// Block timestamp the simulation starts at
pub const SIM_GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// A collaborator step that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Verify,
    Approve,
    Swap,
    Stake,
    Transfer,
    Checkpoint,
    Revert,
}

/// A logged collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedCall {
    ReceiveMessage,
    Approve { spender: Address, amount: U256 },
    Swap { amount_in: U256, amount_out_min: U256 },
    Submit { amount: U256 },
    Transfer { token: Address, to: Address, amount: U256 },
}

/// Invoked by the swap venue before it executes a swap.
///
/// Tests use this to model a venue that calls back into the receiver.
#[async_trait]
pub trait SwapCallback: Send + Sync {
    async fn on_swap(&self);
}

#[derive(Debug, Clone, Default)]
struct World {
    usdc: HashMap<Address, U256>,
    usdc_allowances: HashMap<(Address, Address), U256>,
    derivative: HashMap<Address, U256>,
    derivative_allowances: HashMap<(Address, Address), U256>,
    native: HashMap<Address, U256>,
    consumed_messages: HashSet<Bytes>,
    timestamp: u64,
}

struct Attestation {
    signature: Bytes,
    credit: U256,
}

struct State {
    world: World,
    journal: Vec<(U256, World)>,
    next_checkpoint: u64,
    attestations: HashMap<Bytes, Attestation>,
    swap_rate: (U256, U256),
    stake_rate: (U256, U256),
    failures: HashSet<FailurePoint>,
    calls: Vec<SimulatedCall>,
    swap_callback: Option<Arc<dyn SwapCallback>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            world: World {
                timestamp: SIM_GENESIS_TIMESTAMP,
                ..World::default()
            },
            journal: Vec::new(),
            next_checkpoint: 1,
            attestations: HashMap::new(),
            swap_rate: (U256::from(1u64), U256::from(1u64)),
            stake_rate: (U256::from(1u64), U256::from(1u64)),
            failures: HashSet::new(),
            calls: Vec::new(),
            swap_callback: None,
        }
    }
}

impl State {
    fn check(&self, point: FailurePoint) -> Result<()> {
        if self.failures.contains(&point) {
            return Err(ReceiverError::ContractCall(format!(
                "simulated {point:?} failure"
            )));
        }
        Ok(())
    }
}

fn revert(reason: &str) -> ReceiverError {
    ReceiverError::ContractCall(format!("execution reverted: {reason}"))
}

fn debit(balances: &mut HashMap<Address, U256>, account: Address, amount: U256) -> Result<()> {
    let balance = balances.entry(account).or_default();
    *balance = balance
        .checked_sub(amount)
        .ok_or_else(|| revert("transfer amount exceeds balance"))?;
    Ok(())
}

fn credit(balances: &mut HashMap<Address, U256>, account: Address, amount: U256) {
    *balances.entry(account).or_default() += amount;
}

/// Shared in-memory chain state
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Clone)]
pub struct SimulatedChain {
    state: Arc<Mutex<State>>,
    custody: Address,
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            custody: SIM_CUSTODY,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Swap path from USDC to the wrapped native token
    pub fn swap_path(&self) -> Vec<Address> {
        vec![SIM_USDC, SIM_WRAPPED_NATIVE]
    }

    pub fn message_transmitter(&self) -> SimulatedTransmitter {
        SimulatedTransmitter(self.clone())
    }

    pub fn usdc(&self) -> SimulatedUsdc {
        SimulatedUsdc(self.clone())
    }

    pub fn swap_venue(&self) -> SimulatedSwapVenue {
        SimulatedSwapVenue(self.clone())
    }

    pub fn staking(&self) -> SimulatedStaking {
        SimulatedStaking(self.clone())
    }

    pub fn host(&self) -> SimulatedHost {
        SimulatedHost(self.clone())
    }

    /// Registers an attestation that, once verified, mints `credit` USDC to custody.
    pub fn add_attestation(&self, message: Bytes, signature: Bytes, credit: U256) {
        self.state()
            .attestations
            .insert(message, Attestation { signature, credit });
    }

    /// Sets native units paid out per USDC unit swapped, as `numerator / denominator`.
    pub fn set_swap_rate(&self, numerator: u64, denominator: u64) {
        self.state().swap_rate = (U256::from(numerator), U256::from(denominator));
    }

    /// Sets derivative units minted per native unit staked, as `numerator / denominator`.
    pub fn set_stake_rate(&self, numerator: u64, denominator: u64) {
        self.state().stake_rate = (U256::from(numerator), U256::from(denominator));
    }

    pub fn fail_at(&self, point: FailurePoint) {
        self.state().failures.insert(point);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn set_swap_callback(&self, callback: Arc<dyn SwapCallback>) {
        self.state().swap_callback = Some(callback);
    }

    pub fn mint_usdc(&self, account: Address, amount: U256) {
        credit(&mut self.state().world.usdc, account, amount);
    }

    pub fn mint_derivative(&self, account: Address, amount: U256) {
        credit(&mut self.state().world.derivative, account, amount);
    }

    pub fn set_native_balance(&self, account: Address, amount: U256) {
        self.state().world.native.insert(account, amount);
    }

    pub fn usdc_balance(&self, account: Address) -> U256 {
        self.state().world.usdc.get(&account).copied().unwrap_or_default()
    }

    pub fn usdc_allowance(&self, owner: Address, spender: Address) -> U256 {
        self.state()
            .world
            .usdc_allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn derivative_balance(&self, account: Address) -> U256 {
        self.state()
            .world
            .derivative
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.state()
            .world
            .native
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_message_consumed(&self, message: &Bytes) -> bool {
        self.state().world.consumed_messages.contains(message)
    }

    /// Open journal checkpoints
    pub fn journal_depth(&self) -> usize {
        self.state().journal.len()
    }

    pub fn calls(&self) -> Vec<SimulatedCall> {
        self.state().calls.clone()
    }

    pub fn advance_time(&self, secs: u64) {
        self.state().world.timestamp += secs;
    }
}

/// Message transmitter handle
#[derive(Clone)]
pub struct SimulatedTransmitter(SimulatedChain);

#[async_trait]
impl MessageVerifier for SimulatedTransmitter {
    async fn receive_message(&self, message: &Bytes, attestation: &Bytes) -> Result<bool> {
        let custody = self.0.custody;
        let mut state = self.0.state();
        state.calls.push(SimulatedCall::ReceiveMessage);
        state.check(FailurePoint::Verify)?;

        if state.world.consumed_messages.contains(message) {
            return Err(revert("Nonce already used"));
        }
        let credit_amount = match state.attestations.get(message) {
            Some(registered) if registered.signature == *attestation => registered.credit,
            _ => return Ok(false),
        };

        state.world.consumed_messages.insert(message.clone());
        credit(&mut state.world.usdc, custody, credit_amount);
        Ok(true)
    }
}

/// USDC ledger handle
#[derive(Clone)]
pub struct SimulatedUsdc(SimulatedChain);

#[async_trait]
impl TokenLedger for SimulatedUsdc {
    fn address(&self) -> Address {
        SIM_USDC
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        Ok(self.0.usdc_balance(account))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.0.usdc_allowance(owner, spender))
    }

    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        let mut state = self.0.state();
        state.calls.push(SimulatedCall::Approve { spender, amount });
        state.check(FailurePoint::Approve)?;
        state.world.usdc_allowances.insert((owner, spender), amount);
        Ok(())
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<()> {
        let mut state = self.0.state();
        state.calls.push(SimulatedCall::Transfer {
            token: SIM_USDC,
            to,
            amount,
        });
        state.check(FailurePoint::Transfer)?;
        debit(&mut state.world.usdc, from, amount)?;
        credit(&mut state.world.usdc, to, amount);
        Ok(())
    }
}

/// Swap venue handle paying out native tokens at the configured rate
#[derive(Clone)]
pub struct SimulatedSwapVenue(SimulatedChain);

#[async_trait]
impl SwapVenue for SimulatedSwapVenue {
    fn address(&self) -> Address {
        SIM_SWAP_VENUE
    }

    async fn swap_exact_tokens_for_native(
        &self,
        sender: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: &[Address],
        to: Address,
        deadline: U256,
    ) -> Result<()> {
        let callback = {
            let mut state = self.0.state();
            state.calls.push(SimulatedCall::Swap {
                amount_in,
                amount_out_min,
            });
            state.swap_callback.clone()
        };
        if let Some(callback) = callback {
            callback.on_swap().await;
        }

        let mut state = self.0.state();
        state.check(FailurePoint::Swap)?;

        if deadline < U256::from(state.world.timestamp) {
            return Err(revert("UniswapV2Router: EXPIRED"));
        }
        if path.len() < 2 || path[0] != SIM_USDC || path[path.len() - 1] != SIM_WRAPPED_NATIVE {
            return Err(revert("UniswapV2Router: INVALID_PATH"));
        }

        let allowance = state
            .world
            .usdc_allowances
            .entry((sender, SIM_SWAP_VENUE))
            .or_default();
        *allowance = allowance
            .checked_sub(amount_in)
            .ok_or_else(|| revert("ERC20: insufficient allowance"))?;
        debit(&mut state.world.usdc, sender, amount_in)?;
        credit(&mut state.world.usdc, SIM_SWAP_VENUE, amount_in);

        let (numerator, denominator) = state.swap_rate;
        let amount_out = amount_in * numerator / denominator;
        if amount_out < amount_out_min {
            return Err(revert("UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        credit(&mut state.world.native, to, amount_out);
        Ok(())
    }
}

/// Staking protocol and derivative token handle
#[derive(Clone)]
pub struct SimulatedStaking(SimulatedChain);

#[async_trait]
impl TokenLedger for SimulatedStaking {
    fn address(&self) -> Address {
        SIM_STAKING
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        Ok(self.0.derivative_balance(account))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        Ok(self
            .0
            .state()
            .world
            .derivative_allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        let mut state = self.0.state();
        state.check(FailurePoint::Approve)?;
        state
            .world
            .derivative_allowances
            .insert((owner, spender), amount);
        Ok(())
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<()> {
        let mut state = self.0.state();
        state.calls.push(SimulatedCall::Transfer {
            token: SIM_STAKING,
            to,
            amount,
        });
        state.check(FailurePoint::Transfer)?;
        debit(&mut state.world.derivative, from, amount)?;
        credit(&mut state.world.derivative, to, amount);
        Ok(())
    }
}

#[async_trait]
impl StakingProtocol for SimulatedStaking {
    async fn submit(&self, from: Address, amount: U256, _referral: Address) -> Result<()> {
        let mut state = self.0.state();
        state.calls.push(SimulatedCall::Submit { amount });
        state.check(FailurePoint::Stake)?;

        if amount.is_zero() {
            return Err(revert("ZERO_DEPOSIT"));
        }
        debit(&mut state.world.native, from, amount)?;

        let (numerator, denominator) = state.stake_rate;
        let shares = amount * numerator / denominator;
        credit(&mut state.world.derivative, from, shares);
        Ok(())
    }
}

/// Host handle providing native balances, time and the snapshot journal
#[derive(Clone)]
pub struct SimulatedHost(SimulatedChain);

#[async_trait]
impl ExecutionHost for SimulatedHost {
    async fn native_balance(&self, account: Address) -> Result<U256> {
        Ok(self.0.native_balance(account))
    }

    async fn timestamp(&self) -> Result<u64> {
        Ok(self.0.state().world.timestamp)
    }

    async fn checkpoint(&self) -> Result<Checkpoint> {
        let mut state = self.0.state();
        if state.failures.contains(&FailurePoint::Checkpoint) {
            return Err(ReceiverError::Journal("simulated checkpoint failure".into()));
        }
        let id = U256::from(state.next_checkpoint);
        state.next_checkpoint += 1;
        let snapshot = state.world.clone();
        state.journal.push((id, snapshot));
        Ok(Checkpoint(id))
    }

    async fn revert_to(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut state = self.0.state();
        if state.failures.contains(&FailurePoint::Revert) {
            return Err(ReceiverError::Journal("simulated revert failure".into()));
        }
        let position = state
            .journal
            .iter()
            .position(|(id, _)| *id == checkpoint.0)
            .ok_or_else(|| ReceiverError::Journal(format!("unknown checkpoint {}", checkpoint.0)))?;
        let (_, snapshot) = state.journal.swap_remove(position);
        state.journal.truncate(position);
        state.world = snapshot;
        Ok(())
    }

    async fn commit(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut state = self.0.state();
        let position = state
            .journal
            .iter()
            .position(|(id, _)| *id == checkpoint.0)
            .ok_or_else(|| ReceiverError::Journal(format!("unknown checkpoint {}", checkpoint.0)))?;
        state.journal.truncate(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revert_restores_balances() {
        let chain = SimulatedChain::new();
        let host = chain.host();
        let custody = chain.custody();

        chain.mint_usdc(custody, U256::from(10u64));
        let checkpoint = host.checkpoint().await.unwrap();
        chain.mint_usdc(custody, U256::from(5u64));
        assert_eq!(chain.usdc_balance(custody), U256::from(15u64));

        host.revert_to(checkpoint).await.unwrap();
        assert_eq!(chain.usdc_balance(custody), U256::from(10u64));
        assert_eq!(chain.journal_depth(), 0);
    }

    #[tokio::test]
    async fn test_commit_keeps_balances() {
        let chain = SimulatedChain::new();
        let host = chain.host();

        let checkpoint = host.checkpoint().await.unwrap();
        chain.mint_derivative(chain.custody(), U256::from(3u64));
        host.commit(checkpoint).await.unwrap();

        assert_eq!(chain.derivative_balance(chain.custody()), U256::from(3u64));
        assert_eq!(chain.journal_depth(), 0);
        assert!(matches!(
            host.revert_to(checkpoint).await,
            Err(ReceiverError::Journal(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_revert_discards_inner_checkpoints() {
        let chain = SimulatedChain::new();
        let host = chain.host();
        let custody = chain.custody();

        let outer = host.checkpoint().await.unwrap();
        chain.mint_usdc(custody, U256::from(1u64));
        let _inner = host.checkpoint().await.unwrap();
        chain.mint_usdc(custody, U256::from(1u64));

        host.revert_to(outer).await.unwrap();
        assert_eq!(chain.usdc_balance(custody), U256::ZERO);
        assert_eq!(chain.journal_depth(), 0);
    }

    #[tokio::test]
    async fn test_transmitter_rejects_unknown_and_replayed_messages() {
        let chain = SimulatedChain::new();
        let transmitter = chain.message_transmitter();
        let message = Bytes::from_static(b"message");
        let signature = Bytes::from_static(b"signature");

        assert!(!transmitter.receive_message(&message, &signature).await.unwrap());

        chain.add_attestation(message.clone(), signature.clone(), U256::from(7u64));
        assert!(!transmitter
            .receive_message(&message, &Bytes::from_static(b"forged"))
            .await
            .unwrap());
        assert!(transmitter.receive_message(&message, &signature).await.unwrap());
        assert_eq!(chain.usdc_balance(chain.custody()), U256::from(7u64));

        assert!(transmitter.receive_message(&message, &signature).await.is_err());
    }

    #[tokio::test]
    async fn test_swap_requires_allowance() {
        let chain = SimulatedChain::new();
        let custody = chain.custody();
        chain.mint_usdc(custody, U256::from(10u64));

        let result = chain
            .swap_venue()
            .swap_exact_tokens_for_native(
                custody,
                U256::from(10u64),
                U256::ZERO,
                &chain.swap_path(),
                custody,
                U256::MAX,
            )
            .await;

        assert!(matches!(result, Err(ReceiverError::ContractCall(_))));
    }

    #[tokio::test]
    async fn test_stake_mints_at_rate() {
        let chain = SimulatedChain::new();
        let custody = chain.custody();
        chain.set_native_balance(custody, U256::from(1_000u64));
        chain.set_stake_rate(1, 10);

        chain
            .staking()
            .submit(custody, U256::from(1_000u64), Address::ZERO)
            .await
            .unwrap();

        assert_eq!(chain.derivative_balance(custody), U256::from(100u64));
        assert_eq!(chain.native_balance(custody), U256::ZERO);
    }
}
