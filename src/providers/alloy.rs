//! Alloy-backed collaborators for settling against a live node.

use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockNumberOrTag, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use tracing::{debug, instrument, trace, warn};

use crate::chain::ReceiverDeployment;
use crate::contracts::{
    Erc20Contract, LidoContract, MessageTransmitterContract, UniswapV2RouterContract,
};
use crate::error::{ReceiverError, Result};
use crate::receiver::{CctpReceiver, HookConfig};
use crate::traits::{
    Checkpoint, ExecutionHost, MessageVerifier, StakingProtocol, SwapVenue, TokenLedger,
};

/// A [`CctpReceiver`] wired entirely to Alloy collaborators
pub type AlloyReceiver<P> =
    CctpReceiver<AlloyMessageVerifier<P>, AlloyToken<P>, AlloySwapVenue<P>, AlloyStaking<P>, AlloyHost<P>>;

/// Execution host over an Alloy [`Provider`].
///
/// Checkpoints use the `evm_snapshot` / `evm_revert` RPC methods, so the
/// node must be a development node (Anvil, Hardhat) or a fork of one. The
/// hook measures swap proceeds as the custody account's native balance
/// delta, which gas spending would distort; run the node with a zero base
/// fee and gas price.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_hook_receiver::providers::AlloyHost;
/// use cctp_hook_receiver::{HookConfig, ReceiverDeployment};
/// use alloy_chains::NamedChain;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let custody = address!("1234567890123456789012345678901234567890");
///
/// let host = AlloyHost::new(provider);
/// host.impersonate(custody).await?;
///
/// let deployment = ReceiverDeployment::for_chain(NamedChain::Mainnet)?;
/// let receiver = host.receiver(deployment, custody, HookConfig::for_chain(NamedChain::Mainnet)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyHost<P> {
    provider: P,
}

impl<P> AlloyHost<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }

    /// Lets the node accept unsigned transactions from `account`.
    #[instrument(skip(self))]
    pub async fn impersonate(&self, account: Address) -> Result<()> {
        let _: () = self
            .provider
            .raw_request("anvil_impersonateAccount".into(), (account,))
            .await?;
        debug!(account = %account, event = "account_impersonated");
        Ok(())
    }

    /// Builds a receiver for `deployment` acting as `custody`.
    pub fn receiver(
        &self,
        deployment: ReceiverDeployment,
        custody: Address,
        config: HookConfig,
    ) -> AlloyReceiver<P> {
        CctpReceiver::builder()
            .custody(custody)
            .message_transmitter(AlloyMessageVerifier::new(
                deployment.message_transmitter,
                custody,
                self.provider.clone(),
            ))
            .usdc(AlloyToken::new(deployment.usdc, self.provider.clone()))
            .swap_venue(AlloySwapVenue::new(
                deployment.swap_router,
                self.provider.clone(),
            ))
            .staking(AlloyStaking::new(deployment.staking, self.provider.clone()))
            .host(self.clone())
            .config(config)
            .build()
    }
}

#[async_trait]
impl<P> ExecutionHost for AlloyHost<P>
where
    P: Provider<Ethereum> + Clone,
{
    #[instrument(skip(self))]
    async fn native_balance(&self, account: Address) -> Result<U256> {
        let balance = self.provider.get_balance(account).await?;
        trace!(balance = %balance, "Native balance retrieved");
        Ok(balance)
    }

    async fn timestamp(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| ReceiverError::Provider("latest block not available".to_string()))?;
        Ok(block.header.timestamp)
    }

    #[instrument(skip(self))]
    async fn checkpoint(&self) -> Result<Checkpoint> {
        let id: U256 = self
            .provider
            .raw_request("evm_snapshot".into(), ())
            .await
            .map_err(|e| ReceiverError::Journal(format!("evm_snapshot failed: {e}")))?;
        debug!(snapshot_id = %id, event = "snapshot_taken");
        Ok(Checkpoint(id))
    }

    #[instrument(skip(self), fields(snapshot_id = %checkpoint.0))]
    async fn revert_to(&self, checkpoint: Checkpoint) -> Result<()> {
        let reverted: bool = self
            .provider
            .raw_request("evm_revert".into(), (checkpoint.0,))
            .await
            .map_err(|e| ReceiverError::Journal(format!("evm_revert failed: {e}")))?;

        if !reverted {
            return Err(ReceiverError::Journal(format!(
                "node refused to revert to snapshot {}",
                checkpoint.0
            )));
        }
        debug!(event = "snapshot_reverted");
        Ok(())
    }

    async fn commit(&self, checkpoint: Checkpoint) -> Result<()> {
        // Snapshots need no release; an unused one is simply never reverted to.
        trace!(snapshot_id = %checkpoint.0, "Checkpoint committed");
        Ok(())
    }
}

/// CCTP message transmitter acting on behalf of `caller`
pub struct AlloyMessageVerifier<P: Provider<Ethereum>> {
    contract: MessageTransmitterContract<P>,
    caller: Address,
    provider: P,
}

impl<P> AlloyMessageVerifier<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(address: Address, caller: Address, provider: P) -> Self {
        Self {
            contract: MessageTransmitterContract::new(address, provider.clone()),
            caller,
            provider,
        }
    }
}

#[async_trait]
impl<P> MessageVerifier for AlloyMessageVerifier<P>
where
    P: Provider<Ethereum> + Clone,
{
    #[instrument(skip_all, fields(caller = %self.caller))]
    async fn receive_message(&self, message: &Bytes, attestation: &Bytes) -> Result<bool> {
        let accepted = self
            .contract
            .receive_message_call(message.clone(), attestation.clone(), self.caller)
            .await
            .map_err(contract_error)?;
        if !accepted {
            warn!(event = "receive_message_rejected");
            return Ok(false);
        }

        let tx = self.contract.receive_message_transaction(
            message.clone(),
            attestation.clone(),
            self.caller,
        );
        send_and_confirm(&self.provider, tx, "receiveMessage").await?;
        Ok(true)
    }
}

/// ERC20 ledger for the custody token
pub struct AlloyToken<P: Provider<Ethereum>> {
    contract: Erc20Contract<P>,
    provider: P,
}

impl<P> AlloyToken<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            contract: Erc20Contract::new(address, provider.clone()),
            provider,
        }
    }
}

#[async_trait]
impl<P> TokenLedger for AlloyToken<P>
where
    P: Provider<Ethereum> + Clone,
{
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        self.contract.balance_of(account).await.map_err(contract_error)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.contract
            .allowance(owner, spender)
            .await
            .map_err(contract_error)
    }

    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        let tx = self.contract.approve_transaction(owner, spender, amount);
        send_and_confirm(&self.provider, tx, "approve").await?;
        Ok(())
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<()> {
        let tx = self.contract.transfer_transaction(from, to, amount);
        send_and_confirm(&self.provider, tx, "transfer").await?;
        Ok(())
    }
}

/// Uniswap V2 router as a swap venue
pub struct AlloySwapVenue<P: Provider<Ethereum>> {
    contract: UniswapV2RouterContract<P>,
    provider: P,
}

impl<P> AlloySwapVenue<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            contract: UniswapV2RouterContract::new(address, provider.clone()),
            provider,
        }
    }
}

#[async_trait]
impl<P> SwapVenue for AlloySwapVenue<P>
where
    P: Provider<Ethereum> + Clone,
{
    fn address(&self) -> Address {
        self.contract.address()
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
        let tx = self.contract.swap_exact_tokens_for_eth_transaction(
            sender,
            amount_in,
            amount_out_min,
            path.to_vec(),
            to,
            deadline,
        );
        send_and_confirm(&self.provider, tx, "swapExactTokensForETH").await?;
        Ok(())
    }
}

/// Lido as the staking protocol and derivative ledger
pub struct AlloyStaking<P: Provider<Ethereum>> {
    contract: LidoContract<P>,
    provider: P,
}

impl<P> AlloyStaking<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            contract: LidoContract::new(address, provider.clone()),
            provider,
        }
    }
}

#[async_trait]
impl<P> TokenLedger for AlloyStaking<P>
where
    P: Provider<Ethereum> + Clone,
{
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn balance_of(&self, account: Address) -> Result<U256> {
        self.contract.balance_of(account).await.map_err(contract_error)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.contract
            .allowance(owner, spender)
            .await
            .map_err(contract_error)
    }

    async fn approve(&self, owner: Address, spender: Address, amount: U256) -> Result<()> {
        let tx = self.contract.approve_transaction(owner, spender, amount);
        send_and_confirm(&self.provider, tx, "approve").await?;
        Ok(())
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<()> {
        let tx = self.contract.transfer_transaction(from, to, amount);
        send_and_confirm(&self.provider, tx, "transfer").await?;
        Ok(())
    }
}

#[async_trait]
impl<P> StakingProtocol for AlloyStaking<P>
where
    P: Provider<Ethereum> + Clone,
{
    async fn submit(&self, from: Address, amount: U256, referral: Address) -> Result<()> {
        let tx = self.contract.submit_transaction(from, amount, referral);
        send_and_confirm(&self.provider, tx, "submit").await?;
        Ok(())
    }
}

/// Sends `tx`, waits for its receipt and fails if it reverted.
async fn send_and_confirm<P>(
    provider: &P,
    tx: TransactionRequest,
    action: &'static str,
) -> Result<TransactionReceipt>
where
    P: Provider<Ethereum>,
{
    let pending = provider.send_transaction(tx).await?;
    let tx_hash = *pending.tx_hash();
    trace!(tx_hash = %tx_hash, action, "Transaction sent");

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ReceiverError::Provider(format!("{action} ({tx_hash}): {e}")))?;

    if !receipt.status() {
        return Err(ReceiverError::ContractCall(format!(
            "{action} reverted in {tx_hash}"
        )));
    }

    debug!(
        tx_hash = %tx_hash,
        action,
        gas_used = receipt.gas_used(),
        event = "transaction_confirmed"
    );
    Ok(receipt)
}

fn contract_error(e: alloy_contract::Error) -> ReceiverError {
    ReceiverError::ContractCall(e.to_string())
}
