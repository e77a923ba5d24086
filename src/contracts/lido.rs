//! Lido stETH bindings
//!
//! stETH is both the staking entry point (`submit`) and the ERC20 derivative
//! token it mints.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use Lido::LidoInstance;

/// Lido staking contract wrapper
///
/// stETH balances are share-based and may come out one or two wei below the
/// submitted amount, so callers should read balances rather than assume a
/// 1:1 mint.
pub struct LidoContract<P: Provider<Ethereum>> {
    instance: LidoInstance<P>,
}

impl<P: Provider<Ethereum>> LidoContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "lido_contract_initialized"
        );
        Self {
            instance: LidoInstance::new(address, provider),
        }
    }

    /// Builds a payable `submit(referral)` staking `amount` wei from `from`.
    pub fn submit_transaction(
        &self,
        from: Address,
        amount: U256,
        referral: Address,
    ) -> TransactionRequest {
        info!(
            from = %from,
            amount = %amount,
            referral = %referral,
            contract_address = %self.instance.address(),
            event = "submit_transaction_created"
        );

        self.instance
            .submit(referral)
            .from(from)
            .value(amount)
            .into_transaction_request()
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.balanceOf(account).call().await?;

        debug!(
            account = %account,
            balance = %result,
            contract_address = %self.instance.address(),
            event = "steth_balance_retrieved"
        );

        Ok(result)
    }

    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, alloy_contract::Error> {
        self.instance.allowance(owner, spender).call().await
    }

    pub fn approve_transaction(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        self.instance
            .approve(spender, amount)
            .from(owner)
            .into_transaction_request()
    }

    /// Builds a stETH `transfer(to, amount)` sent from `from`.
    pub fn transfer_transaction(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            to = %to,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "steth_transfer_transaction_created"
        );

        self.instance
            .transfer(to, amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Lido {
        function submit(address referral) external payable returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
);
