// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! ERC20 contract bindings
//!
//! Used for the USDC custody ledger: balance snapshots around verification,
//! the swap router allowance, and plain transfers.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use Erc20::Erc20Instance;

/// ERC20 contract wrapper
///
/// Reads go straight to the node; writes are returned as unsigned
/// [`TransactionRequest`]s for the caller to send.
///
/// # Example
///
/// ```rust,no_run
/// use cctp_hook_receiver::contracts::Erc20Contract;
/// use alloy_primitives::{address, U256};
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// let custody = address!("1234567890123456789012345678901234567890");
/// let router = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
///
/// let erc20 = Erc20Contract::new(usdc, provider);
/// if erc20.allowance(custody, router).await? < U256::from(1_000_000u64) {
///     let tx = erc20.approve_transaction(custody, router, U256::from(1_000_000u64));
///     // Send transaction...
/// }
/// # Ok(())
/// # }
/// ```
pub struct Erc20Contract<P: Provider<Ethereum>> {
    instance: Erc20Instance<P>,
}

impl<P: Provider<Ethereum>> Erc20Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "erc20_contract_initialized"
        );
        Self {
            instance: Erc20Instance::new(address, provider),
        }
    }

    /// Amount `spender` may pull from `owner`
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.allowance(owner, spender).call().await?;

        debug!(
            owner = %owner,
            spender = %spender,
            allowance = %result,
            contract_address = %self.instance.address(),
            event = "allowance_retrieved"
        );

        Ok(result)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        let result = self.instance.balanceOf(account).call().await?;

        debug!(
            account = %account,
            balance = %result,
            contract_address = %self.instance.address(),
            event = "balance_retrieved"
        );

        Ok(result)
    }

    /// Builds an `approve(spender, amount)` transaction sent from `owner`.
    pub fn approve_transaction(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            owner = %owner,
            spender = %spender,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "approve_transaction_created"
        );

        self.instance
            .approve(spender, amount)
            .from(owner)
            .into_transaction_request()
    }

    /// Builds a `transfer(to, amount)` transaction sent from `from`.
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
            event = "transfer_transaction_created"
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
    contract Erc20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
);
