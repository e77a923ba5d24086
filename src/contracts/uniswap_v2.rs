//! Uniswap V2 router bindings
//!
//! Only the exact-input, token-to-native swap is bound. The fee-on-transfer
//! variant is used because it returns nothing: callers measure proceeds from
//! their own balance.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use UniswapV2Router::UniswapV2RouterInstance;

pub struct UniswapV2RouterContract<P: Provider<Ethereum>> {
    instance: UniswapV2RouterInstance<P>,
}

impl<P: Provider<Ethereum>> UniswapV2RouterContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "uniswap_v2_router_contract_initialized"
        );
        Self {
            instance: UniswapV2RouterInstance::new(address, provider),
        }
    }

    /// Builds a swap of exactly `amount_in` of `path[0]` for the native asset.
    ///
    /// The router unwraps the last hop (the wrapped native token) and sends
    /// the native asset to `to`. The call reverts if fewer than
    /// `amount_out_min` units come out or the block is past `deadline`.
    pub fn swap_exact_tokens_for_eth_transaction(
        &self,
        sender: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    ) -> TransactionRequest {
        info!(
            sender = %sender,
            amount_in = %amount_in,
            amount_out_min = %amount_out_min,
            hops = path.len(),
            to = %to,
            deadline = %deadline,
            contract_address = %self.instance.address(),
            event = "swap_transaction_created"
        );

        self.instance
            .swapExactTokensForETHSupportingFeeOnTransferTokens(
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            )
            .from(sender)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract UniswapV2Router {
        function swapExactTokensForETHSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external;
    }
);
