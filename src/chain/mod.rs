//! Per-chain deployment addresses for the receiver's collaborators

mod addresses;

use alloy_chains::NamedChain;
use alloy_primitives::Address;

use crate::error::{ReceiverError, Result};
pub use addresses::*;

/// Addresses of every contract a settlement touches on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverDeployment {
    /// USDC, the custody token
    pub usdc: Address,
    /// Wrapped native token, the last hop of the swap path
    pub wrapped_native: Address,
    /// Uniswap V2 router used as swap venue
    pub swap_router: Address,
    /// Lido stETH, both staking entrypoint and derivative token
    pub staking: Address,
    /// CCTP MessageTransmitter that verifies attestations and mints
    pub message_transmitter: Address,
}

impl ReceiverDeployment {
    /// Looks up the deployment for `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::ChainNotSupported`] for chains without a full
    /// set of collaborators.
    pub fn for_chain(chain: NamedChain) -> Result<Self> {
        match chain {
            NamedChain::Mainnet => Ok(Self {
                usdc: ETHEREUM_USDC,
                wrapped_native: ETHEREUM_WETH,
                swap_router: ETHEREUM_UNISWAP_V2_ROUTER,
                staking: ETHEREUM_LIDO_STETH,
                message_transmitter: ETHEREUM_MESSAGE_TRANSMITTER,
            }),
            NamedChain::Sepolia => Ok(Self {
                usdc: SEPOLIA_USDC,
                wrapped_native: SEPOLIA_WETH,
                swap_router: SEPOLIA_UNISWAP_V2_ROUTER,
                staking: SEPOLIA_LIDO_STETH,
                message_transmitter: SEPOLIA_MESSAGE_TRANSMITTER,
            }),
            _ => Err(ReceiverError::ChainNotSupported {
                chain: chain.to_string(),
            }),
        }
    }
}
