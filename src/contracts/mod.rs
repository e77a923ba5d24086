//! Contract bindings
//!
//! Alloy-generated bindings for the contracts a settlement touches, each
//! wrapped in a small instrumented type:
//!
//! - [`MessageTransmitterContract`]: CCTP attestation verification and mint
//! - [`Erc20Contract`]: the USDC custody ledger
//! - [`UniswapV2RouterContract`]: the USDC to native swap
//! - [`LidoContract`]: staking and the stETH derivative

mod erc20;
mod lido;
mod message_transmitter;
mod uniswap_v2;

pub use erc20::Erc20Contract;
pub use lido::LidoContract;
pub use message_transmitter::MessageTransmitterContract;
pub use uniswap_v2::UniswapV2RouterContract;
