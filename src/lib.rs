//! # cctp-hook-receiver
//!
//! Destination-side settlement for Circle's Cross-Chain Transfer Protocol
//! (CCTP) with an optional swap-and-stake hook.
//!
//! A settlement takes an attested CCTP message, has the message transmitter
//! mint the transferred USDC into a custody account, and, when the sender
//! attached hook data, swaps that USDC for the chain's native asset, stakes it
//! and hands the resulting staking derivative to the hook's recipient. The
//! whole settlement is atomic: any failure leaves custody, the recipient and
//! the mint exactly as they were.
//!
//! ## Building hook data
//!
//! The sender encodes the instruction on the source chain:
//!
//! ```rust
//! use cctp_hook_receiver::{build_hook_data, DomainId, HookPayload};
//! use alloy_primitives::{address, U256};
//!
//! let recipient = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
//! let hook_data = build_hook_data(
//!     U256::from(1_000_000_000u64),
//!     recipient,
//!     DomainId::Arbitrum.as_u32(),
//! )
//! .unwrap();
//!
//! assert_eq!(hook_data.len(), HookPayload::PACKED_SIZE);
//! let payload = HookPayload::decode(&hook_data).unwrap();
//! assert_eq!(payload.recipient(), recipient);
//! ```
//!
//! ## Settling
//!
//! [`CctpReceiver`] is generic over its collaborators. Against a development
//! node use [`providers::AlloyHost`]; in tests use
//! [`testing::SimulatedChain`]:
//!
//! ```rust,ignore
//! use cctp_hook_receiver::testing::SimulatedChain;
//! use cctp_hook_receiver::{CctpReceiver, HookConfig, SettlementOutcome};
//!
//! let chain = SimulatedChain::new();
//! let receiver = CctpReceiver::builder()
//!     .custody(chain.custody())
//!     .message_transmitter(chain.message_transmitter())
//!     .usdc(chain.usdc())
//!     .swap_venue(chain.swap_venue())
//!     .staking(chain.staking())
//!     .host(chain.host())
//!     .config(HookConfig::new(chain.swap_path()))
//!     .build();
//!
//! match receiver.receive_usdc(&hook_data, &message, &attestation).await? {
//!     SettlementOutcome::Custodied { credited } => println!("kept {credited} in custody"),
//!     SettlementOutcome::Completed(record) => println!("delivered {}", record.final_amount()),
//! }
//! ```
//!
//! ## Configuration
//!
//! [`HookConfig`] holds the swap path, the hook data layout, the minimum swap
//! output policy, the swap deadline and the staking referral. Every field can
//! be overridden from `CCTP_HOOK_*` environment variables (and a `.env` file)
//! with [`HookConfig::from_env`].
//!
//! ## Public API
//!
//! - [`CctpReceiver`] - The settlement orchestrator
//! - [`HookExecutor`] - The swap-then-stake hook it delegates to
//! - [`HookPayload`], [`build_hook_data`] and [`HookEncoding`] - Hook data codec
//! - [`SettlementRecord`], [`SettlementOutcome`] and [`SettlementCompleted`] - Settlement results
//! - [`ReceiverError`] and [`Result`] - Error types for error handling
//! - [`traits`] - Collaborator abstractions
//! - Contract wrappers: [`Erc20Contract`], [`MessageTransmitterContract`],
//!   [`UniswapV2RouterContract`], [`LidoContract`]

mod chain;
pub mod contracts;
mod error;
mod protocol;
mod receiver;

pub use chain::{
    ReceiverDeployment, ETHEREUM_LIDO_STETH, ETHEREUM_MESSAGE_TRANSMITTER,
    ETHEREUM_UNISWAP_V2_ROUTER, ETHEREUM_USDC, ETHEREUM_WETH, SEPOLIA_LIDO_STETH,
    SEPOLIA_MESSAGE_TRANSMITTER, SEPOLIA_UNISWAP_V2_ROUTER, SEPOLIA_USDC, SEPOLIA_WETH,
};
pub use contracts::{
    Erc20Contract, LidoContract, MessageTransmitterContract, UniswapV2RouterContract,
};
pub use error::{HookStage, ReceiverError, Result};
pub use protocol::{
    build_hook_data, DomainId, HookEncoding, HookPayload, SettlementCompleted, SettlementOutcome,
    SettlementRecord,
};
pub use receiver::{
    CctpReceiver, Entered, HookConfig, HookExecutor, MinOutputPolicy, ReentrancyGuard,
    DEFAULT_SWAP_DEADLINE_SECS, ENV_ENCODING, ENV_MIN_AMOUNT_OUT, ENV_REFERRAL,
    ENV_SWAP_DEADLINE_SECS,
};

pub mod providers;
// Public module for advanced users who need custom instrumentation
pub mod spans;
pub mod testing;
pub mod traits;
