//! Settles a CCTP transfer with a swap-and-stake hook against the simulated
//! chain, printing the structured trace.
//!
//! The hook configuration is read from `CCTP_HOOK_*` variables (or `.env`):
//!
//! ```bash
//! CCTP_HOOK_MIN_AMOUNT_OUT=90000000 RUST_LOG=cctp_hook_receiver=debug \
//!     cargo run --example simulated_settlement
//! ```

use alloy_primitives::{address, Bytes, U256};
use cctp_hook_receiver::testing::SimulatedChain;
use cctp_hook_receiver::{CctpReceiver, DomainId, HookConfig, ReceiverError, SettlementOutcome};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ReceiverError> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cctp_hook_receiver=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let recipient = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
    let amount = U256::from(50_000_000u64);
    let message = Bytes::from_static(b"burn of 50 USDC on Arbitrum");
    let attestation = Bytes::from_static(b"attestation");

    // 50 USDC -> 0.1 ETH -> ~0.1 stETH
    let chain = SimulatedChain::new();
    chain.add_attestation(message.clone(), attestation.clone(), amount);
    chain.set_swap_rate(2_000_000_000, 1);
    chain.set_stake_rate(999, 1_000);

    let config = HookConfig::new(chain.swap_path()).from_env()?;
    info!(config = ?config, "Hook configuration loaded");

    let receiver = CctpReceiver::builder()
        .custody(chain.custody())
        .message_transmitter(chain.message_transmitter())
        .usdc(chain.usdc())
        .swap_venue(chain.swap_venue())
        .staking(chain.staking())
        .host(chain.host())
        .config(config)
        .build();

    let hook_data = receiver.build_hook_data(amount, recipient, DomainId::Arbitrum.as_u32())?;
    println!("Hook data: {hook_data}");

    match receiver
        .receive_usdc(&hook_data, &message, &attestation)
        .await?
    {
        SettlementOutcome::Completed(record) => {
            println!("Delivered {} stETH wei to {}", record.final_amount(), record.recipient());
            println!("Event: {}", record.to_json()?);
        }
        SettlementOutcome::Custodied { credited } => {
            println!("Kept {credited} USDC units in custody");
        }
    }

    println!(
        "Recipient stETH balance: {}",
        chain.derivative_balance(recipient)
    );
    Ok(())
}
