//! Integration tests for settlement using the simulated chain
//!
//! Every scenario drives `CctpReceiver::receive_usdc` end to end against
//! `SimulatedChain` and checks balances on every ledger afterwards, including
//! the cases where the settlement must leave no trace.

use alloy_primitives::{address, hex, Address, Bytes, U256};
use alloy_sol_types::{SolEvent, SolValue};
use async_trait::async_trait;
use cctp_hook_receiver::testing::{
    FailurePoint, SimulatedCall, SimulatedChain, SimulatedHost, SimulatedStaking,
    SimulatedSwapVenue, SimulatedTransmitter, SimulatedUsdc, SwapCallback, SIM_STAKING,
    SIM_SWAP_VENUE,
};
use cctp_hook_receiver::traits::TokenLedger;
use cctp_hook_receiver::{
    build_hook_data, CctpReceiver, HookConfig, HookEncoding, HookPayload, HookStage,
    MinOutputPolicy, ReceiverError, SettlementCompleted, SettlementOutcome, SettlementRecord,
};
use std::sync::{Arc, Mutex};

type TestReceiver = CctpReceiver<
    SimulatedTransmitter,
    SimulatedUsdc,
    SimulatedSwapVenue,
    SimulatedStaking,
    SimulatedHost,
>;

const RECIPIENT: Address = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
const FIFTY_USDC: u64 = 50_000_000;

fn message() -> Bytes {
    Bytes::from_static(b"cctp message: 50 USDC to custody")
}

fn attestation() -> Bytes {
    Bytes::from_static(b"circle attestation")
}

/// Chain where an attested 50 USDC swaps to 100e6 wei, which stakes to 100
/// derivative units.
fn funded_chain() -> SimulatedChain {
    let chain = SimulatedChain::new();
    chain.add_attestation(message(), attestation(), U256::from(FIFTY_USDC));
    chain.set_swap_rate(2, 1);
    chain.set_stake_rate(1, 1_000_000);
    chain
}

fn create_receiver(chain: &SimulatedChain, config: HookConfig) -> TestReceiver {
    CctpReceiver::builder()
        .custody(chain.custody())
        .message_transmitter(chain.message_transmitter())
        .usdc(chain.usdc())
        .swap_venue(chain.swap_venue())
        .staking(chain.staking())
        .host(chain.host())
        .config(config)
        .build()
}

fn default_receiver(chain: &SimulatedChain) -> TestReceiver {
    create_receiver(chain, HookConfig::new(chain.swap_path()))
}

fn hook_for(amount: u64, recipient: Address, source_domain: u32) -> Bytes {
    build_hook_data(U256::from(amount), recipient, source_domain).unwrap()
}

/// Asserts the settlement left nothing behind, the mint included.
fn assert_untouched(chain: &SimulatedChain) {
    let custody = chain.custody();
    assert_eq!(chain.usdc_balance(custody), U256::ZERO, "custody USDC");
    assert_eq!(chain.native_balance(custody), U256::ZERO, "custody native");
    assert_eq!(chain.derivative_balance(custody), U256::ZERO, "custody derivative");
    assert_eq!(chain.derivative_balance(RECIPIENT), U256::ZERO, "recipient derivative");
    assert_eq!(chain.usdc_allowance(custody, SIM_SWAP_VENUE), U256::ZERO, "allowance");
    assert!(!chain.is_message_consumed(&message()), "message consumed");
    assert_eq!(chain.journal_depth(), 0, "journal depth");
}

fn swap_count(chain: &SimulatedChain) -> usize {
    chain
        .calls()
        .iter()
        .filter(|call| matches!(call, SimulatedCall::Swap { .. }))
        .count()
}

#[tokio::test]
async fn test_empty_hook_data_keeps_usdc_in_custody() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);

    let outcome = receiver
        .receive_usdc(&Bytes::new(), &message(), &attestation())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SettlementOutcome::Custodied {
            credited: U256::from(FIFTY_USDC)
        }
    );
    assert!(outcome.record().is_none());
    assert_eq!(chain.usdc_balance(chain.custody()), U256::from(FIFTY_USDC));
    assert_eq!(chain.calls(), vec![SimulatedCall::ReceiveMessage]);
    assert!(chain.is_message_consumed(&message()));
    assert_eq!(chain.journal_depth(), 0);
}

#[tokio::test]
async fn test_swap_and_stake_delivers_derivative() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);
    let hook_data = hook_for(FIFTY_USDC, RECIPIENT, 2);

    let outcome = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await
        .unwrap();

    let record = outcome.into_record().expect("hook should complete");
    assert_eq!(record.recipient(), RECIPIENT);
    assert_eq!(record.final_amount(), U256::from(100u64));
    assert_eq!(record.raw_hook_data(), &hook_data);

    let custody = chain.custody();
    assert_eq!(chain.derivative_balance(RECIPIENT), U256::from(100u64));
    assert_eq!(chain.derivative_balance(custody), U256::ZERO);
    assert_eq!(chain.usdc_balance(custody), U256::ZERO);
    assert_eq!(chain.native_balance(custody), U256::ZERO);
    assert_eq!(chain.usdc_balance(SIM_SWAP_VENUE), U256::from(FIFTY_USDC));
    assert!(!receiver.is_settling());
}

#[tokio::test]
async fn test_completed_record_emits_matching_event() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);
    let hook_data = hook_for(FIFTY_USDC, RECIPIENT, 2);

    let record = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await
        .unwrap()
        .into_record()
        .unwrap();

    let log = record.log_data();
    assert_eq!(log.topics()[0], SettlementCompleted::SIGNATURE_HASH);
    assert_eq!(log.topics()[1], RECIPIENT.into_word());
    assert_eq!(SettlementRecord::from_log_data(&log).unwrap(), record);
}

#[tokio::test]
async fn test_collaborator_call_order() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);

    receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await
        .unwrap();

    assert_eq!(
        chain.calls(),
        vec![
            SimulatedCall::ReceiveMessage,
            SimulatedCall::Approve {
                spender: SIM_SWAP_VENUE,
                amount: U256::from(FIFTY_USDC),
            },
            SimulatedCall::Swap {
                amount_in: U256::from(FIFTY_USDC),
                amount_out_min: U256::ZERO,
            },
            SimulatedCall::Submit {
                amount: U256::from(100_000_000u64),
            },
            SimulatedCall::Transfer {
                token: SIM_STAKING,
                to: RECIPIENT,
                amount: U256::from(100u64),
            },
        ]
    );
}

#[tokio::test]
async fn test_existing_custody_balances_are_not_delivered() {
    let chain = funded_chain();
    let custody = chain.custody();
    chain.mint_derivative(custody, U256::from(500u64));
    chain.set_native_balance(custody, U256::from(7u64));
    let receiver = default_receiver(&chain);

    let record = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await
        .unwrap()
        .into_record()
        .unwrap();

    assert_eq!(record.final_amount(), U256::from(100u64));
    assert_eq!(chain.derivative_balance(custody), U256::from(500u64));
    assert_eq!(chain.native_balance(custody), U256::from(7u64));
}

#[tokio::test]
async fn test_stake_failure_reverts_everything() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Stake);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(
        matches!(
            result,
            Err(ReceiverError::HookExecutionFailed {
                stage: HookStage::Stake,
                ..
            })
        ),
        "Expected stake failure, got {result:?}"
    );
    assert_eq!(swap_count(&chain), 1, "swap ran before the failure");
    assert_untouched(&chain);
    assert_eq!(chain.usdc_balance(SIM_SWAP_VENUE), U256::ZERO);
    assert!(!receiver.is_settling());
}

#[tokio::test]
async fn test_failed_settlement_can_be_retried() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Swap);
    let receiver = default_receiver(&chain);
    let hook_data = hook_for(FIFTY_USDC, RECIPIENT, 2);

    let first = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await;
    assert!(matches!(
        first,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Swap,
            ..
        })
    ));
    assert_untouched(&chain);

    chain.clear_failures();
    let second = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await
        .unwrap();

    assert_eq!(
        second.record().map(SettlementRecord::final_amount),
        Some(U256::from(100u64))
    );
}

#[tokio::test]
async fn test_delivery_failure_reported_as_deliver_stage() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Transfer);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Deliver,
            ..
        })
    ));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_zero_derivative_minted_fails() {
    let chain = funded_chain();
    chain.set_stake_rate(0, 1);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Stake,
            ..
        })
    ));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_zero_swap_proceeds_fails() {
    let chain = funded_chain();
    chain.set_swap_rate(0, 1);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Swap,
            ..
        })
    ));
    let submitted = chain
        .calls()
        .iter()
        .any(|call| matches!(call, SimulatedCall::Submit { .. }));
    assert!(!submitted, "nothing should be staked");
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_rejected_attestation_fails_verification() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(
            &hook_for(FIFTY_USDC, RECIPIENT, 2),
            &message(),
            &Bytes::from_static(b"forged"),
        )
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::VerificationFailed { .. })
    ));
    assert_eq!(swap_count(&chain), 0);
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_verifier_error_fails_verification() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Verify);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&Bytes::new(), &message(), &attestation())
        .await;

    match result {
        Err(ReceiverError::VerificationFailed { reason }) => {
            assert!(reason.contains("simulated Verify failure"), "reason: {reason}");
        }
        other => panic!("Expected VerificationFailed, got {other:?}"),
    }
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_replayed_message_fails_verification() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);

    receiver
        .receive_usdc(&Bytes::new(), &message(), &attestation())
        .await
        .unwrap();
    let replay = receiver
        .receive_usdc(&Bytes::new(), &message(), &attestation())
        .await;

    assert!(matches!(
        replay,
        Err(ReceiverError::VerificationFailed { .. })
    ));
    assert_eq!(chain.usdc_balance(chain.custody()), U256::from(FIFTY_USDC));
}

#[tokio::test]
async fn test_truncated_hook_data_reverts_mint() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);
    let mut hook_data = hook_for(FIFTY_USDC, RECIPIENT, 2).to_vec();
    hook_data.pop();

    let result = receiver
        .receive_usdc(&Bytes::from(hook_data), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::MalformedPayload {
            expected: 56,
            actual: 55
        })
    ));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_zero_amount_hook_rejected() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);
    let hook_data = Bytes::from((U256::ZERO, RECIPIENT, 2u32).abi_encode_packed());

    let result = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await;

    assert!(matches!(result, Err(ReceiverError::InvalidAmount)));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_zero_recipient_hook_rejected() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);
    let hook_data =
        Bytes::from((U256::from(FIFTY_USDC), Address::ZERO, 2u32).abi_encode_packed());

    let result = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await;

    assert!(matches!(result, Err(ReceiverError::InvalidRecipient)));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_hook_amount_above_credit_fails_swap() {
    let chain = funded_chain();
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC + 1, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Swap,
            ..
        })
    ));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_min_output_floor_enforced() {
    let chain = funded_chain();
    let floor = U256::from(200_000_000u64);
    let config =
        HookConfig::new(chain.swap_path()).with_min_output(MinOutputPolicy::Absolute(floor));
    let receiver = create_receiver(&chain, config);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::HookExecutionFailed {
            stage: HookStage::Swap,
            ..
        })
    ));
    assert!(chain.calls().contains(&SimulatedCall::Swap {
        amount_in: U256::from(FIFTY_USDC),
        amount_out_min: floor,
    }));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_min_output_floor_met() {
    let chain = funded_chain();
    let config = HookConfig::new(chain.swap_path())
        .with_min_output(MinOutputPolicy::Absolute(U256::from(100_000_000u64)));
    let receiver = create_receiver(&chain, config);

    let outcome = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await
        .unwrap();

    assert!(matches!(outcome, SettlementOutcome::Completed(_)));
}

#[tokio::test]
async fn test_abi_encoded_hook_data() {
    let chain = funded_chain();
    let config = HookConfig::new(chain.swap_path()).with_encoding(HookEncoding::Abi);
    let receiver = create_receiver(&chain, config);

    let hook_data = receiver
        .build_hook_data(U256::from(FIFTY_USDC), RECIPIENT, 2)
        .unwrap();
    assert_eq!(hook_data.len(), HookPayload::ABI_SIZE);

    let record = receiver
        .receive_usdc(&hook_data, &message(), &attestation())
        .await
        .unwrap()
        .into_record()
        .unwrap();

    assert_eq!(record.recipient(), RECIPIENT);
    assert_eq!(chain.derivative_balance(RECIPIENT), U256::from(100u64));
}

#[tokio::test]
async fn test_packed_hook_data_rejected_under_abi_encoding() {
    let chain = funded_chain();
    let config = HookConfig::new(chain.swap_path()).with_encoding(HookEncoding::Abi);
    let receiver = create_receiver(&chain, config);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(
        result,
        Err(ReceiverError::MalformedPayload {
            expected: 96,
            actual: 56
        })
    ));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_unusable_swap_path_rejected() {
    let chain = funded_chain();
    let config = HookConfig::new(vec![chain.swap_path()[1]]);
    let receiver = create_receiver(&chain, config);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(result, Err(ReceiverError::InvalidConfig(_))));
    assert_untouched(&chain);
}

#[tokio::test]
async fn test_existing_allowance_is_reused() {
    let chain = funded_chain();
    let custody = chain.custody();
    chain
        .usdc()
        .approve(custody, SIM_SWAP_VENUE, U256::MAX)
        .await
        .unwrap();
    let receiver = default_receiver(&chain);
    let approvals_before = chain.calls().len();

    receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await
        .unwrap();

    let approvals = chain.calls()[approvals_before..]
        .iter()
        .filter(|call| matches!(call, SimulatedCall::Approve { .. }))
        .count();
    assert_eq!(approvals, 0);
    assert_eq!(
        chain.usdc_allowance(custody, SIM_SWAP_VENUE),
        U256::MAX - U256::from(FIFTY_USDC)
    );
}

#[tokio::test]
async fn test_checkpoint_failure_touches_nothing() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Checkpoint);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    assert!(matches!(result, Err(ReceiverError::Journal(_))));
    assert!(chain.calls().is_empty());
    assert!(!receiver.is_settling());
}

#[tokio::test]
async fn test_revert_failure_reports_both_errors() {
    let chain = funded_chain();
    chain.fail_at(FailurePoint::Swap);
    chain.fail_at(FailurePoint::Revert);
    let receiver = default_receiver(&chain);

    let result = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await;

    match result {
        Err(ReceiverError::Journal(message)) => {
            assert!(message.contains("hook execution failed at swap"), "{message}");
            assert!(message.contains("simulated revert failure"), "{message}");
        }
        other => panic!("Expected Journal error, got {other:?}"),
    }
}

/// Swap venue behaviour that calls back into the receiver mid-swap.
struct ReentrantSwap {
    receiver: Arc<TestReceiver>,
    inner_errors: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl SwapCallback for ReentrantSwap {
    async fn on_swap(&self) {
        let result = self
            .receiver
            .receive_usdc(&Bytes::new(), &message(), &attestation())
            .await;
        if let Err(e) = result {
            self.inner_errors.lock().unwrap().push(e.kind());
        }
    }
}

#[tokio::test]
async fn test_reentrant_settlement_refused() {
    let chain = funded_chain();
    let receiver = Arc::new(default_receiver(&chain));
    let inner_errors = Arc::new(Mutex::new(Vec::new()));
    chain.set_swap_callback(Arc::new(ReentrantSwap {
        receiver: receiver.clone(),
        inner_errors: inner_errors.clone(),
    }));

    let outcome = receiver
        .receive_usdc(&hook_for(FIFTY_USDC, RECIPIENT, 2), &message(), &attestation())
        .await
        .unwrap();

    assert_eq!(*inner_errors.lock().unwrap(), vec!["Reentrancy"]);
    assert_eq!(
        outcome.record().map(SettlementRecord::final_amount),
        Some(U256::from(100u64))
    );
    assert!(!receiver.is_settling());
}

#[test]
fn test_build_hook_data_layout() {
    let recipient = address!("00000000000000000000000000000000000000aa");
    let hook_data = hook_for(1_000_000_000, recipient, 3);

    let expected = hex!(
        "000000000000000000000000000000000000000000000000000000003b9aca00"
        "00000000000000000000000000000000000000aa"
        "00000003"
    );
    assert_eq!(hook_data.as_ref(), expected.as_slice());
}

#[test]
fn test_build_hook_data_validates_fields() {
    assert!(matches!(
        build_hook_data(U256::ZERO, RECIPIENT, 3),
        Err(ReceiverError::InvalidAmount)
    ));
    assert!(matches!(
        build_hook_data(U256::from(1u64), Address::ZERO, 3),
        Err(ReceiverError::InvalidRecipient)
    ));
}
