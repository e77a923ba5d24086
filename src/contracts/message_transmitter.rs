//! MessageTransmitter contract bindings
//!
//! The destination-side CCTP contract that checks Circle's attestation over a
//! message and mints the burned USDC to the message's mint recipient.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use MessageTransmitter::MessageTransmitterInstance;

/// The CCTP Message Transmitter contract wrapper
pub struct MessageTransmitterContract<P: Provider<Ethereum>> {
    instance: MessageTransmitterInstance<P>,
}

impl<P: Provider<Ethereum>> MessageTransmitterContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "message_transmitter_contract_initialized"
        );
        Self {
            instance: MessageTransmitterInstance::new(address, provider),
        }
    }

    /// Simulates `receiveMessage` from `caller` and returns the contract's verdict.
    ///
    /// A reverting call surfaces as an error rather than `false`.
    pub async fn receive_message_call(
        &self,
        message: Bytes,
        attestation: Bytes,
        caller: Address,
    ) -> Result<bool, alloy_contract::Error> {
        let accepted = self
            .instance
            .receiveMessage(message, attestation)
            .from(caller)
            .call()
            .await?;

        debug!(
            caller = %caller,
            accepted = accepted,
            contract_address = %self.instance.address(),
            event = "receive_message_simulated"
        );

        Ok(accepted)
    }

    /// Builds the `receiveMessage(message, attestation)` transaction sent from `caller`.
    ///
    /// # Arguments
    ///
    /// * `message` - The message bytes from the source chain
    /// * `attestation` - Circle's attestation signature for the message
    /// * `caller` - Address submitting the transaction
    pub fn receive_message_transaction(
        &self,
        message: Bytes,
        attestation: Bytes,
        caller: Address,
    ) -> TransactionRequest {
        info!(
            message_len = message.len(),
            attestation_len = attestation.len(),
            caller = %caller,
            contract_address = %self.instance.address(),
            event = "receive_message_transaction_created"
        );

        self.instance
            .receiveMessage(message, attestation)
            .from(caller)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MessageTransmitter {
        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
    }
);
