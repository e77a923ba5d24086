//! Settlement audit record
//!
//! A [`SettlementRecord`] is produced once per settlement that executed a hook,
//! after every external effect has committed. It maps one-to-one onto the
//! `SettlementCompleted` EVM event so downstream indexers see the same shape
//! whether they read logs or the receiver's return value.

use alloy_primitives::{Address, Bytes, LogData, U256};
use alloy_sol_types::{sol, SolEvent};
use serde::{Deserialize, Serialize};

use crate::error::Result;

sol! {
    /// Emitted when a hook settlement delivers derivative tokens to its recipient.
    #[derive(Debug, PartialEq, Eq)]
    event SettlementCompleted(address indexed recipient, uint256 finalAmount, bytes hookData);
}

/// Immutable record of a completed hook settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    recipient: Address,
    final_amount: U256,
    raw_hook_data: Bytes,
}

impl SettlementRecord {
    pub(crate) fn new(recipient: Address, final_amount: U256, raw_hook_data: Bytes) -> Self {
        Self {
            recipient,
            final_amount,
            raw_hook_data,
        }
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    /// Derivative tokens delivered, measured as the custody balance delta
    pub fn final_amount(&self) -> U256 {
        self.final_amount
    }

    /// The hook data exactly as received
    pub fn raw_hook_data(&self) -> &Bytes {
        &self.raw_hook_data
    }

    pub fn to_event(&self) -> SettlementCompleted {
        SettlementCompleted {
            recipient: self.recipient,
            finalAmount: self.final_amount,
            hookData: self.raw_hook_data.clone(),
        }
    }

    /// Topics and data of the `SettlementCompleted` log
    pub fn log_data(&self) -> LogData {
        self.to_event().encode_log_data()
    }

    /// Reconstructs a record from a `SettlementCompleted` log.
    pub fn from_log_data(log: &LogData) -> Result<Self> {
        let event = SettlementCompleted::decode_log_data(log)?;
        Ok(Self::new(event.recipient, event.finalAmount, event.hookData))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What a call to `receive_usdc` accomplished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// No hook data: the minted USDC stays in custody
    Custodied {
        /// Custody token balance delta observed across verification
        credited: U256,
    },
    /// Hook executed and a record was emitted
    Completed(SettlementRecord),
}

impl SettlementOutcome {
    pub fn record(&self) -> Option<&SettlementRecord> {
        match self {
            Self::Completed(record) => Some(record),
            Self::Custodied { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<SettlementRecord> {
        match self {
            Self::Completed(record) => Some(record),
            Self::Custodied { .. } => None,
        }
    }
}
