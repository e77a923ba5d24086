use std::fmt;

use thiserror::Error;

/// The step of hook execution that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Reading a token or derivative balance
    BalanceQuery,
    /// Granting the swap venue an allowance over custody
    Approve,
    /// Exchanging custody tokens for the staking base asset
    Swap,
    /// Submitting swap proceeds to the staking protocol
    Stake,
    /// Transferring derivative tokens to the hook recipient
    Deliver,
}

impl HookStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceQuery => "balance_query",
            Self::Approve => "approve",
            Self::Swap => "swap",
            Self::Stake => "stake",
            Self::Deliver => "deliver",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("invalid recipient address")]
    InvalidRecipient,

    #[error("malformed hook payload: expected {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },

    #[error("attestation verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("hook execution failed at {stage}: {reason}")]
    HookExecutionFailed { stage: HookStage, reason: String },

    #[error("settlement already in progress")]
    Reentrancy,

    #[error("state journal error: {0}")]
    Journal(String),

    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReceiverError {
    /// Variant name, used as the `error.type` span attribute
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "InvalidAmount",
            Self::InvalidRecipient => "InvalidRecipient",
            Self::MalformedPayload { .. } => "MalformedPayload",
            Self::VerificationFailed { .. } => "VerificationFailed",
            Self::HookExecutionFailed { .. } => "HookExecutionFailed",
            Self::Reentrancy => "Reentrancy",
            Self::Journal(_) => "Journal",
            Self::ChainNotSupported { .. } => "ChainNotSupported",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::ContractCall(_) => "ContractCall",
            Self::Provider(_) => "Provider",
            Self::Rpc(_) => "Rpc",
            Self::Abi(_) => "Abi",
            Self::Json(_) => "Json",
        }
    }

    pub(crate) fn hook(stage: HookStage, reason: impl fmt::Display) -> Self {
        Self::HookExecutionFailed {
            stage,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReceiverError>;
