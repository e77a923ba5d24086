//! Hook data codec
//!
//! Hook data is the instruction payload a sender attaches to a CCTP transfer to
//! describe what the receiver does with the minted USDC. It carries three
//! scalars in a fixed order:
//!
//! - amount: uint256 - USDC to swap and stake, in 6-decimal atomic units
//! - recipient: address - account that receives the staking derivative
//! - sourceDomain: uint32 - CCTP domain the transfer originated from
//!
//! Two byte layouts are supported. [`HookEncoding::Packed`] is the canonical
//! one and matches Solidity `abi.encodePacked(uint256, address, uint32)`.
//! [`HookEncoding::Abi`] matches `abi.encode(uint256, address, uint32)` for
//! senders that build hook data with the standard ABI encoder.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainId;
use crate::error::{ReceiverError, Result};

/// Byte layout used for hook data on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEncoding {
    /// Tightly packed fields, 56 bytes
    #[default]
    Packed,
    /// Word-aligned ABI fields, 96 bytes
    Abi,
}

impl HookEncoding {
    /// Exact payload length for this layout
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Packed => HookPayload::PACKED_SIZE,
            Self::Abi => HookPayload::ABI_SIZE,
        }
    }
}

impl FromStr for HookEncoding {
    type Err = ReceiverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "packed" => Ok(Self::Packed),
            "abi" => Ok(Self::Abi),
            other => Err(ReceiverError::InvalidConfig(format!(
                "unknown hook encoding '{other}', expected 'packed' or 'abi'"
            ))),
        }
    }
}

impl fmt::Display for HookEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packed => f.write_str("packed"),
            Self::Abi => f.write_str("abi"),
        }
    }
}

/// Decoded hook instruction
///
/// Construct with [`HookPayload::new`] to get a validated payload, or with
/// [`HookPayload::decode`] to reconstruct one from bytes. Decoding does not
/// validate; callers run [`HookPayload::validate`] before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookPayload {
    amount: U256,
    recipient: Address,
    source_domain: u32,
}

impl HookPayload {
    /// Packed layout size: 32 + 20 + 4
    pub const PACKED_SIZE: usize = 56;

    /// ABI layout size: three 32-byte words
    pub const ABI_SIZE: usize = 96;

    /// Creates a payload, rejecting a zero amount or zero recipient.
    pub fn new(amount: U256, recipient: Address, source_domain: u32) -> Result<Self> {
        let payload = Self {
            amount,
            recipient,
            source_domain,
        };
        payload.validate()?;
        Ok(payload)
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn source_domain(&self) -> u32 {
        self.source_domain
    }

    /// The source domain as a known CCTP domain, if it is one.
    ///
    /// Source domains are never range-checked; this is for diagnostics.
    pub fn known_source_domain(&self) -> Option<DomainId> {
        DomainId::from_u32(self.source_domain)
    }

    /// Checks the payload invariants.
    ///
    /// # Errors
    ///
    /// - [`ReceiverError::InvalidAmount`] if `amount` is zero
    /// - [`ReceiverError::InvalidRecipient`] if `recipient` is the zero address
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_zero() {
            return Err(ReceiverError::InvalidAmount);
        }
        if self.recipient == Address::ZERO {
            return Err(ReceiverError::InvalidRecipient);
        }
        Ok(())
    }

    /// Encodes to the packed layout.
    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::PACKED_SIZE);

        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(&self.source_domain.to_be_bytes());

        Bytes::from(bytes)
    }

    /// Encodes to the word-aligned ABI layout.
    pub fn abi_encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::ABI_SIZE);

        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        // address is left-padded to a full word
        bytes.extend_from_slice(&[0u8; 12]);
        bytes.extend_from_slice(self.recipient.as_slice());
        // uint32 is left-padded to a full word
        bytes.extend_from_slice(&[0u8; 28]);
        bytes.extend_from_slice(&self.source_domain.to_be_bytes());

        Bytes::from(bytes)
    }

    /// Encodes with the given layout.
    pub fn encode_with(&self, encoding: HookEncoding) -> Bytes {
        match encoding {
            HookEncoding::Packed => self.encode(),
            HookEncoding::Abi => self.abi_encode(),
        }
    }

    /// Decodes the packed layout.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::MalformedPayload`] unless `bytes` is exactly
    /// [`HookPayload::PACKED_SIZE`] long.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::PACKED_SIZE {
            return Err(ReceiverError::MalformedPayload {
                expected: Self::PACKED_SIZE,
                actual: bytes.len(),
            });
        }

        let amount = U256::from_be_slice(&bytes[0..32]);
        let recipient = Address::from_slice(&bytes[32..52]);
        let source_domain = u32::from_be_bytes([bytes[52], bytes[53], bytes[54], bytes[55]]);

        Ok(Self {
            amount,
            recipient,
            source_domain,
        })
    }

    /// Decodes the word-aligned ABI layout.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::MalformedPayload`] unless `bytes` is exactly
    /// [`HookPayload::ABI_SIZE`] long with zeroed padding in the address and
    /// uint32 words.
    pub fn decode_abi(bytes: &[u8]) -> Result<Self> {
        let malformed = ReceiverError::MalformedPayload {
            expected: Self::ABI_SIZE,
            actual: bytes.len(),
        };
        if bytes.len() != Self::ABI_SIZE {
            return Err(malformed);
        }
        if bytes[32..44].iter().chain(&bytes[64..92]).any(|b| *b != 0) {
            return Err(malformed);
        }

        let amount = U256::from_be_slice(&bytes[0..32]);
        let recipient = Address::from_slice(&bytes[44..64]);
        let source_domain = u32::from_be_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);

        Ok(Self {
            amount,
            recipient,
            source_domain,
        })
    }

    /// Decodes with the given layout.
    pub fn decode_with(bytes: &[u8], encoding: HookEncoding) -> Result<Self> {
        match encoding {
            HookEncoding::Packed => Self::decode(bytes),
            HookEncoding::Abi => Self::decode_abi(bytes),
        }
    }
}

/// Validates the fields and encodes them as packed hook data.
///
/// This is what upstream senders call to build the payload they attach to a
/// burn before initiating a transfer.
///
/// # Example
///
/// ```rust
/// use cctp_hook_receiver::{build_hook_data, HookPayload};
/// use alloy_primitives::{address, U256};
///
/// let recipient = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
/// let hook_data = build_hook_data(U256::from(1_000_000_000u64), recipient, 3).unwrap();
///
/// let payload = HookPayload::decode(&hook_data).unwrap();
/// assert_eq!(payload.recipient(), recipient);
/// assert_eq!(payload.source_domain(), 3);
/// ```
pub fn build_hook_data(amount: U256, recipient: Address, source_domain: u32) -> Result<Bytes> {
    Ok(HookPayload::new(amount, recipient, source_domain)?.encode())
}
