//! Known CCTP source domains
//!
//! Hook payloads carry the source domain as a raw `uint32` and the receiver
//! never rejects a value on that basis; domain legitimacy is the message
//! transmitter's concern. This type only gives known domains a readable name
//! in logs and audit output.
//!
//! Reference: <https://developers.circle.com/stablecoins/supported-domains>

use std::fmt;

/// CCTP domain identifier of a supported network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    Ethereum = 0,
    Avalanche = 1,
    Optimism = 2,
    Arbitrum = 3,
    Noble = 4,
    Solana = 5,
    Base = 6,
    Polygon = 7,
    Sui = 8,
    Aptos = 9,
    Unichain = 10,
    Linea = 11,
    Sonic = 13,
    WorldChain = 14,
}

impl DomainId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Looks up a known domain, returning `None` for anything unrecognised.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cctp_hook_receiver::DomainId;
    ///
    /// assert_eq!(DomainId::from_u32(2), Some(DomainId::Optimism));
    /// assert_eq!(DomainId::from_u32(12), None);
    /// ```
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            4 => Some(Self::Noble),
            5 => Some(Self::Solana),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            8 => Some(Self::Sui),
            9 => Some(Self::Aptos),
            10 => Some(Self::Unichain),
            11 => Some(Self::Linea),
            13 => Some(Self::Sonic),
            14 => Some(Self::WorldChain),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Noble => "Noble",
            Self::Solana => "Solana",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Sui => "Sui",
            Self::Aptos => "Aptos",
            Self::Unichain => "Unichain",
            Self::Linea => "Linea",
            Self::Sonic => "Sonic",
            Self::WorldChain => "World Chain",
        }
    }

    /// Renders a raw domain value, naming it when it is known.
    pub fn describe(value: u32) -> String {
        match Self::from_u32(value) {
            Some(domain) => domain.to_string(),
            None => format!("unknown ({value})"),
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}
