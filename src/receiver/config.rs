use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::str::FromStr;

use crate::chain::ReceiverDeployment;
use crate::error::{ReceiverError, Result};
use crate::protocol::HookEncoding;

/// Environment variable selecting the hook data layout (`packed` or `abi`)
pub const ENV_ENCODING: &str = "CCTP_HOOK_ENCODING";
/// Environment variable setting an absolute swap output floor
pub const ENV_MIN_AMOUNT_OUT: &str = "CCTP_HOOK_MIN_AMOUNT_OUT";
/// Environment variable setting the swap deadline offset in seconds
pub const ENV_SWAP_DEADLINE_SECS: &str = "CCTP_HOOK_SWAP_DEADLINE_SECS";
/// Environment variable setting the staking referral address
pub const ENV_REFERRAL: &str = "CCTP_HOOK_REFERRAL";

/// Default offset added to the host timestamp to form the swap deadline
pub const DEFAULT_SWAP_DEADLINE_SECS: u64 = 300;

/// Minimum-output protection applied to the swap step.
///
/// No floor is inferred. Without an explicit policy the venue's own behavior
/// decides what output is acceptable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MinOutputPolicy {
    /// Accept whatever the venue returns
    #[default]
    Unprotected,
    /// Require at least this much native asset from the swap
    Absolute(U256),
}

impl MinOutputPolicy {
    /// The floor passed to the venue and enforced on measured proceeds
    pub fn floor(&self) -> U256 {
        match self {
            Self::Unprotected => U256::ZERO,
            Self::Absolute(min) => *min,
        }
    }
}

/// Configuration for hook execution.
///
/// # Examples
///
/// ```rust
/// use cctp_hook_receiver::{HookConfig, MinOutputPolicy};
/// use alloy_chains::NamedChain;
/// use alloy_primitives::U256;
///
/// // USDC -> WETH on Ethereum mainnet, no output floor
/// let config = HookConfig::for_chain(NamedChain::Mainnet).unwrap();
///
/// // With a floor of 0.01 ETH
/// let config = config.with_min_output(MinOutputPolicy::Absolute(U256::from(10u64).pow(U256::from(16u64))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Swap route, starting with the custody token
    pub swap_path: Vec<Address>,
    /// Hook data layout accepted by `receive_usdc`
    pub encoding: HookEncoding,
    pub min_output: MinOutputPolicy,
    /// Seconds added to the host timestamp to form the swap deadline
    pub swap_deadline_secs: u64,
    /// Referral passed to the staking protocol
    pub referral: Address,
}

impl HookConfig {
    /// Creates a configuration swapping along `swap_path` with defaults for
    /// everything else.
    pub fn new(swap_path: Vec<Address>) -> Self {
        Self {
            swap_path,
            encoding: HookEncoding::default(),
            min_output: MinOutputPolicy::default(),
            swap_deadline_secs: DEFAULT_SWAP_DEADLINE_SECS,
            referral: Address::ZERO,
        }
    }

    /// Creates the default USDC -> wrapped native route for a supported chain.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::ChainNotSupported`] if no deployment is known.
    pub fn for_chain(chain: NamedChain) -> Result<Self> {
        let deployment = ReceiverDeployment::for_chain(chain)?;
        Ok(Self::new(vec![deployment.usdc, deployment.wrapped_native]))
    }

    pub fn with_encoding(mut self, encoding: HookEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_min_output(mut self, policy: MinOutputPolicy) -> Self {
        self.min_output = policy;
        self
    }

    pub fn with_swap_deadline_secs(mut self, secs: u64) -> Self {
        self.swap_deadline_secs = secs;
        self
    }

    pub fn with_referral(mut self, referral: Address) -> Self {
        self.referral = referral;
        self
    }

    /// Overlays settings from the environment, loading `.env` if present.
    ///
    /// Unset variables leave the current value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::InvalidConfig`] if a variable is set but cannot
    /// be parsed.
    pub fn from_env(self) -> Result<Self> {
        self.overlay(|key| match dotenvy::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
            Err(e) => Err(ReceiverError::InvalidConfig(format!("{key}: {e}"))),
        })
    }

    fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        if let Some(value) = lookup(ENV_ENCODING)? {
            self.encoding = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MIN_AMOUNT_OUT)? {
            let min = U256::from_str(value.trim()).map_err(|e| {
                ReceiverError::InvalidConfig(format!("{ENV_MIN_AMOUNT_OUT}: {e}"))
            })?;
            self.min_output = if min.is_zero() {
                MinOutputPolicy::Unprotected
            } else {
                MinOutputPolicy::Absolute(min)
            };
        }
        if let Some(value) = lookup(ENV_SWAP_DEADLINE_SECS)? {
            self.swap_deadline_secs = value.trim().parse().map_err(|e| {
                ReceiverError::InvalidConfig(format!("{ENV_SWAP_DEADLINE_SECS}: {e}"))
            })?;
        }
        if let Some(value) = lookup(ENV_REFERRAL)? {
            self.referral = Address::from_str(value.trim())
                .map_err(|e| ReceiverError::InvalidConfig(format!("{ENV_REFERRAL}: {e}")))?;
        }
        Ok(self)
    }

    /// Checks the configuration can drive a hook.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::InvalidConfig`] if the swap path has fewer than
    /// two hops or does not start with `custody_token`.
    pub fn validate(&self, custody_token: Address) -> Result<()> {
        if self.swap_path.len() < 2 {
            return Err(ReceiverError::InvalidConfig(format!(
                "swap path needs at least 2 tokens, got {}",
                self.swap_path.len()
            )));
        }
        if self.swap_path[0] != custody_token {
            return Err(ReceiverError::InvalidConfig(format!(
                "swap path starts at {} but custody token is {custody_token}",
                self.swap_path[0]
            )));
        }
        Ok(())
    }
}
