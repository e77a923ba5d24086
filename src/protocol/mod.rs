//! Hook payload and settlement record types
//!
//! This module contains the wire-level types the receiver works with: the
//! hook data codec, the settlement record and its EVM event, and known CCTP
//! domain identifiers.

mod domain_id;
mod hook_data;
mod record;

pub use domain_id::DomainId;
pub use hook_data::{build_hook_data, HookEncoding, HookPayload};
pub use record::{SettlementCompleted, SettlementOutcome, SettlementRecord};
