//! Production implementations of the collaborator traits.
//!
//! This module provides the implementations of the traits defined in
//! [`crate::traits`] that talk to a real node through Alloy. Test code uses
//! [`crate::testing::SimulatedChain`] instead.

mod alloy;

pub use self::alloy::{
    AlloyHost, AlloyMessageVerifier, AlloyReceiver, AlloyStaking, AlloySwapVenue, AlloyToken,
};
