//! Core traits for the SOLIDserver provider
//!
//! This module defines the seams between the generic adapter and its
//! collaborators.
//!
//! - [`Transport`]: Execute one REST call against the appliance
//! - [`Resource`]: Lifecycle of one managed object type
//! - [`StateStore`]: Persistent local state

pub mod resource;
pub mod state_store;
pub mod transport;

pub use resource::Resource;
pub use state_store::{StateRecord, StateStore};
pub use transport::Transport;
