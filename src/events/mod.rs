//! Event bus
//!
//! Carries the two events the client emits: structured errors for the UI's
//! dialog layer, and the logout signal that external collaborators react to
//! by clearing storage and navigating.

mod bus;

pub use bus::EventBus;
