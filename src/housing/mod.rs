//! Houses and the flats inside them.
//!
//! - [`houses`] - house registration
//! - [`flats`] - flat creation, moderation transitions and role-filtered listing

pub mod flats;
pub mod houses;

pub use flats::{visible_statuses, FlatStatusMachine};
pub use houses::HouseService;
