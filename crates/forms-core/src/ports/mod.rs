//! Ports module (Hexagonal Architecture)
//!
//! Interfaces the form service needs from the outside world.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
