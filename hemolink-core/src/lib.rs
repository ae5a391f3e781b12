//! Core types and service wiring for the hemolink blood-donation scheduling client.

/// Bundle of port implementations for a platform backend.
pub mod backend;
/// Domain models and identifiers shared by all backends.
pub mod model;
/// Traits describing the backend interfaces.
pub mod ports;
/// Authentication context for signed-in donors.
pub mod session;
/// High-level service facade used by clients.
pub mod service;
/// Bookable time-slot computation from operating hours.
pub mod slots;

pub use backend::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use session::*;
pub use slots::*;
