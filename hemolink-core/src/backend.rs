//! Bundle of port implementations for the platform backend.

use std::sync::Arc;

use crate::ports::{AppointmentPort, AuthPort, DirectoryPort, DonationPort};

#[derive(Debug, Clone)]
/// Static metadata describing a backend.
pub struct BackendMeta {
    /// Unique identifier (slug).
    pub id: String,
    /// Human-friendly display name.
    pub name: String,
}

/// Collection of ports implementing a single platform backend.
///
/// Providers construct one of these from a shared HTTP client; the service
/// facade only ever talks to the trait objects.
pub struct Backend {
    /// Static metadata describing the backend.
    pub meta: BackendMeta,
    /// Implementation for searching hospitals.
    pub directory: Arc<dyn DirectoryPort>,
    /// Implementation for registration and sign-in.
    pub auth: Arc<dyn AuthPort>,
    /// Implementation for booking and reviewing appointments.
    pub appointments: Arc<dyn AppointmentPort>,
    /// Implementation for the donation history.
    pub donations: Arc<dyn DonationPort>,
}
