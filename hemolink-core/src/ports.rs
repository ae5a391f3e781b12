//! Traits describing backend capabilities and shared request types.

use async_trait::async_trait;
use chrono::{NaiveDate, ParseError as ChronoParseError};
use reqwest::Error as ReqwestError;

use crate::model::{
    Appointment, AppointmentId, BloodType, Donation, Donor, Hospital, HospitalId,
};
use crate::session::Session;
use crate::slots::TimeSlot;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the platform backend.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Failed to parse a date or time from the backend response.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// Response payload was nested under none of the known envelope keys.
    #[error("Unrecognized response shape: {0}")]
    UnrecognizedShape(String),
    /// Credentials were rejected or the session token is no longer valid.
    #[error("Not authenticated")]
    Unauthorized,
    /// Requested resource does not exist upstream.
    #[error("Not found")]
    NotFound,
    /// Hospital identifier is invalid for the provider.
    #[error("Invalid hospital id")]
    InvalidHospitalId,
    /// The requested slot was booked by someone else first.
    #[error("Slot no longer available")]
    SlotTaken,
    /// Backend rejected the request payload.
    #[error("Rejected by backend: {0}")]
    Rejected(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
/// Query parameters for searching hospitals.
pub struct HospitalSearch {
    /// Hospital name fragment to look up.
    pub name: String,
    /// Optional city filter.
    pub city: Option<String>,
}

impl HospitalSearch {
    /// Construct a new search query.
    #[must_use]
    pub fn new<N: Into<String>, C: Into<String>>(name: N, city: Option<C>) -> Self {
        Self {
            name: name.into(),
            city: city.map(Into::into),
        }
    }

    /// Check if the search query is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self
                .city
                .as_deref()
                .is_none_or(|city| city.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
/// Credentials for signing a donor in.
pub struct Credentials {
    /// Registered email address.
    pub email: String,
    /// Account password, sent once over TLS and never stored.
    pub password: String,
}

#[derive(Debug, Clone)]
/// Payload for registering a new donor account.
pub struct NewDonor {
    /// Full name.
    pub name: String,
    /// Sign-in email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Declared blood group.
    pub blood_type: BloodType,
    /// Optional contact phone number.
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
/// Payload for booking a slot at a hospital.
pub struct AppointmentRequest {
    /// Hospital to book at.
    pub hospital_id: HospitalId,
    /// Calendar date of the appointment.
    pub date: NaiveDate,
    /// Chosen slot start.
    pub slot: TimeSlot,
}

#[async_trait]
/// Trait for the hospital directory backend.
pub trait DirectoryPort: Send + Sync {
    /// Search hospitals by name fragment and optional city.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the directory request fails.
    async fn search(
        &self,
        query: &HospitalSearch,
        limit: usize,
    ) -> Result<Vec<Hospital>, PortError>;
}

#[async_trait]
/// Trait for donor registration and sign-in.
pub trait AuthPort: Send + Sync {
    /// Create a donor account.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend rejects the registration or
    /// the request fails.
    async fn register(&self, donor: &NewDonor) -> Result<Donor, PortError>;

    /// Exchange credentials for a [`Session`].
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unauthorized`] for bad credentials, or another
    /// [`PortError`] when the request fails.
    async fn login(&self, credentials: &Credentials) -> Result<Session, PortError>;
}

#[async_trait]
/// Trait for booking and reviewing donation appointments.
pub trait AppointmentPort: Send + Sync {
    /// Book a slot for the signed-in donor.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::SlotTaken`] when someone else booked the slot
    /// first, [`PortError::Unauthorized`] when the session expired, or
    /// another [`PortError`] when the request fails.
    async fn book(
        &self,
        session: &Session,
        request: &AppointmentRequest,
    ) -> Result<Appointment, PortError>;

    /// List the signed-in donor's appointments, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the session expired.
    async fn appointments(&self, session: &Session) -> Result<Vec<Appointment>, PortError>;

    /// Cancel one of the signed-in donor's appointments.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotFound`] for an unknown appointment, or another
    /// [`PortError`] when the request fails or the session expired.
    async fn cancel(
        &self,
        session: &Session,
        appointment: &AppointmentId,
    ) -> Result<(), PortError>;
}

#[async_trait]
/// Trait for the donor's donation history.
pub trait DonationPort: Send + Sync {
    /// List the signed-in donor's completed donations, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the session expired.
    async fn donations(&self, session: &Session) -> Result<Vec<Donation>, PortError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::HospitalSearch;

    #[test]
    fn blank_query_is_empty() {
        assert!(HospitalSearch::new("  ", None::<String>).is_empty());
        assert!(HospitalSearch::new("", Some("  ")).is_empty());
    }

    #[test]
    fn city_only_query_is_not_empty() {
        let query = HospitalSearch::new("", Some("Recife"));
        assert!(!query.is_empty());
        assert_eq!(query.city.as_deref(), Some("Recife"));
    }
}
