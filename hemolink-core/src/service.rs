//! High-level service facade over the backend ports and the slot engine.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::backend::Backend;
use crate::model::{Appointment, AppointmentId, Donation, Donor, Hospital};
use crate::ports::{
    AppointmentRequest, Credentials, HospitalSearch, NewDonor, PortError,
};
use crate::session::Session;
use crate::slots::{self, SlotPolicy, TimeSlot};

/// Public entry point for directory search, scheduling, and account flows.
pub struct HemolinkService {
    backend: Arc<Backend>,
    policy: SlotPolicy,
}

impl HemolinkService {
    /// Create a new service bound to the provided backend, with the default
    /// slot policy.
    #[must_use]
    pub fn new(backend: Arc<Backend>) -> Self {
        Self::with_policy(backend, SlotPolicy::default())
    }

    /// Create a new service with a custom slot policy.
    #[must_use]
    pub fn with_policy(backend: Arc<Backend>, policy: SlotPolicy) -> Self {
        Self { backend, policy }
    }

    /// Display name of the backend this service talks to.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        &self.backend.meta.name
    }

    /// Search for hospitals matching the query.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the directory call fails.
    pub async fn search_hospitals(
        &self,
        query: HospitalSearch,
        limit: usize,
    ) -> Result<Vec<Hospital>, PortError> {
        self.backend.directory.search(&query, limit).await
    }

    /// Full-day slot sequence for `hospital`, before availability filtering.
    ///
    /// The UI renders these and disables the ones
    /// [`bookable_slots`](Self::bookable_slots) no longer returns for today.
    #[must_use]
    pub fn day_slots(&self, hospital: &Hospital) -> Vec<TimeSlot> {
        slots::day_slots(hospital.hours, &self.policy)
    }

    /// Bookable slots for `hospital` on `target`, given the current instant.
    ///
    /// Pure and infallible: unusable operating hours degrade to the policy
    /// fallback, and elapsed slots are dropped when `target` is the date of
    /// `now`. Safe to call on every redraw.
    #[must_use]
    pub fn bookable_slots(
        &self,
        hospital: &Hospital,
        target: NaiveDate,
        now: NaiveDateTime,
    ) -> Vec<TimeSlot> {
        slots::available_slots(hospital.hours, target, now, &self.policy)
    }

    /// Register a new donor account.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the backend rejects the registration or the
    /// request fails.
    pub async fn register(&self, donor: NewDonor) -> Result<Donor, PortError> {
        let created = self.backend.auth.register(&donor).await?;
        debug!(donor = %created.name, "registered donor");
        Ok(created)
    }

    /// Sign a donor in and return the session to pass to authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unauthorized`] for bad credentials, or another
    /// [`PortError`] when the request fails.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, PortError> {
        let session = self.backend.auth.login(&credentials).await?;
        debug!(donor = %session.donor_name, "signed in");
        Ok(session)
    }

    /// Book a slot for the signed-in donor.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::SlotTaken`] when the slot was booked by someone
    /// else first, or another [`PortError`] when the request fails.
    pub async fn book(
        &self,
        session: &Session,
        request: AppointmentRequest,
    ) -> Result<Appointment, PortError> {
        self.backend.appointments.book(session, &request).await
    }

    /// List the signed-in donor's appointments.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the session expired.
    pub async fn appointments(&self, session: &Session) -> Result<Vec<Appointment>, PortError> {
        self.backend.appointments.appointments(session).await
    }

    /// Cancel one of the signed-in donor's appointments.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails, the appointment is
    /// unknown, or the session expired.
    pub async fn cancel(
        &self,
        session: &Session,
        appointment: &AppointmentId,
    ) -> Result<(), PortError> {
        self.backend.appointments.cancel(session, appointment).await
    }

    /// List the signed-in donor's completed donations.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the session expired.
    pub async fn donations(&self, session: &Session) -> Result<Vec<Donation>, PortError> {
        self.backend.donations.donations(session).await
    }
}
