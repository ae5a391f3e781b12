//! Authentication context for signed-in donors.
//!
//! A session is created by [`AuthPort::login`](crate::ports::AuthPort) and
//! passed by reference to every authenticated port call; request builders
//! read the token from it, never from process-wide state. The caller drops
//! the session on sign-out and whenever a port reports
//! [`PortError::Unauthorized`](crate::ports::PortError).

use serde::{Deserialize, Serialize};

use crate::model::DonorId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Bearer token plus the identity it was issued for.
pub struct Session {
    /// Opaque token issued by the backend.
    pub token: String,
    /// Donor the token authenticates.
    pub donor_id: DonorId,
    /// Donor display name, kept for greeting and list headers.
    pub donor_name: String,
}

impl Session {
    /// Bundle a freshly issued token with its donor identity.
    #[must_use]
    pub fn new<T: Into<String>, N: Into<String>>(token: T, donor_id: DonorId, donor_name: N) -> Self {
        Self {
            token: token.into(),
            donor_id,
            donor_name: donor_name.into(),
        }
    }

    /// Value for the `Authorization` header of an authenticated request.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Session;
    use crate::model::DonorId;

    #[test]
    fn bearer_header_carries_the_token() {
        let session = Session::new("tok-123", DonorId("d-1".to_owned()), "Ana");
        assert_eq!(session.bearer(), "Bearer tok-123");
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = Session::new("tok-123", DonorId("d-1".to_owned()), "Ana");
        let json = serde_json::to_string(&session).expect("serializes");
        let back: Session = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, session);
    }
}
