//! Domain data structures for hospitals, donors, appointments, and donations.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::slots::TimeSlot;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a hospital known to the platform.
pub struct HospitalId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a registered donor.
pub struct DonorId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a booked appointment.
pub struct AppointmentId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Declared opening and closing wall-clock times of a hospital.
///
/// Both times are hour:minute with no timezone; they are interpreted in the
/// hospital's local time. `opens >= closes` can arrive from upstream and is
/// treated as unusable by the slot engine.
pub struct OperatingHours {
    /// Time the hospital starts accepting donors.
    pub opens: NaiveTime,
    /// Time the hospital stops accepting donors (exclusive).
    pub closes: NaiveTime,
}

impl OperatingHours {
    /// Pair up opening and closing times.
    #[must_use]
    pub fn new(opens: NaiveTime, closes: NaiveTime) -> Self {
        Self { opens, closes }
    }

    /// Whether the window is usable for slot generation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.opens < self.closes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Hospital returned from a directory search.
pub struct Hospital {
    /// Unique identifier used by the backend when booking appointments.
    pub id: HospitalId,
    /// Display name.
    pub name: String,
    /// City the hospital is located in.
    pub city: String,
    /// Street address.
    pub address: String,
    /// Contact phone number, when the directory has one.
    pub phone: Option<String>,
    /// Normalized operating hours; `None` when upstream data was absent or
    /// unparseable.
    pub hours: Option<OperatingHours>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// AB0/Rh blood groups tracked by the platform.
pub enum BloodType {
    /// A, Rh positive.
    #[serde(rename = "A+")]
    APositive,
    /// A, Rh negative.
    #[serde(rename = "A-")]
    ANegative,
    /// B, Rh positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B, Rh negative.
    #[serde(rename = "B-")]
    BNegative,
    /// AB, Rh positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB, Rh negative.
    #[serde(rename = "AB-")]
    AbNegative,
    /// 0, Rh positive.
    #[serde(rename = "O+")]
    OPositive,
    /// 0, Rh negative.
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// All groups in the order the registration form cycles through them.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Map a backend spelling ("A+", "ab-", "o +", …) to a blood group.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "A+" => Some(Self::APositive),
            "A-" => Some(Self::ANegative),
            "B+" => Some(Self::BPositive),
            "B-" => Some(Self::BNegative),
            "AB+" => Some(Self::AbPositive),
            "AB-" => Some(Self::AbNegative),
            "O+" | "0+" => Some(Self::OPositive),
            "O-" | "0-" => Some(Self::ONegative),
            _ => None,
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Registered donor account.
pub struct Donor {
    /// Unique identifier.
    pub id: DonorId,
    /// Full name.
    pub name: String,
    /// Sign-in email address.
    pub email: String,
    /// Declared blood group.
    pub blood_type: BloodType,
    /// Contact phone number.
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle state of an appointment.
pub enum AppointmentStatus {
    /// Booked and waiting for the donor to show up.
    Scheduled,
    /// The donor donated at the booked time.
    Completed,
    /// Cancelled by the donor or the hospital.
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Donation appointment booked through the platform.
pub struct Appointment {
    /// Unique identifier.
    pub id: AppointmentId,
    /// Hospital the appointment was booked at.
    pub hospital_id: HospitalId,
    /// Hospital display name, denormalized for list views.
    pub hospital_name: String,
    /// Calendar date of the appointment.
    pub date: NaiveDate,
    /// Start of the booked slot.
    pub time: TimeSlot,
    /// Current lifecycle state.
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Completed donation record.
pub struct Donation {
    /// Unique identifier.
    pub id: String,
    /// Hospital the donation took place at.
    pub hospital_name: String,
    /// Date of the donation.
    pub date: NaiveDate,
    /// Collected volume in milliliters.
    pub volume_ml: u32,
    /// Blood group recorded for the donation, when the backend kept it.
    pub blood_type: Option<BloodType>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::BloodType;

    #[rstest]
    #[case("A+", BloodType::APositive)]
    #[case("ab-", BloodType::AbNegative)]
    #[case(" O + ", BloodType::OPositive)]
    #[case("0-", BloodType::ONegative)]
    #[case("B+", BloodType::BPositive)]
    fn blood_type_accepts_backend_spellings(#[case] raw: &str, #[case] expected: BloodType) {
        assert_eq!(BloodType::from_wire(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("C+")]
    #[case("AB")]
    fn blood_type_rejects_unknown_spellings(#[case] raw: &str) {
        assert_eq!(BloodType::from_wire(raw), None);
    }

    #[test]
    fn blood_type_display_matches_wire_names() {
        let json = serde_json::to_string(&BloodType::AbPositive).expect("serializes");
        assert_eq!(json, format!("\"{}\"", BloodType::AbPositive));
    }
}
