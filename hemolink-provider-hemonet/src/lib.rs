//! Provider implementation for the HemoNet blood-donation platform API.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use hemolink_core::{
    backend::{Backend, BackendMeta},
    model::{
        Appointment, AppointmentId, AppointmentStatus, BloodType, Donation, Donor, DonorId,
        Hospital, HospitalId, OperatingHours,
    },
    ports::{
        AppointmentPort, AppointmentRequest, AuthPort, Credentials, DirectoryPort, DonationPort,
        HospitalSearch, NewDonor, PortError,
    },
    session::Session,
    slots::{TimeSlot, parse_wall_time},
};

/// Production base URL of the HemoNet REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.hemonet.org.br/v1";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Known payload nestings used inconsistently across HemoNet endpoints.
///
/// Older endpoints wrap payloads in `{"data": …}`, the rewritten ones in
/// `{"result": …}`, and a few return the payload bare. Anything else is an
/// unrecognized shape and fails loudly instead of being guessed at.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Data { data: T },
    Result { result: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Data { data } => data,
            Self::Result { result } => result,
            Self::Bare(payload) => payload,
        }
    }
}

/// Hospital entry from /hospitais
#[derive(Debug, Deserialize)]
struct HospitalEntry {
    id: i64,
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "cidade")]
    city: String,
    #[serde(rename = "endereco")]
    address: String,

    #[serde(default, rename = "telefone")]
    phone: Option<String>,

    #[serde(default, rename = "horario_abertura")]
    opening_time: Option<String>,
    #[serde(default, rename = "horario_fechamento")]
    closing_time: Option<String>,
}

/// Donor entry from /doadores and inside the login payload
#[derive(Debug, Deserialize)]
struct DonorEntry {
    id: i64,
    #[serde(rename = "nome")]
    name: String,
    email: String,
    #[serde(rename = "tipo_sanguineo")]
    blood_type: String,

    #[serde(default, rename = "telefone")]
    phone: Option<String>,
}

/// Login payload from /auth/login
#[derive(Debug, Deserialize)]
struct LoginEntry {
    token: String,
    #[serde(rename = "doador")]
    donor: DonorEntry,
}

/// Appointment entry from /agendamentos
#[derive(Debug, Deserialize)]
struct AppointmentEntry {
    id: i64,
    hospital_id: i64,
    #[serde(rename = "hospital_nome")]
    hospital_name: String,
    #[serde(rename = "data")]
    date: String, // "YYYY-MM-DD"
    #[serde(rename = "hora")]
    time: String, // wall time, same mixed formats as operating hours
    status: String, // "agendado", "concluido", "cancelado"
}

/// Donation entry from /doacoes
#[derive(Debug, Deserialize)]
struct DonationEntry {
    id: i64,
    #[serde(rename = "hospital_nome")]
    hospital_name: String,
    #[serde(rename = "data")]
    date: String,
    volume_ml: u32,

    #[serde(default, rename = "tipo_sanguineo")]
    blood_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    #[serde(rename = "senha")]
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    #[serde(rename = "nome")]
    name: &'a str,
    email: &'a str,
    #[serde(rename = "senha")]
    password: &'a str,
    #[serde(rename = "tipo_sanguineo")]
    blood_type: String,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BookRequest {
    hospital_id: i64,
    #[serde(rename = "data")]
    date: String, // "YYYY-MM-DD"
    #[serde(rename = "hora")]
    time: String, // "HH:MM"
}

/// Hospital directory implementation for HemoNet.
pub struct HemonetDirectoryPort {
    client: Client,
    base_url: String,
}

impl HemonetDirectoryPort {
    /// Create a new directory port bound to the given HTTP client.
    #[must_use]
    pub fn new<U: Into<String>>(client: Client, base_url: U) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DirectoryPort for HemonetDirectoryPort {
    async fn search(
        &self,
        query: &HospitalSearch,
        limit: usize,
    ) -> Result<Vec<Hospital>, PortError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // An empty query lists the directory unfiltered; donors browse before
        // they search.
        let mut request = self
            .client
            .get(format!("{}/hospitais", self.base_url))
            .query(&[("limite", limit.to_string())]);

        let name = query.name.trim();
        if !name.is_empty() {
            request = request.query(&[("nome", name)]);
        }
        if let Some(city) = query
            .city
            .as_deref()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
        {
            request = request.query(&[("cidade", city)]);
        }

        debug!(name, "searching hospital directory");
        let entries = fetch_json::<Vec<HospitalEntry>>(request).await?;

        let results = entries
            .into_iter()
            .take(limit)
            .map(|entry| Hospital {
                id: HospitalId(entry.id.to_string()),
                name: entry.name,
                city: entry.city,
                address: entry.address,
                phone: entry.phone,
                hours: normalize_hours(
                    entry.opening_time.as_deref(),
                    entry.closing_time.as_deref(),
                ),
            })
            .collect();

        Ok(results)
    }
}

/// Registration and sign-in implementation for HemoNet.
pub struct HemonetAuthPort {
    client: Client,
    base_url: String,
}

impl HemonetAuthPort {
    /// Create a new auth port bound to the given HTTP client.
    #[must_use]
    pub fn new<U: Into<String>>(client: Client, base_url: U) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthPort for HemonetAuthPort {
    async fn register(&self, donor: &NewDonor) -> Result<Donor, PortError> {
        let payload = RegisterRequest {
            name: &donor.name,
            email: &donor.email,
            password: &donor.password,
            blood_type: donor.blood_type.to_string(),
            phone: donor.phone.as_deref(),
        };

        let entry = fetch_json::<DonorEntry>(
            self.client
                .post(format!("{}/doadores", self.base_url))
                .json(&payload),
        )
        .await?;

        map_donor(entry)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, PortError> {
        let payload = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        };

        let entry = fetch_json::<LoginEntry>(
            self.client
                .post(format!("{}/auth/login", self.base_url))
                .json(&payload),
        )
        .await?;

        debug!(donor = %entry.donor.name, "session issued");

        Ok(Session::new(
            entry.token,
            DonorId(entry.donor.id.to_string()),
            entry.donor.name,
        ))
    }
}

/// Appointment booking implementation for HemoNet.
pub struct HemonetAppointmentPort {
    client: Client,
    base_url: String,
}

impl HemonetAppointmentPort {
    /// Create a new appointment port bound to the given HTTP client.
    #[must_use]
    pub fn new<U: Into<String>>(client: Client, base_url: U) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AppointmentPort for HemonetAppointmentPort {
    async fn book(
        &self,
        session: &Session,
        request: &AppointmentRequest,
    ) -> Result<Appointment, PortError> {
        let hospital_id = request
            .hospital_id
            .0
            .parse::<i64>()
            .map_err(|_error| PortError::InvalidHospitalId)?;

        let payload = BookRequest {
            hospital_id,
            date: request.date.format(DATE_FORMAT).to_string(),
            time: request.slot.to_string(),
        };

        debug!(hospital_id, date = %payload.date, time = %payload.time, "booking slot");

        let entry = fetch_json::<AppointmentEntry>(
            self.client
                .post(format!("{}/agendamentos", self.base_url))
                .header(AUTHORIZATION, session.bearer())
                .json(&payload),
        )
        .await?;

        map_appointment(entry)
    }

    async fn appointments(&self, session: &Session) -> Result<Vec<Appointment>, PortError> {
        let entries = fetch_json::<Vec<AppointmentEntry>>(
            self.client
                .get(format!("{}/agendamentos", self.base_url))
                .header(AUTHORIZATION, session.bearer()),
        )
        .await?;

        let mut appointments = entries
            .into_iter()
            .map(map_appointment)
            .collect::<Result<Vec<_>, _>>()?;

        appointments.sort_by_key(|appointment| (appointment.date, appointment.time));

        Ok(appointments)
    }

    async fn cancel(
        &self,
        session: &Session,
        appointment: &AppointmentId,
    ) -> Result<(), PortError> {
        let response = self
            .client
            .delete(format!("{}/agendamentos/{}", self.base_url, appointment.0))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await
            .map_err(PortError::from)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(PortError::Unauthorized),
            StatusCode::NOT_FOUND => Err(PortError::NotFound),
            _ => {
                response.error_for_status().map_err(PortError::from)?;
                Ok(())
            }
        }
    }
}

/// Donation history implementation for HemoNet.
pub struct HemonetDonationPort {
    client: Client,
    base_url: String,
}

impl HemonetDonationPort {
    /// Create a new donation port bound to the given HTTP client.
    #[must_use]
    pub fn new<U: Into<String>>(client: Client, base_url: U) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DonationPort for HemonetDonationPort {
    async fn donations(&self, session: &Session) -> Result<Vec<Donation>, PortError> {
        let entries = fetch_json::<Vec<DonationEntry>>(
            self.client
                .get(format!("{}/doacoes", self.base_url))
                .header(AUTHORIZATION, session.bearer()),
        )
        .await?;

        let mut donations = Vec::new();
        for entry in entries {
            let date = NaiveDate::parse_from_str(&entry.date, DATE_FORMAT)?;
            donations.push(Donation {
                id: entry.id.to_string(),
                hospital_name: entry.hospital_name,
                date,
                volume_ml: entry.volume_ml,
                // Display-only metadata; an unknown spelling degrades to
                // "not recorded" rather than failing the whole listing.
                blood_type: entry.blood_type.as_deref().and_then(BloodType::from_wire),
            });
        }

        donations.sort_by_key(|donation| Reverse(donation.date));

        Ok(donations)
    }
}

/// Build the backend bundle for the HemoNet provider.
#[must_use]
pub fn backend<U: Into<String>>(client: Client, base_url: U) -> Backend {
    let base_url = base_url.into();

    Backend {
        meta: backend_meta(),
        directory: Arc::new(HemonetDirectoryPort::new(client.clone(), base_url.clone())),
        auth: Arc::new(HemonetAuthPort::new(client.clone(), base_url.clone())),
        appointments: Arc::new(HemonetAppointmentPort::new(client.clone(), base_url.clone())),
        donations: Arc::new(HemonetDonationPort::new(client, base_url)),
    }
}

fn backend_meta() -> BackendMeta {
    BackendMeta {
        id: String::from("hemonet"),
        name: String::from("HemoNet"),
    }
}

// Operating hours arrive as "HH:MM", "HH:MM:SS", or a full timestamp; a pair
// that does not normalize cleanly degrades to "no declared hours" and the
// slot engine's fallback takes over.
fn normalize_hours(opening: Option<&str>, closing: Option<&str>) -> Option<OperatingHours> {
    let opens = parse_wall_time(opening?)?;
    let closes = parse_wall_time(closing?)?;
    Some(OperatingHours::new(opens, closes))
}

fn map_donor(entry: DonorEntry) -> Result<Donor, PortError> {
    let blood_type = BloodType::from_wire(&entry.blood_type).ok_or_else(|| {
        PortError::Internal(format!("Unknown blood type: {}", entry.blood_type))
    })?;

    Ok(Donor {
        id: DonorId(entry.id.to_string()),
        name: entry.name,
        email: entry.email,
        blood_type,
        phone: entry.phone,
    })
}

fn map_appointment(entry: AppointmentEntry) -> Result<Appointment, PortError> {
    let date = NaiveDate::parse_from_str(&entry.date, DATE_FORMAT)?;
    let time = parse_wall_time(&entry.time)
        .ok_or_else(|| PortError::Internal(format!("Invalid appointment time: {}", entry.time)))?;
    let status = map_status(&entry.status)?;

    Ok(Appointment {
        id: AppointmentId(entry.id.to_string()),
        hospital_id: HospitalId(entry.hospital_id.to_string()),
        hospital_name: entry.hospital_name,
        date,
        time: TimeSlot(time),
        status,
    })
}

/// Map HemoNet status strings to the appointment lifecycle.
fn map_status(raw: &str) -> Result<AppointmentStatus, PortError> {
    match raw.trim().to_lowercase().as_str() {
        "agendado" | "agendada" | "scheduled" => Ok(AppointmentStatus::Scheduled),
        "concluido" | "concluído" | "realizado" | "completed" => Ok(AppointmentStatus::Completed),
        "cancelado" | "cancelada" | "cancelled" => Ok(AppointmentStatus::Cancelled),
        _ => Err(PortError::Internal(format!(
            "Unknown appointment status: {raw}"
        ))),
    }
}

// Small helper to fetch and decode JSON with status and envelope handling.
async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, PortError> {
    let response = request.send().await.map_err(PortError::from)?;

    match response.status() {
        StatusCode::UNAUTHORIZED => return Err(PortError::Unauthorized),
        StatusCode::NOT_FOUND => return Err(PortError::NotFound),
        StatusCode::CONFLICT => return Err(PortError::SlotTaken),
        _ => {}
    }

    let response = response.error_for_status().map_err(PortError::from)?;
    let body = response.text().await.map_err(PortError::from)?;
    decode_envelope(&body)
}

// Unwrap one of the known envelope shapes; anything else is a tagged error,
// never a guess.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, PortError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|error| PortError::UnrecognizedShape(error.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use hemolink_core::model::AppointmentStatus;
    use hemolink_core::ports::PortError;
    use hemolink_core::slots::parse_wall_time;

    use super::{
        AppointmentEntry, HospitalEntry, decode_envelope, map_appointment, map_status,
        normalize_hours,
    };

    #[rstest]
    #[case::data_nested(r#"{"data": [1, 2, 3]}"#)]
    #[case::result_nested(r#"{"result": [1, 2, 3]}"#)]
    #[case::bare("[1, 2, 3]")]
    fn known_envelopes_decode_identically(#[case] body: &str) {
        let decoded: Vec<u32> = decode_envelope(body).expect("known shape");
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_envelope_is_a_tagged_error() {
        let result: Result<Vec<u32>, PortError> = decode_envelope(r#"{"items": [1, 2, 3]}"#);
        assert!(matches!(result, Err(PortError::UnrecognizedShape(_))));
    }

    #[test]
    fn hospital_entry_normalizes_mixed_hour_formats() {
        let body = r#"{
            "data": [
                {
                    "id": 7,
                    "nome": "Hemocentro Central",
                    "cidade": "Recife",
                    "endereco": "Av. Agamenon, 100",
                    "horario_abertura": "08:00",
                    "horario_fechamento": "2023-01-01T18:00:00Z"
                },
                {
                    "id": 8,
                    "nome": "Hospital das Clinicas",
                    "cidade": "Recife",
                    "endereco": "Rua Um, 1",
                    "horario_abertura": "whenever",
                    "horario_fechamento": "18:00"
                },
                {
                    "id": 9,
                    "nome": "Posto Norte",
                    "cidade": "Olinda",
                    "endereco": "Rua Dois, 2"
                }
            ]
        }"#;

        let entries: Vec<HospitalEntry> = decode_envelope(body).expect("valid fixture");
        let hours: Vec<_> = entries
            .iter()
            .map(|entry| {
                normalize_hours(entry.opening_time.as_deref(), entry.closing_time.as_deref())
            })
            .collect();

        let declared = hours.first().copied().flatten().expect("normalized pair");
        assert_eq!(declared.opens, parse_wall_time("08:00").expect("parses"));
        assert_eq!(declared.closes, parse_wall_time("18:00").expect("parses"));

        // Unparseable and missing pairs degrade to no declared hours.
        assert_eq!(hours.get(1).copied().flatten(), None);
        assert_eq!(hours.get(2).copied().flatten(), None);
    }

    #[rstest]
    #[case("agendado", AppointmentStatus::Scheduled)]
    #[case(" Concluido ", AppointmentStatus::Completed)]
    #[case("CANCELADA", AppointmentStatus::Cancelled)]
    fn status_spellings_normalize(#[case] raw: &str, #[case] expected: AppointmentStatus) {
        assert_eq!(map_status(raw).expect("known status"), expected);
    }

    #[test]
    fn unknown_status_fails_loudly() {
        assert!(matches!(map_status("pendente"), Err(PortError::Internal(_))));
    }

    #[test]
    fn appointment_entry_maps_to_domain() {
        let body = r#"{
            "result": {
                "id": 41,
                "hospital_id": 7,
                "hospital_nome": "Hemocentro Central",
                "data": "2024-06-10",
                "hora": "09:00:00",
                "status": "agendado"
            }
        }"#;

        let entry: AppointmentEntry = decode_envelope(body).expect("valid fixture");
        let appointment = map_appointment(entry).expect("maps cleanly");

        assert_eq!(appointment.id.0, "41");
        assert_eq!(appointment.hospital_id.0, "7");
        assert_eq!(appointment.time.to_string(), "09:00");
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn appointment_with_garbage_time_is_rejected() {
        let entry = AppointmentEntry {
            id: 1,
            hospital_id: 2,
            hospital_name: "Posto Norte".to_owned(),
            date: "2024-06-10".to_owned(),
            time: "soon".to_owned(),
            status: "agendado".to_owned(),
        };

        assert!(matches!(map_appointment(entry), Err(PortError::Internal(_))));
    }
}
