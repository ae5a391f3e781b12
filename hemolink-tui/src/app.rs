use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use hemolink_core::{
    model::{Appointment, BloodType, Donation, Hospital},
    service::HemolinkService,
    session::Session,
    slots::TimeSlot,
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Screen {
    SignIn,
    Hospitals,
    Slots,
    Records,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    SignIn,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthField {
    Name,
    Email,
    Password,
    BloodType,
}

pub(crate) struct App {
    pub service: Arc<HemolinkService>,

    pub screen: Screen,
    pub session: Option<Session>,

    pub auth_mode: AuthMode,
    pub auth_field: AuthField,
    pub name_input: String,
    pub email_input: String,
    pub password_input: String,
    pub blood_type_index: usize,

    pub search_input: String,
    pub hospitals: Vec<Hospital>,
    pub hospital_index: usize,
    pub selected_hospital: Option<Hospital>,

    pub target_date: NaiveDate,
    pub day_slots: Vec<TimeSlot>,
    pub bookable: Vec<TimeSlot>,
    pub slot_index: usize,

    pub appointments: Vec<Appointment>,
    pub donations: Vec<Donation>,
    pub record_index: usize,

    pub is_loading: bool,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<HemolinkService>) -> Self {
        Self {
            service,
            screen: Screen::SignIn,
            session: None,
            auth_mode: AuthMode::SignIn,
            auth_field: AuthField::Email,
            name_input: String::new(),
            email_input: String::new(),
            password_input: String::new(),
            blood_type_index: 0,
            search_input: String::new(),
            hospitals: Vec::new(),
            hospital_index: 0,
            selected_hospital: None,
            target_date: Local::now().date_naive(),
            day_slots: Vec::new(),
            bookable: Vec::new(),
            slot_index: 0,
            appointments: Vec::new(),
            donations: Vec::new(),
            record_index: 0,
            is_loading: false,
            error_message: None,
            info_message: None,
        }
    }

    /// Blood group currently shown on the register form.
    pub(crate) fn chosen_blood_type(&self) -> BloodType {
        BloodType::ALL
            .get(self.blood_type_index % BloodType::ALL.len())
            .copied()
            .unwrap_or(BloodType::OPositive)
    }

    pub(crate) fn cycle_blood_type(&mut self) {
        self.blood_type_index = (self.blood_type_index + 1) % BloodType::ALL.len();
    }

    pub(crate) fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.auth_field {
            AuthField::Name => Some(&mut self.name_input),
            AuthField::Email => Some(&mut self.email_input),
            AuthField::Password => Some(&mut self.password_input),
            AuthField::BloodType => None,
        }
    }

    pub(crate) fn next_auth_field(&mut self) {
        self.auth_field = match (self.auth_mode, self.auth_field) {
            (AuthMode::SignIn, AuthField::Email) => AuthField::Password,
            (AuthMode::SignIn, _) => AuthField::Email,
            (AuthMode::Register, AuthField::Name) => AuthField::Email,
            (AuthMode::Register, AuthField::Email) => AuthField::Password,
            (AuthMode::Register, AuthField::Password) => AuthField::BloodType,
            (AuthMode::Register, AuthField::BloodType) => AuthField::Name,
        };
    }

    pub(crate) fn toggle_auth_mode(&mut self) {
        self.auth_mode = match self.auth_mode {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
        };
        self.auth_field = match self.auth_mode {
            AuthMode::SignIn => AuthField::Email,
            AuthMode::Register => AuthField::Name,
        };
    }

    pub(crate) fn select_current_hospital(&mut self) -> Option<Hospital> {
        let hospital = self.hospitals.get(self.hospital_index).cloned()?;
        self.selected_hospital = Some(hospital.clone());
        self.target_date = Local::now().date_naive();
        self.slot_index = 0;
        self.refresh_slots();
        self.screen = Screen::Slots;
        Some(hospital)
    }

    /// Recompute the slot lists for the selected hospital and target date.
    ///
    /// The clock is read here, at the composition root; the computation
    /// itself is pure and cheap enough to run on every change.
    pub(crate) fn refresh_slots(&mut self) {
        let Some(hospital) = &self.selected_hospital else {
            self.day_slots.clear();
            self.bookable.clear();
            return;
        };

        let now = Local::now().naive_local();
        self.day_slots = self.service.day_slots(hospital);
        self.bookable = self.service.bookable_slots(hospital, self.target_date, now);

        if self.slot_index >= self.day_slots.len() {
            self.slot_index = 0;
        }
    }

    pub(crate) fn slot_is_bookable(&self, slot: TimeSlot) -> bool {
        self.bookable.contains(&slot)
    }

    pub(crate) fn selected_slot(&self) -> Option<TimeSlot> {
        self.day_slots.get(self.slot_index).copied()
    }

    pub(crate) fn shift_target_date(&mut self, days: i64) {
        let today = Local::now().date_naive();
        let shifted = self.target_date + Duration::days(days);
        // Booking into the past makes no sense; clamp at today.
        self.target_date = shifted.max(today);
        self.refresh_slots();
    }

    pub(crate) fn sign_out(&mut self) {
        self.session = None;
        self.password_input.clear();
        self.hospitals.clear();
        self.selected_hospital = None;
        self.screen = Screen::SignIn;
        self.auth_mode = AuthMode::SignIn;
        self.auth_field = AuthField::Email;
    }
}
