use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AuthField, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run the sign-in or register flow, depending on the form mode
    Submit,
    /// Run `service.search_hospitals`(...)
    SearchHospitals,
    /// Run `service.book`(...) for the currently selected slot
    BookSelectedSlot,
    /// Fetch appointments and donations for the records screen
    OpenRecords,
    /// Run `service.cancel`(...) for the selected appointment
    CancelSelectedAppointment,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut. Plain `q` stays usable inside text inputs, so
    // only Ctrl-C quits from everywhere.
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::SignIn => match key.code {
            Tab => app.next_auth_field(),
            Enter => action = Action::Submit,
            Esc => action = Action::Quit,
            Backspace => {
                if let Some(input) = app.focused_input_mut() {
                    input.pop();
                }
            }
            Char(character) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if character == 'r' {
                        app.toggle_auth_mode();
                    }
                } else if !key.modifiers.contains(KeyModifiers::ALT) {
                    if app.auth_field == AuthField::BloodType {
                        if character == ' ' {
                            app.cycle_blood_type();
                        }
                    } else if let Some(input) = app.focused_input_mut() {
                        input.push(character);
                    }
                }
            }
            _ => {}
        },

        Screen::Hospitals => match key.code {
            Up => {
                if app.hospital_index > 0 {
                    app.hospital_index -= 1;
                }
            }
            Down => {
                if app.hospital_index + 1 < app.hospitals.len() {
                    app.hospital_index += 1;
                }
            }
            Backspace => {
                app.search_input.pop();
            }
            Enter => {
                action = Action::SearchHospitals;
            }
            Right | Tab => {
                if app.select_current_hospital().is_none() {
                    app.error_message =
                        Some("No hospital selected (search and pick one first)".into());
                }
            }
            Esc => {
                app.sign_out();
            }
            Char(character) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if character == 'r' {
                        action = Action::OpenRecords;
                    }
                } else if !key.modifiers.contains(KeyModifiers::ALT) {
                    app.search_input.push(character);
                }
            }
            _ => {}
        },

        Screen::Slots => match key.code {
            Up => {
                if app.slot_index > 0 {
                    app.slot_index -= 1;
                }
            }
            Down => {
                if app.slot_index + 1 < app.day_slots.len() {
                    app.slot_index += 1;
                }
            }
            Left => app.shift_target_date(-1),
            Right => app.shift_target_date(1),
            Enter => {
                if let Some(slot) = app.selected_slot() {
                    if app.slot_is_bookable(slot) {
                        action = Action::BookSelectedSlot;
                    } else {
                        app.error_message = Some(format!("{slot} has already passed today"));
                    }
                }
            }
            Esc | Char('b') => {
                app.screen = Screen::Hospitals;
            }
            _ => {}
        },

        Screen::Records => match key.code {
            Up => {
                if app.record_index > 0 {
                    app.record_index -= 1;
                }
            }
            Down => {
                if app.record_index + 1 < app.appointments.len() {
                    app.record_index += 1;
                }
            }
            Char('x') => {
                action = Action::CancelSelectedAppointment;
            }
            Esc | Char('b') => {
                app.screen = Screen::Hospitals;
            }
            _ => {}
        },
    }
    action
}
