//! Terminal UI for hemolink that lets donors find hospitals and book donation slots.

mod app;
mod input;
mod ui;

use std::{
    env,
    fs::File,
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hemolink_core::{
    model::AppointmentStatus,
    ports::{AppointmentRequest, Credentials, HospitalSearch, NewDonor, PortError},
    service::HemolinkService,
};
use hemolink_provider_hemonet as hemonet;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use crate::app::{App, AuthMode, Screen};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    // HTTP + service setup
    let base_url =
        env::var("HEMONET_BASE_URL").unwrap_or_else(|_| hemonet::DEFAULT_BASE_URL.to_owned());
    let client = Client::builder().user_agent("hemolink/0.1").build()?;

    let backend = Arc::new(hemonet::backend(client, base_url));
    let service = Arc::new(HemolinkService::new(backend));

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

// ratatui owns stdout, so logs only go to a file and only when asked for.
fn init_logging() -> Result<()> {
    let Ok(path) = env::var("HEMOLINK_LOG") else {
        return Ok(());
    };

    let file = File::create(path)?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

async fn run(terminal: &mut Term, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::Submit => submit_auth_form(terminal, &mut app).await?,
                Action::SearchHospitals => search_hospitals(terminal, &mut app).await?,
                Action::BookSelectedSlot => book_selected_slot(terminal, &mut app).await?,
                Action::OpenRecords => open_records(terminal, &mut app).await?,
                Action::CancelSelectedAppointment => {
                    cancel_selected_appointment(terminal, &mut app).await?;
                }
            }
        }
    }

    Ok(())
}

async fn submit_auth_form(terminal: &mut Term, app: &mut App) -> Result<()> {
    match app.auth_mode {
        AuthMode::Register => {
            if app.name_input.trim().is_empty()
                || app.email_input.trim().is_empty()
                || app.password_input.is_empty()
            {
                app.error_message = Some("Fill in name, email, and password".into());
                return Ok(());
            }

            let new_donor = NewDonor {
                name: app.name_input.trim().to_owned(),
                email: app.email_input.trim().to_owned(),
                password: app.password_input.clone(),
                blood_type: app.chosen_blood_type(),
                phone: None,
            };

            app.is_loading = true;
            app.error_message = None;
            terminal.draw(|frame| ui::draw(frame, app))?;

            let res = app.service.register(new_donor).await;

            app.is_loading = false;
            match res {
                Ok(donor) => {
                    app.info_message =
                        Some(format!("Account created for {}; sign in to continue", donor.name));
                    app.password_input.clear();
                    app.toggle_auth_mode();
                }
                Err(error) => report_port_error(app, &error),
            }
        }
        AuthMode::SignIn => {
            if app.email_input.trim().is_empty() || app.password_input.is_empty() {
                app.error_message = Some("Type your email and password, then press Enter".into());
                return Ok(());
            }

            let credentials = Credentials {
                email: app.email_input.trim().to_owned(),
                password: app.password_input.clone(),
            };

            app.is_loading = true;
            app.error_message = None;
            terminal.draw(|frame| ui::draw(frame, app))?;

            let res = app.service.login(credentials).await;

            app.is_loading = false;
            match res {
                Ok(session) => {
                    app.session = Some(session);
                    app.password_input.clear();
                    app.info_message = None;
                    app.screen = Screen::Hospitals;
                    // Load the directory right away so the list is not empty.
                    search_hospitals(terminal, app).await?;
                }
                Err(PortError::Unauthorized) => {
                    app.error_message = Some("Email or password incorrect".into());
                }
                Err(error) => report_port_error(app, &error),
            }
        }
    }

    Ok(())
}

async fn search_hospitals(terminal: &mut Term, app: &mut App) -> Result<()> {
    let query = parse_search_input(&app.search_input);

    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.search_hospitals(query, 50).await;

    app.is_loading = false;
    match res {
        Ok(hospitals) => {
            app.hospitals = hospitals;
            app.hospital_index = 0;
            if app.hospitals.is_empty() {
                app.info_message = Some("No hospitals matched".into());
            }
        }
        Err(error) => report_port_error(app, &error),
    }

    Ok(())
}

async fn book_selected_slot(terminal: &mut Term, app: &mut App) -> Result<()> {
    let Some(session) = app.session.clone() else {
        app.error_message = Some("Sign in first".into());
        return Ok(());
    };
    let Some(hospital) = app.selected_hospital.clone() else {
        app.error_message = Some("Pick a hospital first".into());
        return Ok(());
    };
    let Some(slot) = app.selected_slot() else {
        app.error_message = Some("Pick a slot first".into());
        return Ok(());
    };

    let request = AppointmentRequest {
        hospital_id: hospital.id.clone(),
        date: app.target_date,
        slot,
    };

    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.book(&session, request).await;

    app.is_loading = false;
    match res {
        Ok(appointment) => {
            app.info_message = Some(format!(
                "Booked {} at {} on {}",
                appointment.time,
                appointment.hospital_name,
                appointment.date.format("%d/%m/%Y"),
            ));
            app.refresh_slots();
        }
        Err(PortError::SlotTaken) => {
            app.error_message = Some("That slot was just taken, pick another".into());
            app.refresh_slots();
        }
        Err(error) => report_port_error(app, &error),
    }

    Ok(())
}

async fn open_records(terminal: &mut Term, app: &mut App) -> Result<()> {
    let Some(session) = app.session.clone() else {
        app.error_message = Some("Sign in first".into());
        return Ok(());
    };

    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let appointments = app.service.appointments(&session).await;
    let donations = if appointments.is_ok() {
        app.service.donations(&session).await
    } else {
        Ok(Vec::new())
    };

    app.is_loading = false;
    match (appointments, donations) {
        (Ok(appointments), Ok(donations)) => {
            app.appointments = appointments;
            app.donations = donations;
            app.record_index = 0;
            app.screen = Screen::Records;
        }
        (Err(error), _) | (_, Err(error)) => report_port_error(app, &error),
    }

    Ok(())
}

async fn cancel_selected_appointment(terminal: &mut Term, app: &mut App) -> Result<()> {
    let Some(session) = app.session.clone() else {
        app.error_message = Some("Sign in first".into());
        return Ok(());
    };
    let Some(appointment) = app.appointments.get(app.record_index).cloned() else {
        app.error_message = Some("No appointment selected".into());
        return Ok(());
    };

    if appointment.status != AppointmentStatus::Scheduled {
        app.error_message = Some("Only scheduled appointments can be cancelled".into());
        return Ok(());
    }

    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.cancel(&session, &appointment.id).await;

    app.is_loading = false;
    match res {
        Ok(()) => {
            app.info_message = Some(format!(
                "Cancelled the {} appointment at {}",
                appointment.time, appointment.hospital_name,
            ));
            // Reload so the status change is visible right away.
            match app.service.appointments(&session).await {
                Ok(list) => {
                    app.appointments = list;
                    if app.record_index >= app.appointments.len() {
                        app.record_index = 0;
                    }
                }
                Err(error) => report_port_error(app, &error),
            }
        }
        Err(error) => report_port_error(app, &error),
    }

    Ok(())
}

fn report_port_error(app: &mut App, error: &PortError) {
    if matches!(error, PortError::Unauthorized) {
        // Session lifecycle: a 401 clears the session and sends the donor
        // back to sign-in.
        app.sign_out();
        app.error_message = Some("Session expired, sign in again".into());
    } else {
        app.error_message = Some(error.to_string());
    }
}

fn parse_search_input(input: &str) -> HospitalSearch {
    match input.split_once(',') {
        Some((name, city)) => {
            let city = city.trim();
            HospitalSearch::new(name.trim(), (!city.is_empty()).then(|| city.to_owned()))
        }
        None => HospitalSearch::new(input.trim(), None::<String>),
    }
}
