use chrono::{Local, NaiveDate};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use hemolink_core::model::AppointmentStatus;

use crate::app::{App, AuthField, AuthMode, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let greeting = app.session.as_ref().map_or_else(
        || "hemolink – blood donation appointments".to_owned(),
        |session| format!("hemolink – signed in as {}", session.donor_name),
    );
    let header =
        Paragraph::new(greeting).block(Block::default().borders(Borders::ALL).title("Hemolink"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::SignIn => draw_sign_in(frame, app, *content_area),
        Screen::Hospitals => draw_hospitals(frame, app, *content_area),
        Screen::Slots => draw_slots(frame, app, *content_area),
        Screen::Records => draw_records(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::SignIn => {
            "Tab next field · Ctrl-R sign-in/register · Enter submit · Esc/Ctrl-C quit"
        }
        Screen::Hospitals => {
            "Type to search (name, city) · Enter search · Tab/→ slots · Ctrl-R records · Esc sign out"
        }
        Screen::Slots => "↑/↓ choose slot · ←/→ change day · Enter book · Esc/b back",
        Screen::Records => "↑/↓ choose appointment · x cancel · Esc/b back",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.info_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else if app.info_message.is_some() {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_sign_in(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mode_line = match app.auth_mode {
        AuthMode::SignIn => "Sign in to book a donation slot (Ctrl-R to create an account)",
        AuthMode::Register => "Create your donor account (Ctrl-R to go back to sign-in)",
    };

    let masked_password = "•".repeat(app.password_input.chars().count());

    let fields: Vec<(&str, String, AuthField)> = match app.auth_mode {
        AuthMode::SignIn => vec![
            ("Email", app.email_input.clone(), AuthField::Email),
            ("Password", masked_password, AuthField::Password),
        ],
        AuthMode::Register => vec![
            ("Full name", app.name_input.clone(), AuthField::Name),
            ("Email", app.email_input.clone(), AuthField::Email),
            ("Password", masked_password, AuthField::Password),
            (
                "Blood type (space to change)",
                app.chosen_blood_type().to_string(),
                AuthField::BloodType,
            ),
        ],
    };

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_field| Constraint::Length(3)));
    constraints.push(Constraint::Min(0));

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let Some(mode_area) = layout_chunks.first() else {
        return;
    };
    frame.render_widget(Paragraph::new(mode_line), *mode_area);

    for (chunk, (title, content, field)) in layout_chunks.iter().skip(1).zip(fields) {
        let border_style = if field == app.auth_field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let widget = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
        frame.render_widget(widget, *chunk);
    }
}

fn draw_hospitals(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // results
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, results_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.search_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search hospitals (name, optionally followed by a comma and a city)"),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(input, *input_area);

    let items = if app.hospitals.is_empty() {
        vec![ListItem::new(
            "No hospitals loaded yet. Press Enter to search the directory.",
        )]
    } else {
        app.hospitals
            .iter()
            .map(|hospital| {
                let hours = hospital.hours.map_or_else(
                    || "hours unknown".to_owned(),
                    |window| {
                        format!(
                            "{}–{}",
                            window.opens.format("%H:%M"),
                            window.closes.format("%H:%M")
                        )
                    },
                );
                ListItem::new(format!(
                    "{} – {} · {hours}",
                    hospital.name, hospital.city
                ))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Hospitals (↑/↓, Tab/→ to pick a slot)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.hospitals.is_empty() {
        state.select(Some(app.hospital_index));
    }
    frame.render_stateful_widget(list, *results_area, &mut state);
}

fn draw_slots(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let hospital_name = app
        .selected_hospital
        .as_ref()
        .map_or("<hospital>", |hospital| hospital.name.as_str());

    let today = Local::now().date_naive();
    let title = format!(
        "Slots at {hospital_name} on {} ({})",
        app.target_date.format("%d/%m/%Y"),
        relative_day_label(app.target_date, today),
    );

    if app.is_loading {
        let paragraph = Paragraph::new("Loading…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items = app
        .day_slots
        .iter()
        .map(|slot| {
            if app.slot_is_bookable(*slot) {
                ListItem::new(format!("{slot}"))
            } else {
                ListItem::new(format!("{slot}  (passed)"))
                    .style(Style::default().fg(Color::DarkGray))
            }
        })
        .collect::<Vec<ListItem<'_>>>();

    let block_title = if app.bookable.is_empty() {
        format!("{title} – no more availability today")
    } else {
        title
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(block_title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.day_slots.is_empty() {
        state.select(Some(app.slot_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_records(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [appointments_area, donations_area] = chunks else {
        return;
    };

    // Appointments
    if app.appointments.is_empty() {
        let paragraph = Paragraph::new("No appointments booked yet.")
            .block(Block::default().borders(Borders::ALL).title("Appointments"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *appointments_area);
    } else {
        let rows = app.appointments.iter().map(|appointment| {
            Row::new(vec![
                Cell::from(appointment.date.format("%d/%m/%Y").to_string()),
                Cell::from(appointment.time.to_string()),
                Cell::from(appointment.hospital_name.clone()),
                Cell::from(appointment.status.to_string()),
            ])
            .style(Style::default().fg(status_color(appointment.status)))
        });

        let column_widths = [
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Min(20),
            Constraint::Length(11),
        ];

        let table = Table::new(rows, column_widths)
            .header(
                Row::new(vec!["Date", "Time", "Hospital", "Status"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Appointments (↑/↓, x to cancel a scheduled one)"),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .column_spacing(1);

        let mut state = TableState::default();
        state.select(Some(app.record_index));
        frame.render_stateful_widget(table, *appointments_area, &mut state);
    }

    // Donation history
    if app.donations.is_empty() {
        let paragraph = Paragraph::new("No donations recorded yet.")
            .block(Block::default().borders(Borders::ALL).title("Donations"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *donations_area);
        return;
    }

    let rows = app.donations.iter().map(|donation| {
        let blood_type = donation
            .blood_type
            .map_or_else(|| "—".to_owned(), |group| group.to_string());

        Row::new(vec![
            Cell::from(donation.date.format("%d/%m/%Y").to_string()),
            Cell::from(donation.hospital_name.clone()),
            Cell::from(format!("{} ml", donation.volume_ml)),
            Cell::from(blood_type),
        ])
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Date", "Hospital", "Volume", "Type"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Donations"))
        .column_spacing(1);

    frame.render_widget(table, *donations_area);
}

fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Scheduled => Color::Yellow,
        AppointmentStatus::Completed => Color::Green,
        AppointmentStatus::Cancelled => Color::DarkGray,
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}
