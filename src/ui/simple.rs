use crate::app::{App, DetailState, MenuState};
use crate::directory::Contact;
use crate::platform::ComposerKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Busy indicator frames, advanced by the tick timer
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the contact list (home view)
pub fn render_contacts_view(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Contacts", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    if app.contacts_loading && app.contacts.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{} Loading contacts...", spinner_frame(app.tick_count)),
            Style::default().fg(Color::DarkGray),
        )));
    } else if app.contacts.is_empty() {
        lines.push(Line::from(Span::styled("No contacts yet", Style::default().fg(Color::DarkGray))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Press r to refresh", Style::default().fg(Color::DarkGray))));
    } else {
        for (idx, contact) in app.contacts.iter().enumerate() {
            let (prefix, style) = if idx == app.selected_index {
                ("→ ", Style::default().fg(Color::Cyan))
            } else {
                ("  ", Style::default().fg(Color::White))
            };
            let marker = if contact.favorite { " ★" } else { "" };
            lines.push(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(contact.full_name(), style),
                Span::styled(marker, Style::default().fg(Color::Yellow)),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines);
    f.render_widget(paragraph, area);
}

/// Render the contact detail screen
pub fn render_detail_view(f: &mut Frame, app: &App, area: Rect) {
    match &app.detail_state {
        DetailState::Idle => {}
        DetailState::Loading { .. } => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} Loading contact...", spinner_frame(app.tick_count)),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines), area);
        }
        DetailState::LoadFailed => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Couldn't load this contact.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines), area);
        }
        DetailState::Loaded(contact) => render_contact_card(f, app, contact, area),
    }
}

fn render_contact_card(f: &mut Frame, app: &App, contact: &Contact, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            contact.full_name(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("({})", avatar_initials(contact)), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", avatar_caption(app, contact)), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Mobile: ", Style::default().fg(Color::DarkGray)),
            Span::raw(&contact.mobile),
        ]),
        Line::from(vec![
            Span::styled("Email:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(&contact.email),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            favorite_label(contact.favorite),
            Style::default().fg(if contact.favorite { Color::Yellow } else { Color::DarkGray }),
        )),
    ];

    let paragraph = Paragraph::new(lines);
    f.render_widget(paragraph, area);
}

/// Favorite indicator: exactly one of two fixed states
pub(crate) fn favorite_label(favorite: bool) -> &'static str {
    if favorite {
        "★ Favorite"
    } else {
        "☆ Not favorite"
    }
}

fn avatar_initials(contact: &Contact) -> String {
    let initials = contact.initials();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

fn avatar_caption(app: &App, contact: &Contact) -> String {
    if contact.profile_pic.is_empty() {
        "no photo".to_string()
    } else if let Some(bytes) = app.avatar_cache.get(&contact.profile_pic) {
        format!("photo cached ({} bytes)", bytes.len())
    } else {
        "photo loading...".to_string()
    }
}

/// Render the edit contact form
pub fn render_edit_view(f: &mut Frame, app: &App, area: Rect) {
    let fields = [
        ("First name: ", app.edit_first_name.as_str()),
        ("Last name:  ", app.edit_last_name.as_str()),
        ("Mobile:     ", app.edit_mobile.as_str()),
        ("Email:      ", app.edit_email.as_str()),
    ];

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Edit Contact", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    for (idx, (label, value)) in fields.iter().enumerate() {
        let selected = idx == app.edit_selected_field;
        let cursor = if selected { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(if selected { "→ " } else { "  " }, Style::default().fg(Color::Cyan)),
            Span::styled(*label, Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}{}", value, cursor)),
        ]));
    }

    let favorite_selected = app.edit_selected_field == 4;
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(if favorite_selected { "→ " } else { "  " }, Style::default().fg(Color::Cyan)),
        Span::styled("Favorite:   ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if app.edit_favorite { "[x]" } else { "[ ]" },
            Style::default().fg(Color::Yellow),
        ),
    ]));

    let paragraph = Paragraph::new(lines);
    f.render_widget(paragraph, area);
}

/// Render the text/mail composer as a centered popup
pub fn render_composer_popup(f: &mut Frame, app: &App) {
    let composer = match &app.composer {
        Some(c) => c,
        None => return,
    };

    let popup_area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, popup_area);

    let title = match composer.kind {
        ComposerKind::Text => " New Message ",
        ComposerKind::Mail => " New Mail ",
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup_area);

    let mut header = vec![Line::from(vec![
        Span::styled("To: ", Style::default().fg(Color::DarkGray)),
        Span::raw(&composer.recipient),
    ])];
    if composer.kind == ComposerKind::Mail {
        header.push(Line::from(vec![
            Span::styled("Subject: ", Style::default().fg(Color::DarkGray)),
            Span::raw(&composer.subject),
        ]));
    }
    if composer.sending {
        header.push(Line::from(Span::styled(
            "Sending...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(header), inner[0]);

    let body = Paragraph::new(composer.body.as_str()).wrap(Wrap { trim: false });
    f.render_widget(body, inner[1]);
}

/// Render the modal error alert with its single OK acknowledgement
pub fn render_alert_popup(f: &mut Frame, app: &App) {
    let message = match &app.alert {
        Some(m) => m,
        None => return,
    };

    let popup_area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Error ", Style::default().fg(Color::Red)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(popup_area);

    let body = Paragraph::new(Line::from(Span::raw(message.as_str()))).wrap(Wrap { trim: true });
    f.render_widget(body, inner[0]);

    let ok = Paragraph::new(Line::from(Span::styled(
        "[ OK ]",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(ok, inner[1]);
}

/// Render the bottom hint bar and status line
pub fn render_hints(f: &mut Frame, app: &App, area: Rect) {
    let hint_style = Style::default().fg(Color::DarkGray);

    let first_line = if app.alert.is_some() {
        Line::from(Span::styled("Enter OK", hint_style))
    } else if app.composer.is_some() {
        Line::from(vec![
            Span::styled("Enter", hint_style),
            Span::styled(" send  ", hint_style),
            Span::styled("Esc", hint_style),
            Span::styled(" cancel", hint_style),
        ])
    } else {
        match app.menu_state {
            MenuState::Contacts => Line::from(vec![
                Span::styled("↑↓", hint_style),
                Span::styled(" navigate  ", hint_style),
                Span::styled("Enter", hint_style),
                Span::styled(" open  ", hint_style),
                Span::styled("r", hint_style),
                Span::styled(" refresh  ", hint_style),
                Span::styled("q", hint_style),
                Span::styled(" quit  ", hint_style),
                Span::styled("│ ", hint_style),
                Span::styled(app.config.server_url.as_str(), hint_style),
            ]),
            MenuState::Detail => {
                if app.is_busy() {
                    Line::from(Span::styled("Loading...", hint_style))
                } else {
                    Line::from(vec![
                        Span::styled("c", hint_style),
                        Span::styled(" call  ", hint_style),
                        Span::styled("t", hint_style),
                        Span::styled(" text  ", hint_style),
                        Span::styled("m", hint_style),
                        Span::styled(" email  ", hint_style),
                        Span::styled("e", hint_style),
                        Span::styled(" edit  ", hint_style),
                        Span::styled("Esc", hint_style),
                        Span::styled(" back", hint_style),
                    ])
                }
            }
            MenuState::EditContact => Line::from(vec![
                Span::styled("↑↓", hint_style),
                Span::styled(" field  ", hint_style),
                Span::styled("Space", hint_style),
                Span::styled(" toggle favorite  ", hint_style),
                Span::styled("Enter", hint_style),
                Span::styled(" save  ", hint_style),
                Span::styled("Esc", hint_style),
                Span::styled(" cancel", hint_style),
            ]),
        }
    };

    let hints = vec![
        first_line,
        Line::from(Span::styled(&app.status_message, Style::default().fg(Color::White))),
    ];

    let paragraph = Paragraph::new(hints);
    f.render_widget(paragraph, area);
}

fn spinner_frame(tick_count: u64) -> &'static str {
    SPINNER_FRAMES[(tick_count as usize) % SPINNER_FRAMES.len()]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
