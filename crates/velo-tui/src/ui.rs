use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::presenter::{Turn, WizardView};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let error_height = if app.presenter().error.is_some() { 1 } else { 0 };

    let [header_area, chat_area, error_area, actions_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(error_height),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    if let Some(error) = &app.presenter().error {
        let banner = Paragraph::new(format!(" {} ", error))
            .style(Style::default().bg(Color::Red).fg(Color::White).bold());
        frame.render_widget(banner, error_area);
    }
    render_quick_actions(app, frame, actions_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_consent {
        render_consent(frame, area);
    } else if let Some(view) = &app.presenter().wizard {
        render_wizard(view, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (health_text, health_color) = match app.backend_healthy {
        None => ("prüfe Verbindung", Color::Gray),
        Some(true) => ("verbunden", Color::Green),
        Some(false) => ("nicht erreichbar", Color::Red),
    };

    let consent = if app.controller.consent_granted() {
        Span::raw("")
    } else {
        Span::styled(" [Zustimmung fehlt]", Style::default().fg(Color::Yellow))
    };

    let title = Line::from(vec![
        Span::styled(" Velo Fahrradberater ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("{} ", app.endpoint), Style::default().fg(Color::Gray)),
        Span::styled(health_text, Style::default().fg(health_color)),
        consent,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let presenter = app.presenter();
    let text = if presenter.turns.is_empty() && !presenter.loading {
        Text::from(vec![
            Line::from(Span::styled(
                "Frag nach dem passenden Fahrrad, nimm eine Schnellaktion (1-9)",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "oder starte mit w den Fahrradfinder.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in &presenter.turns {
            match turn {
                Turn::User(content) => {
                    lines.push(Line::from(Span::styled(
                        "Du:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(content.lines().map(|l| Line::from(l.to_string())));
                    lines.push(Line::default());
                }
                Turn::Assistant(rendered) => {
                    lines.push(Line::from(Span::styled(
                        "Berater:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(rendered.iter().cloned());
                    lines.push(Line::default());
                }
            }
        }

        if presenter.loading {
            lines.push(Line::from(Span::styled(
                "Berater:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Denke nach{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_quick_actions(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Cyan);

    let spans: Vec<Span> = app
        .controller
        .quick_actions()
        .iter()
        .take(9)
        .enumerate()
        .flat_map(|(i, action)| {
            [
                Span::styled(format!(" {} ", i + 1), key_style),
                Span::styled(format!(" {}  ", action.label), label_style),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = match &app.status {
        Some(status) => format!(" {} ", status),
        None => " Nachricht ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    let popup_open = app.show_consent || app.presenter().wizard.is_some();
    if app.input_mode == InputMode::Editing && !popup_open {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" SCHREIBEN ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let hints = footer_hints(app);

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)]
            .into_iter()
            .chain(hints.into_iter().flat_map(|(key, label)| {
                [Span::styled(key, key_style), Span::styled(label, label_style)]
            }))
            .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Key hints for the footer; the back hint only shows once there is an answer to undo.
fn footer_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.show_consent {
        vec![(" y ", " zustimmen "), (" n ", " ablehnen ")]
    } else if app.presenter().wizard.is_some() {
        let mut hints = vec![(" j/k ", " wählen "), (" Enter ", " weiter ")];
        if app.controller.wizard().is_some_and(|w| w.can_go_back()) {
            hints.push((" h ", " zurück "));
        }
        hints.push((" Esc ", " schließen "));
        hints
    } else {
        match app.input_mode {
            InputMode::Normal => vec![
                (" i ", " schreiben "),
                (" 1-9 ", " Schnellaktion "),
                (" w ", " Fahrradfinder "),
                (" j/k ", " scrollen "),
                (" q ", " beenden "),
            ],
            InputMode::Editing => vec![(" Enter ", " senden "), (" Esc ", " Menü ")],
        }
    }
}

/// Centered popup area of at most `width` x `height`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_wizard(view: &WizardView, frame: &mut Frame, area: Rect) {
    // Title line, gauge, and borders around the option list
    let height = view.options.len() as u16 + 6;
    let popup = popup_area(area, 60, height);

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Fahrradfinder ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [question_area, gauge_area, options_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let question = Paragraph::new(view.title.as_str())
        .style(Style::default().bold())
        .wrap(Wrap { trim: true });
    frame.render_widget(question, question_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .percent(u16::from(view.progress.percent))
        .label(format!(
            "Frage {} von ca. {}",
            view.progress.answered + 1,
            view.progress.estimated_total
        ));
    frame.render_widget(gauge, gauge_area);

    let items: Vec<ListItem> = view
        .options
        .iter()
        .enumerate()
        .map(|(i, label)| ListItem::new(format!(" {}. {} ", i + 1, label)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(view.selected));
    frame.render_stateful_widget(list, options_area, &mut state);
}

fn render_consent(frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 64, 9);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Datenschutz ");

    let text = Text::from(vec![
        Line::from("Deine Nachrichten werden zur Beantwortung an den"),
        Line::from("Beratungsdienst gesendet."),
        Line::default(),
        Line::from("Bist du damit einverstanden?"),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::Green).fg(Color::Black)),
            Span::raw(" ja   "),
            Span::styled(" n ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(" nein"),
        ]),
    ]);

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}
