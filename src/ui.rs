pub mod layout;
pub mod screen;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    app::App,
    controller::Operation,
    session::{OptionClass, QuizSession},
    ui::layout::{centered_rect, max_scroll, spinner, tail_fit},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn help_line(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
}

/// Draw whichever screen the controller is on, plus any alert on top
pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.controller.view()).render(app, f);

    if let Some(alert) = &app.alert {
        render_alert(alert, f);
    }
}

pub fn render_upload(app: &App, f: &mut Frame) {
    let controller = &app.controller;
    let busy = controller.pending();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // path input
            Constraint::Length(3), // question count
            Constraint::Length(1), // triggers
            Constraint::Length(1), // padding
            Constraint::Min(1),    // status
            Constraint::Length(1), // help
        ])
        .split(f.area());

    let title = Paragraph::new(vec![
        Line::styled("Note2Quiz", bold().fg(Color::Magenta)),
        Line::raw("Upload your course notes (PDF) to get started."),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let input_title = match controller.selected_file() {
        Some(file) => format!(" PDF file · selected: {} ", file.name),
        None => " PDF file ".to_string(),
    };
    let inner_width = chunks[1].width.saturating_sub(3) as usize;
    let input = Paragraph::new(Line::from(vec![
        Span::raw(tail_fit(&app.path_input, inner_width)),
        Span::styled("▏", dim()),
    ]))
    .block(Block::default().borders(Borders::ALL).title(input_title))
    .style(if busy.is_some() { dim() } else { Style::default() });
    f.render_widget(input, chunks[1]);

    let count = Paragraph::new(Line::from(vec![
        Span::raw("Questions: "),
        Span::styled(format!("‹ {} ›", controller.question_count()), bold()),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .style(if busy.is_some() { dim() } else { Style::default() });
    f.render_widget(count, chunks[2]);

    let (quiz_label, recap_label) = match busy {
        Some(Operation::Generating) => ("Generating...", "Get Short Recap"),
        Some(Operation::Recapping) => ("Generate Quiz", "Generating Recap..."),
        None => ("Generate Quiz", "Get Short Recap"),
    };
    let trigger_style = if controller.can_request() {
        bold().fg(Color::Cyan)
    } else {
        dim()
    };
    let triggers = Paragraph::new(Line::from(vec![
        Span::styled(format!("[ {quiz_label} ]"), trigger_style),
        Span::raw("   "),
        Span::styled(format!("[ {recap_label} ]"), trigger_style),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(triggers, chunks[3]);

    if !controller.status().is_empty() {
        let mut spans = Vec::new();
        if busy.is_some() {
            spans.push(Span::styled(
                format!("{} ", spinner(app.spinner_frame)),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::raw(controller.status()));
        let status = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(status, chunks[5]);
    }

    f.render_widget(
        help_line("(enter) select path | (tab) questions | (ctrl+g) quiz | (ctrl+r) recap | (esc) quit"),
        chunks[6],
    );
}

pub fn render_quiz(app: &App, session: &QuizSession, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(1),    // card
            Constraint::Length(1), // help
        ])
        .split(f.area());

    let title = Paragraph::new(Line::styled(
        "Your Generated Quiz",
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let Some(question) = session.current_question() else {
        let results = Paragraph::new(vec![
            Line::styled("Quiz Complete!", bold()),
            Line::raw(""),
            Line::raw(session.summary()),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(results, centered_rect(50, 5, chunks[1]));
        f.render_widget(help_line("(enter/u) upload new PDF | (esc) quit"), chunks[2]);
        return;
    };

    let mut lines = vec![
        Line::styled(session.progress_label().unwrap_or_default(), bold()),
        Line::styled(
            format!("({})", question.difficulty),
            Style::default().add_modifier(Modifier::ITALIC),
        ),
        Line::raw(""),
        Line::styled(question.question.clone(), bold()),
        Line::raw(""),
    ];

    let enabled = session.options_enabled();
    for (i, option) in question.options.iter().enumerate() {
        let highlighted = enabled && i == app.highlighted;
        let marker = if highlighted { "▶ " } else { "  " };
        let style = match session.option_class(option) {
            OptionClass::Correct => bold().fg(Color::Green),
            OptionClass::Incorrect => bold().fg(Color::Red),
            OptionClass::Neutral if highlighted => bold().add_modifier(Modifier::UNDERLINED),
            OptionClass::Neutral if !enabled => dim(),
            OptionClass::Neutral => Style::default(),
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}. {}", i + 1, option), style),
        ]));
    }

    if let Some(feedback) = session.feedback() {
        let color = if session.option_class(session.selected_option().unwrap_or_default())
            == OptionClass::Correct
        {
            Color::Green
        } else {
            Color::Red
        };
        lines.push(Line::raw(""));
        lines.push(Line::styled(feedback, bold().fg(color)));
        lines.push(Line::styled("[ Next ]", bold().fg(Color::Cyan)));
    }

    let card = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(card, chunks[1]);

    let help = if enabled {
        "(↑/↓ enter or 1-9) choose | (u) upload new PDF | (esc) quit"
    } else {
        "(enter/n) next | (u) upload new PDF | (esc) quit"
    };
    f.render_widget(help_line(help), chunks[2]);
}

pub fn render_recap(app: &App, recap: &str, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let inner = Block::default().borders(Borders::ALL).inner(chunks[0]);
    let text = Paragraph::new(recap).wrap(Wrap { trim: false });
    let limit = max_scroll(text.line_count(inner.width), inner.height);
    app.recap_max_scroll.set(Some(limit));

    let scroll = app.recap_scroll.min(limit);
    let body = text
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Short Recap ", bold().fg(Color::Magenta))),
        )
        .scroll((scroll, 0));
    f.render_widget(body, chunks[0]);

    f.render_widget(
        help_line("(↑/↓ PgUp/PgDn) scroll | (u/b) upload new PDF | (esc) quit"),
        chunks[1],
    );
}

fn render_alert(message: &str, f: &mut Frame) {
    let area: Rect = centered_rect(56, 5, f.area());
    let popup = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Notice ")
                .title_bottom(Line::from(" any key to dismiss ").alignment(Alignment::Right)),
        );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}
