//! Screen rendering

use crate::agent::{ActionKind, AgentService, FactCheckResult};
use crate::app::{App, ChatFocus, TextInput};
use crate::markdown::{self, sanitize};
use crate::state_machine::{FactCheckField, Message, Sender, View};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn render<A: AgentService + 'static>(app: &App<A>, frame: &mut Frame) {
    let area = frame.area();
    match app.state().view() {
        View::Landing => render_landing(frame, area),
        View::Chat => render_chat(app, frame, area),
        View::FactChecker => render_fact_checker(app, frame, area),
    }
}

fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn header(frame: &mut Frame, area: Rect, title: &str, color: Color, right: String) {
    let right_width = u16::try_from(right.chars().count() + 1).unwrap_or(u16::MAX);
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(right_width)]).areas(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {title}"), bold(color)))),
        left_area,
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(right, dim()))).alignment(Alignment::Right),
        right_area,
    );
}

fn footer(frame: &mut Frame, area: Rect, keys: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {key} "), bold(Color::Cyan)));
        spans.push(Span::styled(format!("{label}  "), dim()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
        area,
    );
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("⚠ {}", sanitize(message)),
        bold(Color::Red),
    ))
}

fn pending_line(label: &str, frame: u8) -> Line<'static> {
    let dots = ".".repeat(usize::from(frame) + 1);
    Line::from(Span::styled(
        format!("🛰  {label}{dots}"),
        dim().add_modifier(Modifier::ITALIC),
    ))
}

/// Single-line input box that scrolls horizontally to keep the cursor visible
fn render_input(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    title: &str,
    placeholder: &str,
    focused: bool,
) {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {title} "));

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = input.cursor();
    let scroll_offset = if inner_width > 0 && cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let content = if input.value().is_empty() {
        Span::styled(placeholder.to_string(), dim())
    } else {
        let visible: String = input
            .value()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Span::styled(visible, Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if focused {
        let cursor_x = u16::try_from(cursor - scroll_offset).unwrap_or(u16::MAX);
        frame.set_cursor_position((
            area.x.saturating_add(cursor_x).saturating_add(1).min(area.right().saturating_sub(2)),
            area.y + 1,
        ));
    }
}

// ============================================================================
// Landing
// ============================================================================

fn render_landing(frame: &mut Frame, area: Rect) {
    let features = [
        (
            "🛸 Space Exploration",
            "Journey through galaxies, nebulae, and cosmic phenomena.",
        ),
        (
            "🌠 Personalized Learning",
            "Explanations tailored to your cosmic curiosity.",
        ),
        (
            "🔍 Fact Verification",
            "Accuracy assessments and confidence scores for cosmic knowledge.",
        ),
    ];

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("🚀 Cosmic Quest", bold(Color::Cyan))).centered(),
        Line::default(),
        Line::from(Span::styled(
            "Embark on an infinite journey through space and ideas",
            Style::default().fg(Color::LightCyan),
        ))
        .centered(),
        Line::default(),
    ];
    for (title, description) in features {
        lines.push(Line::from(Span::styled(title, bold(Color::Magenta))).centered());
        lines.push(Line::from(Span::styled(description, Style::default().fg(Color::Gray))).centered());
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled("[ Enter ] Launch Into Space", bold(Color::Yellow))).centered());
    lines.push(Line::from(Span::styled("Begin your cosmic adventure", dim())).centered());

    let [body, footer_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered().border_style(Style::default().fg(Color::Blue)))
            .wrap(Wrap { trim: true }),
        body,
    );
    footer(frame, footer_area, &[("Enter", "start"), ("Esc", "quit")]);
}

// ============================================================================
// Chat
// ============================================================================

fn render_chat<A: AgentService + 'static>(app: &App<A>, frame: &mut Frame, area: Rect) {
    let [header_area, chat_area, image_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(if app.chat_focus == ChatFocus::ImagePath { 3 } else { 1 }),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    header(
        frame,
        header_area,
        "🚀 Cosmic Quest",
        Color::Cyan,
        app.base_url().to_string(),
    );

    let lines = conversation_lines(app);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner_width = chat_area.width.saturating_sub(2);
    let inner_height = chat_area.height.saturating_sub(2);
    let bottom = wrapped_height(&lines, inner_width).saturating_sub(inner_height);
    let scroll = bottom.saturating_sub(app.chat_scroll);

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        chat_area,
    );

    render_attachment(app, frame, image_area);

    let pending = app.state().chat().is_pending();
    render_input(
        frame,
        input_area,
        &app.composer,
        if pending { "Awaiting transmission" } else { "Ask" },
        "What cosmic mysteries shall we explore...",
        app.chat_focus == ChatFocus::Composer,
    );

    footer(
        frame,
        footer_area,
        &[
            ("Enter", "send"),
            ("^O", "image"),
            ("^E/^D/^S", "actions"),
            ("Alt+N", "suggestion"),
            ("^F", "fact checker"),
            ("^C", "quit"),
        ],
    );
}

fn render_attachment<A: AgentService + 'static>(app: &App<A>, frame: &mut Frame, area: Rect) {
    if app.chat_focus == ChatFocus::ImagePath {
        let title = match &app.notice {
            Some(notice) => format!("Image path (Enter attach, Esc cancel): {}", sanitize(notice)),
            None => "Image path (Enter attach, Esc cancel)".to_string(),
        };
        render_input(frame, area, &app.image_path, &title, "path/to/nebula.png", true);
        return;
    }

    let line = match &app.image {
        Some(image) => Line::from(vec![
            Span::styled(" 🖼  ", Style::default()),
            Span::styled(
                sanitize(&image.path().display().to_string()),
                Style::default().fg(Color::LightMagenta),
            ),
            Span::styled(format!(" ({})", image.media_type()), dim()),
        ]),
        None => Line::from(Span::styled(" No image attached", dim())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Rows the lines occupy once wrapped to `width`
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn conversation_lines<A: AgentService + 'static>(app: &App<A>) -> Vec<Line<'static>> {
    let chat = app.state().chat();
    let pending = chat.is_pending();
    let actionable_id = chat.latest_actionable().map(|m| m.id.clone());
    let suggestions_id = chat
        .messages()
        .iter()
        .rev()
        .find(|m| m.suggestions.is_some())
        .map(|m| m.id.clone());

    let mut lines = Vec::new();
    for message in chat.messages() {
        message_lines(message, &mut lines);

        if !pending && actionable_id.as_ref() == Some(&message.id) {
            lines.push(action_line());
        }
        if let Some(suggestions) = &message.suggestions {
            let selectable = !pending && suggestions_id.as_ref() == Some(&message.id);
            suggestion_lines(suggestions, selectable, &mut lines);
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(pending_line("Navigating the cosmos", app.animation_frame));
    }
    if let Some(error) = chat.error() {
        lines.push(error_line(error));
    }
    lines
}

fn message_lines(message: &Message, lines: &mut Vec<Line<'static>>) {
    match message.sender {
        Sender::User => {
            lines.push(Line::from(Span::styled("🧑‍🚀 You", bold(Color::Cyan))));
            if let Some(text) = &message.text {
                for line in sanitize(text).lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(Color::LightCyan),
                    )));
                }
            }
            if let Some(image) = &message.image {
                lines.push(Line::from(Span::styled(
                    format!("📎 {}", sanitize(image)),
                    Style::default().fg(Color::LightMagenta),
                )));
            }
        }
        Sender::Agent => {
            lines.push(Line::from(Span::styled("🤖 Navigator", bold(Color::Magenta))));
            if let Some(text) = &message.text {
                lines.extend(markdown::render(text));
            }
            for url in &message.images {
                lines.push(Line::from(Span::styled(
                    format!("🖼  {}", sanitize(url)),
                    Style::default().fg(Color::LightBlue).add_modifier(Modifier::UNDERLINED),
                )));
            }
            if let Some(check) = &message.fact_check {
                fact_check_summary(check, lines);
            }
        }
    }
}

fn fact_check_summary(check: &FactCheckResult, lines: &mut Vec<Line<'static>>) {
    let (label, color) = if check.is_accurate {
        ("✔ Verified", Color::Green)
    } else {
        ("⚠ Issues Found", Color::Yellow)
    };
    lines.push(Line::from(vec![
        Span::styled(label, bold(color)),
        Span::styled(format!("  confidence {}", check.confidence_percent()), dim()),
    ]));
    if let Some(recommendation) = check.recommendation() {
        lines.push(Line::from(Span::styled(sanitize(recommendation), dim())));
    }
}

fn action_line() -> Line<'static> {
    let keys = ["^E", "^D", "^S"];
    let icons = ["🌟", "🔭", "🌌"];
    let mut spans = Vec::new();
    for ((action, key), icon) in ActionKind::ALL.iter().zip(keys).zip(icons) {
        spans.push(Span::styled(format!("[{key}] "), bold(Color::Cyan)));
        spans.push(Span::styled(
            format!("{icon} {}   ", action.label()),
            Style::default().fg(Color::Green),
        ));
    }
    Line::from(spans)
}

fn suggestion_lines(suggestions: &[String], selectable: bool, lines: &mut Vec<Line<'static>>) {
    for (i, question) in suggestions.iter().enumerate() {
        let marker = if selectable && i < 9 {
            format!("[Alt+{}] ", i + 1)
        } else {
            "• ".to_string()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, bold(Color::Cyan)),
            Span::styled(sanitize(question), Style::default().fg(Color::LightYellow)),
        ]));
    }
}

// ============================================================================
// Fact checker
// ============================================================================

fn render_fact_checker<A: AgentService + 'static>(app: &App<A>, frame: &mut Frame, area: Rect) {
    let [header_area, intro_area, query_area, answer_area, result_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

    header(
        frame,
        header_area,
        "🔍 Cosmic Fact Checker",
        Color::Green,
        app.base_url().to_string(),
    );

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled("🔬 Verify Scientific Information", bold(Color::LightGreen))),
            Line::from(Span::styled(
                "Cross-reference space information against scientific sources and get a confidence score.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: true }),
        intro_area,
    );

    render_input(
        frame,
        query_area,
        app.fact_input(FactCheckField::OriginalQuery),
        "Original question",
        "e.g., What is the distance to Andromeda Galaxy?",
        app.fact_field == FactCheckField::OriginalQuery,
    );
    render_input(
        frame,
        answer_area,
        app.fact_input(FactCheckField::AnswerToCheck),
        "Answer to check",
        "Enter the information you want to fact-check...",
        app.fact_field == FactCheckField::AnswerToCheck,
    );

    render_fact_check_result(app, frame, result_area);

    footer(
        frame,
        footer_area,
        &[
            ("Tab", "field"),
            ("Enter", "check"),
            ("^L", "clear"),
            ("Esc", "back to chat"),
            ("^C", "quit"),
        ],
    );
}

fn render_fact_check_result<A: AgentService + 'static>(app: &App<A>, frame: &mut Frame, area: Rect) {
    let form = app.state().fact_check();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Assessment ");

    let Some(result) = form.result() else {
        let mut lines = Vec::new();
        if form.is_pending() {
            lines.push(pending_line("Fact checking", app.animation_frame));
        }
        if let Some(error) = form.error() {
            lines.push(error_line(error));
        }
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [verdict_area, gauge_area, details_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let (verdict, color) = if result.is_accurate {
        ("✔ Information appears accurate", Color::Green)
    } else {
        ("⚠ Issues found with accuracy", Color::Red)
    };
    frame.render_widget(Paragraph::new(Span::styled(verdict, bold(color))), verdict_area);

    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(result.confidence_ratio())
            .label(format!("Confidence Score {}", result.confidence_percent())),
        gauge_area,
    );

    let mut lines = Vec::new();
    list_section("Verified Facts", "✓", Color::Green, &result.verified_facts, &mut lines);
    list_section("Issues Found", "✗", Color::Red, &result.issues_found, &mut lines);
    if let Some(recommendation) = result.recommendation() {
        lines.push(Line::from(Span::styled("Recommendations", bold(Color::Cyan))));
        lines.push(Line::from(sanitize(recommendation)));
    }
    if let Some(error) = form.error() {
        lines.push(error_line(error));
    }
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        details_area,
    );
}

fn list_section(
    title: &str,
    bullet: &str,
    color: Color,
    items: &[String],
    lines: &mut Vec<Line<'static>>,
) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(title.to_string(), bold(color))));
    for item in items {
        lines.push(Line::from(vec![
            Span::styled(format!("{bullet} "), Style::default().fg(color)),
            Span::raw(sanitize(item)),
        ]));
    }
    lines.push(Line::default());
}
