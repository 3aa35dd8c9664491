//! TUI views and rendering
//!
//! Draws the session as held by the App; the only state written here is the
//! scroll bound of the reflections pane.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::trace;

use super::app::App;
use crate::orchestrator::{Phase, Reflection};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 191, 255); // Deep sky blue
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const INITIAL: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const SECONDARY: Color = Color::Rgb(218, 165, 32); // Goldenrod
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const NOTICE: Color = Color::Rgb(255, 215, 0); // Gold
    pub const DIM: Color = Color::DarkGray;
}

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(app: &mut App, frame: &mut Frame) {
    let banner_height = if app.session().error().is_some() || app.notice().is_some() {
        4
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Length(5),             // Input
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(0),                // Reflections
            Constraint::Length(1),             // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_input(app, frame, chunks[1]);
    if banner_height > 0 {
        render_banner(app, frame, chunks[2]);
    }
    render_reflections(app, frame, chunks[3]);
    render_footer(app, frame, chunks[4]);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session = app.session();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Guidance through {} ", session.lens()),
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(app.driver().reflector().describe(), Style::default().fg(colors::DIM)),
        Span::raw(" │ "),
        Span::styled(session.phase().label(), phase_style(session.phase())),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" A Healing Reflection "));

    frame.render_widget(header, area);
}

fn phase_style(phase: Phase) -> Style {
    let color = match phase {
        Phase::Idle => Color::Gray,
        Phase::LoadingInitial | Phase::LoadingSecondary => colors::NOTICE,
        Phase::Ready | Phase::Complete => Color::Green,
        Phase::Error => colors::ERROR,
    };
    Style::default().fg(color)
}

/// Render the draft with a block cursor at the cursor position
fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = app.input();
    let enabled = input.is_enabled();
    let input_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(colors::DIM)
    };

    let mut spans = Vec::new();
    if input.is_empty() && enabled {
        spans.push(Span::styled(
            "e.g. I am experiencing persistent anxiety and wish to understand its underlying emotional conflict.",
            Style::default().fg(colors::DIM).add_modifier(Modifier::ITALIC),
        ));
    } else {
        let split = input
            .draft()
            .char_indices()
            .nth(input.cursor())
            .map(|(i, _)| i)
            .unwrap_or(input.draft().len());
        let (before, after) = input.draft().split_at(split);
        spans.push(Span::styled(before, input_style));

        if !enabled {
            spans.push(Span::styled(after, input_style));
        } else if after.is_empty() {
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        } else {
            let mut chars = after.chars();
            if let Some(c) = chars.next() {
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::Black).bg(Color::White),
                ));
                spans.push(Span::styled(chars.as_str(), input_style));
            }
        }
    }

    let title = if enabled {
        format!(" Share your concern for reflection under {} ", app.session().lens())
    } else {
        " Seeking insight... ".to_string()
    };

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_banner(app: &App, frame: &mut Frame, area: Rect) {
    let (text, color) = match (app.session().error_message(), app.notice()) {
        (Some(error), _) => (error, colors::ERROR),
        (None, Some(notice)) => (notice, colors::NOTICE),
        (None, None) => return,
    };

    let banner = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)))
        .wrap(Wrap { trim: true });

    frame.render_widget(banner, area);
}

fn push_reflection<'a>(lines: &mut Vec<Line<'a>>, title: String, color: Color, reflection: &'a Reflection) {
    lines.push(Line::from(vec![
        Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", reflection.received_at.format("%H:%M:%S")),
            Style::default().fg(colors::DIM),
        ),
    ]));
    lines.push(Line::from(""));
    let markdown_text = tui_markdown::from_str(&reflection.text);
    for line in markdown_text.lines {
        lines.push(line);
    }
    lines.push(Line::from(""));
}

fn spinner_line(app: &App, text: String) -> Line<'static> {
    let frame = SPINNER[app.spinner_frame() % SPINNER.len()];
    Line::from(Span::styled(format!("{} {}", frame, text), Style::default().fg(colors::NOTICE)))
}

fn render_reflections(app: &mut App, frame: &mut Frame, area: Rect) {
    trace!("render_reflections: called");
    let session = app.session();
    let lens = session.lens().to_string();
    let mut lines: Vec<Line> = Vec::new();

    match session.initial() {
        Some(initial) => {
            push_reflection(&mut lines, "Your Reflection".to_string(), colors::INITIAL, initial);

            match session.phase() {
                Phase::Ready => {
                    lines.push(Line::from(vec![
                        Span::raw("Press "),
                        Span::styled("Tab", Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
                        Span::raw(format!(" to continue this reflection through the lens of {}.", lens)),
                    ]));
                }
                Phase::LoadingSecondary => {
                    lines.push(spinner_line(app, format!("Seeking insight through {}...", lens)));
                }
                _ => {}
            }

            if let Some(secondary) = session.secondary() {
                push_reflection(
                    &mut lines,
                    format!("Through the Lens of {}", lens),
                    colors::SECONDARY,
                    secondary,
                );
            }
        }
        None if session.phase() == Phase::LoadingInitial => {
            lines.push(spinner_line(app, "Seeking insight...".to_string()));
        }
        None if session.error().is_none() => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "\"The key to well-being lies in understanding the echoes of our past and aligning with the harmony of {}.\"",
                    lens
                ),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Please share your concern above to receive a personalized reflection.",
                Style::default().fg(colors::DIM),
            )));
        }
        None => {}
    }

    // Content height accounting for line wrapping
    let viewport_height = area.height.saturating_sub(2) as usize;
    let viewport_width = area.width.saturating_sub(2) as usize;
    let content_height: usize = lines
        .iter()
        .map(|line| {
            let line_width = line.width();
            if viewport_width == 0 || line_width == 0 {
                1
            } else {
                line_width.div_ceil(viewport_width)
            }
        })
        .sum();
    let max_scroll = content_height.saturating_sub(viewport_height);
    let scroll = app.scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Reflections "))
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, area);
    app.max_scroll = max_scroll;
    app.scroll = scroll;
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(colors::KEYBIND));
    let dim = |t: &'static str| Span::styled(t, Style::default().fg(colors::DIM));

    let mut spans = Vec::new();
    if app.session().is_loading() {
        spans.extend([key("Esc"), dim(" cancel  ")]);
    } else {
        spans.extend([key("Enter"), dim(" request guidance  ")]);
    }
    if app.session().continue_visible() {
        spans.extend([key("Tab"), dim(" continue  ")]);
    }
    spans.extend([key("↑↓/PgUp/PgDn"), dim(" scroll  "), key("Ctrl-C"), dim(" quit")]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
