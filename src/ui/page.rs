use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use tui_input::Input;
use unicode_width::UnicodeWidthStr;

use crate::store::{CommandStatus, CurrentCommand, CurrentPage, State};

use super::layout::split_layout;

/// Render the current page. Completed pages are not re-rendered; the view
/// always shows the live page only.
pub fn draw(frame: &mut Frame<'_>, state: &State, editor: &Input) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }
    let Some(page) = state.pages.current.as_ref() else {
        return;
    };

    let header_height = header_height(page);
    let body_height = wrapped_height(&page.body, area.width).min(area.height / 2);
    let layout = split_layout(area, header_height, body_height);

    draw_header(frame, layout.header, page);
    draw_body(frame, layout.body, page);
    if let Some(command) = page.command.as_ref() {
        draw_output(frame, layout.output, command, state.app.pin_output);
        draw_command_line(frame, layout.command, command);
    }
    draw_prompt(frame, layout.prompt, state, page, editor);
}

fn header_height(page: &CurrentPage) -> u16 {
    u16::from(page.title.is_some()) + u16::from(page.subtitle.is_some())
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, page: &CurrentPage) {
    if area.height == 0 {
        return;
    }
    let mut lines = Vec::new();
    if let Some(title) = page.title.as_deref() {
        lines.push(Line::from(Span::styled(
            format!(" {title} "),
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(subtitle) = page.subtitle.as_deref() {
        lines.push(Line::from(Span::styled(
            format!("~ {subtitle} ~"),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, page: &CurrentPage) {
    frame.render_widget(
        Paragraph::new(page.body.as_str()).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_output(frame: &mut Frame<'_>, area: Rect, command: &CurrentCommand, pin: bool) {
    if area.height == 0 {
        return;
    }
    let lines = output_lines(command);
    let visible = visible_window(&lines, area.height as usize, pin);
    let text: Vec<Line<'_>> = visible
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                line.clone(),
                Style::default().fg(Color::DarkGray),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(text), area);
}

fn draw_command_line(frame: &mut Frame<'_>, area: Rect, command: &CurrentCommand) {
    let (marker, color) = match command.status {
        CommandStatus::Unstarted => (">_", Color::LightBlue),
        CommandStatus::Running => ("...", Color::LightYellow),
        CommandStatus::InputRequired => ("?", Color::Yellow),
        CommandStatus::Finished if command.error => ("x", Color::Red),
        CommandStatus::Finished => ("ok", Color::LightGreen),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("{marker} {}", command.command_line()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))),
        area,
    );
}

fn draw_prompt(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &State,
    page: &CurrentPage,
    editor: &Input,
) {
    if area.height == 0 {
        return;
    }
    let hint_area = Rect::new(area.x, area.y, area.width, 1);

    let awaiting_input = page
        .command
        .as_ref()
        .is_some_and(|command| command.status == CommandStatus::InputRequired);
    if awaiting_input {
        let line = build_input_line(
            editor.value(),
            editor.visual_cursor(),
            hint_area.width as usize,
        );
        frame.render_widget(Paragraph::new(line), hint_area);
    } else if let Some(hint) = prompt_hint(state, page) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            ))),
            hint_area,
        );
    }

    if area.height >= 2 {
        let progress_area = Rect::new(area.x, area.y + 1, area.width, 1);
        let progress = format!("{}/{}", state.pages.position(), state.pages.total());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                progress,
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Right),
            progress_area,
        );
    }
}

/// Stdin editor line with a software caret; avoids moving the terminal
/// cursor around the frame.
fn build_input_line(input: &str, cursor: usize, width: usize) -> Line<'static> {
    let mut spans = vec![Span::styled(
        ">_ ".to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];

    let chars: Vec<char> = input.chars().collect();
    let max_text_width = width.saturating_sub(4).max(1);
    let cursor = cursor.min(chars.len());
    let start = if cursor >= max_text_width {
        cursor.saturating_sub(max_text_width.saturating_sub(1))
    } else {
        0
    };
    let end = (start + max_text_width).min(chars.len());

    for (index, ch) in chars[start..end].iter().enumerate() {
        let style = if start + index == cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(ch.to_string(), style));
    }
    if cursor >= end {
        spans.push(Span::styled(
            " ".to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    Line::from(spans)
}

fn prompt_hint(state: &State, page: &CurrentPage) -> Option<&'static str> {
    if !state.app.wait_for_trigger {
        return None;
    }
    match page.command.as_ref() {
        None => Some("(press <space> to continue)"),
        Some(command) => match command.status {
            CommandStatus::Unstarted => Some("(press <space> to run)"),
            CommandStatus::Finished => Some("(press <space> to continue)"),
            CommandStatus::Running | CommandStatus::InputRequired => None,
        },
    }
}

/// Flatten output chunks into display lines; chunks may span several lines
/// or end mid-line.
fn output_lines(command: &CurrentCommand) -> Vec<String> {
    let mut joined = String::new();
    for record in command.output.iter().flatten() {
        joined.push_str(&record.text);
    }
    if joined.is_empty() {
        return Vec::new();
    }
    joined
        .trim_end_matches('\n')
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// All lines when they fit; otherwise the tail. `pin` forces the tail view
/// even when a taller window would fit more context above it.
fn visible_window(lines: &[String], height: usize, pin: bool) -> Vec<String> {
    if lines.len() <= height && !pin {
        return lines.to_vec();
    }
    let keep = height.min(lines.len());
    lines[lines.len() - keep..].to_vec()
}

fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| {
            let cells = UnicodeWidthStr::width(line).max(1);
            cells.div_ceil(width) as u16
        })
        .sum()
}
