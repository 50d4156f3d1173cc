use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use levelup::timer::{Phase, PomodoroTimer, TimerState};

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Focus => Color::Magenta,
        Phase::Break => Color::Green,
    }
}

pub fn render(timer: &PomodoroTimer, area: Rect, buf: &mut Buffer) {
    let color = phase_color(timer.phase());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" Pomodoro · {} ", timer.phase()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // clock
            Constraint::Length(1), // state
            Constraint::Length(1), // elapsed gauge
            Constraint::Length(1), // padding
            Constraint::Length(1), // settings
        ])
        .split(inner);

    Paragraph::new(Span::styled(
        timer.clock(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let state = match timer.state() {
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Idle if timer.has_pending_start() => "starting break…",
        TimerState::Idle => "ready",
    };
    Paragraph::new(Span::styled(
        state,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let total = timer.total_secs().max(1);
    let elapsed = total.saturating_sub(timer.seconds_remaining());
    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((elapsed as f64 / total as f64).clamp(0.0, 1.0))
        .label("")
        .render(chunks[2], buf);

    let settings = timer.settings();
    Paragraph::new(Line::from(vec![
        Span::raw(format!("Focus {}m", settings.focus_minutes)),
        Span::raw("   "),
        Span::raw(format!("Break {}m", settings.break_minutes)),
        Span::raw("   "),
        Span::raw(format!(
            "Auto-break {}",
            if settings.auto_start_break { "on" } else { "off" }
        )),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}
