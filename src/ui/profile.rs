use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use levelup::store::Snapshot;

pub fn render(snap: &Snapshot, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // level and tier
            Constraint::Length(1), // gauge
            Constraint::Length(1), // exp / next
            Constraint::Length(1), // padding
            Constraint::Length(3), // counters
            Constraint::Min(0),    // tip
        ])
        .split(inner);

    Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Level {}", snap.level),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            snap.tier_name,
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .render(chunks[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .percent(snap.progress_percent)
        .render(chunks[1], buf);

    Paragraph::new(format!(
        "{} EXP   next at {} EXP",
        snap.exp, snap.next_threshold
    ))
    .style(Style::default().fg(Color::Gray))
    .render(chunks[2], buf);

    Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Coins     "),
            Span::styled(snap.coins.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(format!("Sessions  {}", snap.sessions_today)),
        Line::from(format!("Focus     {}m", snap.focus_minutes_today)),
    ])
    .render(chunks[4], buf);

    Paragraph::new("Complete a focus session or finish a task to earn EXP and coins.")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);
}
