pub mod profile;
pub mod task_panel;
pub mod timer_panel;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{App, InputMode};

const HORIZONTAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.tracker.progress().snapshot();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let footer_height = match self.mode {
            InputMode::Browse => 3,
            InputMode::EditTitle | InputMode::EditDescription => 4,
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),             // header
                Constraint::Min(8),                // panels
                Constraint::Length(footer_height), // help or task editor
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("LevelUp", bold_style.fg(Color::Magenta)),
            Span::raw(format!("   Level {} ", snap.level)),
            Span::styled(snap.tier_name, bold_style),
            Span::raw(format!("   EXP {}", snap.exp)),
            Span::styled(
                format!("   Coins {}", snap.coins),
                Style::default().fg(Color::Yellow),
            ),
        ]));
        header.render(rows[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(columns[0]);

        timer_panel::render(self.tracker.timer(), left[0], buf);
        task_panel::render(self.tracker.progress(), self.selected, left[1], buf);
        profile::render(&snap, columns[1], buf);

        match self.mode {
            InputMode::Browse => render_help(self, rows[2], buf),
            InputMode::EditTitle | InputMode::EditDescription => render_editor(self, rows[2], buf),
        }
    }
}

fn render_help(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![Line::from(Span::styled(
        "(space) start/pause  (r)eset  (f)ocus  (b)reak  +/- focus  [/] break  (a)uto-break  (n)ew task  (enter) done/undo  (q)uit",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))];
    if let Some(message) = &app.message {
        lines.insert(
            0,
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Cyan),
            )),
        );
    }
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_editor(app: &App, area: Rect, buf: &mut Buffer) {
    let active = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::Gray);
    let (title_style, desc_style) = match app.mode {
        InputMode::EditTitle => (active, inactive),
        _ => (inactive, active),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Title: ", title_style),
            Span::raw(app.draft.title.clone()),
        ]),
        Line::from(vec![
            Span::styled("Description: ", desc_style),
            Span::raw(app.draft.description.clone()),
        ]),
    ];
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("New task  (tab) switch field  (enter) add  (esc) cancel"),
        )
        .render(area, buf);
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelup::{storage::SqliteSlotStore, task::TaskInput, tracker::Tracker};

    fn test_app() -> App {
        App::new(Tracker::load(SqliteSlotStore::open_in_memory().unwrap()))
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_dashboard_renders_clock_and_level() {
        let app = test_app();
        let out = rendered(&app, 120, 30);
        assert!(out.contains("25:00"));
        assert!(out.contains("Novice"));
        assert!(out.contains("No pending tasks"));
    }

    #[test]
    fn test_dashboard_lists_tasks() {
        let mut app = test_app();
        app.tracker
            .progress_mut()
            .add_task(TaskInput::new("Gym", ""))
            .unwrap();
        let out = rendered(&app, 120, 30);
        assert!(out.contains("Gym"));
        assert!(out.contains("+10 EXP"));
    }

    #[test]
    fn test_editor_replaces_help() {
        let mut app = test_app();
        app.mode = InputMode::EditTitle;
        app.draft.title = "Draft title".to_string();
        let out = rendered(&app, 120, 30);
        assert!(out.contains("Draft title"));
        assert!(out.contains("New task"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = test_app();
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("abc", 0), "");
    }
}
