use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use levelup::{storage::SlotStore, store::ProgressionStore, task::Task};

use crate::{report::tags_line, ui::truncate};

fn task_item(task: &Task, title_width: usize) -> ListItem<'static> {
    let (mark, title_style) = if task.is_done() {
        (
            "[x] ",
            Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ] ", Style::default().add_modifier(Modifier::BOLD))
    };
    ListItem::new(Line::from(vec![
        Span::raw(mark),
        Span::styled(truncate(&task.title, title_width), title_style),
        Span::raw("  "),
        Span::styled(tags_line(task), Style::default().fg(Color::Cyan)),
    ]))
}

pub fn render<S: SlotStore>(
    progress: &ProgressionStore<S>,
    selected: usize,
    area: Rect,
    buf: &mut Buffer,
) {
    let pending = progress.pending_tasks().count();
    let done = progress.completed_tasks().count();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Tasks · {} pending · {} done ", pending, done));

    if progress.tasks().is_empty() {
        Paragraph::new("No pending tasks. Press (n) to add one and start leveling up.")
            .style(Style::default().fg(Color::Gray))
            .block(block)
            .render(area, buf);
        return;
    }

    // leave room for the checkbox and the tag column
    let title_width = (area.width as usize).saturating_sub(40).max(8);
    let items: Vec<ListItem> = progress
        .pending_tasks()
        .chain(progress.completed_tasks())
        .map(|task| task_item(task, title_width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(selected));
    StatefulWidget::render(list, area, buf, &mut state);
}
