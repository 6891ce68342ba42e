//! Dual-wheel picker component.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::app::picker::{Wheel, WheelPicker};
use crate::domain::model::Axis;

/// Renders the wheels of a [`WheelPicker`] side by side.
#[derive(Debug, Clone)]
pub struct WheelView {
    visible_rows: usize,
}

impl Default for WheelView {
    fn default() -> Self {
        Self::new(7)
    }
}

impl WheelView {
    pub fn new(visible_rows: u16) -> Self {
        Self {
            visible_rows: usize::from(visible_rows.max(1)),
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, title: &str, picker: &WheelPicker) {
        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let axes: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|axis| picker.wheel(*axis).is_configured())
            .collect();
        if axes.is_empty() {
            let placeholder = Paragraph::new("No ranges configured")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, inner);
            return;
        }

        let constraints: Vec<Constraint> = axes
            .iter()
            .map(|_| Constraint::Ratio(1, axes.len() as u32))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(inner);

        let focus = picker.focus();
        for (axis, column) in axes.iter().zip(columns.iter()) {
            let wheel = picker.wheel(*axis);
            self.render_wheel(frame, *column, wheel, focus == Some(*axis));
        }
    }

    fn render_wheel(&self, frame: &mut Frame<'_>, area: Rect, wheel: &Wheel, has_focus: bool) {
        let mut border = Style::default().fg(Color::Gray);
        if has_focus {
            border = border.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        let block = Block::default()
            .title(wheel.title().unwrap_or_default().to_string())
            .borders(Borders::ALL)
            .border_style(border);

        let items: Vec<ListItem<'static>> = visible_window(wheel, self.visible_rows)
            .map(|index| row_item(wheel, index))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}

/// Indices of the rows drawn for `wheel`, keeping the highlighted row centred where possible.
pub fn visible_window(wheel: &Wheel, visible_rows: usize) -> std::ops::Range<usize> {
    let len = wheel.rows().len();
    let visible = visible_rows.min(len);
    let highlighted = wheel.highlighted().unwrap_or(0);
    let start = highlighted
        .saturating_sub(visible / 2)
        .min(len.saturating_sub(visible));
    start..start + visible
}

fn row_item(wheel: &Wheel, index: usize) -> ListItem<'static> {
    let (_, label) = &wheel.rows()[index];
    let marker = if wheel.selected() == Some(index) {
        "● "
    } else {
        "  "
    };
    let mut style = Style::default();
    if wheel.highlighted() == Some(index) {
        style = style.fg(Color::Black).bg(Color::Cyan);
    }
    ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(label.clone(), style),
    ]))
}
