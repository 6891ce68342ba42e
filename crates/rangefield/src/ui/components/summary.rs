//! Form summary component.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};

use crate::app::form::Form;

/// Lists every field of a form with its display value and validation status.
#[derive(Debug, Default)]
pub struct FormSummary;

impl FormSummary {
    /// Render `form` inside `area`, highlighting the field at `current`.
    ///
    /// `titles` maps field keys to the labels shown to users.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        form: &Form,
        titles: &[(String, String)],
        current: usize,
    ) {
        let block = Block::default()
            .title(if form.is_dirty() { "Form · modified" } else { "Form" })
            .borders(Borders::ALL);

        let items: Vec<ListItem<'static>> = summary_lines(form, titles)
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let mut item = ListItem::new(line);
                if index == current {
                    item = item.style(Style::default().add_modifier(Modifier::REVERSED));
                }
                item
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}

/// One line per field: title, display value (or a placeholder), and a failure marker.
pub fn summary_lines(form: &Form, titles: &[(String, String)]) -> Vec<Line<'static>> {
    form.fields()
        .map(|field| {
            let title = titles
                .iter()
                .find(|(key, _)| key == field.key())
                .map(|(_, title)| title.clone())
                .unwrap_or_else(|| field.key().to_string());
            let display = field.display_value();
            let mut spans = vec![
                Span::styled(title, Style::default().fg(Color::Gray)),
                Span::raw(": "),
            ];
            if display.is_empty() {
                spans.push(Span::styled(
                    "—".to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
            } else {
                spans.push(Span::styled(display, Style::default().fg(Color::Cyan)));
            }
            if let Err(failure) = field.validate() {
                spans.push(Span::styled(
                    format!("  ! {}", failure.message),
                    Style::default().fg(Color::Red),
                ));
            }
            Line::from(spans)
        })
        .collect()
}
