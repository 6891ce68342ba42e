//! Application loop for the picker TUI.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::app::form::Form;
use crate::app::picker::{self, WheelPicker};
use crate::app::range_field::InputView;
use crate::infra::config::{Config, Keybindings};
use crate::ui::components::summary::FormSummary;
use crate::ui::components::wheel::WheelView;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Interactive editor over the range fields of a form.
///
/// One shared [`WheelPicker`] is attached to whichever field is current; moving to another field
/// detaches it and attaches it there.
pub struct PickerApp {
    form: Form,
    titles: Vec<(String, String)>,
    current: usize,
    picker: Rc<RefCell<WheelPicker>>,
    view: Rc<RefCell<dyn InputView>>,
    keys: Keybindings,
    wheel_view: WheelView,
    summary: FormSummary,
    status: Option<String>,
    should_quit: bool,
}

impl PickerApp {
    /// `titles` maps field keys to display titles; fields without one show their key.
    pub fn new(form: Form, titles: Vec<(String, String)>, config: &Config) -> Self {
        let picker = Rc::new(RefCell::new(
            WheelPicker::new().with_wrap(config.picker.wrap()),
        ));
        let view: Rc<RefCell<dyn InputView>> = picker.clone();
        let mut app = Self {
            form,
            titles,
            current: 0,
            picker,
            view,
            keys: config.keybindings.clone(),
            wheel_view: WheelView::new(config.picker.visible_rows()),
            summary: FormSummary,
            status: None,
            should_quit: false,
        };
        app.attach_current();
        app
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Stop editing and hand the form back.
    pub fn into_form(mut self) -> Form {
        self.detach_current();
        self.form
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Key of the field being edited.
    pub fn current_key(&self) -> Option<String> {
        self.form.keys().nth(self.current).map(str::to_string)
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }
        }
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(self.form.len() as u16 + 2),
                Constraint::Length(1),
            ])
            .split(size);

        let title = self
            .current_key()
            .map(|key| self.title_for(&key))
            .unwrap_or_else(|| "No fields".to_string());
        self.wheel_view
            .render(frame, layout[0], &title, &self.picker.borrow());
        self.summary
            .render(frame, layout[1], &self.form, &self.titles, self.current);

        let hint = self.status.clone().unwrap_or_else(|| {
            format!(
                "{}/{} move · {}/{} switch wheel · {} select · {} reset · tab next field · q quit",
                self.keys.up(),
                self.keys.down(),
                self.keys.left(),
                self.keys.right(),
                self.keys.confirm(),
                self.keys.reset()
            )
        });
        let status = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, layout[2]);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.cycle_field(true),
            KeyCode::BackTab => self.cycle_field(false),
            _ if matches_binding(self.keys.up(), &key) || key.code == KeyCode::Up => {
                self.picker.borrow_mut().move_up();
            }
            _ if matches_binding(self.keys.down(), &key) || key.code == KeyCode::Down => {
                self.picker.borrow_mut().move_down();
            }
            _ if matches_binding(self.keys.left(), &key)
                || matches_binding(self.keys.right(), &key)
                || matches!(key.code, KeyCode::Left | KeyCode::Right) =>
            {
                self.picker.borrow_mut().toggle_focus();
            }
            _ if matches_binding(self.keys.confirm(), &key) => self.commit(),
            _ if matches_binding(self.keys.reset(), &key) => self.reset_current(),
            _ => {}
        }
    }

    fn commit(&mut self) {
        let Some(key) = self.current_key() else {
            return;
        };
        let result = match self.form.range_field_mut(&key) {
            Ok(field) => picker::commit(&self.picker, field).map_err(anyhow::Error::from),
            Err(err) => Err(err.into()),
        };
        self.status = match result {
            Ok(()) => Some(format!(
                "{} = {}",
                self.title_for(&key),
                self.form.display_value(&key).unwrap_or_default()
            )),
            Err(err) => {
                warn!(field = %key, error = %err, "selection rejected");
                Some(format!("error: {err}"))
            }
        };
    }

    fn reset_current(&mut self) {
        if let Some(key) = self.current_key()
            && self.form.reset_field(&key).is_ok()
        {
            self.status = Some(format!("{} cleared", self.title_for(&key)));
        }
    }

    fn cycle_field(&mut self, forward: bool) {
        let len = self.form.len();
        if len == 0 {
            return;
        }
        self.detach_current();
        self.current = if forward {
            (self.current + 1) % len
        } else {
            (self.current + len - 1) % len
        };
        self.attach_current();
        self.status = None;
        debug!(field = ?self.current_key(), "switched field");
    }

    fn attach_current(&mut self) {
        let handle = Rc::downgrade(&self.view);
        if let Some(key) = self.current_key()
            && let Ok(field) = self.form.range_field_mut(&key)
        {
            field.attach_input_view(handle);
        }
    }

    fn detach_current(&mut self) {
        if let Some(key) = self.current_key()
            && let Ok(field) = self.form.range_field_mut(&key)
        {
            field.detach_input_view();
        }
    }

    fn title_for(&self, key: &str) -> String {
        self.titles
            .iter()
            .find(|(field, _)| field == key)
            .map(|(_, title)| title.clone())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Whether `key` matches a configured binding such as `j`, `enter`, or `space`.
pub fn matches_binding(binding: &str, key: &KeyEvent) -> bool {
    let binding = binding.trim().to_ascii_lowercase();
    match (binding.as_str(), key.code) {
        ("enter", KeyCode::Enter) => true,
        ("space", KeyCode::Char(' ')) => true,
        ("backspace", KeyCode::Backspace) => true,
        ("delete", KeyCode::Delete) => true,
        (name, KeyCode::Char(ch)) => {
            let mut chars = name.chars();
            chars.next() == Some(ch.to_ascii_lowercase()) && chars.next().is_none()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::backend::TestBackend;

    use crate::app::field::Field;
    use crate::domain::model::Axis;
    use crate::infra::catalog::FormCatalog;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn demo_app() -> PickerApp {
        let catalog = FormCatalog::demo().unwrap();
        let titles = catalog
            .fields
            .iter()
            .map(|spec| (spec.key.clone(), spec.title().to_string()))
            .collect();
        PickerApp::new(catalog.build_form().unwrap(), titles, &Config::default())
    }

    #[test]
    fn matches_named_and_character_bindings() {
        assert!(matches_binding("enter", &press(KeyCode::Enter)));
        assert!(matches_binding("J", &press(KeyCode::Char('j'))));
        assert!(!matches_binding("j", &press(KeyCode::Char('k'))));
        assert!(!matches_binding("enter", &press(KeyCode::Char('e'))));
    }

    #[test]
    fn keys_drive_selection_into_form() {
        let mut app = demo_app();
        assert_eq!(app.current_key().as_deref(), Some("weight"));

        app.handle_key_event(press(KeyCode::Char('j')));
        app.handle_key_event(press(KeyCode::Enter));

        let field = app.form().range_field("weight").unwrap();
        assert_eq!(field.selection(Axis::Lower), Some("2"));
        assert_eq!(field.selection(Axis::Upper), Some("kg"));
        assert_eq!(field.display_value(), "2 kg");
        assert_eq!(app.status(), Some("Weight = 2 kg"));
        assert!(app.form().is_dirty());
    }

    #[test]
    fn tab_moves_picker_to_next_field() {
        let mut app = demo_app();
        app.handle_key_event(press(KeyCode::Tab));
        assert_eq!(app.current_key().as_deref(), Some("fruit"));
        assert!(!app.form().range_field("weight").unwrap().has_input_view());
        assert!(app.form().range_field("fruit").unwrap().has_input_view());

        app.handle_key_event(press(KeyCode::Down));
        app.handle_key_event(press(KeyCode::Down));
        app.handle_key_event(press(KeyCode::Enter));
        app.handle_key_event(press(KeyCode::Char('r')));

        let form = app.into_form();
        assert_eq!(form.display_value("fruit").as_deref(), Some(""));
        assert!(!form.range_field("fruit").unwrap().has_input_view());
    }

    #[test]
    fn quits_on_escape() {
        let mut app = demo_app();
        app.handle_key_event(press(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[test]
    fn renders_without_panicking() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = demo_app();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
