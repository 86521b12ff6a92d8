use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Form => Self::handle_form_mode(app, key, modifiers),
            AppMode::Notification => Self::handle_notification_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportCsv => Self::handle_filename_input_mode(app, key),
        }
    }

    /// Whether the key should end the program. Quitting works from any mode.
    pub fn is_quit(key: KeyCode, modifiers: KeyModifiers) -> bool {
        modifiers.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
    }

    fn handle_form_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        app.status_message = None;

        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('r') => app.register(),
                KeyCode::Char('d') => app.refresh(),
                KeyCode::Char('x') => app.clear_all(),
                KeyCode::Char('e') => app.start_csv_export(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Tab => app.focus_next(),
            KeyCode::BackTab => app.focus_previous(),
            KeyCode::Enter => app.activate_focused(),
            KeyCode::F(1) => app.show_help(),
            KeyCode::Up => app.scroll_list_up(1),
            KeyCode::Down => app.scroll_list_down(1),
            KeyCode::PageUp => app.scroll_list_up(5),
            KeyCode::PageDown => app.scroll_list_down(5),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.delete(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_notification_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notification();
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) => app.close_help(),
            KeyCode::Up => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.export_csv(),
            KeyCode::Esc => app.cancel_filename_input(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.delete(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }
}
