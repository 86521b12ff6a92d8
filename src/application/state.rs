//! Application state management for the registration desk.
//!
//! This module contains the form state, the cached record list and the
//! action handlers that talk to the record repository.

use crate::domain::{validate_registration, Record, RecordIdGenerator, RegistrationError, StorageResult};
use crate::infrastructure::{CsvExporter, RecordRepository};
use tracing::{error, info, warn};

const DEFAULT_CSV_FILENAME: &str = "users.csv";

/// Represents the current mode of the application.
///
/// The mode decides how key presses are interpreted and which overlays
/// are drawn on top of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Form is active - typing goes into the focused field
    Form,
    /// A modal alert is shown and must be dismissed
    Notification,
    /// Help screen is displayed
    Help,
    /// CSV export dialog is open
    ExportCsv,
}

/// The control that currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Email,
    Register,
    Display,
    Clear,
}

impl Focus {
    const ORDER: [Focus; 5] = [Focus::Name, Focus::Email, Focus::Register, Focus::Display, Focus::Clear];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Focus {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_text_field(self) -> bool {
        matches!(self, Focus::Name | Focus::Email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Error",
        }
    }
}

/// A modal alert with a fixed title and a short message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Main application state: the form inputs, the cached records and the
/// repository they are loaded from.
///
/// The cache is only replaced after a storage call succeeds, so a failed
/// action leaves it as it was.
pub struct App {
    repository: RecordRepository,
    ids: RecordIdGenerator,
    /// Current application mode
    pub mode: AppMode,
    /// Control with keyboard focus
    pub focus: Focus,
    /// Name field contents
    pub name_input: String,
    /// Email field contents
    pub email_input: String,
    /// Cursor position within the active input, in characters
    pub cursor_position: usize,
    /// Records as last loaded from storage
    pub records: Vec<Record>,
    /// Alert currently displayed, if any
    pub notification: Option<Notification>,
    /// Index of the first record shown in the list
    pub list_scroll: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
}

impl App {
    /// Creates the application and loads the stored records once.
    pub fn new(repository: RecordRepository) -> Self {
        let mut app = Self {
            repository,
            ids: RecordIdGenerator::new(),
            mode: AppMode::Form,
            focus: Focus::Name,
            name_input: String::new(),
            email_input: String::new(),
            cursor_position: 0,
            records: Vec::new(),
            notification: None,
            list_scroll: 0,
            help_scroll: 0,
            status_message: None,
            filename_input: String::new(),
        };
        app.refresh();
        app
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repository
    }

    /// Number of records in the cached list.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Registers the user typed into the form.
    ///
    /// Empty fields are rejected before storage is touched. On success the
    /// inputs are cleared and the cache becomes the newly written list; on
    /// failure the inputs stay filled in for another attempt.
    pub fn register(&mut self) {
        match self.try_register() {
            Ok(records) => {
                info!(count = records.len(), "user registered");
                self.records = records;
                self.name_input.clear();
                self.email_input.clear();
                self.focus = Focus::Name;
                self.cursor_position = 0;
                self.notify(NotificationKind::Success, "User has been registered");
            }
            Err(RegistrationError::Validation(e)) => {
                warn!(error = %e, "registration rejected");
                self.notify(NotificationKind::Error, "Name and Email are required");
            }
            Err(RegistrationError::Storage(e)) => {
                error!(error = %e, "registration failed");
                self.notify(NotificationKind::Error, "Failed to register user");
            }
        }
    }

    fn try_register(&mut self) -> Result<Vec<Record>, RegistrationError> {
        validate_registration(&self.name_input, &self.email_input)?;
        let record = Record::new(self.ids.next_id(), self.name_input.clone(), self.email_input.clone());

        let mut records = self.repository.read_all()?;
        records.push(record);
        self.repository.write_all(&records)?;
        Ok(records)
    }

    /// Reloads the cached list from storage.
    pub fn refresh(&mut self) {
        match self.repository.read_all() {
            Ok(records) => {
                info!(count = records.len(), "records loaded");
                self.records = records;
                self.clamp_list_scroll();
            }
            Err(e) => {
                error!(error = %e, "loading records failed");
                self.notify(NotificationKind::Error, "Failed to fetch users");
            }
        }
    }

    /// Deletes every stored record.
    pub fn clear_all(&mut self) {
        match self.repository.clear_all() {
            Ok(()) => {
                info!("records cleared");
                self.records.clear();
                self.list_scroll = 0;
                self.notify(NotificationKind::Success, "All users have been cleared");
            }
            Err(e) => {
                error!(error = %e, "clearing records failed");
                self.notify(NotificationKind::Error, "Failed to clear users");
            }
        }
    }

    /// Triggers whatever the focused control does.
    ///
    /// Enter in the name field moves on to the email field; Enter in the
    /// email field submits the form.
    pub fn activate_focused(&mut self) {
        match self.focus {
            Focus::Name => self.set_focus(Focus::Email),
            Focus::Email | Focus::Register => self.register(),
            Focus::Display => self.refresh(),
            Focus::Clear => self.clear_all(),
        }
    }

    fn notify(&mut self, kind: NotificationKind, message: &str) {
        self.notification = Some(Notification {
            kind,
            message: message.to_string(),
        });
        self.mode = AppMode::Notification;
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
        self.mode = AppMode::Form;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_previous(&mut self) {
        self.set_focus(self.focus.previous());
    }

    /// Moves focus, placing the cursor at the end of a text field.
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.cursor_position = self.active_input().map(|s| s.chars().count()).unwrap_or(0);
    }

    /// The text buffer that typing currently edits, if any.
    pub fn active_input(&self) -> Option<&String> {
        match self.mode {
            AppMode::ExportCsv => Some(&self.filename_input),
            AppMode::Form => match self.focus {
                Focus::Name => Some(&self.name_input),
                Focus::Email => Some(&self.email_input),
                _ => None,
            },
            _ => None,
        }
    }

    fn active_input_mut(&mut self) -> Option<&mut String> {
        match self.mode {
            AppMode::ExportCsv => Some(&mut self.filename_input),
            AppMode::Form => match self.focus {
                Focus::Name => Some(&mut self.name_input),
                Focus::Email => Some(&mut self.email_input),
                _ => None,
            },
            _ => None,
        }
    }

    fn byte_offset(input: &str, chars: usize) -> usize {
        input.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(input) = self.active_input_mut() {
            let at = Self::byte_offset(input, cursor);
            input.insert(at, c);
            self.cursor_position += 1;
        }
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        if let Some(input) = self.active_input_mut() {
            let at = Self::byte_offset(input, cursor - 1);
            input.remove(at);
            self.cursor_position -= 1;
        }
    }

    /// Deletes the character under the cursor.
    pub fn delete(&mut self) {
        let cursor = self.cursor_position;
        if let Some(input) = self.active_input_mut() {
            if cursor < input.chars().count() {
                let at = Self::byte_offset(input, cursor);
                input.remove(at);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.active_input().map(|s| s.chars().count()).unwrap_or(0);
        if self.cursor_position < len {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.active_input().map(|s| s.chars().count()).unwrap_or(0);
    }

    pub fn scroll_list_up(&mut self, amount: usize) {
        self.list_scroll = self.list_scroll.saturating_sub(amount);
    }

    pub fn scroll_list_down(&mut self, amount: usize) {
        self.list_scroll += amount;
        self.clamp_list_scroll();
    }

    fn clamp_list_scroll(&mut self) {
        self.list_scroll = self.list_scroll.min(self.records.len().saturating_sub(1));
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Form;
    }

    /// Switches to CSV export mode to prompt for a filename.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = DEFAULT_CSV_FILENAME.to_string();
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Cancels filename input and returns to the form.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Form;
        self.filename_input.clear();
        self.set_focus(self.focus);
    }

    /// Gets the filename to use for CSV export.
    ///
    /// Returns the filename input if not empty, otherwise the default.
    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            DEFAULT_CSV_FILENAME.to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Exports the cached records to the chosen CSV file.
    pub fn export_csv(&mut self) {
        let filename = self.get_csv_export_filename();
        let result = CsvExporter::export_records(&self.records, &filename);
        self.set_csv_export_result(result);
    }

    /// Processes the result of a CSV export operation.
    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                info!(filename = %filename, count = self.records.len(), "records exported");
                self.status_message = Some(format!("Exported {} users to {}", self.records.len(), filename));
            }
            Err(e) => {
                error!(error = %e, "csv export failed");
                self.status_message = Some(format!("Export failed: {}", e));
            }
        }
        self.cancel_filename_input();
    }

    /// Re-reads the store and reports whether the cache still matches it.
    pub fn is_in_sync(&self) -> StorageResult<bool> {
        Ok(self.repository.read_all()? == self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::testing::FlakyStore;
    use crate::infrastructure::{MemoryStore, RecordRepository};
    use std::sync::Arc;

    fn memory_app() -> App {
        App::new(RecordRepository::new(Box::new(MemoryStore::new())))
    }

    fn flaky_app() -> (App, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::default());
        let app = App::new(RecordRepository::new(Box::new(store.clone())));
        (app, store)
    }

    fn fill(app: &mut App, name: &str, email: &str) {
        app.name_input = name.to_string();
        app.email_input = email.to_string();
    }

    fn stored(app: &App) -> Vec<Record> {
        app.repository().read_all().unwrap()
    }

    #[test]
    fn test_new_app_starts_on_empty_form() {
        let app = memory_app();
        assert_eq!(app.mode, AppMode::Form);
        assert_eq!(app.focus, Focus::Name);
        assert_eq!(app.record_count(), 0);
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_new_app_loads_existing_records() {
        let store = Arc::new(MemoryStore::new());
        RecordRepository::new(Box::new(store.clone()))
            .write_all(&[Record::new("1", "Alice", "a@x.com")])
            .unwrap();

        let app = App::new(RecordRepository::new(Box::new(store)));
        assert_eq!(app.record_count(), 1);
        assert_eq!(app.records[0].name, "Alice");
    }

    #[test]
    fn test_register_alice() {
        let mut app = memory_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();

        let records = stored(&app);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[0].email, "a@x.com");
        assert!(!records[0].id.is_empty());
        assert_eq!(app.record_count(), 1);
        assert_eq!(app.records, records);

        assert!(app.name_input.is_empty());
        assert!(app.email_input.is_empty());
        assert_eq!(app.mode, AppMode::Notification);
        assert_eq!(
            app.notification,
            Some(Notification {
                kind: NotificationKind::Success,
                message: "User has been registered".to_string(),
            })
        );
    }

    #[test]
    fn test_register_with_empty_name_is_rejected() {
        let mut app = memory_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        app.dismiss_notification();

        fill(&mut app, "", "b@x.com");
        app.register();

        assert_eq!(stored(&app).len(), 1);
        assert_eq!(app.record_count(), 1);
        let notification = app.notification.clone().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Name and Email are required");
        // Inputs are kept for correction
        assert_eq!(app.email_input, "b@x.com");
    }

    #[test]
    fn test_register_with_empty_email_is_rejected() {
        let mut app = memory_app();
        fill(&mut app, "Bob", "");
        app.register();
        assert!(stored(&app).is_empty());
        assert_eq!(app.notification.unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn test_validation_does_not_touch_storage() {
        let (mut app, store) = flaky_app();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        fill(&mut app, "", "");
        app.register();
        assert_eq!(app.notification.unwrap().message, "Name and Email are required");
    }

    #[test]
    fn test_registers_keep_call_order() {
        let mut app = memory_app();
        let inputs = [("Alice", "a@x.com"), ("Bob", "b@x.com"), ("Carol", "c@x.com")];
        for (name, email) in inputs {
            fill(&mut app, name, email);
            app.register();
            app.dismiss_notification();
        }

        app.refresh();
        assert_eq!(app.record_count(), 3);
        for (record, (name, email)) in app.records.iter().zip(inputs) {
            assert_eq!(record.name, name);
            assert_eq!(record.email, email);
        }
        let ids: Vec<&str> = app.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2]);
    }

    #[test]
    fn test_register_read_failure_keeps_inputs() {
        let (mut app, store) = flaky_app();
        store.set_fail_reads(true);
        fill(&mut app, "Alice", "a@x.com");
        app.register();

        assert_eq!(app.name_input, "Alice");
        assert_eq!(app.email_input, "a@x.com");
        assert_eq!(app.record_count(), 0);
        assert_eq!(app.notification.unwrap().message, "Failed to register user");
    }

    #[test]
    fn test_register_write_failure_leaves_cache_untouched() {
        let (mut app, store) = flaky_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        app.dismiss_notification();

        store.set_fail_writes(true);
        fill(&mut app, "Bob", "b@x.com");
        app.register();

        assert_eq!(app.record_count(), 1);
        assert_eq!(app.name_input, "Bob");
        assert_eq!(app.notification.clone().unwrap().kind, NotificationKind::Error);
        store.set_fail_writes(false);
        assert!(app.is_in_sync().unwrap());
    }

    #[test]
    fn test_refresh_sets_count_from_storage() {
        let store = Arc::new(MemoryStore::new());
        let mut app = App::new(RecordRepository::new(Box::new(store.clone())));
        assert_eq!(app.record_count(), 0);

        // Another writer adds records behind the app's back
        RecordRepository::new(Box::new(store))
            .write_all(&[Record::new("1", "Alice", "a@x.com"), Record::new("2", "Bob", "b@x.com")])
            .unwrap();
        assert!(!app.is_in_sync().unwrap());

        app.refresh();
        assert_eq!(app.record_count(), 2);
        assert!(app.notification.is_none());
        assert!(app.is_in_sync().unwrap());
    }

    #[test]
    fn test_refresh_failure_keeps_stale_cache() {
        let (mut app, store) = flaky_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        app.dismiss_notification();

        store.set_fail_reads(true);
        app.refresh();
        assert_eq!(app.record_count(), 1);
        assert_eq!(app.notification.unwrap().message, "Failed to fetch users");
    }

    #[test]
    fn test_mount_failure_reports_error() {
        let store = Arc::new(FlakyStore::default());
        store.set_fail_reads(true);
        let app = App::new(RecordRepository::new(Box::new(store)));
        assert_eq!(app.mode, AppMode::Notification);
        assert_eq!(app.notification.unwrap().message, "Failed to fetch users");
    }

    #[test]
    fn test_register_two_then_clear() {
        let mut app = memory_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        fill(&mut app, "Bob", "b@x.com");
        app.register();
        assert_eq!(app.record_count(), 2);

        app.clear_all();
        assert!(stored(&app).is_empty());
        assert_eq!(app.record_count(), 0);
        assert_eq!(app.notification.clone().unwrap().message, "All users have been cleared");

        // Clearing again still succeeds
        app.dismiss_notification();
        app.clear_all();
        assert_eq!(app.notification.unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn test_clear_failure_keeps_cache() {
        let (mut app, store) = flaky_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        store.set_fail_writes(true);

        app.clear_all();
        assert_eq!(app.record_count(), 1);
        assert_eq!(app.notification.unwrap().message, "Failed to clear users");
    }

    #[test]
    fn test_focus_cycle() {
        let mut app = memory_app();
        app.focus_previous();
        assert_eq!(app.focus, Focus::Clear);
        app.focus_next();
        assert_eq!(app.focus, Focus::Name);
        app.focus_next();
        assert_eq!(app.focus, Focus::Email);
        assert!(app.focus.is_text_field());
        assert!(!Focus::Register.is_text_field());
    }

    #[test]
    fn test_activate_focused() {
        let mut app = memory_app();
        fill(&mut app, "Alice", "a@x.com");
        app.activate_focused();
        assert_eq!(app.focus, Focus::Email);
        assert_eq!(app.cursor_position, "a@x.com".len());

        app.activate_focused();
        assert_eq!(app.record_count(), 1);
        assert_eq!(app.focus, Focus::Name);
    }

    #[test]
    fn test_text_editing_handles_multibyte() {
        let mut app = memory_app();
        for c in "Zoë".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.name_input, "Zoë");
        assert_eq!(app.cursor_position, 3);

        app.move_cursor_left();
        app.insert_char('e');
        assert_eq!(app.name_input, "Zoeë");

        app.move_cursor_end();
        app.backspace();
        assert_eq!(app.name_input, "Zoe");

        app.move_cursor_home();
        app.delete();
        assert_eq!(app.name_input, "oe");
        app.move_cursor_right();
        app.move_cursor_right();
        app.move_cursor_right();
        assert_eq!(app.cursor_position, 2);
    }

    #[test]
    fn test_typing_on_button_is_ignored() {
        let mut app = memory_app();
        app.set_focus(Focus::Register);
        app.insert_char('x');
        assert!(app.name_input.is_empty());
        assert!(app.email_input.is_empty());
        assert_eq!(app.cursor_position, 0);
    }

    #[test]
    fn test_list_scroll_is_clamped() {
        let mut app = memory_app();
        app.scroll_list_down(3);
        assert_eq!(app.list_scroll, 0);

        for name in ["A", "B", "C"] {
            fill(&mut app, name, "x@x.com");
            app.register();
        }
        app.scroll_list_down(10);
        assert_eq!(app.list_scroll, 2);
        app.scroll_list_up(1);
        assert_eq!(app.list_scroll, 1);

        app.clear_all();
        assert_eq!(app.list_scroll, 0);
    }

    #[test]
    fn test_csv_export_mode() {
        let mut app = memory_app();
        app.start_csv_export();
        assert_eq!(app.mode, AppMode::ExportCsv);
        assert_eq!(app.filename_input, "users.csv");
        assert_eq!(app.cursor_position, "users.csv".len());

        app.filename_input.clear();
        assert_eq!(app.get_csv_export_filename(), "users.csv");

        app.cancel_filename_input();
        assert_eq!(app.mode, AppMode::Form);
        assert!(app.filename_input.is_empty());
    }

    #[test]
    fn test_csv_export_result_handling() {
        let mut app = memory_app();
        app.start_csv_export();
        app.set_csv_export_result(Ok("out.csv".to_string()));
        assert_eq!(app.mode, AppMode::Form);
        assert!(app.status_message.as_ref().unwrap().contains("out.csv"));

        app.start_csv_export();
        assert!(app.status_message.is_none());
        app.set_csv_export_result(Err("denied".to_string()));
        assert!(app.status_message.unwrap().contains("Export failed: denied"));
    }

    #[test]
    fn test_csv_export_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        let mut app = memory_app();
        fill(&mut app, "Alice", "a@x.com");
        app.register();
        app.dismiss_notification();

        app.start_csv_export();
        app.filename_input = path.to_str().unwrap().to_string();
        app.export_csv();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,name,email\n"));
        assert!(content.contains("Alice,a@x.com"));
    }

    #[test]
    fn test_help_mode() {
        let mut app = memory_app();
        app.show_help();
        assert_eq!(app.mode, AppMode::Help);
        app.close_help();
        assert_eq!(app.mode, AppMode::Form);
    }
}
