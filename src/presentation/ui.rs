use crate::application::{App, AppMode, Focus, NotificationKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_input(f, app, chunks[1], Focus::Name, "Name", &app.name_input);
    render_input(f, app, chunks[2], Focus::Email, "Email", &app.email_input);
    render_buttons(f, app, chunks[3]);
    render_count(f, app, chunks[4]);
    render_records(f, app, chunks[5]);
    render_status_bar(f, app, chunks[6]);

    match app.mode {
        AppMode::Notification => render_notification(f, app),
        AppMode::Help => render_help_popup(f, app.help_scroll),
        _ => {}
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("User Registration")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(header, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect, focus: Focus, label: &str, value: &str) {
    let focused = app.mode == AppMode::Form && app.focus == focus;
    let border_style = if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if value.is_empty() && !focused {
        Paragraph::new(label).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(value)
    };
    f.render_widget(
        content.block(Block::default().borders(Borders::ALL).title(label).border_style(border_style)),
        area,
    );

    if focused {
        let x = area.x + 1 + app.cursor_position as u16;
        f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_buttons(f: &mut Frame, app: &App, area: Rect) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let buttons = [
        (Focus::Register, "Register", Color::Blue),
        (Focus::Display, "Display Users", Color::Blue),
        (Focus::Clear, "Clear All Users", Color::Red),
    ];

    for ((focus, label, color), cell) in buttons.into_iter().zip(cells.iter()) {
        let style = if app.mode == AppMode::Form && app.focus == focus {
            Style::default().bg(color).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
        f.render_widget(button, *cell);
    }
}

fn render_count(f: &mut Frame, app: &App, area: Rect) {
    let count = Paragraph::new(format!("Total Users: {}", app.record_count()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(count, area);
}

fn render_records(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .records
        .iter()
        .skip(app.list_scroll)
        .map(|record| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    record.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(record.email.clone(), Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    let title = if app.records.is_empty() {
        "Users".to_string()
    } else {
        format!("Users ({}-{} of {})", app.list_scroll + 1, app.records.len(), app.records.len())
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Form => match app.status_message {
            Some(ref status) => status.clone(),
            None => "Tab: next field | Enter: activate | Ctrl+R: register | Ctrl+D: display | Ctrl+X: clear | Ctrl+E: export CSV | F1: help | Ctrl+Q: quit".to_string(),
        },
        AppMode::Notification => "Enter/Esc: dismiss".to_string(),
        AppMode::Help => "↑↓: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/F1: close help".to_string(),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Form => Style::default(),
            AppMode::Notification => Style::default().fg(Color::Yellow),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);

    if app.mode == AppMode::ExportCsv {
        let prefix = "Export CSV as: ".chars().count() as u16;
        let x = area.x + 1 + prefix + app.cursor_position as u16;
        f.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Centers a `width` x `height` box inside `area`, shrinking it to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_notification(f: &mut Frame, app: &App) {
    let Some(ref notification) = app.notification else {
        return;
    };
    let color = match notification.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
    };

    let popup_area = centered_rect(44, 7, f.area());
    f.render_widget(Clear, popup_area);

    let body = vec![
        Line::from(notification.message.clone()),
        Line::from(""),
        Line::from(Span::styled("[ OK ]", Style::default().add_modifier(Modifier::REVERSED))),
    ];
    let popup = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(notification.kind.title())
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(popup, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("regdesk Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

pub const HELP_TEXT: &str = r#"REGDESK - USER REGISTRATION

=== FORM ===
Tab / Shift+Tab   Move between Name, Email and the buttons
Enter             In Name: go to Email
                  In Email: register the user
                  On a button: press it
←→ Home End       Move the cursor inside a field
Backspace/Delete  Edit the focused field

Both Name and Email must be filled in. The email is not checked
for format.

=== ACTIONS ===
Ctrl+R            Register the user in the form
Ctrl+D            Display users (reload the list from storage)
Ctrl+X            Clear all users
Ctrl+E            Export the listed users to a CSV file

=== LIST ===
↑↓                Scroll the user list one row
Page Up/Down      Scroll the user list five rows

=== ALERTS ===
Enter/Esc         Dismiss a Success or Error alert

=== HELP NAVIGATION ===
↑↓                Scroll help text up/down one line
Page Up/Down      Scroll help text up/down 5 lines
Home              Jump to top of help text
Esc/F1            Close this help window

Ctrl+Q / Ctrl+C   Quit. Records are saved as soon as they are registered."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::infrastructure::{MemoryStore, RecordRepository};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app_with(records: &[Record]) -> App {
        let repository = RecordRepository::new(Box::new(MemoryStore::new()));
        repository.write_all(records).unwrap();
        App::new(repository)
    }

    #[test]
    fn test_renders_form_and_count() {
        let app = app_with(&[Record::new("1", "Alice", "a@x.com")]);
        let screen = draw(&app);
        assert!(screen.contains("User Registration"));
        assert!(screen.contains("Register"));
        assert!(screen.contains("Display Users"));
        assert!(screen.contains("Clear All Users"));
        assert!(screen.contains("Total Users: 1"));
        assert!(screen.contains("Alice"));
        assert!(screen.contains("a@x.com"));
    }

    #[test]
    fn test_renders_notification_title() {
        let mut app = app_with(&[]);
        app.register();
        let screen = draw(&app);
        assert!(screen.contains("Error"));
        assert!(screen.contains("Name and Email are required"));
    }

    #[test]
    fn test_renders_help() {
        let mut app = app_with(&[]);
        app.show_help();
        assert!(draw(&app).contains("regdesk Help"));
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_rect(44, 7, area);
        assert_eq!(rect, Rect::new(0, 0, 20, 5));
        assert_eq!(centered_rect(10, 3, Rect::new(0, 0, 20, 5)), Rect::new(5, 1, 10, 3));
    }
}
