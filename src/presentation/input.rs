use crate::application::{App, AppMode};
use crate::domain::Step;
use crate::infrastructure::{FileRepository, RecordExporter, SubmissionClient};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveAs => Self::handle_filename_input_mode(app, key, "save"),
            AppMode::LoadFile => Self::handle_filename_input_mode(app, key, "load"),
            AppMode::ExportCsv => Self::handle_filename_input_mode(app, key, "csv_export"),
        }
    }

    /// Runs the transport for a submission armed by the previous key
    /// event. Called between draws, so the pending indicator is already on
    /// screen while the request is in flight. Returns whether a submission
    /// was resolved.
    pub fn resolve_pending_submission(app: &mut App, client: &SubmissionClient) -> bool {
        let Some(record) = app.pending_submission.take() else {
            return false;
        };
        let result = client.submit(&record);
        app.set_submission_result(result);
        true
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => {
                    app.start_save_draft();
                    return;
                }
                KeyCode::Char('o') => {
                    app.start_load_draft();
                    return;
                }
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return;
                }
                KeyCode::Char('n') => {
                    app.advance();
                    return;
                }
                KeyCode::Char('p') => {
                    app.retreat();
                    return;
                }
                _ => {}
            }
        }

        match key {
            KeyCode::Tab => {
                app.status_message = None;
                app.next_focus();
            }
            KeyCode::BackTab => {
                app.status_message = None;
                app.prev_focus();
            }
            KeyCode::Up | KeyCode::Char('k') if app.step != Step::Preview => {
                app.focus_up();
            }
            KeyCode::Down | KeyCode::Char('j') if app.step != Step::Preview => {
                app.focus_down();
            }
            KeyCode::Left => {
                app.focus_left();
            }
            KeyCode::Right => {
                app.focus_right();
            }
            KeyCode::Enter | KeyCode::F(2) => {
                if app.step == Step::Preview {
                    Self::arm_submission(app);
                } else {
                    app.start_editing();
                }
            }
            KeyCode::Char('+') => {
                app.add_row();
            }
            KeyCode::Char('-') => {
                app.remove_row();
            }
            KeyCode::Up | KeyCode::Char('k') if app.step == Step::Preview => {
                app.preview_scroll = app.preview_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if app.step == Step::Preview => {
                app.preview_scroll += 1;
            }
            KeyCode::PageUp if app.step == Step::Preview => {
                app.preview_scroll = app.preview_scroll.saturating_sub(5);
            }
            KeyCode::PageDown if app.step == Step::Preview => {
                app.preview_scroll += 5;
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Esc => {
                app.status_message = None;
            }
            _ => {}
        }
    }

    /// Arms a single submission attempt; `begin_submission` already
    /// refuses re-entry while one is pending. The transport itself runs in
    /// [`Self::resolve_pending_submission`] after the next draw.
    fn arm_submission(app: &mut App) {
        if let Some(record) = app.begin_submission(Utc::now().to_rfc3339()) {
            app.pending_submission = Some(record);
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.finish_editing();
            }
            KeyCode::Esc => {
                app.cancel_editing();
            }
            _ => {
                edit_buffer(&mut app.input, &mut app.cursor_position, key);
            }
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
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

    fn handle_filename_input_mode(app: &mut App, key: KeyCode, mode: &str) {
        match key {
            KeyCode::Enter => match mode {
                "save" => {
                    let filename = app.dialog_filename("survey.json");
                    let result = FileRepository::save_draft(&app.form, &filename);
                    app.set_save_result(result);
                }
                "load" => {
                    let filename = app.dialog_filename("survey.json");
                    let result = FileRepository::load_draft(&filename);
                    app.set_load_result(result);
                }
                "csv_export" => {
                    let filename = app.dialog_filename("survey.csv");
                    let record = app.flattened_record(Utc::now().to_rfc3339());
                    let result = RecordExporter::export_csv(&record, &filename);
                    app.set_export_result(result);
                }
                _ => {}
            },
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            _ => {
                edit_buffer(&mut app.filename_input, &mut app.cursor_position, key);
            }
        }
    }
}

/// Applies one key to a text buffer. The cursor counts chars, not bytes,
/// so multibyte input (any accented Vietnamese letter) edits cleanly.
fn edit_buffer(text: &mut String, cursor: &mut usize, key: KeyCode) {
    match key {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let at = byte_offset(text, *cursor);
                text.remove(at);
            }
        }
        KeyCode::Delete => {
            if *cursor < text.chars().count() {
                let at = byte_offset(text, *cursor);
                text.remove(at);
            }
        }
        KeyCode::Left => {
            if *cursor > 0 {
                *cursor -= 1;
            }
        }
        KeyCode::Right => {
            if *cursor < text.chars().count() {
                *cursor += 1;
            }
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = text.chars().count();
        }
        KeyCode::Char(c) => {
            let at = byte_offset(text, *cursor);
            text.insert(at, c);
            *cursor += 1;
        }
        _ => {}
    }
}

/// Byte offset of the char at `index`, or the end of the string.
fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SubmissionState;
    use crate::domain::TableKind;

    fn client() -> SubmissionClient {
        SubmissionClient::new(None)
    }

    #[test]
    fn ctrl_n_advances_and_ctrl_p_retreats() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(app.step, Step::B1);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(app.step, Step::A);
    }

    #[test]
    fn save_dialog_opens_with_default_filename() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches!(app.mode, AppMode::SaveAs));
        assert_eq!(app.filename_input, "survey.json");

        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.filename_input.is_empty());
    }

    #[test]
    fn plus_and_minus_manage_rows_on_table_steps() {
        let mut app = App::default();
        app.step = Step::B1;
        InputHandler::handle_key_event(&mut app, KeyCode::Char('+'), KeyModifiers::NONE);
        assert_eq!(app.form.table(TableKind::Waste).row_count(), 2);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('-'), KeyModifiers::NONE);
        assert_eq!(app.form.table(TableKind::Waste).row_count(), 1);
    }

    #[test]
    fn enter_on_preview_arms_then_resolve_submits() {
        let mut app = App::default();
        app.step = Step::Preview;
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        // The key event only arms the attempt: pending state is visible to
        // the next draw, the transport has not run yet.
        assert_eq!(app.submission, SubmissionState::Pending);
        assert!(app.pending_submission.is_some());
        assert_eq!(app.status_message.as_deref(), Some("Đang gửi khảo sát..."));

        assert!(InputHandler::resolve_pending_submission(&mut app, &client()));
        assert_eq!(app.submission, SubmissionState::Success);
        assert!(app.pending_submission.is_none());
    }

    #[test]
    fn resolve_without_armed_submission_is_a_no_op() {
        let mut app = App::default();
        assert!(!InputHandler::resolve_pending_submission(&mut app, &client()));
        assert_eq!(app.submission, SubmissionState::Idle);
    }

    #[test]
    fn typed_characters_land_in_the_edit_buffer() {
        let mut app = App::default();
        app.start_editing(); // company_name
        for c in ['A', 'B'] {
            InputHandler::handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(app.input, "AB");
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.form.field_text("company_name"), "AB");
    }

    #[test]
    fn multibyte_characters_edit_cleanly() {
        let mut app = App::default();
        app.start_editing(); // company_name
        for c in ['n', 'g', 'h', 'i', 'ệ', 'p'] {
            InputHandler::handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(app.input, "nghiệp");
        assert_eq!(app.cursor_position, 6);

        // Walk left over the multibyte char and delete it.
        InputHandler::handle_key_event(&mut app, KeyCode::Left, KeyModifiers::NONE);
        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.input, "nghip");

        // Insert in the middle, before another multibyte char.
        InputHandler::handle_key_event(&mut app, KeyCode::Char('ệ'), KeyModifiers::NONE);
        assert_eq!(app.input, "nghiệp");
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.form.field_text("company_name"), "nghiệp");
    }

    #[test]
    fn editing_resumes_at_the_char_count_of_existing_text() {
        let mut app = App::default();
        app.form
            .set_field(
                "company_name",
                crate::domain::FieldValue::Text("Công ty".into()),
            )
            .unwrap();
        app.start_editing();
        assert_eq!(app.cursor_position, 7);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('!'), KeyModifiers::NONE);
        assert_eq!(app.input, "Công ty!");
    }
}
