//! Application state for the terminal survey.
//!
//! [`App`] owns the form model and the step machine, and mediates every
//! mutation the input layer asks for: field edits, row management, step
//! navigation, draft save/load, and the submission lifecycle.

use crate::domain::{
    AggregateTotals, ColumnKind, FieldKind, FieldValue, PreviewDocument, Step, StepValidation,
    SurveyForm, SurveyRecord, TableKind, Validator,
};

/// Current interaction mode, dispatched on by the input handler.
#[derive(Debug)]
pub enum AppMode {
    /// Navigating fields and cells.
    Normal,
    /// Typing into the focused field or cell.
    Editing,
    /// Help screen is displayed.
    Help,
    /// Draft save dialog is open.
    SaveAs,
    /// Draft load dialog is open.
    LoadFile,
    /// Record CSV export dialog is open.
    ExportCsv,
}

/// Where input is currently directed on the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(&'static str),
    Cell {
        table: TableKind,
        row: usize,
        col: usize,
    },
}

/// Lifecycle of the one-shot submission. There is no automatic retry; a
/// failed submission goes back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending,
    Success,
    Failed,
}

#[derive(Debug)]
pub struct App {
    /// The survey as entered so far.
    pub form: SurveyForm,
    /// The step currently displayed. Exactly one at any time.
    pub step: Step,
    pub mode: AppMode,
    /// Index into [`App::focus_targets`] for the active step.
    pub focus: usize,
    /// Input buffer for editing mode.
    pub input: String,
    /// Cursor position within the active input buffer, counted in chars.
    pub cursor_position: usize,
    /// Draft filename, once saved or loaded.
    pub filename: Option<String>,
    /// Input buffer for filename dialogs.
    pub filename_input: String,
    /// Temporary status line, also used for validation and row-limit notices.
    pub status_message: Option<String>,
    /// Derived totals, recomputed in full on every relevant change.
    pub totals: AggregateTotals,
    /// Result of the most recent step validation.
    pub validation: StepValidation,
    /// Preview document, built when the preview step is entered.
    pub preview: Option<PreviewDocument>,
    pub submission: SubmissionState,
    /// Record armed by the last key event, handed to the transport on the
    /// next loop tick so the pending indicator gets drawn first.
    pub pending_submission: Option<SurveyRecord>,
    pub help_scroll: usize,
    pub preview_scroll: usize,
}

impl Default for App {
    fn default() -> Self {
        let form = SurveyForm::default();
        let totals = AggregateTotals::compute(&form);
        Self {
            form,
            step: Step::A,
            mode: AppMode::Normal,
            focus: 0,
            input: String::new(),
            cursor_position: 0,
            filename: None,
            filename_input: String::new(),
            status_message: None,
            totals,
            validation: StepValidation::default(),
            preview: None,
            submission: SubmissionState::Idle,
            pending_submission: None,
            help_scroll: 0,
            preview_scroll: 0,
        }
    }
}

impl App {
    /// Focusable widgets of the active step, in navigation order: table
    /// cells row by row, then the step's scalar fields.
    pub fn focus_targets(&self) -> Vec<FocusTarget> {
        let mut targets = Vec::new();
        for &kind in self.step.tables() {
            let columns = kind.schema().columns.len();
            for row in 0..self.form.table(kind).row_count() {
                for col in 0..columns {
                    targets.push(FocusTarget::Cell {
                        table: kind,
                        row,
                        col,
                    });
                }
            }
        }
        for def in self.step.fields() {
            targets.push(FocusTarget::Field(def.key));
        }
        targets
    }

    pub fn current_focus(&self) -> Option<FocusTarget> {
        self.focus_targets().get(self.focus).copied()
    }

    /// The table the focus sits in, falling back to the step's first table.
    pub fn current_table(&self) -> Option<TableKind> {
        match self.current_focus() {
            Some(FocusTarget::Cell { table, .. }) => Some(table),
            _ => self.step.tables().first().copied(),
        }
    }

    pub fn next_focus(&mut self) {
        let last = self.focus_targets().len().saturating_sub(1);
        if self.focus < last {
            self.focus += 1;
        }
    }

    pub fn prev_focus(&mut self) {
        if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Moves focus one table row up, or one widget back outside a table.
    pub fn focus_up(&mut self) {
        match self.current_focus() {
            Some(FocusTarget::Cell { table, row, col }) if row > 0 => {
                self.jump_to(FocusTarget::Cell {
                    table,
                    row: row - 1,
                    col,
                });
            }
            _ => self.prev_focus(),
        }
    }

    /// Moves focus one table row down, or one widget forward outside a table.
    pub fn focus_down(&mut self) {
        match self.current_focus() {
            Some(FocusTarget::Cell { table, row, col })
                if row + 1 < self.form.table(table).row_count() =>
            {
                self.jump_to(FocusTarget::Cell {
                    table,
                    row: row + 1,
                    col,
                });
            }
            _ => self.next_focus(),
        }
    }

    pub fn focus_left(&mut self) {
        if let Some(FocusTarget::Cell { col, .. }) = self.current_focus() {
            if col > 0 {
                self.focus -= 1;
            }
        }
    }

    pub fn focus_right(&mut self) {
        if let Some(FocusTarget::Cell { table, col, .. }) = self.current_focus() {
            if col + 1 < table.schema().columns.len() {
                self.focus += 1;
            }
        }
    }

    fn jump_to(&mut self, target: FocusTarget) {
        if let Some(index) = self.focus_targets().iter().position(|t| *t == target) {
            self.focus = index;
        }
    }

    /// Begins editing of the focused widget. Radio fields and select
    /// columns cycle to their next option instead of opening the buffer.
    pub fn start_editing(&mut self) {
        let Some(target) = self.current_focus() else {
            return;
        };
        match target {
            FocusTarget::Field(key) => {
                let Some(def) = SurveyForm::field_def(key) else {
                    return;
                };
                if let FieldKind::Radio(options) = def.kind {
                    let next = next_option(self.form.field_text(key), options, false);
                    let _ = self.form.set_field(key, FieldValue::Text(next));
                    self.clear_issue(key);
                    return;
                }
                self.input = self.form.field_text(key).to_string();
            }
            FocusTarget::Cell { table, row, col } => {
                let column = &table.schema().columns[col];
                if let ColumnKind::Select(options) = column.kind {
                    let next = next_option(self.form.cell(table, row, col), options, true);
                    let _ = self.form.set_cell(table, row, col, next);
                    return;
                }
                self.input = self.form.cell(table, row, col).to_string();
            }
        }
        self.mode = AppMode::Editing;
        self.cursor_position = self.input.chars().count();
    }

    /// Commits the edit buffer to the focused widget and re-aggregates
    /// when a tracked numeric column changed.
    pub fn finish_editing(&mut self) {
        if let Some(target) = self.current_focus() {
            match target {
                FocusTarget::Field(key) => {
                    let _ = self
                        .form
                        .set_field(key, FieldValue::Text(self.input.clone()));
                    self.clear_issue(key);
                }
                FocusTarget::Cell { table, row, col } => {
                    let _ = self.form.set_cell(table, row, col, self.input.clone());
                    if table.schema().columns[col].kind == ColumnKind::Numeric {
                        self.refresh_totals();
                    }
                }
            }
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn clear_issue(&mut self, key: &str) {
        self.validation.issues.retain(|issue| issue.key() != key);
    }

    /// Advances to the next step. The active step is re-validated first;
    /// failures are flagged for display but never block the transition.
    pub fn advance(&mut self) {
        if self.step == Step::Preview {
            return;
        }
        self.validation = Validator::validate_step(&self.form, self.step);
        if !self.validation.is_valid() {
            self.status_message =
                Some("Một số trường bắt buộc chưa hợp lệ".to_string());
        }

        let index = Step::ORDINARY
            .iter()
            .position(|s| *s == self.step)
            .unwrap_or(0);
        let destination = match Step::ORDINARY.get(index + 1) {
            Some(&next) => next,
            None => Step::Preview,
        };
        self.enter_step(destination);
    }

    /// Retreats unconditionally. From the preview this returns to the last
    /// ordinary step; from the first step it is a no-op.
    pub fn retreat(&mut self) {
        let destination = if self.step == Step::Preview {
            Step::ORDINARY[Step::ORDINARY.len() - 1]
        } else {
            let index = Step::ORDINARY
                .iter()
                .position(|s| *s == self.step)
                .unwrap_or(0);
            if index == 0 {
                return;
            }
            Step::ORDINARY[index - 1]
        };
        self.enter_step(destination);
    }

    /// On-enter hook for every transition: reset focus, re-aggregate
    /// table-bearing steps, and build the preview when entering it.
    fn enter_step(&mut self, step: Step) {
        self.step = step;
        self.focus = 0;
        self.preview_scroll = 0;
        if step.has_tables() {
            self.refresh_totals();
        }
        if step == Step::Preview {
            self.preview = Some(PreviewDocument::build(&self.form.snapshot()));
        } else {
            self.preview = None;
        }
    }

    pub fn refresh_totals(&mut self) {
        self.totals = AggregateTotals::compute(&self.form);
    }

    /// Adds a row to the focused table; rejection notices go to the status
    /// line.
    pub fn add_row(&mut self) {
        let Some(table) = self.current_table() else {
            return;
        };
        match self.form.add_row(table) {
            Ok(count) => {
                self.status_message = Some(format!("Đã thêm dòng {}", count));
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
            }
        }
    }

    /// Removes the last row of the focused table and re-aggregates.
    pub fn remove_row(&mut self) {
        let Some(table) = self.current_table() else {
            return;
        };
        match self.form.remove_row(table) {
            Ok(_) => {
                let last = self.focus_targets().len().saturating_sub(1);
                self.focus = self.focus.min(last);
                self.refresh_totals();
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
            }
        }
    }

    pub fn start_save_draft(&mut self) {
        self.mode = AppMode::SaveAs;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "survey.json".to_string());
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn start_load_draft(&mut self) {
        self.mode = AppMode::LoadFile;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "survey.json".to_string());
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = self
            .filename
            .as_ref()
            .map(|f| f.replace(".json", ".csv"))
            .unwrap_or_else(|| "survey.csv".to_string());
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn dialog_filename(&self, fallback: &str) -> String {
        if self.filename_input.is_empty() {
            fallback.to_string()
        } else {
            self.filename_input.clone()
        }
    }

    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.filename = Some(filename.clone());
                self.status_message = Some(format!("Đã lưu bản nháp vào {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Lưu thất bại: {}", error));
            }
        }
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn set_load_result(&mut self, result: Result<(SurveyForm, String), String>) {
        match result {
            Ok((form, filename)) => {
                self.form = form;
                self.filename = Some(filename.clone());
                self.focus = 0;
                self.refresh_totals();
                self.status_message = Some(format!("Đã nạp bản nháp từ {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Nạp thất bại: {}", error));
            }
        }
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn set_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Đã xuất bản ghi ra {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Xuất thất bại: {}", error));
            }
        }
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// The flattened record for export or submission.
    pub fn flattened_record(&self, timestamp: String) -> SurveyRecord {
        self.form.snapshot().flatten(timestamp)
    }

    /// Starts a submission attempt, returning the record to hand to the
    /// transport. Refused outside the preview step or while one attempt is
    /// already pending — a second submission can never start underneath
    /// the first.
    pub fn begin_submission(&mut self, timestamp: String) -> Option<SurveyRecord> {
        if self.step != Step::Preview || self.submission == SubmissionState::Pending {
            return None;
        }
        self.submission = SubmissionState::Pending;
        self.status_message = Some("Đang gửi khảo sát...".to_string());
        Some(self.flattened_record(timestamp))
    }

    /// Resolves the pending submission. Failure re-enables the trigger and
    /// surfaces the alert; nothing in the form is touched either way.
    pub fn set_submission_result(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.submission = SubmissionState::Success;
                self.status_message = None;
            }
            Err(error) => {
                self.submission = SubmissionState::Failed;
                self.status_message = Some(format!(
                    "Có lỗi xảy ra khi gửi khảo sát. Vui lòng thử lại sau. ({})",
                    error
                ));
            }
        }
    }
}

/// Next option in a cycle. With `allow_blank`, cycling past the last
/// option clears the value (the select's "Chọn phương pháp" placeholder).
fn next_option(current: &str, options: &[&str], allow_blank: bool) -> String {
    match options.iter().position(|o| *o == current) {
        Some(index) if index + 1 < options.len() => options[index + 1].to_string(),
        Some(_) => {
            if allow_blank {
                String::new()
            } else {
                options[0].to_string()
            }
        }
        None => options.first().copied().unwrap_or_default().to_string(),
    }
}
