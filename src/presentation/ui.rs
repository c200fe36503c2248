use crate::application::{App, AppMode, FocusTarget, SubmissionState};
use crate::domain::{FieldKind, PreviewBlock, Step, SurveyForm, TableKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
};

pub fn render_ui(f: &mut Frame, app: &App) {
    if app.submission == SubmissionState::Success {
        render_success_screen(f);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_progress(f, app, chunks[1]);
    render_body(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "ecosurvey - Phiếu khảo sát môi trường | {}",
        app.step.title()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(app.step.progress_percent());
    f.render_widget(gauge, area);
}

fn render_body(f: &mut Frame, app: &App, area: Rect) {
    match app.step {
        Step::A => render_fields(f, app, area),
        Step::B1 => render_table_step(f, app, area),
        Step::B2 => render_table_step(f, app, area),
        Step::C => render_table_step(f, app, area),
        Step::Preview => render_preview(f, app, area),
    }
}

fn render_fields(f: &mut Frame, app: &App, area: Rect) {
    let focus = app.current_focus();
    let mut lines = Vec::new();

    for def in app.step.fields() {
        let selected = focus == Some(FocusTarget::Field(def.key));
        let value = app.form.field_text(def.key);
        let shown = match def.kind {
            FieldKind::Radio(_) if value.is_empty() => "(chưa chọn)".to_string(),
            _ if value.is_empty() => "_".to_string(),
            _ => value.to_string(),
        };

        let marker = if def.required { "*" } else { " " };
        let label_style = if selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut spans = vec![
            Span::styled(format!("{}{}: ", marker, def.label), label_style),
            Span::raw(shown),
        ];
        if let Some(issue) = app.validation.issue_for(def.key) {
            spans.push(Span::styled(
                format!("  ← {}", issue.message()),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.step.title());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table_step(f: &mut Frame, app: &App, area: Rect) {
    let tables = app.step.tables();
    let fields = app.step.fields();

    let mut constraints: Vec<Constraint> = tables
        .iter()
        .map(|&kind| Constraint::Length(app.form.table(kind).row_count() as u16 + 4))
        .collect();
    if app.step == Step::B2 {
        // Grand totals live under the three sub-tables.
        constraints.push(Constraint::Length(3));
    }
    if !fields.is_empty() {
        constraints.push(Constraint::Min(fields.len() as u16 * 2 + 2));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut index = 0;
    for &kind in tables {
        render_survey_table(f, app, kind, chunks[index]);
        index += 1;
    }
    if app.step == Step::B2 {
        render_grand_totals(f, app, chunks[index]);
        index += 1;
    }
    if !fields.is_empty() {
        render_contact_fields(f, app, chunks[index]);
    }
}

fn render_survey_table(f: &mut Frame, app: &App, kind: TableKind, area: Rect) {
    let schema = kind.schema();
    let focus = app.current_focus();
    let numeric: Vec<usize> = schema.numeric_columns().collect();

    let mut headers = vec![Cell::from("STT")];
    for column in schema.columns {
        headers.push(Cell::from(column.label).style(Style::default().fg(Color::Yellow)));
    }
    let mut rows = vec![Row::new(headers).height(1)];

    for (row_index, cells) in app.form.table(kind).rows().iter().enumerate() {
        let mut widgets = vec![Cell::from(format!("{}", row_index + 1))
            .style(Style::default().fg(Color::Yellow))];
        for (col_index, value) in cells.iter().enumerate() {
            let selected = focus
                == Some(FocusTarget::Cell {
                    table: kind,
                    row: row_index,
                    col: col_index,
                });
            let style = if selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            let shown = if value.is_empty() { " " } else { value.as_str() };
            widgets.push(Cell::from(shown.to_string()).style(style));
        }
        rows.push(Row::new(widgets).height(1));
    }

    // Totals row under the data, aligned to the numeric columns. Skipped
    // silently when this table has not been aggregated yet.
    if let Some(totals) = app.totals.table(kind) {
        let mut widgets = vec![Cell::from("")];
        for (col_index, _) in schema.columns.iter().enumerate() {
            let text = match numeric.iter().position(|&n| n == col_index) {
                Some(slot) => totals.get(slot).cloned().unwrap_or_default(),
                None if col_index == 0 => "Tổng cộng".to_string(),
                None => String::new(),
            };
            widgets.push(
                Cell::from(text).style(Style::default().add_modifier(Modifier::BOLD)),
            );
        }
        rows.push(Row::new(widgets).height(1));
    }

    let mut widths = vec![Constraint::Length(3)];
    for (col_index, column) in schema.columns.iter().enumerate() {
        widths.push(Constraint::Length(column_width(
            &app.form,
            kind,
            col_index,
            column.label,
        )));
    }

    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title(schema.title))
        .column_spacing(1);
    f.render_widget(table, area);
}

fn column_width(form: &SurveyForm, kind: TableKind, col: usize, label: &str) -> u16 {
    let mut width = label.chars().count();
    for row in form.table(kind).rows() {
        if let Some(value) = row.get(col) {
            width = width.max(value.chars().count());
        }
    }
    width.clamp(6, 24) as u16
}

fn render_grand_totals(f: &mut Frame, app: &App, area: Rect) {
    let grand = app.totals.grand();
    let line = if grand.is_empty() {
        String::new()
    } else {
        format!(
            "2023: {}   2024: {}   6 tháng đầu 2025: {}",
            grand[0], grand[1], grand[2]
        )
    };
    let paragraph = Paragraph::new(line)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Tổng cộng chất thải công nghiệp"));
    f.render_widget(paragraph, area);
}

fn render_contact_fields(f: &mut Frame, app: &App, area: Rect) {
    let focus = app.current_focus();
    let mut lines = Vec::new();
    for def in app.step.fields() {
        let selected = focus == Some(FocusTarget::Field(def.key));
        let value = app.form.field_text(def.key);
        let label_style = if selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut spans = vec![
            Span::styled(format!("*{}: ", def.label), label_style),
            Span::raw(if value.is_empty() { "_" } else { value }),
        ];
        if let Some(issue) = app.validation.issue_for(def.key) {
            spans.push(Span::styled(
                format!("  ← {}", issue.message()),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(spans));
    }
    let block = Block::default().borders(Borders::ALL).title("Thông tin liên hệ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_preview(f: &mut Frame, app: &App, area: Rect) {
    let Some(preview) = &app.preview else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    for section in &preview.sections {
        lines.push(Line::from(Span::styled(
            section.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for block in &section.blocks {
            match block {
                PreviewBlock::Items(items) => {
                    for item in items {
                        lines.push(Line::from(format!("  {}: {}", item.label, item.value)));
                    }
                }
                PreviewBlock::Table { subtitle, headers, rows } => {
                    if let Some(subtitle) = subtitle {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", subtitle),
                            Style::default().add_modifier(Modifier::BOLD),
                        )));
                    }
                    lines.push(Line::from(Span::styled(
                        format!("    {}", headers.join(" | ")),
                        Style::default().fg(Color::Yellow),
                    )));
                    for row in rows {
                        lines.push(Line::from(format!("    {}", row.join(" | "))));
                    }
                }
                PreviewBlock::Placeholder { subtitle, text } => {
                    if let Some(subtitle) = subtitle {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", subtitle),
                            Style::default().add_modifier(Modifier::BOLD),
                        )));
                    }
                    lines.push(Line::from(Span::styled(
                        format!("    {}", text),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
        lines.push(Line::from(""));
    }

    let scroll = app.preview_scroll.min(lines.len().saturating_sub(1)) as u16;
    let paragraph = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(
            "Xem lại khảo sát (Enter: gửi, PgUp/PgDn: cuộn)",
        ));
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => {
            if app.submission == SubmissionState::Pending {
                "Đang gửi khảo sát...".to_string()
            } else if let Some(ref status) = app.status_message {
                status.clone()
            } else if app.step == Step::Preview {
                "Enter: gửi khảo sát | Ctrl+P: quay lại | Ctrl+E: xuất CSV | q: thoát".to_string()
            } else {
                "Tab/↑↓: di chuyển | Enter: nhập | Ctrl+N/Ctrl+P: bước | +/-: dòng | Ctrl+S: lưu | Ctrl+O: nạp | F1: trợ giúp | q: thoát"
                    .to_string()
            }
        }
        AppMode::Editing => format!("Nhập: {} (Enter lưu, Esc hủy)", app.input),
        AppMode::Help => "↑↓: cuộn | Esc/q: đóng trợ giúp".to_string(),
        AppMode::SaveAs => format!("Lưu bản nháp: {} (Enter lưu, Esc hủy)", app.filename_input),
        AppMode::LoadFile => format!("Nạp bản nháp: {} (Enter nạp, Esc hủy)", app.filename_input),
        AppMode::ExportCsv => format!("Xuất CSV: {} (Enter xuất, Esc hủy)", app.filename_input),
    };

    let style = match app.mode {
        AppMode::Normal => Style::default(),
        AppMode::Editing => Style::default().fg(Color::Green),
        AppMode::Help => Style::default().fg(Color::Cyan),
        AppMode::SaveAs | AppMode::LoadFile => Style::default().fg(Color::Yellow),
        AppMode::ExportCsv => Style::default().fg(Color::Magenta),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Trạng thái"))
        .style(style);
    f.render_widget(status, area);
}

fn render_success_screen(f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            "Gửi khảo sát thành công!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Cảm ơn doanh nghiệp đã tham gia khảo sát môi trường."),
        Line::from("Nhấn q để thoát."),
    ];
    let paragraph = Paragraph::new(lines).centered();
    f.render_widget(paragraph, chunks[1]);
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

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());
    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Hướng dẫn sử dụng")
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"PHIẾU KHẢO SÁT MÔI TRƯỜNG - HƯỚNG DẪN

=== CÁC BƯỚC ===
A   Thông tin chung về doanh nghiệp
B1  Chất thải rắn sinh hoạt (tối đa 10 dòng)
B2  Chất thải rắn công nghiệp: 3 bảng con (tối đa 10 dòng mỗi bảng)
C   Chất thải nguy hại (tối đa 9 dòng) + thông tin liên hệ
    Sau bước C: xem lại và gửi khảo sát

=== DI CHUYỂN ===
Tab / Shift+Tab     Trường hoặc ô tiếp theo / trước đó
Mũi tên ↑↓←→        Di chuyển trong bảng
Ctrl+N              Bước tiếp theo (kiểm tra dữ liệu, không chặn)
Ctrl+P              Bước trước đó

=== NHẬP LIỆU ===
Enter               Sửa trường/ô đang chọn
                    Với loại hình doanh nghiệp và phương pháp xử lý:
                    Enter chuyển sang lựa chọn kế tiếp
+ / -               Thêm / xóa dòng của bảng đang chọn
                    Các cột năm được cộng tự động; giá trị không hợp lệ
                    tính là 0

=== TỆP ===
Ctrl+S              Lưu bản nháp (JSON)
Ctrl+O              Nạp bản nháp
Ctrl+E              Xuất bản ghi phẳng ra CSV (một dòng tiêu đề, một dòng
                    dữ liệu)

=== GỬI ===
Tại bước xem lại: Enter gửi khảo sát. Trong khi đang gửi không thể gửi
lần thứ hai. Nếu gửi thất bại, có thể thử lại thủ công.

=== KHÁC ===
F1 hoặc ?           Trợ giúp này
q                   Thoát"#
        .to_string()
}
