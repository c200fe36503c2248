//! Read-only preview of the collected data, built before submission.
//!
//! The preview is a plain data structure so it can be checked headlessly;
//! the presentation layer only turns it into widgets.

use super::models::Snapshot;
use super::schema::{CONTACT_FIELDS, FieldDef, GENERAL_FIELDS, TableKind};

pub const UNFILLED: &str = "Chưa điền";
pub const NO_DATA: &str = "Chưa có dữ liệu";

/// A labelled scalar line, e.g. `Tên doanh nghiệp: Công ty A`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem {
    pub label: String,
    pub value: String,
}

/// One block of a preview section.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewBlock {
    Items(Vec<PreviewItem>),
    Table {
        subtitle: Option<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Shown in place of a table with no populated rows.
    Placeholder {
        subtitle: Option<String>,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSection {
    pub title: String,
    pub blocks: Vec<PreviewBlock>,
}

/// The whole preview: general info, waste table, the three industrial
/// sub-tables, and the hazardous table with the contact fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDocument {
    pub sections: Vec<PreviewSection>,
}

impl PreviewDocument {
    pub fn build(snapshot: &Snapshot) -> Self {
        let sections = vec![
            PreviewSection {
                title: "THÔNG TIN CHUNG".to_string(),
                blocks: vec![PreviewBlock::Items(items(snapshot, GENERAL_FIELDS))],
            },
            PreviewSection {
                title: "CHẤT THẢI RẮN SINH HOẠT".to_string(),
                blocks: vec![table_block(snapshot, TableKind::Waste, None)],
            },
            PreviewSection {
                title: "CHẤT THẢI RẮN CÔNG NGHIỆP".to_string(),
                blocks: TableKind::INDUSTRIAL
                    .iter()
                    .map(|&kind| {
                        let subtitle = Some(kind.schema().title.to_string());
                        table_block(snapshot, kind, subtitle)
                    })
                    .collect(),
            },
            PreviewSection {
                title: "CHẤT THẢI NGUY HẠI".to_string(),
                blocks: vec![
                    table_block(snapshot, TableKind::Hazardous, None),
                    PreviewBlock::Items(items(snapshot, CONTACT_FIELDS)),
                ],
            },
        ];
        Self { sections }
    }
}

fn items(snapshot: &Snapshot, fields: &[FieldDef]) -> Vec<PreviewItem> {
    fields
        .iter()
        .map(|def| {
            let value = match snapshot.scalar_text(def.key) {
                Some(text) => match def.unit {
                    Some(unit) => format!("{}{}", text, unit),
                    None => text.to_string(),
                },
                None => UNFILLED.to_string(),
            };
            PreviewItem {
                label: def.label.to_string(),
                value,
            }
        })
        .collect()
}

fn table_block(snapshot: &Snapshot, kind: TableKind, subtitle: Option<String>) -> PreviewBlock {
    let schema = kind.schema();
    let rows = snapshot.rows(kind);
    if rows.is_empty() {
        return PreviewBlock::Placeholder {
            subtitle,
            text: NO_DATA.to_string(),
        };
    }

    let headers = schema.columns.iter().map(|c| c.label.to_string()).collect();
    let body = rows
        .iter()
        .map(|row| {
            schema
                .columns
                .iter()
                .map(|column| {
                    row.get(column.key)
                        .and_then(|value| value.as_str())
                        .unwrap_or("")
                        .to_string()
                })
                .collect()
        })
        .collect();

    PreviewBlock::Table {
        subtitle,
        headers,
        rows: body,
    }
}
