//! The headless form model for the environmental survey.
//!
//! All survey state lives in [`SurveyForm`]: scalar field values plus one
//! row collection per table. The UI layer reads and writes this model; the
//! aggregation, validation, and preview logic never touch rendered widgets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DomainError, DomainResult};
use super::schema::{CONTACT_FIELDS, FieldDef, GENERAL_FIELDS, TableKind};

/// A single scalar value: free text, a selected radio/select option (also
/// stored as text), or a checkbox flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Flag(_) => None,
        }
    }

    /// Empty text values are dropped from snapshots; flags never are.
    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }
}

/// Rows of one table, each aligned to the table's declared columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    rows: Vec<Vec<String>>,
}

impl TableData {
    fn with_columns(columns: usize) -> Self {
        Self {
            rows: vec![vec![String::new(); columns]],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// The whole survey as entered so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyForm {
    fields: BTreeMap<String, FieldValue>,
    tables: BTreeMap<TableKind, TableData>,
}

impl Default for SurveyForm {
    fn default() -> Self {
        let mut tables = BTreeMap::new();
        for kind in TableKind::ALL {
            tables.insert(kind, TableData::with_columns(kind.schema().columns.len()));
        }
        Self {
            fields: BTreeMap::new(),
            tables,
        }
    }
}

impl SurveyForm {
    pub fn field_def(key: &str) -> Option<&'static FieldDef> {
        GENERAL_FIELDS
            .iter()
            .chain(CONTACT_FIELDS.iter())
            .find(|def| def.key == key)
    }

    /// Overwrites a declared scalar field.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> DomainResult<()> {
        if Self::field_def(key).is_none() {
            return Err(DomainError::UnknownField(key.to_string()));
        }
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Current text of a field, empty string when unset.
    pub fn field_text(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .and_then(|value| value.as_text())
            .unwrap_or("")
    }

    pub fn table(&self, kind: TableKind) -> &TableData {
        &self.tables[&kind]
    }

    pub fn cell(&self, kind: TableKind, row: usize, col: usize) -> &str {
        self.tables[&kind]
            .rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn set_cell(
        &mut self,
        kind: TableKind,
        row: usize,
        col: usize,
        value: String,
    ) -> DomainResult<()> {
        let schema = kind.schema();
        if col >= schema.columns.len() {
            return Err(DomainError::UnknownColumn(format!(
                "{}:{}",
                schema.section_key, col
            )));
        }
        let table = self
            .tables
            .entry(kind)
            .or_insert_with(|| TableData::with_columns(schema.columns.len()));
        match table.rows.get_mut(row) {
            Some(cells) => {
                cells[col] = value;
                Ok(())
            }
            None => Err(DomainError::RowOutOfRange { row }),
        }
    }

    /// Appends a blank row, rejecting when the table is at its cap.
    pub fn add_row(&mut self, kind: TableKind) -> DomainResult<usize> {
        let schema = kind.schema();
        let table = self
            .tables
            .entry(kind)
            .or_insert_with(|| TableData::with_columns(schema.columns.len()));
        if table.rows.len() >= schema.max_rows {
            return Err(DomainError::RowLimitReached {
                max_rows: schema.max_rows,
            });
        }
        table.rows.push(vec![String::new(); schema.columns.len()]);
        Ok(table.rows.len())
    }

    /// Drops the last row, rejecting when only one row remains.
    pub fn remove_row(&mut self, kind: TableKind) -> DomainResult<usize> {
        let columns = kind.schema().columns.len();
        let table = self
            .tables
            .entry(kind)
            .or_insert_with(|| TableData::with_columns(columns));
        if table.rows.len() <= 1 {
            return Err(DomainError::MinimumRowsRequired);
        }
        table.rows.pop();
        Ok(table.rows.len())
    }

    /// Repairs a deserialized form: every table exists, every row spans the
    /// declared columns, and no table exceeds its row cap.
    pub fn normalized(mut self) -> Self {
        for kind in TableKind::ALL {
            let schema = kind.schema();
            let table = self
                .tables
                .entry(kind)
                .or_insert_with(|| TableData::with_columns(schema.columns.len()));
            table.rows.truncate(schema.max_rows);
            if table.rows.is_empty() {
                table.rows.push(vec![String::new(); schema.columns.len()]);
            }
            for row in &mut table.rows {
                row.resize(schema.columns.len(), String::new());
            }
        }
        self
    }

    /// Rebuilds the full persisted projection from scratch.
    ///
    /// Blank text fields are dropped, checkbox flags are kept, and table
    /// rows become ordered key→value maps of their non-empty cells. Rows
    /// with nothing filled in are omitted entirely. Calling this twice
    /// without mutating the form yields identical output.
    pub fn snapshot(&self) -> Snapshot {
        let scalars = self
            .fields
            .iter()
            .filter(|(_, value)| !value.is_blank())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut tables = BTreeMap::new();
        for kind in TableKind::ALL {
            tables.insert(kind, self.collect_table(kind));
        }

        Snapshot { scalars, tables }
    }

    fn collect_table(&self, kind: TableKind) -> Vec<Map<String, Value>> {
        let schema = kind.schema();
        let mut rows = Vec::new();
        for cells in &self.tables[&kind].rows {
            let mut row = Map::new();
            for (column, value) in schema.columns.iter().zip(cells) {
                if !value.trim().is_empty() {
                    row.insert(column.key.to_string(), Value::String(value.clone()));
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        rows
    }
}

/// Point-in-time projection of the form: non-empty scalars plus the
/// populated rows of every table.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub scalars: BTreeMap<String, FieldValue>,
    pub tables: BTreeMap<TableKind, Vec<Map<String, Value>>>,
}

impl Snapshot {
    pub fn scalar_text(&self, key: &str) -> Option<&str> {
        self.scalars.get(key).and_then(|value| value.as_text())
    }

    pub fn rows(&self, kind: TableKind) -> &[Map<String, Value>] {
        self.tables.get(&kind).map(|rows| rows.as_slice()).unwrap_or(&[])
    }

    /// Flattens the snapshot into the single-row record that gets
    /// submitted: scalars by key, each table as one JSON text blob.
    pub fn flatten(&self, timestamp: String) -> SurveyRecord {
        let scalar = |key: &str| self.scalar_text(key).unwrap_or("").to_string();
        SurveyRecord {
            timestamp,
            company_name: scalar("company_name"),
            address: scalar("address"),
            business_type: scalar("business_type"),
            capital: scalar("capital"),
            employees: scalar("employees"),
            factory_area: scalar("factory_area"),
            company_type: scalar("company_type"),
            waste_data_json: self.blob(TableKind::Waste),
            industrial_direct_json: self.blob(TableKind::IndustrialDirect),
            industrial_reuse_json: self.blob(TableKind::IndustrialReuse),
            industrial_treatment_json: self.blob(TableKind::IndustrialTreatment),
            hazardous_data_json: self.blob(TableKind::Hazardous),
            contact_name: scalar("contact_name"),
            contact_phone: scalar("contact_phone"),
        }
    }

    fn blob(&self, kind: TableKind) -> String {
        serde_json::to_string(self.rows(kind)).unwrap_or_else(|_| "[]".to_string())
    }
}

/// The flat single-row payload handed to the submission transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub timestamp: String,
    pub company_name: String,
    pub address: String,
    pub business_type: String,
    pub capital: String,
    pub employees: String,
    pub factory_area: String,
    pub company_type: String,
    pub waste_data_json: String,
    pub industrial_direct_json: String,
    pub industrial_reuse_json: String,
    pub industrial_treatment_json: String,
    pub hazardous_data_json: String,
    pub contact_name: String,
    pub contact_phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_starts_with_one_blank_row() {
        let form = SurveyForm::default();
        for kind in TableKind::ALL {
            assert_eq!(form.table(kind).row_count(), 1);
        }
    }

    #[test]
    fn set_field_rejects_undeclared_keys() {
        let mut form = SurveyForm::default();
        let err = form
            .set_field("no_such_field", FieldValue::Text("x".into()))
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownField("no_such_field".into()));
    }

    #[test]
    fn set_cell_distinguishes_bad_rows_from_bad_columns() {
        let mut form = SurveyForm::default();
        assert_eq!(
            form.set_cell(TableKind::Waste, 3, 0, "x".into()).unwrap_err(),
            DomainError::RowOutOfRange { row: 3 }
        );
        assert!(matches!(
            form.set_cell(TableKind::Waste, 0, 9, "x".into()).unwrap_err(),
            DomainError::UnknownColumn(_)
        ));
    }

    #[test]
    fn snapshot_drops_blank_scalars_and_keeps_selected_radio() {
        let mut form = SurveyForm::default();
        form.set_field("company_name", FieldValue::Text("Công ty A".into()))
            .unwrap();
        form.set_field("address", FieldValue::Text("   ".into())).unwrap();
        form.set_field("company_type", FieldValue::Text("Công ty TNHH".into()))
            .unwrap();

        let snapshot = form.snapshot();
        assert_eq!(snapshot.scalar_text("company_name"), Some("Công ty A"));
        assert_eq!(snapshot.scalar_text("address"), None);
        assert_eq!(snapshot.scalar_text("company_type"), Some("Công ty TNHH"));
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut form = SurveyForm::default();
        form.set_field("company_name", FieldValue::Text("Nada".into()))
            .unwrap();
        form.set_cell(TableKind::Waste, 0, 0, "Giấy vụn".into()).unwrap();
        form.set_cell(TableKind::Waste, 0, 1, "12.5".into()).unwrap();

        assert_eq!(form.snapshot(), form.snapshot());
    }

    #[test]
    fn snapshot_excludes_rows_with_no_populated_field() {
        let mut form = SurveyForm::default();
        form.add_row(TableKind::Waste).unwrap();
        form.add_row(TableKind::Waste).unwrap();
        form.set_cell(TableKind::Waste, 1, 0, "Nhựa".into()).unwrap();

        let snapshot = form.snapshot();
        let rows = snapshot.rows(TableKind::Waste);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["waste_name"], "Nhựa");
    }

    #[test]
    fn snapshot_rows_keep_column_order() {
        let mut form = SurveyForm::default();
        form.set_cell(TableKind::Waste, 0, 4, "URENCO".into()).unwrap();
        form.set_cell(TableKind::Waste, 0, 0, "Giấy".into()).unwrap();
        form.set_cell(TableKind::Waste, 0, 2, "3".into()).unwrap();

        let snapshot = form.snapshot();
        let keys: Vec<&String> = snapshot.rows(TableKind::Waste)[0].keys().collect();
        assert_eq!(keys, ["waste_name", "waste_2024", "waste_receiver"]);
    }

    #[test]
    fn add_row_rejected_at_cap_and_count_unchanged() {
        let mut form = SurveyForm::default();
        for _ in 1..10 {
            form.add_row(TableKind::Waste).unwrap();
        }
        assert_eq!(form.table(TableKind::Waste).row_count(), 10);

        let err = form.add_row(TableKind::Waste).unwrap_err();
        assert_eq!(err, DomainError::RowLimitReached { max_rows: 10 });
        assert_eq!(form.table(TableKind::Waste).row_count(), 10);
    }

    #[test]
    fn hazardous_table_caps_at_nine_rows() {
        let mut form = SurveyForm::default();
        for _ in 1..9 {
            form.add_row(TableKind::Hazardous).unwrap();
        }
        let err = form.add_row(TableKind::Hazardous).unwrap_err();
        assert_eq!(err, DomainError::RowLimitReached { max_rows: 9 });
    }

    #[test]
    fn remove_row_rejected_below_one() {
        let mut form = SurveyForm::default();
        let err = form.remove_row(TableKind::Waste).unwrap_err();
        assert_eq!(err, DomainError::MinimumRowsRequired);
        assert_eq!(form.table(TableKind::Waste).row_count(), 1);
    }

    #[test]
    fn flatten_passes_scalars_through_and_blanks_missing_ones() {
        let mut form = SurveyForm::default();
        form.set_field("company_name", FieldValue::Text("Công ty B".into()))
            .unwrap();
        form.set_field("contact_phone", FieldValue::Text("0123 456 789".into()))
            .unwrap();

        let record = form.snapshot().flatten("2025-08-30T00:00:00Z".into());
        assert_eq!(record.company_name, "Công ty B");
        assert_eq!(record.contact_phone, "0123 456 789");
        assert_eq!(record.address, "");
        assert_eq!(record.timestamp, "2025-08-30T00:00:00Z");
    }

    #[test]
    fn flatten_serializes_rows_as_parseable_blobs() {
        let mut form = SurveyForm::default();
        form.set_cell(TableKind::Hazardous, 0, 0, "Dầu thải".into()).unwrap();
        form.set_cell(TableKind::Hazardous, 0, 1, "17 02 03".into()).unwrap();
        form.set_cell(TableKind::Hazardous, 0, 3, "40".into()).unwrap();

        let record = form.snapshot().flatten(String::new());
        let rows: Vec<Map<String, Value>> =
            serde_json::from_str(&record.hazardous_data_json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["haz_name"], "Dầu thải");
        assert_eq!(rows[0]["haz_code"], "17 02 03");
        assert_eq!(rows[0]["haz_2024"], "40");

        let empty: Vec<Map<String, Value>> =
            serde_json::from_str(&record.waste_data_json).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn normalized_repairs_missing_tables_and_short_rows() {
        let json = r#"{"fields":{},"tables":{"Waste":{"rows":[["Giấy"]]}}}"#;
        let form: SurveyForm = serde_json::from_str(json).unwrap();
        let form = form.normalized();

        for kind in TableKind::ALL {
            assert!(form.table(kind).row_count() >= 1, "{:?}", kind);
        }
        assert_eq!(form.table(TableKind::Waste).rows()[0].len(), 5);
        assert_eq!(form.cell(TableKind::Waste, 0, 0), "Giấy");
        assert_eq!(form.cell(TableKind::Waste, 0, 4), "");
    }

    #[test]
    fn draft_round_trips_through_json() {
        let mut form = SurveyForm::default();
        form.set_field("company_name", FieldValue::Text("Công ty C".into()))
            .unwrap();
        form.add_row(TableKind::IndustrialReuse).unwrap();
        form.set_cell(TableKind::IndustrialReuse, 1, 1, "7.25".into()).unwrap();

        let json = serde_json::to_string(&form).unwrap();
        let restored: SurveyForm = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.field_text("company_name"), "Công ty C");
        assert_eq!(restored.cell(TableKind::IndustrialReuse, 1, 1), "7.25");
        assert_eq!(restored.snapshot(), form.snapshot());
    }
}
