//! Column aggregation for the survey tables.
//!
//! Totals are kept as display strings, not raw numbers: per-table column
//! sums are formatted immediately, and the industrial grand totals are
//! re-derived by parsing those formatted strings back. Every recompute is
//! a full pass over the rows, so the displayed totals can never drift from
//! the entered data.

use std::collections::BTreeMap;

use super::models::SurveyForm;
use super::schema::{TableKind, TableSchema};

/// Unit literals for the three year columns: full years report kg/năm,
/// the half-year 2025 column reports plain kg.
pub const YEAR_UNITS: [&str; 3] = [" kg/năm", " kg/năm", " kg"];

/// Formats a total with exactly two fraction digits and thousands
/// grouping, e.g. `1234.5` → `"1,234.50"`.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}.{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Parses a displayed total back into a number: strips unit text and
/// grouping separators, then parses what remains. Unparsable input is
/// zero, never an error.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// A raw table cell parsed for summing; anything unparsable counts as zero.
fn cell_amount(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

/// Sums the numeric columns of one table across all of its rows.
pub fn column_totals(form: &SurveyForm, kind: TableKind) -> Vec<f64> {
    let schema: &TableSchema = kind.schema();
    let columns: Vec<usize> = schema.numeric_columns().collect();
    let mut totals = vec![0.0; columns.len()];

    for row in form.table(kind).rows() {
        for (slot, &col) in columns.iter().enumerate() {
            if let Some(value) = row.get(col) {
                totals[slot] += cell_amount(value);
            }
        }
    }

    totals
}

/// All derived totals, recomputed in full on every relevant change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTotals {
    per_table: BTreeMap<TableKind, Vec<String>>,
    grand: Vec<String>,
}

impl AggregateTotals {
    pub fn compute(form: &SurveyForm) -> Self {
        let mut per_table = BTreeMap::new();
        for kind in TableKind::ALL {
            let formatted: Vec<String> = column_totals(form, kind)
                .into_iter()
                .map(format_amount)
                .collect();
            per_table.insert(kind, formatted);
        }

        let grand = Self::grand_totals(&per_table);
        Self { per_table, grand }
    }

    /// Re-derives the industrial grand totals from the already-formatted
    /// per-table totals via a parse/format round trip, then appends the
    /// per-year unit literal.
    fn grand_totals(per_table: &BTreeMap<TableKind, Vec<String>>) -> Vec<String> {
        (0..YEAR_UNITS.len())
            .map(|year| {
                let sum: f64 = TableKind::INDUSTRIAL
                    .iter()
                    .filter_map(|kind| per_table.get(kind))
                    .filter_map(|totals| totals.get(year))
                    .map(|text| parse_amount(text))
                    .sum();
                format!("{}{}", format_amount(sum), YEAR_UNITS[year])
            })
            .collect()
    }

    /// Formatted totals for one table, aligned to its numeric columns.
    /// `None` when the table has not been aggregated, which callers skip
    /// silently.
    pub fn table(&self, kind: TableKind) -> Option<&[String]> {
        self.per_table.get(&kind).map(|totals| totals.as_slice())
    }

    /// Grand totals across the three industrial sub-tables, one per year
    /// column, unit suffix included.
    pub fn grand(&self) -> &[String] {
        &self.grand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SurveyForm;

    #[test]
    fn format_groups_thousands_and_pads_fractions() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(100.5), "100.50");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-42.0), "-42.00");
    }

    #[test]
    fn parse_strips_units_and_grouping() {
        assert_eq!(parse_amount("1,234.50"), 1234.5);
        assert_eq!(parse_amount("75.00 kg/năm"), 75.0);
        assert_eq!(parse_amount("0.00"), 0.0);
        assert_eq!(parse_amount("kg"), 0.0);
    }

    #[test]
    fn unparsable_cells_contribute_zero() {
        let mut form = SurveyForm::default();
        form.add_row(TableKind::Waste).unwrap();
        form.add_row(TableKind::Waste).unwrap();
        // waste_2023 is column index 1
        form.set_cell(TableKind::Waste, 0, 1, "100.5".into()).unwrap();
        form.set_cell(TableKind::Waste, 1, 1, "abc".into()).unwrap();
        form.set_cell(TableKind::Waste, 2, 1, "".into()).unwrap();

        let totals = AggregateTotals::compute(&form);
        assert_eq!(totals.table(TableKind::Waste).unwrap()[0], "100.50");
    }

    #[test]
    fn column_totals_sum_each_year_independently() {
        let mut form = SurveyForm::default();
        form.add_row(TableKind::Waste).unwrap();
        form.set_cell(TableKind::Waste, 0, 1, "10".into()).unwrap();
        form.set_cell(TableKind::Waste, 0, 2, "20".into()).unwrap();
        form.set_cell(TableKind::Waste, 1, 1, "1.5".into()).unwrap();
        form.set_cell(TableKind::Waste, 1, 3, "4".into()).unwrap();

        assert_eq!(column_totals(&form, TableKind::Waste), vec![11.5, 20.0, 4.0]);
    }

    #[test]
    fn grand_totals_reconstruct_from_formatted_sub_totals() {
        let mut form = SurveyForm::default();
        // 2024 is column index 2 in every industrial schema.
        form.set_cell(TableKind::IndustrialDirect, 0, 2, "50".into()).unwrap();
        form.set_cell(TableKind::IndustrialReuse, 0, 2, "25".into()).unwrap();
        form.set_cell(TableKind::IndustrialTreatment, 0, 2, "0".into()).unwrap();

        let totals = AggregateTotals::compute(&form);
        assert_eq!(totals.table(TableKind::IndustrialDirect).unwrap()[1], "50.00");
        assert_eq!(totals.table(TableKind::IndustrialReuse).unwrap()[1], "25.00");
        assert_eq!(totals.grand()[1], "75.00 kg/năm");
    }

    #[test]
    fn grand_totals_survive_grouped_formatting() {
        let mut form = SurveyForm::default();
        form.set_cell(TableKind::IndustrialDirect, 0, 1, "1200.25".into()).unwrap();
        form.set_cell(TableKind::IndustrialReuse, 0, 1, "99.75".into()).unwrap();

        let totals = AggregateTotals::compute(&form);
        assert_eq!(totals.table(TableKind::IndustrialDirect).unwrap()[0], "1,200.25");
        assert_eq!(totals.grand()[0], "1,300.00 kg/năm");
    }

    #[test]
    fn half_year_column_uses_plain_kg_unit() {
        let form = SurveyForm::default();
        let totals = AggregateTotals::compute(&form);
        assert_eq!(totals.grand()[0], "0.00 kg/năm");
        assert_eq!(totals.grand()[1], "0.00 kg/năm");
        assert_eq!(totals.grand()[2], "0.00 kg");
    }

    #[test]
    fn missing_table_is_skipped_silently() {
        let totals = AggregateTotals::default();
        assert!(totals.table(TableKind::Waste).is_none());
        assert!(totals.grand().is_empty());
    }
}
