//! Declarative schema for the survey: steps, scalar fields, and table
//! column layouts.
//!
//! Everything the form model, aggregator, validator, and preview builder
//! need to know about a field or column is declared here, so row-to-column
//! mapping is explicit rather than inferred from key prefixes.

use serde::{Deserialize, Serialize};

/// One page of the multi-part survey.
///
/// Exactly one step is current at any time. `Preview` is reachable only by
/// advancing past the last ordinary step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    A,
    B1,
    B2,
    C,
    Preview,
}

impl Step {
    /// The ordinary steps, in navigation order. `Preview` sits after them.
    pub const ORDINARY: [Step; 4] = [Step::A, Step::B1, Step::B2, Step::C];

    pub fn title(self) -> &'static str {
        match self {
            Step::A => "A. Thông tin chung",
            Step::B1 => "B1. Chất thải rắn sinh hoạt",
            Step::B2 => "B2. Chất thải rắn công nghiệp",
            Step::C => "C. Chất thải nguy hại",
            Step::Preview => "Xem lại khảo sát",
        }
    }

    /// Scalar fields shown on this step, in display order.
    pub fn fields(self) -> &'static [FieldDef] {
        match self {
            Step::A => GENERAL_FIELDS,
            Step::C => CONTACT_FIELDS,
            _ => &[],
        }
    }

    /// Tables shown on this step, in display order.
    pub fn tables(self) -> &'static [TableKind] {
        match self {
            Step::B1 => &[TableKind::Waste],
            Step::B2 => &TableKind::INDUSTRIAL,
            Step::C => &[TableKind::Hazardous],
            _ => &[],
        }
    }

    pub fn has_tables(self) -> bool {
        !self.tables().is_empty()
    }

    /// Progress through the survey as a percentage, for the progress bar.
    pub fn progress_percent(self) -> u16 {
        match self {
            Step::Preview => 100,
            step => {
                let index = Step::ORDINARY.iter().position(|s| *s == step).unwrap_or(0);
                (((index + 1) * 100) / Step::ORDINARY.len()) as u16
            }
        }
    }
}

/// How a scalar field is entered and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Tel,
    Radio(&'static [&'static str]),
}

/// A named scalar input belonging to one step.
#[derive(Debug)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Unit literal appended to filled values in the preview.
    pub unit: Option<&'static str>,
}

pub const COMPANY_TYPES: &[&str] = &[
    "Doanh nghiệp tư nhân",
    "Công ty TNHH",
    "Công ty cổ phần",
    "Doanh nghiệp FDI",
    "Khác",
];

pub const GENERAL_FIELDS: &[FieldDef] = &[
    FieldDef {
        key: "company_name",
        label: "Tên doanh nghiệp",
        kind: FieldKind::Text,
        required: true,
        unit: None,
    },
    FieldDef {
        key: "address",
        label: "Địa chỉ",
        kind: FieldKind::Text,
        required: true,
        unit: None,
    },
    FieldDef {
        key: "business_type",
        label: "Ngành nghề sản xuất",
        kind: FieldKind::Text,
        required: false,
        unit: None,
    },
    FieldDef {
        key: "capital",
        label: "Vốn điều lệ",
        kind: FieldKind::Text,
        required: false,
        unit: None,
    },
    FieldDef {
        key: "employees",
        label: "Quy mô lao động",
        kind: FieldKind::Number,
        required: false,
        unit: Some(" người"),
    },
    FieldDef {
        key: "factory_area",
        label: "Diện tích nhà xưởng",
        kind: FieldKind::Number,
        required: false,
        unit: Some(" m²"),
    },
    FieldDef {
        key: "company_type",
        label: "Loại hình doanh nghiệp",
        kind: FieldKind::Radio(COMPANY_TYPES),
        required: true,
        unit: None,
    },
];

pub const CONTACT_FIELDS: &[FieldDef] = &[
    FieldDef {
        key: "contact_name",
        label: "Người liên hệ",
        kind: FieldKind::Text,
        required: true,
        unit: None,
    },
    FieldDef {
        key: "contact_phone",
        label: "Số điện thoại",
        kind: FieldKind::Tel,
        required: true,
        unit: None,
    },
];

/// How a table column is entered and whether it participates in totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    Select(&'static [&'static str]),
}

/// One declared column of a repeatable-row table.
#[derive(Debug)]
pub struct ColumnDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
}

/// The five repeatable-row tables of the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableKind {
    Waste,
    IndustrialDirect,
    IndustrialReuse,
    IndustrialTreatment,
    Hazardous,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Waste,
        TableKind::IndustrialDirect,
        TableKind::IndustrialReuse,
        TableKind::IndustrialTreatment,
        TableKind::Hazardous,
    ];

    /// The three industrial sub-tables whose totals roll up into grand totals.
    pub const INDUSTRIAL: [TableKind; 3] = [
        TableKind::IndustrialDirect,
        TableKind::IndustrialReuse,
        TableKind::IndustrialTreatment,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            TableKind::Waste => &WASTE_SCHEMA,
            TableKind::IndustrialDirect => &INDUSTRIAL_DIRECT_SCHEMA,
            TableKind::IndustrialReuse => &INDUSTRIAL_REUSE_SCHEMA,
            TableKind::IndustrialTreatment => &INDUSTRIAL_TREATMENT_SCHEMA,
            TableKind::Hazardous => &HAZARDOUS_SCHEMA,
        }
    }
}

/// Fixed column layout and row cap for one table.
#[derive(Debug)]
pub struct TableSchema {
    /// Section key used when the table's rows are persisted or flattened.
    pub section_key: &'static str,
    pub title: &'static str,
    pub columns: &'static [ColumnDef],
    pub max_rows: usize,
}

impl TableSchema {
    /// Indices of the columns that participate in aggregation.
    pub fn numeric_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::Numeric)
            .map(|(i, _)| i)
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }
}

pub const TREATMENT_METHODS: &[&str] = &[
    "TC - Tận thu/tái chế",
    "TH - Trung hòa",
    "PT - Phân tách/chiết/lọc/kết tủa",
    "OH - Oxy hóa",
    "SH - Sinh học",
    "ĐX - Đồng xử lý",
    "TĐ - Thiêu đốt",
    "HR - Hóa rắn",
    "CL - Cô lập/đóng kén",
    "C - Chôn lấp",
    "TR - Tẩy rửa",
    "SC - Sơ chế",
    "Khác",
];

pub static WASTE_SCHEMA: TableSchema = TableSchema {
    section_key: "waste_data",
    title: "Chất thải rắn sinh hoạt",
    columns: &[
        ColumnDef { key: "waste_name", label: "Tên chất thải", kind: ColumnKind::Text },
        ColumnDef { key: "waste_2023", label: "2023 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "waste_2024", label: "2024 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "waste_2025", label: "6 tháng đầu 2025 (kg)", kind: ColumnKind::Numeric },
        ColumnDef { key: "waste_receiver", label: "Tiếp nhận", kind: ColumnKind::Text },
    ],
    max_rows: 10,
};

pub static INDUSTRIAL_DIRECT_SCHEMA: TableSchema = TableSchema {
    section_key: "direct_use",
    title: "Sử dụng trực tiếp làm nguyên liệu",
    columns: &[
        ColumnDef { key: "ind1_name", label: "Tên chất thải", kind: ColumnKind::Text },
        ColumnDef { key: "ind1_2023", label: "2023 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind1_2024", label: "2024 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind1_2025", label: "6 tháng đầu 2025 (kg)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind1_receiver", label: "Tiếp nhận", kind: ColumnKind::Text },
    ],
    max_rows: 10,
};

pub static INDUSTRIAL_REUSE_SCHEMA: TableSchema = TableSchema {
    section_key: "reuse_recycle",
    title: "Tái sử dụng, tái chế",
    columns: &[
        ColumnDef { key: "ind2_name", label: "Tên chất thải", kind: ColumnKind::Text },
        ColumnDef { key: "ind2_2023", label: "2023 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind2_2024", label: "2024 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind2_2025", label: "6 tháng đầu 2025 (kg)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind2_receiver", label: "Tiếp nhận", kind: ColumnKind::Text },
    ],
    max_rows: 10,
};

pub static INDUSTRIAL_TREATMENT_SCHEMA: TableSchema = TableSchema {
    section_key: "waste_treatment",
    title: "Chất thải phải xử lý",
    columns: &[
        ColumnDef { key: "ind3_name", label: "Tên chất thải", kind: ColumnKind::Text },
        ColumnDef { key: "ind3_2023", label: "2023 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind3_2024", label: "2024 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind3_2025", label: "6 tháng đầu 2025 (kg)", kind: ColumnKind::Numeric },
        ColumnDef { key: "ind3_receiver", label: "Tiếp nhận", kind: ColumnKind::Text },
    ],
    max_rows: 10,
};

pub static HAZARDOUS_SCHEMA: TableSchema = TableSchema {
    section_key: "hazardous_data",
    title: "Chất thải nguy hại",
    columns: &[
        ColumnDef { key: "haz_name", label: "Tên CTNH", kind: ColumnKind::Text },
        ColumnDef { key: "haz_code", label: "Mã CTNH", kind: ColumnKind::Text },
        ColumnDef { key: "haz_2023", label: "2023 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "haz_2024", label: "2024 (kg/năm)", kind: ColumnKind::Numeric },
        ColumnDef { key: "haz_2025", label: "6 tháng đầu 2025 (kg)", kind: ColumnKind::Numeric },
        ColumnDef { key: "haz_method", label: "Phương pháp", kind: ColumnKind::Select(TREATMENT_METHODS) },
        ColumnDef { key: "haz_receiver", label: "Tiếp nhận", kind: ColumnKind::Text },
    ],
    max_rows: 9,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_steps_are_in_navigation_order() {
        assert_eq!(Step::ORDINARY, [Step::A, Step::B1, Step::B2, Step::C]);
    }

    #[test]
    fn progress_reaches_full_on_preview() {
        assert_eq!(Step::A.progress_percent(), 25);
        assert_eq!(Step::B1.progress_percent(), 50);
        assert_eq!(Step::B2.progress_percent(), 75);
        assert_eq!(Step::C.progress_percent(), 100);
        assert_eq!(Step::Preview.progress_percent(), 100);
    }

    #[test]
    fn numeric_columns_are_the_three_year_columns() {
        for kind in TableKind::ALL {
            let schema = kind.schema();
            let numeric: Vec<usize> = schema.numeric_columns().collect();
            assert_eq!(numeric.len(), 3, "{:?}", kind);
            for index in numeric {
                assert!(schema.columns[index].key.contains("202"));
            }
        }
    }

    #[test]
    fn row_caps_match_the_survey_rules() {
        assert_eq!(TableKind::Waste.schema().max_rows, 10);
        for kind in TableKind::INDUSTRIAL {
            assert_eq!(kind.schema().max_rows, 10);
        }
        assert_eq!(TableKind::Hazardous.schema().max_rows, 9);
    }

    #[test]
    fn column_index_resolves_declared_keys() {
        let schema = TableKind::Hazardous.schema();
        assert_eq!(schema.column_index("haz_code"), Some(1));
        assert_eq!(schema.column_index("haz_method"), Some(5));
        assert_eq!(schema.column_index("nope"), None);
    }
}
