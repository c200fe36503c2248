//! Per-step validation of required fields.
//!
//! Validation only ever marks errors for display; navigation is never
//! blocked by an invalid step. A step that declares no required fields is
//! valid unconditionally.

use super::models::SurveyForm;
use super::schema::{FieldDef, FieldKind, Step};

/// One validation failure, scoped either to a single field or to a whole
/// radio group.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    Field { key: String, message: String },
    Group { name: String, message: String },
}

impl ValidationIssue {
    pub fn key(&self) -> &str {
        match self {
            ValidationIssue::Field { key, .. } => key,
            ValidationIssue::Group { name, .. } => name,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationIssue::Field { message, .. } => message,
            ValidationIssue::Group { message, .. } => message,
        }
    }
}

/// Result of validating one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepValidation {
    pub issues: Vec<ValidationIssue>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issue_for(&self, key: &str) -> Option<&ValidationIssue> {
        self.issues.iter().find(|issue| issue.key() == key)
    }
}

pub struct Validator;

impl Validator {
    /// Checks the required fields of the given step only.
    pub fn validate_step(form: &SurveyForm, step: Step) -> StepValidation {
        let required: Vec<&FieldDef> =
            step.fields().iter().filter(|def| def.required).collect();

        // No required fields on this step: valid unconditionally.
        if required.is_empty() {
            return StepValidation::default();
        }

        let mut issues = Vec::new();
        for def in required {
            if let Some(issue) = Self::validate_field(form, def) {
                issues.push(issue);
            }
        }
        StepValidation { issues }
    }

    fn validate_field(form: &SurveyForm, def: &FieldDef) -> Option<ValidationIssue> {
        let value = form.field_text(def.key);

        if let FieldKind::Radio(_) = def.kind {
            if value.is_empty() {
                return Some(ValidationIssue::Group {
                    name: def.key.to_string(),
                    message: "Vui lòng chọn một tùy chọn".to_string(),
                });
            }
            return None;
        }

        if value.trim().is_empty() {
            return Some(ValidationIssue::Field {
                key: def.key.to_string(),
                message: "Trường này không được để trống".to_string(),
            });
        }

        match def.kind {
            FieldKind::Tel if !Self::is_valid_phone(value) => Some(ValidationIssue::Field {
                key: def.key.to_string(),
                message: "Số điện thoại không hợp lệ".to_string(),
            }),
            FieldKind::Number if !Self::is_valid_amount(value) => Some(ValidationIssue::Field {
                key: def.key.to_string(),
                message: "Vui lòng nhập số hợp lệ".to_string(),
            }),
            _ => None,
        }
    }

    /// At least 8 characters drawn from digits, `+ - ( )` and whitespace.
    fn is_valid_phone(value: &str) -> bool {
        value.chars().count() >= 8
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-()".contains(c))
    }

    /// Non-negative and parseable as a number.
    fn is_valid_amount(value: &str) -> bool {
        matches!(value.trim().parse::<f64>(), Ok(n) if n >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FieldValue;

    fn filled_step_a() -> SurveyForm {
        let mut form = SurveyForm::default();
        form.set_field("company_name", FieldValue::Text("Công ty D".into()))
            .unwrap();
        form.set_field("address", FieldValue::Text("KCN Sóng Thần".into()))
            .unwrap();
        form.set_field("company_type", FieldValue::Text("Công ty TNHH".into()))
            .unwrap();
        form
    }

    #[test]
    fn filled_required_fields_pass() {
        let form = filled_step_a();
        assert!(Validator::validate_step(&form, Step::A).is_valid());
    }

    #[test]
    fn empty_required_field_yields_field_issue() {
        let mut form = filled_step_a();
        form.set_field("address", FieldValue::Text("".into())).unwrap();

        let validation = Validator::validate_step(&form, Step::A);
        assert!(!validation.is_valid());
        let issue = validation.issue_for("address").unwrap();
        assert!(matches!(issue, ValidationIssue::Field { .. }));
        assert_eq!(issue.message(), "Trường này không được để trống");
    }

    #[test]
    fn unchecked_required_radio_yields_one_group_issue() {
        let mut form = filled_step_a();
        form.set_field("company_type", FieldValue::Text("".into())).unwrap();

        let validation = Validator::validate_step(&form, Step::A);
        assert_eq!(validation.issues.len(), 1);
        assert!(matches!(
            validation.issues[0],
            ValidationIssue::Group { ref name, .. } if name == "company_type"
        ));
    }

    #[test]
    fn steps_without_required_fields_are_always_valid() {
        let form = SurveyForm::default();
        assert!(Validator::validate_step(&form, Step::B1).is_valid());
        assert!(Validator::validate_step(&form, Step::B2).is_valid());
        assert!(Validator::validate_step(&form, Step::Preview).is_valid());
    }

    #[test]
    fn phone_numbers_need_eight_plausible_characters() {
        let mut form = SurveyForm::default();
        form.set_field("contact_name", FieldValue::Text("Anh Tú".into()))
            .unwrap();

        for (value, ok) in [
            ("0123 456 789", true),
            ("+84 (28) 3822-9999", true),
            ("12345", false),
            ("not a phone", false),
        ] {
            form.set_field("contact_phone", FieldValue::Text(value.into()))
                .unwrap();
            let validation = Validator::validate_step(&form, Step::C);
            assert_eq!(validation.is_valid(), ok, "{:?}", value);
            if !ok {
                assert_eq!(
                    validation.issue_for("contact_phone").unwrap().message(),
                    "Số điện thoại không hợp lệ"
                );
            }
        }
    }

    #[test]
    fn optional_number_fields_do_not_block_when_empty() {
        // employees/factory_area are number-typed but not required, so a
        // fully blank step A only reports the three required fields.
        let form = SurveyForm::default();
        let validation = Validator::validate_step(&form, Step::A);
        assert_eq!(validation.issues.len(), 3);
    }

    #[test]
    fn negative_numbers_rejected_for_required_number_fields() {
        // No required number field exists in the survey itself, so check
        // the rule directly.
        assert!(Validator::is_valid_amount("0"));
        assert!(Validator::is_valid_amount("120.5"));
        assert!(!Validator::is_valid_amount("-3"));
        assert!(!Validator::is_valid_amount("ten"));
    }
}
