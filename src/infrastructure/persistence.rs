use crate::domain::{SurveyForm, SurveyRecord};
use std::fs;

/// Saves and loads survey drafts as JSON files.
pub struct FileRepository;

impl FileRepository {
    pub fn save_draft(form: &SurveyForm, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(form) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }

    pub fn load_draft(filename: &str) -> Result<(SurveyForm, String), String> {
        match fs::read_to_string(filename) {
            Ok(content) => match serde_json::from_str::<SurveyForm>(&content) {
                Ok(form) => Ok((form.normalized(), filename.to_string())),
                Err(e) => Err(format!("Invalid draft format - {}", e)),
            },
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Writes the flattened record as a single-row CSV, the same shape as the
/// target sheet: one header row, one data row.
pub struct RecordExporter;

impl RecordExporter {
    pub fn export_csv(record: &SurveyRecord, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;
        writer.serialize(record).map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}
