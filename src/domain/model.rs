use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record of the source table, resolved against the header map at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub institution: String,
    pub career: Option<String>,
    pub activities: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub region: Option<String>,
    pub acceptance_letter_addressee: Option<String>,
    pub school_role: Option<String>,
    /// Columns the composer does not read (student names, etc.).
    pub extra: BTreeMap<String, String>,
}

/// Which optional columns the source table actually carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSet {
    pub career: bool,
    pub activities: bool,
    pub start_date: bool,
    pub region: bool,
    pub acceptance_letter_addressee: bool,
    pub school_role: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub rows: Vec<SourceRow>,
    pub columns: ColumnSet,
}

impl SourceTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone)]
pub struct InstitutionGroup {
    pub institution: String,
    pub region: Option<String>,
    pub rows: Vec<SourceRow>,
}

impl InstitutionGroup {
    pub fn earliest_start_date(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(|row| row.start_date).min()
    }

    /// The row responsible-party fields are taken from.
    pub fn representative(&self) -> Option<&SourceRow> {
        self.rows.first()
    }
}

#[derive(Debug, Clone)]
pub struct CareerGroup {
    pub career: String,
    pub rows: Vec<SourceRow>,
}

impl CareerGroup {
    pub fn student_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw activity strings, exact-match deduplicated in first-seen order.
    pub fn unique_activities(&self) -> Vec<&str> {
        let mut unique: Vec<&str> = Vec::new();
        for activity in self.rows.iter().filter_map(|row| row.activities.as_deref()) {
            if !unique.contains(&activity) {
                unique.push(activity);
            }
        }
        unique
    }
}

/// The template as uploaded. Every document parses its own working copy from `bytes`,
/// so nothing written for one institution can leak into another.
#[derive(Debug, Clone)]
pub struct TemplateWorkbook {
    pub bytes: Vec<u8>,
    pub sheet_count: usize,
}

#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub institution: String,
    /// Sub-directory for region-grouped output, already safe to use as a path segment.
    pub folder: Option<String>,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl OutputDocument {
    /// Storage key: `folder/filename` when grouped by region.
    pub fn relative_path(&self) -> String {
        match &self.folder {
            Some(folder) => format!("{}/{}", folder, self.filename),
            None => self.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub institution: String,
    pub region: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub documents: Vec<OutputDocument>,
    pub failures: Vec<DocumentFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(career: &str, activity: Option<&str>, date: Option<(i32, u32, u32)>) -> SourceRow {
        SourceRow {
            institution: "Colegio".to_string(),
            career: Some(career.to_string()),
            activities: activity.map(str::to_string),
            start_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            ..Default::default()
        }
    }

    #[test]
    fn test_earliest_start_date_skips_missing() {
        let group = InstitutionGroup {
            institution: "Colegio".to_string(),
            region: None,
            rows: vec![
                row("A", None, Some((2025, 3, 1))),
                row("A", None, None),
                row("B", None, Some((2025, 1, 15))),
            ],
        };
        assert_eq!(group.earliest_start_date(), NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn test_earliest_start_date_all_missing() {
        let group = InstitutionGroup {
            institution: "Colegio".to_string(),
            region: None,
            rows: vec![row("A", None, None)],
        };
        assert_eq!(group.earliest_start_date(), None);
    }

    #[test]
    fn test_unique_activities_exact_match_first_seen() {
        let career = CareerGroup {
            career: "A".to_string(),
            rows: vec![
                row("A", Some("Cursó taller. asistió."), None),
                row("A", Some("nueva actividad"), None),
                row("A", None, None),
                row("A", Some("Cursó taller. asistió."), None),
                row("A", Some("cursó TALLER."), None),
            ],
        };
        assert_eq!(career.student_count(), 5);
        assert_eq!(
            career.unique_activities(),
            vec!["Cursó taller. asistió.", "nueva actividad", "cursó TALLER."]
        );
    }

    #[test]
    fn test_relative_path() {
        let mut doc = OutputDocument {
            institution: "X".to_string(),
            folder: None,
            filename: "a.xlsx".to_string(),
            bytes: vec![],
        };
        assert_eq!(doc.relative_path(), "a.xlsx");
        doc.folder = Some("NORTE".to_string());
        assert_eq!(doc.relative_path(), "NORTE/a.xlsx");
    }
}
