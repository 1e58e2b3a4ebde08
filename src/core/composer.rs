use crate::config::toml_config::{CellRef, GeneratorConfig};
use crate::core::grouping::group_careers;
use crate::core::sheet::{SheetError, SheetWriter};
use crate::core::template::serialize_workbook;
use crate::core::text::{
    format_activity_text, format_career_name, numbered_filename, output_filename,
    sanitize_path_segment,
};
use crate::domain::model::{
    CareerGroup, ColumnSet, DocumentFailure, GenerationReport, InstitutionGroup, OutputDocument,
    TemplateWorkbook,
};
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

/// Sentence-cased activities of one career, without repeats. Raw strings are deduplicated
/// by exact match first; variants that only differ in case collapse once formatted.
pub fn formatted_activities(career: &CareerGroup) -> Vec<String> {
    let mut formatted: Vec<String> = Vec::new();
    for activity in career.unique_activities() {
        let text = format_activity_text(activity);
        if !formatted.contains(&text) {
            formatted.push(text);
        }
    }
    formatted
}

/// Fills one copy of the template per institution group.
pub struct DocumentComposer<'a> {
    config: &'a GeneratorConfig,
    columns: ColumnSet,
}

impl<'a> DocumentComposer<'a> {
    pub fn new(config: &'a GeneratorConfig, columns: ColumnSet) -> Self {
        Self { config, columns }
    }

    pub fn filename_for(&self, institution: &str) -> String {
        output_filename(
            &self.config.output.base_filename,
            &self.config.output.placeholder,
            institution,
        )
    }

    /// Output sub-directory for a region; unusable values fall back to the missing-region
    /// placeholder.
    pub fn folder_for(&self, region: &str) -> String {
        sanitize_path_segment(region)
            .or_else(|| sanitize_path_segment(&self.config.output.missing_region))
            .unwrap_or_else(|| "sin_region".to_string())
    }

    /// Generates every group in order. A group that fails is logged and reported; the
    /// remaining groups are still generated. Documents whose paths collide get a
    /// numbered filename.
    pub fn compose_all(
        &self,
        template: &TemplateWorkbook,
        groups: &[InstitutionGroup],
    ) -> GenerationReport {
        let mut report = GenerationReport::default();
        let mut used_paths = HashSet::new();

        for group in groups {
            match self.compose(template, group) {
                Ok(mut document) => {
                    claim_unique_path(&mut document, &mut used_paths);
                    tracing::info!("Document generated: {}", document.relative_path());
                    report.documents.push(document);
                }
                Err(e) => {
                    tracing::error!("Error processing institution {}: {}", group.institution, e);
                    report.failures.push(DocumentFailure {
                        institution: group.institution.clone(),
                        region: group.region.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    pub fn compose(
        &self,
        template: &TemplateWorkbook,
        group: &InstitutionGroup,
    ) -> Result<OutputDocument> {
        let document_error = |message: String| EtlError::document(&group.institution, message);

        let mut book = template
            .working_copy()
            .map_err(|e| document_error(e.to_string()))?;
        let index = template.body_sheet_index(self.config.layout.body_sheet_index);
        let sheet = book
            .get_sheet_mut(&index)
            .ok_or_else(|| document_error(format!("sheet {} not found", index)))?;

        {
            let mut writer = SheetWriter::new(sheet).map_err(|e| document_error(e.to_string()))?;
            self.fill(&mut writer, group)
                .map_err(|e| document_error(e.to_string()))?;
        }

        let bytes = serialize_workbook(&book).map_err(document_error)?;

        Ok(OutputDocument {
            institution: group.institution.clone(),
            folder: group.region.as_deref().map(|region| self.folder_for(region)),
            filename: self.filename_for(&group.institution),
            bytes,
        })
    }

    fn fill(
        &self,
        writer: &mut SheetWriter<'_>,
        group: &InstitutionGroup,
    ) -> std::result::Result<(), SheetError> {
        let layout = &self.config.layout;

        if let Some(start_date) = group.earliest_start_date() {
            let CellRef { row, col } = layout.start_date_cell;
            writer.write_date(row, col, start_date, &layout.date_format)?;
        }

        // Same address for every region for now.
        let CellRef { row, col } = layout.address_cell;
        writer.write_text(row, col, &layout.address)?;

        if self.columns.career {
            self.fill_careers(writer, group)?;
        }

        if let Some(representative) = group.representative() {
            if let Some(addressee) = &representative.acceptance_letter_addressee {
                let cell = layout.institution_cell;
                writer.write_text(cell.row, cell.col, &representative.institution)?;
                let cell = layout.addressee_cell;
                writer.write_text(cell.row, cell.col, addressee)?;
                if let Some(role) = &representative.school_role {
                    let cell = layout.school_role_cell;
                    writer.write_text(cell.row, cell.col, role)?;
                }
            }
        }

        Ok(())
    }

    /// One block per career starting at the anchor row: name and count on every student
    /// row, activities down the activity column. Rows past the pre-formatted area get the
    /// extended formatting.
    fn fill_careers(
        &self,
        writer: &mut SheetWriter<'_>,
        group: &InstitutionGroup,
    ) -> std::result::Result<(), SheetError> {
        let layout = &self.config.layout;
        let mut cursor = layout.career_start_row;

        for career in group_careers(group, &self.config.output.missing_career) {
            let name = format_career_name(&career.career);
            let count = career.student_count();

            for offset in 0..count {
                let row = row_at(cursor, offset, layout.career_name_col)?;
                if row > layout.last_preformatted_row {
                    writer.extend_row_format(row, &layout.extended_row)?;
                }
                writer.write_text(row, layout.career_name_col, &name)?;
                writer.write_number(row, layout.student_count_col, count as f64)?;
            }

            let activities = formatted_activities(&career);
            for (offset, activity) in activities.iter().enumerate() {
                let row = row_at(cursor, offset, layout.activity_col)?;
                if row > layout.last_preformatted_row {
                    writer.extend_row_format(row, &layout.extended_row)?;
                }
                writer.write_text(row, layout.activity_col, activity)?;
            }

            tracing::debug!(
                "Career '{}' at row {}: {} student(s), {} activities",
                name,
                cursor,
                count,
                activities.len()
            );
            cursor = row_at(cursor, count.max(activities.len()), layout.career_name_col)?;
        }

        Ok(())
    }
}

/// `cursor + offset`, or out of bounds when the sum leaves the `u32` row range.
fn row_at(cursor: u32, offset: usize, col: u32) -> std::result::Result<u32, SheetError> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| cursor.checked_add(offset))
        .ok_or(SheetError::OutOfBounds { row: u32::MAX, col })
}

/// Registers the document's path, numbering the filename until it no longer collides
/// with an earlier one. Paths compare case-insensitively.
fn claim_unique_path(document: &mut OutputDocument, used_paths: &mut HashSet<String>) {
    let base = document.filename.clone();
    let mut n = 1;
    while !used_paths.insert(document.relative_path().to_lowercase()) {
        n += 1;
        document.filename = numbered_filename(&base, n);
    }
    if n > 1 {
        tracing::warn!(
            "Filename for {} collides with another institution; saved as {}",
            document.institution,
            document.relative_path()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SourceRow;

    fn career_with(activities: &[Option<&str>]) -> CareerGroup {
        CareerGroup {
            career: "QUIMICA".to_string(),
            rows: activities
                .iter()
                .map(|a| SourceRow {
                    institution: "Colegio".to_string(),
                    career: Some("QUIMICA".to_string()),
                    activities: a.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_formatted_activities_dedup() {
        let career = career_with(&[
            Some("Cursó taller. asistió."),
            Some("cursó TALLER."),
            None,
            Some("nueva actividad"),
            Some("Cursó taller. asistió."),
            Some("CURSÓ TALLER."),
        ]);

        let activities = formatted_activities(&career);

        assert_eq!(
            activities,
            vec!["Cursó taller. Asistió.", "Cursó taller.", "Nueva actividad"]
        );
        assert_eq!(
            activities.iter().filter(|a| a.as_str() == "Cursó taller. Asistió.").count(),
            1
        );
    }

    #[test]
    fn test_filename_for() {
        let config = GeneratorConfig::default();
        let composer = DocumentComposer::new(&config, ColumnSet::default());
        assert_eq!(
            composer.filename_for("Colegio Nal. #5"),
            "2_REG. DE PROG. Colegio Nal 5 - PEMEX 2025 ALTIPLANO.xlsx"
        );
    }

    #[test]
    fn test_folder_for_strips_path_components() {
        let config = GeneratorConfig::default();
        let composer = DocumentComposer::new(&config, ColumnSet::default());
        assert_eq!(composer.folder_for("NORTE"), "NORTE");
        assert_eq!(composer.folder_for("../fuera"), "fuera");
        assert_eq!(composer.folder_for("A/B"), "AB");
        assert_eq!(composer.folder_for(".."), "sin_region");
    }

    #[test]
    fn test_claim_unique_path_numbers_collisions() {
        let document = |institution: &str| OutputDocument {
            institution: institution.to_string(),
            folder: None,
            filename: "Colegio A.xlsx".to_string(),
            bytes: vec![],
        };
        let mut used = HashSet::new();

        let mut first = document("Colegio A");
        let mut second = document("Colegio A.");
        let mut third = document("colegio a");
        claim_unique_path(&mut first, &mut used);
        claim_unique_path(&mut second, &mut used);
        claim_unique_path(&mut third, &mut used);

        assert_eq!(first.filename, "Colegio A.xlsx");
        assert_eq!(second.filename, "Colegio A (2).xlsx");
        assert_eq!(third.filename, "Colegio A (3).xlsx");
    }

    #[test]
    fn test_row_at_overflow_is_out_of_bounds() {
        assert_eq!(row_at(88, 3, 2), Ok(91));
        assert!(matches!(
            row_at(u32::MAX, 1, 7),
            Err(SheetError::OutOfBounds { col: 7, .. })
        ));
    }
}
