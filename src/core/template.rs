use crate::domain::model::TemplateWorkbook;
use crate::utils::error::{EtlError, Result};
use std::io::Cursor;
use umya_spreadsheet::Spreadsheet;

fn parse_workbook(bytes: &[u8]) -> std::result::Result<Spreadsheet, String> {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).map_err(|e| e.to_string())
}

impl TemplateWorkbook {
    /// Checks that the template opens and records how many sheets it has.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let book = parse_workbook(&bytes).map_err(EtlError::template)?;
        let sheet_count = book.get_sheet_count();
        if sheet_count == 0 {
            return Err(EtlError::template("the template has no worksheets"));
        }
        tracing::info!("Template has {} sheets", sheet_count);
        Ok(Self { bytes, sheet_count })
    }

    /// A fresh, independent copy of the template.
    pub fn working_copy(&self) -> Result<Spreadsheet> {
        parse_workbook(&self.bytes).map_err(EtlError::template)
    }

    /// `preferred` when the template has that sheet, otherwise the first sheet.
    pub fn body_sheet_index(&self, preferred: usize) -> usize {
        if preferred < self.sheet_count {
            preferred
        } else {
            tracing::warn!(
                "Template has {} sheet(s), sheet index {} is unavailable; using the first sheet",
                self.sheet_count,
                preferred
            );
            0
        }
    }
}

pub fn serialize_workbook(book: &Spreadsheet) -> std::result::Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor).map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_bytes(sheets: usize) -> Vec<u8> {
        let mut book = umya_spreadsheet::new_file();
        for i in 1..sheets {
            book.new_sheet(format!("Hoja{}", i + 1)).unwrap();
        }
        serialize_workbook(&book).unwrap()
    }

    #[test]
    fn test_body_sheet_index_falls_back_to_first() {
        let single = TemplateWorkbook::from_bytes(template_bytes(1)).unwrap();
        assert_eq!(single.sheet_count, 1);
        assert_eq!(single.body_sheet_index(1), 0);

        let double = TemplateWorkbook::from_bytes(template_bytes(2)).unwrap();
        assert_eq!(double.body_sheet_index(1), 1);
    }

    #[test]
    fn test_working_copies_are_independent() {
        let template = TemplateWorkbook::from_bytes(template_bytes(1)).unwrap();

        let mut first = template.working_copy().unwrap();
        first
            .get_sheet_mut(&0)
            .unwrap()
            .get_cell_mut((1, 1))
            .set_value("solo en la primera copia");

        let second = template.working_copy().unwrap();
        assert_eq!(second.get_sheet(&0).unwrap().get_value((1, 1)), "");
    }

    #[test]
    fn test_invalid_template_is_template_error() {
        let err = TemplateWorkbook::from_bytes(b"plantilla rota".to_vec()).unwrap_err();
        assert!(matches!(err, EtlError::TemplateError { .. }));
    }
}
