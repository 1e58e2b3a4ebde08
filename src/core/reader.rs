use crate::config::toml_config::ColumnsConfig;
use crate::core::excel_date::{parse_text_date, serial_to_date};
use crate::domain::model::{ColumnSet, SourceRow, SourceTable};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

/// Header positions resolved once; every optional column is `None` when absent.
struct HeaderMap {
    institution: usize,
    career: Option<usize>,
    activities: Option<usize>,
    start_date: Option<usize>,
    region: Option<usize>,
    acceptance_letter_addressee: Option<usize>,
    school_role: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl HeaderMap {
    fn resolve(headers: &[String], columns: &ColumnsConfig) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let find = |name: &str| index.get(name).copied();

        let institution = find(&columns.institution).ok_or_else(|| {
            EtlError::validation(format!(
                "No se encontró la columna requerida: {}",
                columns.institution
            ))
        })?;

        let missing: Vec<&str> = columns
            .optional_columns()
            .into_iter()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "Optional columns not found, related fields will be skipped: {}",
                missing.join(", ")
            );
        }

        let known = [
            columns.institution.as_str(),
            columns.career.as_str(),
            columns.activities.as_str(),
            columns.start_date.as_str(),
            columns.region.as_str(),
            columns.acceptance_letter_addressee.as_str(),
            columns.school_role.as_str(),
        ];
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty() && !known.contains(&name.as_str()))
            .map(|(i, name)| (i, name.clone()))
            .collect();

        Ok(Self {
            institution,
            career: find(&columns.career),
            activities: find(&columns.activities),
            start_date: find(&columns.start_date),
            region: find(&columns.region),
            acceptance_letter_addressee: find(&columns.acceptance_letter_addressee),
            school_role: find(&columns.school_role),
            extra,
        })
    }

    fn column_set(&self) -> ColumnSet {
        ColumnSet {
            career: self.career.is_some(),
            activities: self.activities.is_some(),
            start_date: self.start_date.is_some(),
            region: self.region.is_some(),
            acceptance_letter_addressee: self.acceptance_letter_addressee.is_some(),
            school_role: self.school_role.is_some(),
        }
    }

    fn build_row(&self, cells: &[Data]) -> SourceRow {
        let text = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).and_then(cell_text);

        SourceRow {
            institution: text(Some(self.institution)).unwrap_or_default(),
            career: text(self.career),
            activities: text(self.activities),
            start_date: self.start_date.and_then(|i| cells.get(i)).and_then(cell_date),
            region: text(self.region),
            acceptance_letter_addressee: text(self.acceptance_letter_addressee),
            school_role: text(self.school_role),
            extra: self
                .extra
                .iter()
                .filter_map(|(i, name)| {
                    cells.get(*i).and_then(cell_text).map(|value| (name.clone(), value))
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Cell as text; blank and error cells are `None`. Whole floats print without a
/// fractional part so numeric institution codes group the same way they display.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => serial_to_date(dt.as_f64()).map(|d| d.to_string()),
    }
}

pub fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => serial_to_date(dt.as_f64()),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => {
            let parsed = parse_text_date(s);
            if parsed.is_none() && !s.trim().is_empty() {
                tracing::warn!("Ignoring unparseable start date '{}'", s);
            }
            parsed
        }
        _ => None,
    }
}

/// Parses the first worksheet of an `.xlsx`/`.xls` table. The first row is the header.
pub fn read_source_table(bytes: &[u8], columns: &ColumnsConfig) -> Result<SourceTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| EtlError::parse(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::parse("the workbook has no worksheets"))?
        .map_err(|e| EtlError::parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_text(cell).map(|s| s.trim().to_string()).unwrap_or_default())
            .collect(),
        None => return Err(EtlError::validation("El archivo de datos está vacío")),
    };

    let data_rows: Vec<&[Data]> = rows
        .filter(|cells| cells.iter().any(|cell| cell_text(cell).is_some()))
        .collect();
    if data_rows.is_empty() {
        return Err(EtlError::validation("El archivo de datos está vacío"));
    }

    let header_map = HeaderMap::resolve(&headers, columns)?;
    let table = SourceTable {
        rows: data_rows.iter().map(|cells| header_map.build_row(cells)).collect(),
        columns: header_map.column_set(),
    };

    tracing::info!("Read {} rows from the source table", table.len());
    Ok(table)
}
