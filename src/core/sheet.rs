//! Cell-level access to a template worksheet: merge-aware writes and the formatting
//! applied to rows the template did not pre-format.

use crate::config::toml_config::ExtendedRowFormat;
use crate::core::excel_date::date_to_serial;
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use umya_spreadsheet::{Border, HorizontalAlignmentValues, VerticalAlignmentValues, Worksheet};

pub const MAX_ROW: u32 = 1_048_576;
pub const MAX_COL: u32 = 16_384;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SheetError {
    #[error("cell ({row}, {col}) is outside the worksheet")]
    OutOfBounds { row: u32, col: u32 },

    #[error("unreadable merged range '{0}'")]
    InvalidMergeRange(String),
}

/// Column number (1-based) to letters: 1 -> A, 28 -> AB.
pub fn column_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// `"$F$66"` / `"F66"` to (row, col).
pub fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let col = letters
        .chars()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
        })?;
    let row = digits.parse::<u32>().ok()?;
    Some((row, col))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl MergeRange {
    pub fn parse(range: &str) -> Option<Self> {
        let (start, end) = range.split_once(':').unwrap_or((range, range));
        let (r1, c1) = parse_cell_reference(start)?;
        let (r2, c2) = parse_cell_reference(end)?;
        Some(Self {
            first_row: r1.min(r2),
            first_col: c1.min(c2),
            last_row: r1.max(r2),
            last_col: c1.max(c2),
        })
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn intersects(&self, other: &MergeRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }

    pub fn to_a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_letter(self.first_col),
            self.first_row,
            column_letter(self.last_col),
            self.last_row
        )
    }
}

/// Merged ranges of one worksheet, used to send every write to the range's anchor.
#[derive(Debug, Clone, Default)]
pub struct MergeMap {
    ranges: Vec<MergeRange>,
}

impl MergeMap {
    pub fn from_worksheet(sheet: &Worksheet) -> Result<Self, SheetError> {
        let ranges = sheet
            .get_merge_cells()
            .iter()
            .map(|range| {
                let a1 = range.get_range();
                MergeRange::parse(&a1).ok_or(SheetError::InvalidMergeRange(a1))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Top-left cell of the merge covering (row, col), or (row, col) itself.
    pub fn resolve(&self, row: u32, col: u32) -> (u32, u32) {
        self.ranges
            .iter()
            .find(|range| range.contains(row, col))
            .map(|range| (range.first_row, range.first_col))
            .unwrap_or((row, col))
    }

    pub fn overlaps(&self, candidate: &MergeRange) -> bool {
        self.ranges.iter().any(|range| range.intersects(candidate))
    }

    pub fn insert(&mut self, range: MergeRange) {
        self.ranges.push(range);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Writes into one worksheet of a working copy.
pub struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
    merges: MergeMap,
    extended_rows: HashSet<u32>,
}

impl<'a> SheetWriter<'a> {
    pub fn new(sheet: &'a mut Worksheet) -> Result<Self, SheetError> {
        let merges = MergeMap::from_worksheet(sheet)?;
        Ok(Self {
            sheet,
            merges,
            extended_rows: HashSet::new(),
        })
    }

    fn target(&self, row: u32, col: u32) -> Result<(u32, u32), SheetError> {
        if row == 0 || col == 0 || row > MAX_ROW || col > MAX_COL {
            return Err(SheetError::OutOfBounds { row, col });
        }
        Ok(self.merges.resolve(row, col))
    }

    pub fn write_text(&mut self, row: u32, col: u32, value: &str) -> Result<(), SheetError> {
        let (row, col) = self.target(row, col)?;
        self.sheet.get_cell_mut((col, row)).set_value(value);
        Ok(())
    }

    pub fn write_number(&mut self, row: u32, col: u32, value: f64) -> Result<(), SheetError> {
        let (row, col) = self.target(row, col)?;
        self.sheet.get_cell_mut((col, row)).set_value_number(value);
        Ok(())
    }

    /// Stores the date as a serial number displayed with `format_code`.
    pub fn write_date(
        &mut self,
        row: u32,
        col: u32,
        date: NaiveDate,
        format_code: &str,
    ) -> Result<(), SheetError> {
        let (row, col) = self.target(row, col)?;
        self.sheet
            .get_cell_mut((col, row))
            .set_value_number(date_to_serial(date));
        self.sheet
            .get_style_mut((col, row))
            .get_number_format_mut()
            .set_format_code(format_code);
        Ok(())
    }

    /// Borders, centered wrapped text, font size and column merges for a row past the
    /// template's formatted area. Repeated calls for the same row are no-ops.
    pub fn extend_row_format(
        &mut self,
        row: u32,
        format: &ExtendedRowFormat,
    ) -> Result<(), SheetError> {
        if self.extended_rows.contains(&row) {
            return Ok(());
        }
        self.target(row, format.last_col)?;

        for col in format.first_col..=format.last_col {
            let style = self.sheet.get_style_mut((col, row));
            let borders = style.get_borders_mut();
            borders.get_left_mut().set_border_style(Border::BORDER_THIN);
            borders.get_right_mut().set_border_style(Border::BORDER_THIN);
            borders.get_top_mut().set_border_style(Border::BORDER_THIN);
            borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);

            let alignment = style.get_alignment_mut();
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            alignment.set_wrap_text(true);

            style.get_font_mut().set_size(format.font_size);
        }

        for span in &format.merges {
            let range = MergeRange {
                first_row: row,
                first_col: span.start,
                last_row: row,
                last_col: span.end,
            };
            if self.merges.overlaps(&range) {
                tracing::debug!("Skipping merge {}: overlaps an existing merge", range.to_a1());
                continue;
            }
            self.sheet.add_merge_cells(range.to_a1());
            self.merges.insert(range);
        }

        for (column, width) in &format.column_widths {
            self.sheet.get_column_dimension_mut(column).set_width(*width);
        }

        self.extended_rows.insert(row);
        Ok(())
    }

    pub fn merges(&self) -> &MergeMap {
        &self.merges
    }
}
