#![allow(dead_code)]

use std::io::Cursor;
use umya_spreadsheet::Spreadsheet;

pub const HEADERS: &[&str] = &[
    "NOMBRES",
    "APELLIDO PATERNO",
    "INSTITUCION",
    "CARRERA",
    "ACTIVIDADES",
    "FECHA DE INICIO",
    "NOMBRE A QUIEN SE DIRIGE CARTA DE ACEPTACION",
    "CARGO ESCOLAR",
    "REGION",
];

#[derive(Debug, Clone)]
pub enum Value {
    Text(&'static str),
    Number(f64),
    Empty,
}

pub use Value::{Empty, Number, Text};

fn to_bytes(book: &Spreadsheet) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor).unwrap();
    cursor.into_inner()
}

/// Two sheets; the second is laid out like the registration form with merged date,
/// address, career and signature cells.
pub fn template_bytes() -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    book.get_sheet_mut(&0)
        .unwrap()
        .get_cell_mut((1, 1))
        .set_value("Portada");

    let body = book.new_sheet("Registro").unwrap();
    body.get_cell_mut((5, 7)).set_value("FECHA");
    for range in [
        "E7:H7", "F66:H66", "B88:D88", "E88:F88", "G88:H88", "B89:D89", "E89:F89", "G89:H89",
        "E116:H116", "E119:H119", "E122:H122",
    ] {
        body.add_merge_cells(range);
    }

    to_bytes(&book)
}

pub fn single_sheet_template_bytes() -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    book.get_sheet_mut(&0)
        .unwrap()
        .get_cell_mut((5, 7))
        .set_value("FECHA");
    to_bytes(&book)
}

/// Source table with `headers` in row 1 and `rows` below.
pub fn data_bytes(headers: &[&str], rows: &[Vec<Value>]) -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    for (c, header) in headers.iter().enumerate() {
        sheet.get_cell_mut((c as u32 + 1, 1)).set_value(*header);
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let coordinate = (c as u32 + 1, r as u32 + 2);
            match value {
                Text(text) => {
                    sheet.get_cell_mut(coordinate).set_value(*text);
                }
                Number(number) => {
                    sheet.get_cell_mut(coordinate).set_value_number(*number);
                }
                Empty => {}
            }
        }
    }
    to_bytes(&book)
}

/// Row in `HEADERS` order.
#[allow(clippy::too_many_arguments)]
pub fn student(
    name: &'static str,
    institution: &'static str,
    career: Value,
    activity: Value,
    start_date: Value,
    addressee: Value,
    role: Value,
    region: Value,
) -> Vec<Value> {
    vec![
        Text(name),
        Text("López"),
        Text(institution),
        career,
        activity,
        start_date,
        addressee,
        role,
        region,
    ]
}

pub fn read_book(bytes: &[u8]) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).unwrap()
}

pub fn value(book: &Spreadsheet, sheet: usize, row: u32, col: u32) -> String {
    book.get_sheet(&sheet).unwrap().get_value((col, row))
}

pub fn merges(book: &Spreadsheet, sheet: usize) -> Vec<String> {
    let mut ranges: Vec<String> = book
        .get_sheet(&sheet)
        .unwrap()
        .get_merge_cells()
        .iter()
        .map(|range| range.get_range())
        .collect();
    ranges.sort();
    ranges
}

/// Border styles (left, right, top, bottom), horizontal alignment, wrap and font size of
/// one cell.
pub fn cell_format(
    book: &Spreadsheet,
    sheet: usize,
    row: u32,
    col: u32,
) -> ([String; 4], String, bool, f64) {
    let style = book.get_sheet(&sheet).unwrap().get_style((col, row));
    let borders = style.get_borders().unwrap();
    let border_styles = [
        borders.get_left().get_border_style().to_string(),
        borders.get_right().get_border_style().to_string(),
        borders.get_top().get_border_style().to_string(),
        borders.get_bottom().get_border_style().to_string(),
    ];
    let alignment = style.get_alignment().unwrap();
    (
        border_styles,
        format!("{:?}", alignment.get_horizontal()),
        *alignment.get_wrap_text(),
        *style.get_font().unwrap().get_size(),
    )
}

pub fn column_width(book: &Spreadsheet, sheet: usize, column: &str) -> f64 {
    *book
        .get_sheet(&sheet)
        .unwrap()
        .get_column_dimension(column)
        .unwrap()
        .get_width()
}
