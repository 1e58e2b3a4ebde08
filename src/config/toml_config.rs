use crate::core::sheet::{MAX_COL, MAX_ROW};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_ADDRESS: &str = "Bahía de Ballenas No. 5, Piso 08, Col. Verónica Anzures, Alcaldía Miguel Hidalgo, C.P. 11300, CDMX.";
pub const DEFAULT_BASE_FILENAME: &str =
    "2_REG. DE PROG. INST. EDUCATIVA - PEMEX 2025 ALTIPLANO.xlsx";
pub const DEFAULT_FILENAME_PLACEHOLDER: &str = "INST. EDUCATIVA";

/// Generator settings. Every section falls back to the registration form's layout, so an
/// empty file (or no file at all) keeps the stock placement rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub layout: LayoutConfig,
    pub columns: ColumnsConfig,
    pub output: OutputConfig,
}

/// 1-indexed (row, column) coordinate, spreadsheet style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 0-based sheet holding the document body.
    pub body_sheet_index: usize,
    pub start_date_cell: CellRef,
    pub date_format: String,
    pub address_cell: CellRef,
    pub address: String,
    pub career_start_row: u32,
    /// Rows after this one are not formatted by the template and get `extended_row`.
    pub last_preformatted_row: u32,
    pub career_name_col: u32,
    pub student_count_col: u32,
    pub activity_col: u32,
    pub institution_cell: CellRef,
    pub addressee_cell: CellRef,
    pub school_role_cell: CellRef,
    pub extended_row: ExtendedRowFormat,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            body_sheet_index: 1,
            start_date_cell: CellRef::new(7, 5),
            date_format: "dd/mm/yyyy".to_string(),
            address_cell: CellRef::new(66, 6),
            address: DEFAULT_ADDRESS.to_string(),
            career_start_row: 88,
            last_preformatted_row: 89,
            career_name_col: 2,
            student_count_col: 5,
            activity_col: 7,
            institution_cell: CellRef::new(116, 5),
            addressee_cell: CellRef::new(119, 5),
            school_role_cell: CellRef::new(122, 5),
            extended_row: ExtendedRowFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedRowFormat {
    pub first_col: u32,
    pub last_col: u32,
    pub font_size: f64,
    pub merges: Vec<ColumnSpan>,
    /// Column letter -> width.
    pub column_widths: BTreeMap<String, f64>,
}

impl Default for ExtendedRowFormat {
    fn default() -> Self {
        Self {
            first_col: 2,
            last_col: 8,
            font_size: 9.0,
            merges: vec![
                ColumnSpan { start: 2, end: 4 },
                ColumnSpan { start: 5, end: 6 },
                ColumnSpan { start: 7, end: 8 },
            ],
            column_widths: BTreeMap::from([
                ("B".to_string(), 15.0),
                ("E".to_string(), 8.0),
                ("G".to_string(), 50.0),
            ]),
        }
    }
}

/// Header names looked up once when the source table is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub institution: String,
    pub career: String,
    pub activities: String,
    pub start_date: String,
    pub region: String,
    pub acceptance_letter_addressee: String,
    pub school_role: String,
    /// Reported when missing but never read by the composer.
    pub informational: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            institution: "INSTITUCION".to_string(),
            career: "CARRERA".to_string(),
            activities: "ACTIVIDADES".to_string(),
            start_date: "FECHA DE INICIO".to_string(),
            region: "REGION".to_string(),
            acceptance_letter_addressee: "NOMBRE A QUIEN SE DIRIGE CARTA DE ACEPTACION"
                .to_string(),
            school_role: "CARGO ESCOLAR".to_string(),
            informational: vec!["NOMBRES".to_string(), "APELLIDO PATERNO".to_string()],
        }
    }
}

impl ColumnsConfig {
    /// Optional columns in the order they are reported when missing.
    pub fn optional_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.informational.iter().map(String::as_str).collect();
        columns.extend([
            self.career.as_str(),
            self.activities.as_str(),
            self.start_date.as_str(),
            self.acceptance_letter_addressee.as_str(),
            self.school_role.as_str(),
            self.region.as_str(),
        ]);
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_filename: String,
    pub placeholder: String,
    pub missing_institution: String,
    pub missing_career: String,
    pub missing_region: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_filename: DEFAULT_BASE_FILENAME.to_string(),
            placeholder: DEFAULT_FILENAME_PLACEHOLDER.to_string(),
            missing_institution: "sin_institucion".to_string(),
            missing_career: "sin_carrera".to_string(),
            missing_region: "sin_region".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let layout = &self.layout;
        for (field, cell) in [
            ("layout.start_date_cell", layout.start_date_cell),
            ("layout.address_cell", layout.address_cell),
            ("layout.institution_cell", layout.institution_cell),
            ("layout.addressee_cell", layout.addressee_cell),
            ("layout.school_role_cell", layout.school_role_cell),
        ] {
            validate_range(field, cell.row, 1, MAX_ROW)?;
            validate_range(field, cell.col, 1, MAX_COL)?;
        }

        validate_range("layout.career_start_row", layout.career_start_row, 1, MAX_ROW)?;
        validate_range(
            "layout.last_preformatted_row",
            layout.last_preformatted_row,
            0,
            MAX_ROW,
        )?;
        validate_range("layout.career_name_col", layout.career_name_col, 1, MAX_COL)?;
        validate_range("layout.student_count_col", layout.student_count_col, 1, MAX_COL)?;
        validate_range("layout.activity_col", layout.activity_col, 1, MAX_COL)?;
        validate_non_empty_string("layout.date_format", &layout.date_format)?;

        let extended = &layout.extended_row;
        validate_range("layout.extended_row.first_col", extended.first_col, 1, MAX_COL)?;
        validate_range(
            "layout.extended_row.last_col",
            extended.last_col,
            extended.first_col,
            MAX_COL,
        )?;
        validate_range("layout.extended_row.font_size", extended.font_size, 1.0, 409.0)?;
        for span in &extended.merges {
            if span.start == 0 || span.start > span.end {
                return Err(EtlError::InvalidConfigValueError {
                    field: "layout.extended_row.merges".to_string(),
                    value: format!("{}..{}", span.start, span.end),
                    reason: "merge span must start at column 1 or later and not end before it \
                             starts"
                        .to_string(),
                });
            }
        }
        for (column, width) in &extended.column_widths {
            if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "layout.extended_row.column_widths".to_string(),
                    value: column.clone(),
                    reason: "column must be an uppercase letter reference such as \"B\""
                        .to_string(),
                });
            }
            validate_range("layout.extended_row.column_widths", *width, 0.0, 255.0)?;
        }

        validate_non_empty_string("columns.institution", &self.columns.institution)?;
        validate_non_empty_string("output.placeholder", &self.output.placeholder)?;
        if !self.output.base_filename.contains(&self.output.placeholder) {
            return Err(EtlError::InvalidConfigValueError {
                field: "output.base_filename".to_string(),
                value: self.output.base_filename.clone(),
                reason: format!("must contain the placeholder '{}'", self.output.placeholder),
            });
        }

        Ok(())
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_default_layout() {
        let config = GeneratorConfig::from_toml_str("").unwrap();

        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.layout.start_date_cell, CellRef::new(7, 5));
        assert_eq!(config.layout.address_cell, CellRef::new(66, 6));
        assert_eq!(config.layout.career_start_row, 88);
        assert_eq!(config.layout.last_preformatted_row, 89);
        assert_eq!(config.output.base_filename, DEFAULT_BASE_FILENAME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let toml_content = r#"
[layout]
career_start_row = 40
address = "Av. Juárez 100, Chihuahua"

[layout.start_date_cell]
row = 3
col = 2

[columns]
institution = "ESCUELA"
"#;

        let config = GeneratorConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.layout.career_start_row, 40);
        assert_eq!(config.layout.start_date_cell, CellRef::new(3, 2));
        assert_eq!(config.layout.address, "Av. Juárez 100, Chihuahua");
        assert_eq!(config.layout.last_preformatted_row, 89);
        assert_eq!(config.columns.institution, "ESCUELA");
        assert_eq!(config.columns.career, "CARRERA");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DOCFILL_TEST_ADDRESS", "Calle 5, Monterrey");

        let toml_content = r#"
[layout]
address = "${DOCFILL_TEST_ADDRESS}"
"#;

        let config = GeneratorConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.layout.address, "Calle 5, Monterrey");

        std::env::remove_var("DOCFILL_TEST_ADDRESS");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[output]
base_filename = "reporte.xlsx"
"#;

        let config = GeneratorConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.layout.extended_row.merges.push(ColumnSpan { start: 6, end: 5 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_rows_must_fit_the_worksheet() {
        let mut config = GeneratorConfig::default();
        config.layout.career_start_row = u32::MAX;
        let err = config.validate().unwrap_err();
        match err {
            EtlError::InvalidConfigValueError { field, .. } => {
                assert_eq!(field, "layout.career_start_row")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = GeneratorConfig::default();
        config.layout.address_cell = CellRef::new(1_048_577, 6);
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.layout.career_start_row = 1_048_576;
        config.layout.last_preformatted_row = 1_048_576;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = GeneratorConfig::from_toml_str("[layout\ncareer_start_row = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nmissing_region = \"SIN REGION\"\n")
            .unwrap();

        let config = GeneratorConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.missing_region, "SIN REGION");
    }
}
