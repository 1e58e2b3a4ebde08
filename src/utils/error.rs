use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Error reading source table: {message}")]
    ParseError { message: String },

    #[error("Error reading template: {message}")]
    TemplateError { message: String },

    #[error("Error generating document for '{institution}': {message}")]
    DocumentError {
        institution: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn validation(message: impl Into<String>) -> Self {
        EtlError::ValidationError {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        EtlError::ParseError {
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        EtlError::TemplateError {
            message: message.into(),
        }
    }

    pub fn document(institution: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::DocumentError {
            institution: institution.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ValidationError { .. } | EtlError::ParseError { .. } => ErrorCategory::Input,
            EtlError::TemplateError { .. } => ErrorCategory::Input,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::DocumentError { .. } => ErrorCategory::Processing,
            EtlError::ZipError(_) | EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// HTTP-equivalent status: 400 for rejected input, 500 for everything that broke
    /// while processing.
    pub fn status_code(&self) -> u16 {
        match self {
            EtlError::ValidationError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => 400,
            _ => 500,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ValidationError { message } => message.clone(),
            EtlError::ParseError { message } => {
                format!("Error al leer el archivo Excel: {}", message)
            }
            EtlError::TemplateError { message } => {
                format!("Error al verificar la plantilla: {}", message)
            }
            EtlError::DocumentError {
                institution,
                message,
            } => format!("Error al procesar institución {}: {}", institution, message),
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ValidationError { .. } => {
                "Check that both files are .xlsx/.xls and that the data has an institution column"
            }
            EtlError::ParseError { .. } => {
                "Open the data file in a spreadsheet tool and re-save it as .xlsx"
            }
            EtlError::TemplateError { .. } => "Make sure the template is a valid .xlsx workbook",
            EtlError::DocumentError { .. } => {
                "Inspect the template cells referenced by the layout configuration"
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the configuration file and CLI arguments"
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(EtlError::validation("No se enviaron archivos").status_code(), 400);
        assert_eq!(EtlError::parse("bad zip").status_code(), 500);
        assert_eq!(EtlError::document("Colegio", "boom").status_code(), 500);
    }

    #[test]
    fn test_user_friendly_message_keeps_validation_text() {
        let err = EtlError::validation("El archivo de datos está vacío");
        assert_eq!(err.user_friendly_message(), "El archivo de datos está vacío");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
