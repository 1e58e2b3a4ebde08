//! Text normalization for the values written into the template and for output names.

/// Words kept lowercase inside career names.
const CAREER_CONNECTORS: &[&str] = &["DE", "DEL", "LA", "LAS", "LOS", "Y", "EN"];

/// Title-cases a career name word by word, keeping Spanish connectors lowercase.
/// Runs of whitespace collapse to a single space.
pub fn format_career_name(career_name: &str) -> String {
    career_name
        .split_whitespace()
        .map(|word| {
            if CAREER_CONNECTORS.contains(&word.to_uppercase().as_str()) {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Sentence-cases activity text: everything lowercase except the first character of the
/// text and the first character following each run of periods.
pub fn format_activity_text(activity_text: &str) -> String {
    let mut formatted = String::with_capacity(activity_text.len());
    let mut capitalize_next = true;

    for c in activity_text.chars().flat_map(char::to_lowercase) {
        if c == '.' {
            capitalize_next = true;
            formatted.push(c);
        } else if c.is_whitespace() {
            formatted.push(c);
        } else if capitalize_next {
            formatted.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            formatted.push(c);
        }
    }

    formatted
}

/// Drops everything but ASCII letters, digits and whitespace.
pub fn sanitize_institution_name(institution: &str) -> String {
    institution
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Substitutes the sanitized institution for `placeholder` in `base_filename`.
pub fn output_filename(base_filename: &str, placeholder: &str, institution: &str) -> String {
    base_filename.replace(placeholder, &sanitize_institution_name(institution))
}

/// A region value reduced to one directory name: separators and control characters are
/// dropped, surrounding dots and whitespace trimmed. `None` if nothing is left.
pub fn sanitize_path_segment(value: &str) -> Option<String> {
    let kept: String = value
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':') && !c.is_control())
        .collect();
    let trimmed = kept.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `filename` with ` (n)` before its extension.
pub fn numbered_filename(filename: &str, n: usize) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &filename[..dot], n, &filename[dot..]),
        _ => format!("{} ({})", filename, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::{DEFAULT_BASE_FILENAME, DEFAULT_FILENAME_PLACEHOLDER};

    #[test]
    fn test_format_career_name_connectors() {
        assert_eq!(
            format_career_name("INGENIERIA EN SISTEMAS DE LA INFORMACION"),
            "Ingenieria en Sistemas de la Informacion"
        );
        assert_eq!(format_career_name("licenciatura  y   DERECHO"), "Licenciatura y Derecho");
        assert_eq!(format_career_name("ciencias del mar"), "Ciencias del Mar");
    }

    #[test]
    fn test_format_career_name_non_ascii() {
        assert_eq!(format_career_name("QUÍMICA INDUSTRIAL"), "Química Industrial");
        assert_eq!(format_career_name(""), "");
    }

    #[test]
    fn test_format_activity_text() {
        assert_eq!(
            format_activity_text("Cursó taller. asistió."),
            "Cursó taller. Asistió."
        );
        assert_eq!(format_activity_text("cursó TALLER."), "Cursó taller.");
        assert_eq!(
            format_activity_text("APOYO EN OFICINA...REVISIÓN DE DOCUMENTOS"),
            "Apoyo en oficina...Revisión de documentos"
        );
        assert_eq!(format_activity_text(""), "");
    }

    #[test]
    fn test_format_activity_text_is_idempotent() {
        for input in [
            "Cursó taller. asistió.",
            "ELABORACIÓN DE REPORTES.  captura de datos",
            "mantenimiento... limpieza. . orden",
            "  inicio con espacios",
        ] {
            let once = format_activity_text(input);
            assert_eq!(format_activity_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_output_filename_strips_punctuation() {
        let filename = output_filename(
            DEFAULT_BASE_FILENAME,
            DEFAULT_FILENAME_PLACEHOLDER,
            "Colegio Nal. #5",
        );
        assert_eq!(
            filename,
            "2_REG. DE PROG. Colegio Nal 5 - PEMEX 2025 ALTIPLANO.xlsx"
        );
        assert!(!filename.contains("INST. EDUCATIVA"));
    }

    #[test]
    fn test_sanitize_drops_non_ascii_letters() {
        assert_eq!(sanitize_institution_name("Tecnológico/Norte"), "TecnolgicoNorte");
    }

    #[test]
    fn test_sanitize_path_segment() {
        assert_eq!(sanitize_path_segment("NORTE"), Some("NORTE".to_string()));
        assert_eq!(sanitize_path_segment("../fuera"), Some("fuera".to_string()));
        assert_eq!(sanitize_path_segment("A/B\\C"), Some("ABC".to_string()));
        assert_eq!(sanitize_path_segment(" Región Sur "), Some("Región Sur".to_string()));
        assert_eq!(sanitize_path_segment(".."), None);
        assert_eq!(sanitize_path_segment(" / "), None);
    }

    #[test]
    fn test_numbered_filename() {
        assert_eq!(
            numbered_filename("2_REG. DE PROG. Colegio A - PEMEX 2025 ALTIPLANO.xlsx", 2),
            "2_REG. DE PROG. Colegio A - PEMEX 2025 ALTIPLANO (2).xlsx"
        );
        assert_eq!(numbered_filename("informe", 3), "informe (3)");
    }
}
