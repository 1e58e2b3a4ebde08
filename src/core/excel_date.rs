use chrono::{NaiveDate, NaiveDateTime};

fn epoch() -> Option<NaiveDate> {
    // Serial 0 in the 1900 date system, accounting for the phantom 1900-02-29.
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Whole-day part of an Excel serial as a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    epoch()?.checked_add_days(chrono::Days::new(serial.floor() as u64))
}

pub fn date_to_serial(date: NaiveDate) -> f64 {
    match epoch() {
        Some(epoch) => (date - epoch).num_days() as f64,
        None => 0.0,
    }
}

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const TEXT_DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Dates typed as text in the source table.
pub fn parse_text_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_round_trip_known_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(date_to_serial(date), 45672.0);
        assert_eq!(serial_to_date(45672.75), Some(date));
        assert_eq!(serial_to_date(0.0), None);
    }

    #[test]
    fn test_parse_text_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 3);
        assert_eq!(parse_text_date("2025-02-03"), expected);
        assert_eq!(parse_text_date("03/02/2025"), expected);
        assert_eq!(parse_text_date("2025-02-03 00:00:00"), expected);
        assert_eq!(parse_text_date("pendiente"), None);
    }
}
