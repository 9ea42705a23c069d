use crate::errors::{AppError, AppResult};

/// Parse a literal `"HH:MM:SS"` duration into total seconds.
///
/// Exactly three colon-separated non-negative integers are accepted. The
/// hour field is not capped, so `"48:00:00"` is a valid two-day span;
/// negative fields are rejected because a recorded activity may never end
/// before it starts.
pub fn parse_duration_spec(spec: &str) -> AppResult<i64> {
    let bad = || AppError::Validation(format!("invalid duration {spec:?}, expected HH:MM:SS"));

    let fields: Vec<&str> = spec.split(':').collect();
    if fields.len() != 3 {
        return Err(bad());
    }

    let mut total: i64 = 0;
    for field in fields {
        let value: i64 = field.trim().parse().map_err(|_| bad())?;
        if value < 0 {
            return Err(bad());
        }
        total = total * 60 + value;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_duration_spec("01:30:00").unwrap(), 5400);
        assert_eq!(parse_duration_spec("00:00:01").unwrap(), 1);
        assert_eq!(parse_duration_spec("00:45:30").unwrap(), 2730);
    }

    #[test]
    fn zero_duration_is_allowed() {
        assert_eq!(parse_duration_spec("00:00:00").unwrap(), 0);
    }

    #[test]
    fn hours_are_not_capped() {
        assert_eq!(parse_duration_spec("48:00:00").unwrap(), 48 * 3600);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_duration_spec("90:00").is_err());
        assert!(parse_duration_spec("1:2:3:4").is_err());
        assert!(parse_duration_spec("").is_err());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(parse_duration_spec("aa:bb:cc").is_err());
        assert!(parse_duration_spec("1h:00:00").is_err());
        assert!(parse_duration_spec("::").is_err());
    }

    #[test]
    fn rejects_negative_fields() {
        assert!(parse_duration_spec("-1:00:00").is_err());
        assert!(parse_duration_spec("00:-5:00").is_err());
    }
}
