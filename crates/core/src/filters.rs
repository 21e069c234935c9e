//! Parsing helpers for list-endpoint query filters.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::types::DbId;

/// Date format accepted by the `departure_time` / `arrival_time` filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build an `ILIKE` pattern matching `term` anywhere in the column.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Parse a `YYYY-MM-DD` calendar date filter.
pub fn parse_date(value: &str, name: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!(
            "{name} must be a date in YYYY-MM-DD format, got '{value}'"
        ))
    })
}

/// Parse a comma-separated id list such as `1,3,7`.
///
/// Empty segments are skipped.
pub fn parse_id_list(value: &str, name: &str) -> Result<Vec<DbId>, CoreError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>().map_err(|_| {
                CoreError::Validation(format!("{name} must be a comma-separated list of ids"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_term() {
        assert_eq!(contains_pattern("Lviv"), "%Lviv%");
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn parses_iso_date() {
        let date = parse_date("2023-12-10", "arrival_time").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 12, 10).unwrap());
    }

    #[test]
    fn parses_unpadded_date() {
        let date = parse_date("2000-12-1", "departure_time").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2000, 12, 1).unwrap());
    }

    #[test]
    fn rejects_garbage_date() {
        let err = parse_date("10/12/2023", "arrival_time").unwrap_err();
        assert!(err.to_string().contains("arrival_time"));
    }

    #[test]
    fn parses_id_list() {
        assert_eq!(parse_id_list("1,3", "trips").unwrap(), vec![1, 3]);
        assert_eq!(parse_id_list(" 4 , ,5", "trips").unwrap(), vec![4, 5]);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(parse_id_list("1,abc", "trips").is_err());
    }
}
