use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

/// Parse an RFC 3339 timestamp and express it as wall-clock time in `tz`,
/// dropping the zone. Returns `None` for empty or unparseable input.
pub fn to_civil_naive(date_str: &str, tz: Tz) -> Option<NaiveDateTime> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&tz).naive_local())
}

/// Parse an IANA zone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Split a comma separated list, keeping order and duplicates, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;

    fn civil(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, s))
    }

    #[test]
    fn test_to_civil_naive_handles_dst() {
        // EST, UTC-5
        assert_eq!(
            to_civil_naive("2025-01-15T17:00:00Z", New_York),
            civil(2025, 1, 15, 12, 0, 0)
        );
        // EDT, UTC-4
        assert_eq!(
            to_civil_naive("2025-07-15T17:00:00Z", New_York),
            civil(2025, 7, 15, 13, 0, 0)
        );
        assert_eq!(
            to_civil_naive("2025-07-15T19:00:00+02:00", New_York),
            civil(2025, 7, 15, 13, 0, 0)
        );
    }

    #[test]
    fn test_to_civil_naive_coerces_garbage_to_none() {
        assert_eq!(to_civil_naive("", New_York), None);
        assert_eq!(to_civil_naive("yesterday", New_York), None);
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("America/New_York"), Some(New_York));
        assert_eq!(parse_timezone("UTC"), Some(chrono_tz::UTC));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" C1, C2,,C1 "), vec!["C1", "C2", "C1"]);
        assert!(split_list("").is_empty());
    }
}
