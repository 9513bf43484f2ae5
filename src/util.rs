// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" export cell handling (numbers,
// day-first dates, header spellings) so the rest of the code can assume
// clean, typed values.
use chrono::{Months, NaiveDate};
use num_format::{Locale, ToFormattedString};

/// Day-first layouts tried in order; ISO dates are unambiguous and
/// accepted as well. Two-digit-year layouts must come first, `%Y` would
/// happily read `24` as the year 24.
const DATE_FORMATS: [&str; 8] = [
    "%d/%m/%y", "%d-%m-%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%d %b %Y",
    "%d %B %Y",
];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (this also rules
///   out `NaN` and `inf`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Review scores are small decimals, so a lone comma is a decimal comma
/// (`8,5`), not a thousands separator.
pub fn parse_score(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.matches(',').count() == 1 && !s.contains('.') {
        return parse_f64_safe(Some(&s.replace(',', ".")));
    }
    parse_f64_safe(Some(s))
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Exports sometimes carry a time component; only the day matters.
    let s = match s.split_once('T') {
        Some((day, time)) if time.contains(':') => day,
        _ => s,
    };
    let day = match s.rsplit_once(char::is_whitespace) {
        Some((day, time)) if time.contains(':') => day.trim_end(),
        _ => s,
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Subtract calendar months. A day that does not exist in the target month
/// resolves to that month's last day (31 Aug - 6 months = 29 Feb in a leap
/// year). Underflow saturates at the earliest representable date.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Lower-case, alphanumeric-only form of a column header.
pub fn normalize_header(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Arithmetic mean, `None` for an empty slice. Callers branch on "no data"
/// instead of receiving a misleading zero.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    // `-0.001` rounds to zero and must not keep its sign.
    let neg = n < 0.0 && s.chars().any(|c| matches!(c, '1'..='9'));
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` for optional values; missing values render as `n/a`.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `1,204 reviews loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates_are_read_day_first() {
        assert_eq!(parse_date_safe(Some("03/04/2024")), Some(date(2024, 4, 3)));
        assert_eq!(parse_date_safe(Some("03-04-2024")), Some(date(2024, 4, 3)));
        assert_eq!(parse_date_safe(Some("03/04/24")), Some(date(2024, 4, 3)));
        assert_eq!(parse_date_safe(Some("3 Apr 2024")), Some(date(2024, 4, 3)));
        assert_eq!(parse_date_safe(Some("2024-04-03")), Some(date(2024, 4, 3)));
        assert_eq!(
            parse_date_safe(Some(" 25/12/2023 18:42 ")),
            Some(date(2023, 12, 25))
        );
        assert_eq!(
            parse_date_safe(Some("3 Apr 2024 18:42")),
            Some(date(2024, 4, 3))
        );
        assert_eq!(
            parse_date_safe(Some("2024-04-03T18:42:00")),
            Some(date(2024, 4, 3))
        );
        assert_eq!(
            parse_date_safe(Some("2024-04-03 18:42:00")),
            Some(date(2024, 4, 3))
        );
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(parse_date_safe(Some("31/02/2024")), None);
        assert_eq!(parse_date_safe(Some("13/13/2024")), None);
        assert_eq!(parse_date_safe(Some("")), None);
        assert_eq!(parse_date_safe(None), None);
    }

    #[test]
    fn scores_accept_decimal_commas() {
        assert_eq!(parse_score(Some("8,5")), Some(8.5));
        assert_eq!(parse_score(Some(" 9.1 ")), Some(9.1));
        assert_eq!(parse_score(Some("n/a")), None);
        assert_eq!(parse_score(Some("NaN")), None);
        assert_eq!(parse_score(Some("")), None);
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
    }

    #[test]
    fn month_subtraction_clamps_to_month_end() {
        assert_eq!(months_before(date(2024, 8, 31), 6), date(2024, 2, 29));
        assert_eq!(months_before(date(2023, 8, 31), 6), date(2023, 2, 28));
        assert_eq!(months_before(date(2024, 12, 31), 6), date(2024, 6, 30));
        assert_eq!(months_before(date(2024, 7, 15), 6), date(2024, 1, 15));
        assert_eq!(months_before(date(2024, 3, 10), 6), date(2023, 9, 10));
    }

    #[test]
    fn headers_normalize_across_spellings() {
        assert_eq!(normalize_header("Value-For-Money"), "valueformoney");
        assert_eq!(normalize_header("value_for money"), "valueformoney");
        assert_eq!(normalize_header(" Ratings "), "ratings");
    }

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[7.0, 9.0]), Some(8.0));
    }

    #[test]
    fn numbers_format_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-3.5, 1), "-3.5");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-0.006, 2), "-0.01");
        assert_eq!(format_opt(None, 2), "n/a");
        assert_eq!(format_int(12045usize), "12,045");
    }
}
