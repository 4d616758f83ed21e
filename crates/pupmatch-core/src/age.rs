//! Age display and legacy age-text migration.

use chrono::{Datelike, Months, NaiveDate};

/// Parse a stored birthdate. Accepts `YYYY-MM-DD` and anything starting with
/// it (an RFC 3339 timestamp, for instance).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Human age string for a dog.
///
/// Uses the birthdate when it parses; otherwise returns the legacy age text
/// (or an empty string).
pub fn format_age(birthdate: Option<&str>, fallback: Option<&str>, today: NaiveDate) -> String {
    if let Some(bd) = birthdate.and_then(parse_date) {
        let mut years = today.year() - bd.year();
        let mut months = today.month() as i32 - bd.month() as i32;
        let days = today.day() as i32 - bd.day() as i32;
        if days < 0 {
            months -= 1;
        }
        if months < 0 {
            years -= 1;
            months += 12;
        }
        return match (years, months) {
            (1, _) => "1 year".to_owned(),
            (y, _) if y > 1 => format!("{y} years"),
            (_, 1) => "1 month".to_owned(),
            (_, m) if m > 1 => format!("{m} months"),
            _ => "Less than a month".to_owned(),
        };
    }
    fallback.unwrap_or_default().to_owned()
}

/// Approximate a birthdate from legacy text such as `"2 years"` or
/// `"1 year 6 months"`. Text naming neither unit maps to `today`.
pub fn approximate_birthdate(age_text: &str, today: NaiveDate) -> NaiveDate {
    let text = age_text.to_lowercase();
    let years = count_before(&text, "year").unwrap_or(0);
    let months = count_before(&text, "month").unwrap_or(0);
    let total = years.saturating_mul(12).saturating_add(months);
    today
        .checked_sub_months(Months::new(total))
        .unwrap_or(NaiveDate::MIN)
}

/// The number immediately preceding the first occurrence of `unit`
/// (whitespace allowed in between), e.g. `count_before("3 years", "year")`.
fn count_before(text: &str, unit: &str) -> Option<u32> {
    for (idx, _) in text.match_indices(unit) {
        let head = text[..idx].trim_end();
        let digits: String = head
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if let Ok(n) = digits.parse() {
            return Some(n);
        }
    }
    None
}
