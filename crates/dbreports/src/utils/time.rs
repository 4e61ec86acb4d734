use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

/// Drops any time-of-day suffix from a stored date, e.g.
/// `1966-09-15 00:00:00.000` becomes `1966-09-15`.
#[must_use]
pub fn truncate_to_date(raw: &str) -> &str {
    match raw.split_once(' ') {
        Some((date, _)) => date,
        None => raw,
    }
}

#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Every calendar day of `year`, January 1 through December 31.
pub fn days_of_year(year: i32) -> Result<Vec<Date>> {
    let mut current = Date::from_calendar_date(year, Month::January, 1)
        .with_context(|| format!("year out of range: {year}"))?;
    let mut days = Vec::with_capacity(366);
    while current.year() == year {
        days.push(current);
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(days)
}

pub fn now_utc_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format current timestamp")
}
