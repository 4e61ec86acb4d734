/// Groups digits in threes with commas: `1234567` -> `1,234,567`.
#[must_use]
pub fn thousands(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_digits(value.unsigned_abs()))
}

/// Like [`thousands`] but renders a missing aggregate as `0`.
#[must_use]
pub fn thousands_or_zero(value: Option<i64>) -> String {
    value.map_or_else(|| "0".to_string(), thousands)
}

#[must_use]
pub fn usd(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}${}", group_digits(value.unsigned_abs()))
}

#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:.3}%")
}

/// Prints a coordinate with the shortest exact decimal, keeping one fractional
/// digit on whole numbers (`42` -> `42.0`).
#[must_use]
pub fn coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Joins names the way the detail view lists them: every entry is followed
/// by `", "`, so a non-empty list keeps a trailing separator.
#[must_use]
pub fn trailing_list(items: &[String]) -> String {
    items.iter().map(|item| format!("{item}, ")).collect()
}

#[cfg(test)]
mod tests {
    use super::{coordinate, percent, thousands, thousands_or_zero, trailing_list, usd};

    #[test]
    fn groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
        assert_eq!(thousands(-45_000), "-45,000");
        assert_eq!(thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn missing_aggregate_renders_zero() {
        assert_eq!(thousands_or_zero(None), "0");
        assert_eq!(thousands_or_zero(Some(12_345)), "12,345");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(usd(0), "$0");
        assert_eq!(usd(30_000_000), "$30,000,000");
        assert_eq!(usd(-1_500), "-$1,500");
        assert_eq!(percent(30.0), "30.000%");
        assert_eq!(percent(100.0 / 3.0), "33.333%");
    }

    #[test]
    fn coordinates_keep_a_fractional_digit() {
        assert_eq!(coordinate(41.931_26), "41.93126");
        assert_eq!(coordinate(-87.0), "-87.0");
        assert_eq!(coordinate(0.0), "0.0");
    }

    #[test]
    fn trailing_list_keeps_separator() {
        assert_eq!(trailing_list(&[]), "");
        assert_eq!(
            trailing_list(&["Comedy".to_string(), "Drama".to_string()]),
            "Comedy, Drama, "
        );
    }
}
