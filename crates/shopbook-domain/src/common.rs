//! Name-matching and date-range rules shared by every record.

/// Canonical form used to compare counterparty names.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Counterparty names match ignoring case and surrounding whitespace.
pub fn names_match(left: &str, right: &str) -> bool {
    normalize_name(left) == normalize_name(right)
}

/// Returns `true` when `date` falls in the inclusive `[from, to]` range.
///
/// Dates are ISO-8601 strings compared lexically; an absent bound is open.
pub fn date_in_range(date: &str, from: Option<&str>, to: Option<&str>) -> bool {
    from.map_or(true, |start| date >= start) && to.map_or(true, |end| date <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_ignore_case_and_padding() {
        assert!(names_match(" Acme ", "acme"));
        assert!(names_match("JOSÉ", "josé"));
        assert!(!names_match("Acme", "Acme Corp"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(date_in_range("2024-01-31", Some("2024-01-01"), Some("2024-01-31")));
        assert!(!date_in_range("2024-02-01", Some("2024-01-01"), Some("2024-01-31")));
        assert!(date_in_range("", None, Some("2024-01-31")));
    }
}
