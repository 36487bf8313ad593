//! Currency formatting and identifier helpers.

use chrono::Local;
use uuid::Uuid;

/// Formats an amount as Colombian pesos: whole units, `.` as thousands separator.
///
/// ```
/// use shopbook_domain::format_cop;
/// assert_eq!(format_cop(1_234_567.4), "$1.234.567");
/// assert_eq!(format_cop(-1_500.0), "$-1.500");
/// ```
pub fn format_cop(amount: f64) -> String {
    let rounded = if amount.is_finite() {
        amount.round() as i64
    } else {
        0
    };
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("$-{grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Generates a fresh opaque row identifier.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Today's local date in ISO-8601 form.
pub fn today_iso() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_and_large_amounts() {
        assert_eq!(format_cop(0.0), "$0");
        assert_eq!(format_cop(999.0), "$999");
        assert_eq!(format_cop(1000.0), "$1.000");
        assert_eq!(format_cop(100_000.0), "$100.000");
        assert_eq!(format_cop(f64::NAN), "$0");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn today_is_iso_shaped() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
    }
}
