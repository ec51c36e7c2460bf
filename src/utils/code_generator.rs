use chrono::{DateTime, Utc};
use rand::Rng;

/// `PREFIX-YYYYMMDD-####`
pub fn generate_order_number(prefix: &str, at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}-{}-{:04}",
        prefix,
        at.format("%Y%m%d"),
        rng.gen_range(0..=9999)
    )
}

/// `PREFIX-YYYYMMDD-######`
pub fn generate_receipt_number(prefix: &str, at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}-{}-{:06}",
        prefix,
        at.format("%Y%m%d"),
        rng.gen_range(0..=999_999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;

    #[test]
    fn test_order_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        let number = generate_order_number("ORD", at);
        let pattern = Regex::new(r"^ORD-20260307-\d{4}$").unwrap();
        assert!(pattern.is_match(&number), "{number}");
    }

    #[test]
    fn test_receipt_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 0).unwrap();
        let number = generate_receipt_number("RCP", at);
        let pattern = Regex::new(r"^RCP-20261231-\d{6}$").unwrap();
        assert!(pattern.is_match(&number), "{number}");
    }
}
