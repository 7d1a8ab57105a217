//! Human-readable access request numbers: `REQ-<YYYYMMDD>-<8 hex>`.
//!
//! Numbers are practically unique only. The store enforces uniqueness and
//! inserts retry with a fresh number on conflict.

use chrono::{DateTime, Utc};
use uuid::Uuid;

const PREFIX: &str = "REQ-";
const SUFFIX_LEN: usize = 8;

/// Generate a request number stamped with the UTC date of `now`.
#[must_use]
pub fn generate_request_number(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{PREFIX}{}-{}",
        now.format("%Y%m%d"),
        random[..SUFFIX_LEN].to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
        let number = generate_request_number(now);
        assert!(number.starts_with("REQ-20240309-"), "{number}");
        assert_eq!(number.len(), "REQ-20240309-".len() + 8);
        let suffix = &number["REQ-20240309-".len()..];
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
    }

    #[test]
    fn test_numbers_differ() {
        let now = Utc::now();
        assert_ne!(generate_request_number(now), generate_request_number(now));
    }
}
