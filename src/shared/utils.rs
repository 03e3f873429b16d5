use chrono::{NaiveDate, NaiveDateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer};

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `PREFIX-` followed by `len` random uppercase alphanumerics.
pub fn generate_number(prefix: &str, len: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("{}-{}", prefix, suffix)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_datetime(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_have_prefix_and_uppercase_suffix() {
        let number = generate_number("PAY", 12);
        let (prefix, suffix) = number.split_once('-').unwrap();
        assert_eq!(prefix, "PAY");
        assert_eq!(suffix.len(), 12);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn parses_the_common_date_shapes() {
        assert!(parse_datetime("2025-01-02 03:04:05").is_some());
        assert!(parse_datetime("2025-01-02T03:04:05").is_some());
        assert!(parse_datetime("2025-01-02T03:04:05.123Z").is_some());
        assert!(parse_datetime("2025-01-02").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn rounds_money_to_cents() {
        assert_eq!(round2(10.005000001), 10.01);
        assert_eq!(round2(2500.0), 2500.0);
    }
}
