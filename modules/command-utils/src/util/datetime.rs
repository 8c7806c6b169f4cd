use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

pub fn from_epoch_sec(epoch_sec: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch_sec, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// days elapsed since `base` (UTC midnight) until `at`
pub fn days_since(base: NaiveDate, at: &DateTime<Utc>) -> i64 {
    (at.date_naive() - base).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_since() {
        let base = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let at = Utc.with_ymd_and_hms(2001, 1, 11, 12, 0, 0).unwrap();
        assert_eq!(days_since(base, &at), 10);
        assert_eq!(days_since(base, &from_epoch_sec(978_307_200)), 0);
    }
}
