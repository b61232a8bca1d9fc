use chrono::{DateTime, Local, Utc};

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap())
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::format_timestamp_datetime;

    #[test]
    fn format_timestamp_datetime_is_stable_for_epoch() {
        let value = format_timestamp_datetime(0);
        assert_eq!(value.len(), 16);
        assert!(value.starts_with("19"));
    }
}
