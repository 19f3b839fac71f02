use chrono::{FixedOffset, TimeZone, Utc};

const DISPLAY_OFFSET_HOURS: i32 = 8;

/// Render a stored UTC instant (epoch milliseconds) for the dashboard.
///
/// The offset is fixed at UTC+8 and applied at read/broadcast time; the
/// stored value stays UTC.
pub fn display_timestamp(at_ms: i64) -> String {
    let Some(offset) = FixedOffset::east_opt(DISPLAY_OFFSET_HOURS * 3600) else {
        return String::new();
    };
    match Utc.timestamp_millis_opt(at_ms).single() {
        Some(utc) => utc
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_fixed_offset() {
        // 2023-11-14 22:13:20 UTC → 2023-11-15 06:13:20 at UTC+8.
        assert_eq!(display_timestamp(1_700_000_000_000), "2023-11-15 06:13:20");
    }

    #[test]
    fn epoch_zero() {
        assert_eq!(display_timestamp(0), "1970-01-01 08:00:00");
    }
}
