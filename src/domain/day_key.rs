//! Calendar day keys in a fixed UTC offset.
//!
//! A day key is the `YYYY.MM.DD` rendering of a calendar date as observed in
//! the configured offset. It partitions the day-detail cache and labels the
//! buckets of the day index.

use std::fmt;

use time::{
    Date, Duration, OffsetDateTime, UtcOffset, format_description::FormatItem,
    macros::format_description,
};

use super::error::DomainError;

pub const DAY_KEY_FORMAT: &[FormatItem<'static>] = format_description!("[year].[month].[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(Date);

impl DayKey {
    /// Parse a `YYYY.MM.DD` key. Month and day must be zero padded.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Date::parse(value.trim(), DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::invalid_day_key(value))
    }

    /// The day that contains `timestamp` (seconds since epoch) in `offset`.
    pub fn from_timestamp(timestamp: i64, offset: UtcOffset) -> Result<Self, DomainError> {
        let instant = OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|_| DomainError::timestamp_out_of_range(timestamp))?;
        instant
            .checked_to_offset(offset)
            .map(|local| Self(local.date()))
            .ok_or_else(|| DomainError::timestamp_out_of_range(timestamp))
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// Half-open `[start, end)` bounds of the day in seconds since epoch.
    pub fn bounds(&self, offset: UtcOffset) -> (i64, i64) {
        let start = self.0.midnight().assume_offset(offset);
        let end = start
            .checked_add(Duration::DAY)
            .map_or(i64::MAX, |end| end.unix_timestamp());
        (start.unix_timestamp(), end)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}.{:02}.{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, offset};

    use super::*;

    #[test]
    fn parses_zero_padded_keys() {
        let key = DayKey::parse("2024.01.15").expect("valid key");
        assert_eq!(key.date(), date!(2024 - 01 - 15));
        assert_eq!(key.to_string(), "2024.01.15");
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in ["not-a-date", "2024-01-15", "2024.1.15", "2024.02.30", ""] {
            assert_eq!(
                DayKey::parse(raw),
                Err(DomainError::invalid_day_key(raw)),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn bounds_cover_one_local_day() {
        let key = DayKey::parse("2024.01.15").expect("valid key");
        let (start, end) = key.bounds(offset!(+8));

        // 2024-01-15T00:00:00+08:00
        assert_eq!(start, 1_705_248_000);
        assert_eq!(end - start, 86_400);
    }

    #[test]
    fn timestamps_bucket_by_configured_offset() {
        // 2024-01-14T16:30:00Z is already the 15th in UTC+8.
        let timestamp = 1_705_249_800;
        assert_eq!(
            DayKey::from_timestamp(timestamp, offset!(+8))
                .expect("in range")
                .to_string(),
            "2024.01.15"
        );
        assert_eq!(
            DayKey::from_timestamp(timestamp, UtcOffset::UTC)
                .expect("in range")
                .to_string(),
            "2024.01.14"
        );
    }

    #[test]
    fn day_start_and_last_second_share_a_key() {
        let key = DayKey::parse("2024.01.15").expect("valid key");
        let (start, end) = key.bounds(offset!(+8));
        assert_eq!(DayKey::from_timestamp(start, offset!(+8)), Ok(key));
        assert_eq!(DayKey::from_timestamp(end - 1, offset!(+8)), Ok(key));
        assert_ne!(DayKey::from_timestamp(end, offset!(+8)), Ok(key));
    }

    #[test]
    fn out_of_range_timestamp_is_reported() {
        assert_eq!(
            DayKey::from_timestamp(i64::MAX, UtcOffset::UTC),
            Err(DomainError::timestamp_out_of_range(i64::MAX))
        );
    }
}
