use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

use crate::domain::error::DomainError;

const OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// Parse a fixed offset written as `+HH:MM`/`-HH:MM`, or `UTC`/`Z`.
pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset, DomainError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(trimmed, OFFSET_FORMAT).map_err(|err| {
        DomainError::validation(format!(
            "`{raw}` is not a fixed UTC offset (expected +HH:MM): {err}"
        ))
    })
}

/// Render an offset in the same `+HH:MM` form accepted by `parse_utc_offset`.
pub fn format_utc_offset(offset: UtcOffset) -> String {
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", hours.unsigned_abs(), minutes.unsigned_abs())
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use time::macros::offset;

    use super::*;

    #[test]
    fn parses_signed_offsets() {
        assert_eq!(parse_utc_offset("+08:00"), Ok(offset!(+8)));
        assert_eq!(parse_utc_offset("-05:30"), Ok(offset!(-5:30)));
        assert_eq!(parse_utc_offset(" UTC "), Ok(UtcOffset::UTC));
        assert_eq!(parse_utc_offset("Z"), Ok(UtcOffset::UTC));
    }

    #[test]
    fn rejects_named_zones_and_garbage() {
        for raw in ["Asia/Shanghai", "8", "+8", "08:00", ""] {
            assert!(parse_utc_offset(raw).is_err(), "`{raw}` should be rejected");
        }
    }

    #[test]
    fn formats_back_to_the_parsed_form() {
        for raw in ["+08:00", "-05:30", "+00:00"] {
            let parsed = parse_utc_offset(raw).expect("valid offset");
            assert_eq!(format_utc_offset(parsed), raw);
        }
    }

    #[test]
    fn now_millis_is_positive() {
        assert!(now_millis() > 1_600_000_000_000);
    }
}
