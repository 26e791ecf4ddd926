use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("`{value}` is not a valid day key (expected YYYY.MM.DD)")]
    InvalidDayKey { value: String },
    #[error("timestamp {timestamp} is outside the supported calendar range")]
    TimestampOutOfRange { timestamp: i64 },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn invalid_day_key(value: impl Into<String>) -> Self {
        Self::InvalidDayKey {
            value: value.into(),
        }
    }

    pub fn timestamp_out_of_range(timestamp: i64) -> Self {
        Self::TimestampOutOfRange { timestamp }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
