use thiserror::Error;

/// Errors surfaced by the timer core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A configuration value is out of range. Nothing was started.
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: i64,
        reason: &'static str,
    },
}

impl TimerError {
    pub(crate) fn invalid(field: &'static str, value: i64, reason: &'static str) -> Self {
        TimerError::InvalidConfig {
            field,
            value,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message_names_field() {
        let err = TimerError::invalid("session_count", 21, "must be between 1 and 20");
        assert_eq!(
            err.to_string(),
            "invalid configuration: session_count = 21 (must be between 1 and 20)"
        );
    }
}
