//! Common validation helpers for use cases.

/// Validation error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field_name} cannot be empty")]
    Empty { field_name: &'static str },

    #[error("{field_name} is invalid: {reason}")]
    Invalid {
        field_name: &'static str,
        reason: String,
    },
}

/// Validate a string is non-empty after trimming.
pub fn require_non_empty(value: &str, field_name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field_name });
    }
    Ok(())
}

/// Parse a textual ID, reporting the field it came from.
pub fn parse_id<T>(value: &str, field_name: &'static str) -> Result<T, ValidationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ValidationError::Invalid {
        field_name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameblitz_domain::QuestId;

    #[test]
    fn whitespace_counts_as_empty() {
        assert_eq!(
            require_non_empty("  \t", "player_id"),
            Err(ValidationError::Empty {
                field_name: "player_id"
            })
        );
        assert!(require_non_empty("p1", "player_id").is_ok());
    }

    #[test]
    fn parse_id_reports_field() {
        let id = QuestId::new();
        assert_eq!(parse_id::<QuestId>(&id.to_string(), "quest_id"), Ok(id));

        let err = parse_id::<QuestId>("not-a-uuid", "quest_id").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Invalid {
                field_name: "quest_id",
                ..
            }
        ));
    }
}
