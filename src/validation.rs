//! Request field checks shared by the HTTP handlers and the CLI.

use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};

/// Non-empty meeting id, trimmed.
pub fn require_meeting_id(value: Option<&str>) -> PipelineResult<String> {
    value
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::invalid("meetingId is required."))
}

/// Meeting id that must also be a UUID.
pub fn require_uuid_meeting_id(value: Option<&str>) -> PipelineResult<String> {
    let id = require_meeting_id(value)?;
    if !is_valid_uuid(&id) {
        return Err(PipelineError::invalid("meetingId must be a UUID."));
    }
    Ok(id)
}

pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_meeting_id() {
        assert_eq!(require_meeting_id(Some(" abc ")).unwrap(), "abc");
        assert!(require_meeting_id(Some("   ")).is_err());
        assert!(require_meeting_id(None).is_err());
    }

    #[test]
    fn test_require_uuid_meeting_id() {
        let id = "0d4f6c0e-6b8a-4c1f-9a55-2f1d3f0b7a11";
        assert_eq!(require_uuid_meeting_id(Some(id)).unwrap(), id);

        let err = require_uuid_meeting_id(Some("meeting-1")).unwrap_err();
        assert_eq!(err.user_message(), "meetingId must be a UUID.");
    }
}
