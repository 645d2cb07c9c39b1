//! Assertion primitive used by every scenario

use crate::error::{HarnessError, HarnessResult};
use crate::http::ResponseRecord;

/// Fail with `message` verbatim when `condition` is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> HarnessResult<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed(message.into()))
    }
}

pub fn ensure_status(response: &ResponseRecord, expected: u16) -> HarnessResult<()> {
    ensure(
        response.status == expected,
        format!("Expected {}, got {}", expected, response.status),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ParsedBody;
    use reqwest::header::HeaderMap;

    #[test]
    fn test_ensure_passes_silently() {
        assert!(ensure(true, "never shown").is_ok());
    }

    #[test]
    fn test_ensure_carries_message_verbatim() {
        let err = ensure(false, "Missing DOCTYPE").unwrap_err();
        assert!(matches!(err, HarnessError::AssertionFailed(_)));
        assert_eq!(err.to_string(), "Missing DOCTYPE");
    }

    #[test]
    fn test_ensure_status_message() {
        let response = ResponseRecord {
            status: 404,
            headers: HeaderMap::new(),
            body: ParsedBody::Raw("Not found".to_string()),
        };
        assert!(ensure_status(&response, 404).is_ok());
        assert_eq!(
            ensure_status(&response, 200).unwrap_err().to_string(),
            "Expected 200, got 404"
        );
    }
}
