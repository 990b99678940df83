//! Helpers for the caller-supplied ids that arrive as query strings.

use crate::error::{AppError, AppResult};

/// Returns the value when present and non-blank.
pub fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_id(raw: &str, field: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request(format!("Invalid {} format", field)))
}

/// Missing ids are a bad request unless the route says otherwise.
pub fn require_id(raw: &Option<String>, field: &str, missing: AppError) -> AppResult<i64> {
    match present(raw) {
        Some(v) => parse_id(v, field),
        None => Err(missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn present_skips_blank() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&Some(" 7 ".into())), Some("7"));
    }

    #[test]
    fn parse_id_rejects_non_positive_and_garbage() {
        assert_eq!(parse_id("12", "userID").unwrap(), 12);
        assert!(parse_id("0", "userID").is_err());
        assert!(parse_id("-3", "userID").is_err());
        let err = parse_id("abc", "userID").unwrap_err();
        assert_eq!(err.to_string(), "Invalid userID format");
    }

    #[test]
    fn require_id_uses_given_missing_error() {
        let err = require_id(&None, "userID", AppError::unauthorized("User ID is required"))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        let err = require_id(&Some("x".into()), "userID", AppError::unauthorized("unused"))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
