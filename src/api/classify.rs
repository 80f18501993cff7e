//! Uniform classification of raw responses
//!
//! Every call site runs its response through [`classify`], so an expired
//! session, an unexpected payload and a broken transport look the same no
//! matter which endpoint produced them.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::RawResponse;
use crate::error::CallError;

/// `retcode` the platform returns when the session cookie is no longer valid
const LOGIN_INVALID_RETCODE: i64 = -100;

/// Fragments of the `message` field that mark an invalid login
const LOGIN_INVALID_MARKERS: &[&str] = &["登录", "login"];

/// Whether the response says the session is no longer valid
pub fn is_login_invalid(status: u16, body: &str) -> bool {
    if status == 401 {
        return true;
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    if value.get("retcode").and_then(Value::as_i64) == Some(LOGIN_INVALID_RETCODE) {
        return true;
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .is_some_and(|message| {
            LOGIN_INVALID_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
        })
}

/// Classify a raw response into the payload shape `T` expected by the caller
pub fn classify<T: DeserializeOwned>(response: &RawResponse) -> Result<T, CallError> {
    if is_login_invalid(response.status, &response.body) {
        return Err(CallError::AuthExpired);
    }

    let value: Value = serde_json::from_str(&response.body).map_err(|e| {
        CallError::Transport(format!(
            "non-JSON response (HTTP {}): {}",
            response.status, e
        ))
    })?;

    serde_json::from_value(value).map_err(|e| CallError::Malformed {
        reason: e.to_string(),
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Points {
        data: PointsData,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct PointsData {
        points: i64,
    }

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success() {
        let parsed: Points =
            classify(&response(200, r#"{"retcode":0,"data":{"points":100}}"#)).unwrap();
        assert_eq!(parsed.data.points, 100);
    }

    #[test]
    fn test_auth_marker_wins_over_well_formed_body() {
        let body = r#"{"retcode":-100,"message":"登录失效，请重新登录","data":{"points":1}}"#;
        assert_eq!(
            classify::<Points>(&response(200, body)),
            Err(CallError::AuthExpired)
        );
    }

    #[test]
    fn test_auth_marker_variants() {
        assert!(is_login_invalid(401, ""));
        assert!(is_login_invalid(200, r#"{"retcode":-100}"#));
        assert!(is_login_invalid(200, r#"{"message":"Please Login first"}"#));
        assert!(!is_login_invalid(200, r#"{"retcode":0,"message":"OK"}"#));
        assert!(!is_login_invalid(200, "not json"));
    }

    #[test]
    fn test_missing_field_is_malformed_with_body() {
        let body = r#"{"retcode":0,"data":{}}"#;
        match classify::<Points>(&response(200, body)) {
            Err(CallError::Malformed { body: raw, reason }) => {
                assert_eq!(raw, body);
                assert!(reason.contains("points"));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_is_transport_failure() {
        let result = classify::<Points>(&response(502, "<html>Bad Gateway</html>"));
        assert!(matches!(result, Err(CallError::Transport(msg)) if msg.contains("502")));
    }

    #[test]
    fn test_classification_is_pure() {
        let inputs = [
            response(200, r#"{"data":{"points":3}}"#),
            response(200, r#"{"data":null}"#),
            response(500, ""),
            response(200, r#"{"retcode":-100}"#),
        ];
        for input in &inputs {
            assert_eq!(classify::<Points>(input), classify::<Points>(input));
        }
    }
}
