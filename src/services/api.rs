//! API request and response types for HTTP/MQTT communication.

use serde::{Deserialize, Serialize};

use crate::{Direction, DispatcherState, MotionDirective, SubmitStatus};

// ============================================================================
// Request Types
// ============================================================================

/// JSON form of a command submission: `{"command": "forward-2-50"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Raw command string, same grammar as a plain-text body
    pub command: String,
}

impl CommandRequest {
    /// Extract the raw command from a request body.
    ///
    /// Bodies starting with `{` are read as [`CommandRequest`] JSON;
    /// anything else is the command itself.
    pub fn from_body(body: &str) -> Result<String, serde_json::Error> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') {
            serde_json::from_str::<CommandRequest>(trimmed).map(|req| req.command)
        } else {
            Ok(body.to_string())
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Result of a command submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Integer status code as returned to remote callers
    pub return_value: i8,
    /// Status name, e.g. `"queued"`
    pub status: String,
}

impl From<SubmitStatus> for CommandResponse {
    fn from(status: SubmitStatus) -> Self {
        Self {
            return_value: status.code(),
            status: status.as_str().to_string(),
        }
    }
}

/// Active directive as reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveResponse {
    /// Motion direction
    pub direction: Direction,
    /// Duration in seconds (0 = until replaced)
    pub duration_s: u8,
    /// Speed percentage
    pub speed: u8,
}

impl From<&MotionDirective> for DirectiveResponse {
    fn from(directive: &MotionDirective) -> Self {
        Self {
            direction: directive.direction(),
            duration_s: directive.duration_s(),
            speed: directive.speed(),
        }
    }
}

/// Current dispatcher state response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// A directive's timer is armed
    pub running: bool,
    /// The motors are moving
    pub driving: bool,
    /// Duration of the active directive in milliseconds
    pub duration_ms: u32,
    /// Time since the active directive started
    pub elapsed_ms: u64,
    /// Queue capacity
    pub capacity: usize,
    /// Active directive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<DirectiveResponse>,
    /// Pending raw commands, oldest first
    pub pending: Vec<String>,
}

impl StateResponse {
    /// Build a response from a snapshot plus the pending queue contents.
    pub fn new(state: &DispatcherState, pending: Vec<String>) -> Self {
        Self {
            running: state.running,
            driving: state.driving,
            duration_ms: state.duration_ms,
            elapsed_ms: state.elapsed_ms,
            capacity: state.capacity,
            current: state.current.as_ref().map(DirectiveResponse::from),
            pending,
        }
    }
}

// ============================================================================
// JSON Helpers
// ============================================================================

/// Compact state JSON for MQTT `state` publishes.
pub fn state_to_json(state: &DispatcherState) -> String {
    let direction = state
        .current
        .map(|d| d.direction())
        .unwrap_or_default();

    format!(
        r#"{{"running":{},"driving":{},"direction":"{}","duration_ms":{},"elapsed_ms":{},"pending":{}}}"#,
        state.running,
        state.driving,
        direction.as_str(),
        state.duration_ms,
        state.elapsed_ms,
        state.pending,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> DispatcherState {
        DispatcherState {
            running: true,
            driving: true,
            duration_ms: 2000,
            elapsed_ms: 500,
            pending: 2,
            capacity: 20,
            current: Some(MotionDirective::new(Direction::Left, 2, 40)),
        }
    }

    // ========================================================================
    // Request Types Tests
    // ========================================================================

    #[test]
    fn test_command_from_plain_body() {
        assert_eq!(
            CommandRequest::from_body("forward-2-50").unwrap(),
            "forward-2-50"
        );
    }

    #[test]
    fn test_command_from_json_body() {
        assert_eq!(
            CommandRequest::from_body(r#" {"command": "!stop"}"#).unwrap(),
            "!stop"
        );
    }

    #[test]
    fn test_command_from_bad_json_body() {
        assert!(CommandRequest::from_body(r#"{"cmd": "stop"}"#).is_err());
        assert!(CommandRequest::from_body("{").is_err());
    }

    // ========================================================================
    // ApiResponse Tests
    // ========================================================================

    #[test]
    fn test_api_response_ok() {
        let response = ApiResponse::ok("test data");
        assert!(response.success);
        assert_eq!(response.data, Some("test data"));
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_api_response_err() {
        let response: ApiResponse<String> = ApiResponse::err("something went wrong");
        assert!(!response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.error, Some("something went wrong".to_string()));
    }

    #[test]
    fn test_api_response_skip_serializing_none() {
        let response = ApiResponse::ok(42);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("error"));

        let response: ApiResponse<i32> = ApiResponse::err("failed");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("data"));
    }

    // ========================================================================
    // CommandResponse Tests
    // ========================================================================

    #[test]
    fn test_command_response_from_status() {
        let response = CommandResponse::from(SubmitStatus::QueueFull);
        assert_eq!(response.return_value, -2);
        assert_eq!(response.status, "queue_full");
    }

    #[test]
    fn test_command_response_json_shape() {
        let response = ApiResponse::ok(CommandResponse::from(SubmitStatus::Queued));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["return_value"], 2);
        assert_eq!(json["data"]["status"], "queued");
    }

    // ========================================================================
    // StateResponse Tests
    // ========================================================================

    #[test]
    fn test_state_response_from_snapshot() {
        let response = StateResponse::new(&running_state(), vec!["stop".into()]);
        assert!(response.running);
        assert_eq!(
            response.current,
            Some(DirectiveResponse {
                direction: Direction::Left,
                duration_s: 2,
                speed: 40,
            })
        );
        assert_eq!(response.pending, ["stop"]);
    }

    #[test]
    fn test_state_response_idle_omits_current() {
        let idle = DispatcherState {
            running: false,
            driving: false,
            duration_ms: 0,
            elapsed_ms: 0,
            pending: 0,
            capacity: 20,
            current: None,
        };
        let json = serde_json::to_string(&StateResponse::new(&idle, Vec::new())).unwrap();
        assert!(!json.contains("current"));
        assert!(json.contains(r#""pending":[]"#));
    }

    #[test]
    fn test_state_response_direction_lowercase() {
        let response = StateResponse::new(&running_state(), Vec::new());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["current"]["direction"], "left");
    }

    // ========================================================================
    // JSON Helper Tests
    // ========================================================================

    #[test]
    fn test_state_to_json_running() {
        let json = state_to_json(&running_state());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["running"], true);
        assert_eq!(value["direction"], "left");
        assert_eq!(value["duration_ms"], 2000);
        assert_eq!(value["pending"], 2);
    }

    #[test]
    fn test_state_to_json_idle_reports_stop() {
        let idle = DispatcherState {
            running: false,
            driving: false,
            duration_ms: 0,
            elapsed_ms: 0,
            pending: 0,
            capacity: 20,
            current: None,
        };
        let value: serde_json::Value = serde_json::from_str(&state_to_json(&idle)).unwrap();
        assert_eq!(value["direction"], "stop");
    }
}
