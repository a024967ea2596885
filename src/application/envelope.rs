//! The uniform `{success, code, message, data, timestamp}` response wrapper.

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

pub const CODE_OK: &str = "0";
pub const CODE_BAD_REQUEST: u16 = 400;
pub const CODE_NOT_FOUND: u16 = 404;
pub const CODE_INTERNAL: u16 = 500;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "操作成功";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: i64,
}

pub fn success_response<T>(data: T, message: impl Into<String>) -> Envelope<T> {
    Envelope {
        success: true,
        code: CODE_OK.to_string(),
        message: message.into(),
        data: Some(data),
        timestamp: now_millis(),
    }
}

/// Error envelope; `data` always serializes as `null`.
pub fn error_response(message: impl Into<String>, code: u16) -> Envelope<Value> {
    Envelope {
        success: false,
        code: code.to_string(),
        message: message.into(),
        data: None,
        timestamp: now_millis(),
    }
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_shape() {
        let envelope = success_response(json!({"id": 1}), "ok");
        let value = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["code"], json!("0"));
        assert_eq!(value["message"], json!("ok"));
        assert_eq!(value["data"], json!({"id": 1}));
        assert!(value["timestamp"].as_i64().expect("number") > 0);
    }

    #[test]
    fn error_envelope_has_null_data_and_string_code() {
        let value = serde_json::to_value(error_response("活动不存在", CODE_NOT_FOUND))
            .expect("serialize");
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["code"], json!("404"));
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["message"], json!("活动不存在"));
    }
}
