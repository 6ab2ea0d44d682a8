use serde::{Deserialize, Serialize};

/// Envelope wrapped around every cart API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_success_with_absent_data_keeps_null() {
        // An Option payload serializes as an explicit null, not an omitted field
        let json = serde_json::to_value(ApiResponse::ok(None::<u32>)).unwrap();

        assert_eq!(json["success"], true);
        assert!(json.get("data").is_some());
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(ApiResponse::failure("Cart not found")).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Cart not found");
        assert!(json.get("data").is_none());
    }
}
