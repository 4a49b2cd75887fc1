//! Common test utilities and fixtures

#![allow(dead_code)]

use gmail_triage::client::{parse_message, GmailClient};
use gmail_triage::error::Result;
use gmail_triage::models::{LabelInfo, Message};
use mockall::mock;
use serde_json::json;

/// Create a test message with both headers present
pub fn create_test_message(id: &str, sender: &str, subject: &str) -> Message {
    Message::new(id, sender, subject)
}

/// Create a test LabelInfo
pub fn create_test_label_info(id: &str, name: &str) -> LabelInfo {
    LabelInfo {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Create mock Gmail API metadata response (JSON); `None` leaves the header out
pub fn mock_gmail_message_response(
    id: &str,
    from: Option<&str>,
    subject: Option<&str>,
) -> serde_json::Value {
    let mut headers = Vec::new();
    if let Some(from) = from {
        headers.push(json!({"name": "From", "value": from}));
    }
    if let Some(subject) = subject {
        headers.push(json!({"name": "Subject", "value": subject}));
    }

    json!({
        "id": id,
        "threadId": format!("thread_{}", id),
        "labelIds": ["INBOX", "UNREAD"],
        "payload": {
            "mimeType": "multipart/alternative",
            "headers": headers
        }
    })
}

/// Decode a JSON response the way the production client would see it
pub fn message_from_response(id: &str, response: serde_json::Value) -> Message {
    let api_message: google_gmail1::api::Message =
        serde_json::from_value(response).expect("valid Gmail message JSON");
    parse_message(id, api_message)
}

/// Split captured stdout into a string
pub fn captured(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("stdout is UTF-8")
}

// Mock implementation of GmailClient for testing
mock! {
    pub GmailClient {}

    #[async_trait::async_trait]
    impl GmailClient for GmailClient {
        async fn list_message_ids(&self, max_results: u32, query: &str) -> Result<Vec<String>>;
        async fn get_message(&self, id: &str) -> Result<Message>;
        async fn list_labels(&self) -> Result<Vec<LabelInfo>>;
        async fn create_label(&self, name: &str) -> Result<String>;
        async fn apply_label(&self, message_id: &str, label_id: &str) -> Result<()>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmail_triage::models::{NO_SENDER, NO_SUBJECT};

    #[test]
    fn test_create_test_message() {
        let msg = create_test_message("msg1", "test@example.com", "Test Subject");
        assert_eq!(msg.id, "msg1");
        assert_eq!(msg.sender, "test@example.com");
        assert_eq!(msg.subject, "Test Subject");
    }

    #[test]
    fn test_message_from_response() {
        let response =
            mock_gmail_message_response("msg1", Some("Alice <alice@example.com>"), Some("Hi"));
        let msg = message_from_response("msg1", response);
        assert_eq!(msg.sender, "Alice <alice@example.com>");
        assert_eq!(msg.subject, "Hi");
    }

    #[test]
    fn test_message_from_response_missing_headers() {
        let msg = message_from_response("msg1", mock_gmail_message_response("msg1", None, None));
        assert_eq!(msg.sender, NO_SENDER);
        assert_eq!(msg.subject, NO_SUBJECT);
    }
}
