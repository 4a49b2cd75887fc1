use serde::{Deserialize, Serialize};

/// Sender used when a message carries no `From` header
pub const NO_SENDER: &str = "No sender";

/// Subject used when a message carries no `Subject` header
pub const NO_SUBJECT: &str = "No subject";

/// Message metadata needed for triage.
///
/// Fetched fresh on every run and never cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub subject: String,
}

impl Message {
    pub fn new(id: impl Into<String>, sender: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            subject: subject.into(),
        }
    }

    /// Build a message from `(name, value)` header pairs.
    ///
    /// Header names compare case-insensitively and the first occurrence wins.
    /// Missing `From` / `Subject` headers fall back to [`NO_SENDER`] / [`NO_SUBJECT`].
    pub fn from_headers<'a, I>(id: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut sender = None;
        let mut subject = None;

        for (name, value) in headers {
            if sender.is_none() && name.eq_ignore_ascii_case("from") {
                sender = Some(value.to_string());
            } else if subject.is_none() && name.eq_ignore_ascii_case("subject") {
                subject = Some(value.to_string());
            }
        }

        Self {
            id: id.into(),
            sender: sender.unwrap_or_else(|| NO_SENDER.to_string()),
            subject: subject.unwrap_or_else(|| NO_SUBJECT.to_string()),
        }
    }
}

/// Label info returned from Gmail API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers_extracts_sender_and_subject() {
        let msg = Message::from_headers(
            "m1",
            vec![
                ("Date", "Mon, 1 Jan 2024 10:00:00 -0800"),
                ("From", "HR <hr@google.com>"),
                ("Subject", "Internship opportunity at Google"),
            ],
        );

        assert_eq!(msg.id, "m1");
        assert_eq!(msg.sender, "HR <hr@google.com>");
        assert_eq!(msg.subject, "Internship opportunity at Google");
    }

    #[test]
    fn test_from_headers_sentinels() {
        let msg = Message::from_headers("m2", Vec::<(&str, &str)>::new());
        assert_eq!(msg.sender, NO_SENDER);
        assert_eq!(msg.subject, NO_SUBJECT);

        let msg = Message::from_headers("m3", vec![("Subject", "Hello")]);
        assert_eq!(msg.sender, "No sender");
        assert_eq!(msg.subject, "Hello");
    }

    #[test]
    fn test_from_headers_case_insensitive_first_wins() {
        let msg = Message::from_headers(
            "m4",
            vec![
                ("from", "first@example.com"),
                ("FROM", "second@example.com"),
                ("subject", "lower"),
            ],
        );
        assert_eq!(msg.sender, "first@example.com");
        assert_eq!(msg.subject, "lower");
    }

    #[test]
    fn test_empty_header_value_is_kept() {
        let msg = Message::from_headers("m5", vec![("From", "a@b.com"), ("Subject", "")]);
        assert_eq!(msg.subject, "");
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new("123", "test@example.com", "Test Subject");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
