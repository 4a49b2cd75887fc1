//! Gmail API client

use async_trait::async_trait;
use google_gmail1::api::{Label, ModifyMessageRequest};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AuthScope, GmailHub};
use crate::error::{GmailError, Result};
use crate::models::{LabelInfo, Message};

/// Headers requested for every message fetch
pub const METADATA_HEADERS: &[&str] = &["From", "Subject"];

/// Trait defining the mail provider operations the triage run needs
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// List up to `max_results` of the most recent message IDs matching `query`.
    /// An empty query means no filter.
    async fn list_message_ids(&self, max_results: u32, query: &str) -> Result<Vec<String>>;

    /// Fetch sender and subject metadata for one message
    async fn get_message(&self, id: &str) -> Result<Message>;

    /// List all labels in the account
    async fn list_labels(&self) -> Result<Vec<LabelInfo>>;

    /// Create a new label with default visibility, returning its ID
    async fn create_label(&self, name: &str) -> Result<String>;

    /// Apply a label to a message
    async fn apply_label(&self, message_id: &str, label_id: &str) -> Result<()>;
}

/// Production Gmail client backed by a `google-gmail1` hub.
///
/// Calls are issued one at a time with no retry; every call carries the
/// scope the hub was authorized for.
pub struct ProductionGmailClient {
    hub: GmailHub,
    scope: AuthScope,
}

impl ProductionGmailClient {
    pub fn new(hub: GmailHub, scope: AuthScope) -> Self {
        Self { hub, scope }
    }

    fn require_modify(&self, operation: &str) -> Result<()> {
        ensure_can_modify(self.scope, operation)
    }
}

/// Mutations need `gmail.modify`; fail before the request goes out otherwise
fn ensure_can_modify(scope: AuthScope, operation: &str) -> Result<()> {
    if scope.can_modify() {
        Ok(())
    } else {
        Err(GmailError::Forbidden(format!(
            "{} requires the {} scope",
            operation,
            AuthScope::Modify.url()
        )))
    }
}

/// Search filter for `messages.list`; blank means the `q` parameter is omitted
fn list_query(query: &str) -> Option<&str> {
    let query = query.trim();
    (!query.is_empty()).then_some(query)
}

/// Body for `labels.create`: shown in the label list and in the message list
fn new_label_request(name: &str) -> Label {
    Label {
        name: Some(name.to_string()),
        label_list_visibility: Some("labelShow".to_string()),
        message_list_visibility: Some("show".to_string()),
        ..Default::default()
    }
}

/// Convert a Gmail API message into our [`Message`], falling back to the
/// requested ID when the response omits it
pub fn parse_message(requested_id: &str, msg: google_gmail1::api::Message) -> Message {
    let id = msg.id.unwrap_or_else(|| requested_id.to_string());

    let headers = msg
        .payload
        .and_then(|p| p.headers)
        .unwrap_or_default();

    Message::from_headers(
        id,
        headers
            .iter()
            .filter_map(|h| Some((h.name.as_deref()?, h.value.as_deref()?))),
    )
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_message_ids(&self, max_results: u32, query: &str) -> Result<Vec<String>> {
        let mut call = self
            .hub
            .users()
            .messages_list("me")
            .max_results(max_results);

        if let Some(q) = list_query(query) {
            call = call.q(q);
        }

        debug!(max_results, query, "Listing messages");
        let (_, response) = call.add_scope(self.scope.url()).doit().await?;

        let ids: Vec<String> = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        debug!("Listed {} message ids", ids.len());
        Ok(ids)
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let mut call = self
            .hub
            .users()
            .messages_get("me", id)
            .format("metadata");

        for header in METADATA_HEADERS {
            call = call.add_metadata_headers(header);
        }

        let (_, msg) = call.add_scope(self.scope.url()).doit().await?;
        Ok(parse_message(id, msg))
    }

    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        debug!("Calling Gmail API to list labels...");
        let (_, response) = self
            .hub
            .users()
            .labels_list("me")
            .add_scope(self.scope.url())
            .doit()
            .await?;

        let labels: Vec<LabelInfo> = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| match (label.id, label.name) {
                (Some(id), Some(name)) => Some(LabelInfo { id, name }),
                _ => None,
            })
            .collect();

        debug!("Successfully parsed {} labels", labels.len());
        Ok(labels)
    }

    async fn create_label(&self, name: &str) -> Result<String> {
        self.require_modify("labels.create")?;

        let (_, created_label) = self
            .hub
            .users()
            .labels_create(new_label_request(name), "me")
            .add_scope(self.scope.url())
            .doit()
            .await?;

        created_label
            .id
            .ok_or_else(|| GmailError::LabelError(format!("Created label '{}' has no ID", name)))
    }

    async fn apply_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        self.require_modify("messages.modify")?;

        let modify_request = ModifyMessageRequest {
            add_label_ids: Some(vec![label_id.to_string()]),
            remove_label_ids: None,
        };

        self.hub
            .users()
            .messages_modify(modify_request, "me", message_id)
            .add_scope(self.scope.url())
            .doit()
            .await?;

        Ok(())
    }
}

// Shared ownership for callers holding the client behind an Arc
#[async_trait]
impl<C: GmailClient + ?Sized> GmailClient for Arc<C> {
    async fn list_message_ids(&self, max_results: u32, query: &str) -> Result<Vec<String>> {
        self.as_ref().list_message_ids(max_results, query).await
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        self.as_ref().get_message(id).await
    }

    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        self.as_ref().list_labels().await
    }

    async fn create_label(&self, name: &str) -> Result<String> {
        self.as_ref().create_label(name).await
    }

    async fn apply_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        self.as_ref().apply_label(message_id, label_id).await
    }
}
