//! Label resolution: case-insensitive lookup, created on first miss
use crate::client::GmailClient;
use crate::error::{GmailError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves label names to Gmail label IDs, creating labels that don't exist.
///
/// With caching enabled the account's labels are listed once per run and kept
/// in a map keyed by lowercase name; labels created during the run are added
/// to the map immediately so a later lookup never creates a duplicate. With
/// caching disabled every lookup re-lists the account's labels.
pub struct LabelManager {
    client: Arc<dyn GmailClient>,
    use_cache: bool,
    label_cache: Option<HashMap<String, String>>, // lowercase name -> id
    created_labels: Vec<String>,
}

impl LabelManager {
    pub fn new(client: Arc<dyn GmailClient>, use_cache: bool) -> Self {
        Self {
            client,
            use_cache,
            label_cache: None,
            created_labels: Vec::new(),
        }
    }

    /// Names of labels created by this manager, in creation order
    pub fn created_labels(&self) -> &[String] {
        &self.created_labels
    }

    /// Gets label ID by name (case-insensitive), creating it if necessary
    pub async fn get_or_create_label(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GmailError::LabelError("Label name cannot be empty".to_string()));
        }

        if let Some(id) = self.lookup(name).await? {
            debug!("Resolved label '{}' to {}", name, id);
            return Ok(id);
        }

        info!("Creating label: {}", name);
        let label_id = self.client.create_label(name).await.map_err(|e| match e {
            GmailError::AuthError(_) => e,
            other => GmailError::LabelError(format!("Failed to create label '{}': {}", name, other)),
        })?;

        if let Some(cache) = self.label_cache.as_mut() {
            cache.insert(name.to_lowercase(), label_id.clone());
        }
        self.created_labels.push(name.to_string());

        info!("Successfully created label '{}' with ID: {}", name, label_id);
        Ok(label_id)
    }

    async fn lookup(&mut self, name: &str) -> Result<Option<String>> {
        let key = name.to_lowercase();

        if self.use_cache {
            if self.label_cache.is_none() {
                let labels = self.load_existing_labels().await?;
                self.label_cache = Some(labels);
            }
            return Ok(self
                .label_cache
                .as_ref()
                .and_then(|cache| cache.get(&key))
                .cloned());
        }

        let labels = self.client.list_labels().await?;
        Ok(labels
            .into_iter()
            .find(|label| label.name.to_lowercase() == key)
            .map(|label| label.id))
    }

    /// First label wins when two names differ only by case, matching a linear scan
    async fn load_existing_labels(&self) -> Result<HashMap<String, String>> {
        let labels = self.client.list_labels().await?;
        let mut cache = HashMap::with_capacity(labels.len());
        for label in labels {
            cache.entry(label.name.to_lowercase()).or_insert(label.id);
        }
        info!("Loaded {} existing labels into cache", cache.len());
        Ok(cache)
    }
}
