//! Single-pass triage run: list, classify, label
//!
//! Messages are handled strictly one at a time. A failure on one message is
//! logged and recorded in the [`RunSummary`]; only authentication failures (or
//! any failure when `abort_on_error` is set) stop the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{Classification, KeywordClassifier};
use crate::client::GmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::label_manager::LabelManager;
use crate::models::Message;
use crate::rules::RuleSet;

/// Printed when the listing comes back empty
pub const NO_MESSAGES_NOTICE: &str = "No messages found.";

const RULE_WIDTH: usize = 40;

/// Knobs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub max_results: u32,
    pub query: String,
    pub dry_run: bool,
    pub abort_on_error: bool,
    pub cache_labels: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_results: config.scan.max_results,
            query: config.scan.query.clone(),
            dry_run: config.execution.dry_run,
            abort_on_error: config.execution.abort_on_error,
            cache_labels: config.labels.cache,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What happened to a single message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Label resolved and applied
    Labeled(Classification),
    /// Dry run: label chosen but nothing was changed
    WouldLabel(Classification),
    /// No rule matched
    Unmatched,
}

/// Per-run counters
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// IDs returned by the listing
    pub listed: usize,
    /// Messages handled without error, matched or not
    pub processed: usize,
    pub matched: usize,
    pub label_counts: BTreeMap<String, usize>,
    pub labels_created: Vec<String>,
    pub failed_ids: Vec<String>,
    /// Error that stopped the run early, if any
    pub aborted: Option<String>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: now,
            finished_at: now,
            dry_run,
            listed: 0,
            processed: 0,
            matched: 0,
            label_counts: BTreeMap::new(),
            labels_created: Vec::new(),
            failed_ids: Vec::new(),
            aborted: None,
        }
    }

    pub fn unmatched(&self) -> usize {
        self.processed - self.matched
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Write the summary as pretty JSON to `path`
    pub async fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Human-readable summary block
    pub fn write_report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        if self.dry_run {
            writeln!(out, "Triage Summary (DRY RUN - no labels applied)")?;
        } else {
            writeln!(out, "Triage Summary")?;
        }
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Run ID: {}", self.run_id)?;
        writeln!(out, "Duration: {} seconds", self.duration_seconds())?;
        writeln!(out, "Messages listed: {}", self.listed)?;
        writeln!(out, "Messages processed: {}", self.processed)?;
        writeln!(out, "Messages matched: {}", self.matched)?;
        writeln!(out, "Messages unmatched: {}", self.unmatched())?;
        for (label, count) in &self.label_counts {
            writeln!(out, "  {}: {}", label, count)?;
        }
        if !self.labels_created.is_empty() {
            writeln!(out, "Labels created: {}", self.labels_created.join(", "))?;
        }
        if !self.failed_ids.is_empty() {
            writeln!(out, "Failed messages: {}", self.failed_ids.len())?;
            for id in &self.failed_ids {
                writeln!(out, "  - {}", id)?;
            }
        }
        if let Some(reason) = &self.aborted {
            writeln!(out, "Run aborted: {}", reason)?;
        }
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }
}

/// Write one match record: `[Label] From: …`, `Subject: …`, dash rule
pub fn write_match_record<W: Write>(
    out: &mut W,
    label: &str,
    message: &Message,
) -> std::io::Result<()> {
    writeln!(out, "[{}] From: {}", label, message.sender)?;
    writeln!(out, "Subject: {}", message.subject)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Drives one triage run against a [`GmailClient`]
pub struct TriageRunner {
    client: Arc<dyn GmailClient>,
    classifier: KeywordClassifier,
    label_manager: LabelManager,
    options: RunOptions,
}

impl TriageRunner {
    pub fn new(client: Arc<dyn GmailClient>, rules: RuleSet, options: RunOptions) -> Self {
        let label_manager = LabelManager::new(Arc::clone(&client), options.cache_labels);
        Self {
            client,
            classifier: KeywordClassifier::new(rules),
            label_manager,
            options,
        }
    }

    /// Run the pipeline once, writing the match log to `out`
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::new(self.options.dry_run);
        self.run_into(out, &mut summary).await?;
        Ok(summary)
    }

    /// Run, then print the summary block and optionally save it as JSON.
    ///
    /// The summary is written even when the run stops early, so labels
    /// created and failed IDs up to that point are kept.
    pub async fn run_and_report<W: Write>(
        &mut self,
        out: &mut W,
        report: Option<&Path>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::new(self.options.dry_run);
        let result = self.run_into(out, &mut summary).await;

        // An empty listing prints only the notice
        if summary.listed > 0 {
            summary.write_report(out)?;
        }
        if let Some(path) = report {
            summary.save_json(path).await?;
            info!("Run summary written to {:?}", path);
        }

        result.map(|()| summary)
    }

    /// Run the pipeline, accumulating counters in `summary`.
    ///
    /// On error `summary` holds everything done before the failure, with
    /// `aborted` set.
    pub async fn run_into<W: Write>(&mut self, out: &mut W, summary: &mut RunSummary) -> Result<()> {
        info!(
            run_id = %summary.run_id,
            max_results = self.options.max_results,
            query = %self.options.query,
            dry_run = self.options.dry_run,
            "Starting triage run"
        );

        let result = self.process_listing(out, summary).await;

        summary.labels_created = self.label_manager.created_labels().to_vec();
        summary.finished_at = Utc::now();

        match &result {
            Ok(()) => info!(
                run_id = %summary.run_id,
                processed = summary.processed,
                matched = summary.matched,
                failed = summary.failed_ids.len(),
                "Triage run finished"
            ),
            Err(e) => {
                summary.aborted = Some(e.to_string());
                warn!(
                    run_id = %summary.run_id,
                    processed = summary.processed,
                    matched = summary.matched,
                    labels_created = summary.labels_created.len(),
                    error = %e,
                    "Triage run aborted"
                );
            }
        }
        result
    }

    async fn process_listing<W: Write>(&mut self, out: &mut W, summary: &mut RunSummary) -> Result<()> {
        let ids = self
            .client
            .list_message_ids(self.options.max_results, &self.options.query)
            .await?;
        summary.listed = ids.len();

        if ids.is_empty() {
            writeln!(out, "{}", NO_MESSAGES_NOTICE)?;
            info!("No messages matched the listing");
            return Ok(());
        }

        writeln!(out, "Filtered Emails:\n{}", "-".repeat(RULE_WIDTH))?;

        for id in &ids {
            match self.process_message(id, out).await {
                Ok(outcome) => {
                    summary.processed += 1;
                    match outcome {
                        MessageOutcome::Labeled(c) | MessageOutcome::WouldLabel(c) => {
                            summary.matched += 1;
                            *summary.label_counts.entry(c.label).or_insert(0) += 1;
                        }
                        MessageOutcome::Unmatched => {}
                    }
                }
                Err(e) if e.is_fatal() || self.options.abort_on_error => {
                    summary.failed_ids.push(id.clone());
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        message_id = %id,
                        error = %e,
                        transient = e.is_transient(),
                        "Skipping message after failure"
                    );
                    summary.failed_ids.push(id.clone());
                }
            }
        }
        Ok(())
    }

    /// Fetch, classify and (unless dry run) label a single message
    pub async fn process_message<W: Write>(
        &mut self,
        id: &str,
        out: &mut W,
    ) -> Result<MessageOutcome> {
        let message = self.client.get_message(id).await?;

        let Some(classification) = self.classifier.classify(&message) else {
            debug!(message_id = %id, "No rule matched");
            return Ok(MessageOutcome::Unmatched);
        };

        debug!(
            message_id = %id,
            label = %classification.label,
            reason = %classification.reason,
            "Classified message"
        );
        write_match_record(out, &classification.label, &message)?;

        if self.options.dry_run {
            return Ok(MessageOutcome::WouldLabel(classification));
        }

        let label_id = self
            .label_manager
            .get_or_create_label(&classification.label)
            .await?;
        self.client.apply_label(&message.id, &label_id).await?;

        Ok(MessageOutcome::Labeled(classification))
    }
}
