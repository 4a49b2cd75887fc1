//! Gmail Triage
//!
//! Fetches recent message metadata, classifies each subject line against
//! ordered keyword rules, and applies the matching label, creating it first
//! when the account doesn't have it yet.
//!
//! # Overview
//!
//! A run is a single sequential pass:
//! - **Authentication**: OAuth2 installed-app flow with a cached token
//! - **Listing**: up to N most recent message IDs, optionally filtered by a query
//! - **Classification**: spam policy first, then content rules; first match wins
//! - **Labeling**: case-insensitive label lookup, create on miss, apply
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gmail_triage::{auth, auth::AuthScope, client::ProductionGmailClient, config::Config};
//! use gmail_triage::pipeline::{RunOptions, TriageRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         "token.json".as_ref(),
//!         AuthScope::Modify,
//!     ).await?;
//!
//!     let client = Arc::new(ProductionGmailClient::new(hub, AuthScope::Modify));
//!     let mut runner = TriageRunner::new(client, config.rule_set(), RunOptions::from_config(&config));
//!     let summary = runner.run(&mut std::io::stdout()).await?;
//!     println!("{} of {} messages labeled", summary.matched, summary.processed);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`client`] - Gmail API client trait and production implementation
//! - [`classifier`] - Keyword classification with spam precedence
//! - [`cli`] - Command-line interface and run orchestration
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`label_manager`] - Label lookup and creation
//! - [`models`] - Core data structures
//! - [`pipeline`] - The triage run and its summary
//! - [`rules`] - Keyword rule tables

pub mod auth;
pub mod classifier;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod label_manager;
pub mod models;
pub mod pipeline;
pub mod rules;

// Re-export commonly used types for convenience
pub use error::{GmailError, Result};

pub use models::{LabelInfo, Message, NO_SENDER, NO_SUBJECT};

pub use classifier::{Classification, KeywordClassifier, MatchReason};

pub use rules::{KeywordRule, RuleSet, SpamRule};

pub use config::{Config, ExecutionConfig, LabelConfig, RuleConfig, ScanConfig, SpamConfig};

pub use client::{GmailClient, ProductionGmailClient};

pub use label_manager::LabelManager;

pub use pipeline::{MessageOutcome, RunOptions, RunSummary, TriageRunner};

pub use cli::{Cli, Commands};
