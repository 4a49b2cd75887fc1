//! Command-line interface

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{self, AuthScope};
use crate::classifier::{Classification, KeywordClassifier};
use crate::client::ProductionGmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Message, NO_SENDER};
use crate::pipeline::{RunOptions, RunSummary, TriageRunner};
use crate::rules::RuleSet;

#[derive(Parser, Debug)]
#[command(name = "gmail-triage")]
#[command(version)]
#[command(about = "Label recent Gmail messages by subject keywords", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 client secret file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = "token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Classify recent messages and apply labels
    Run {
        /// Print matches only; no labels are created or applied (read-only scope)
        #[arg(long)]
        dry_run: bool,

        /// Number of most recent messages to examine
        #[arg(long)]
        max_results: Option<u32>,

        /// Gmail search query to restrict the listing
        #[arg(long)]
        query: Option<String>,

        /// Skip the spam pre-filter
        #[arg(long)]
        no_spam_filter: bool,

        /// Also write the run summary as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the effective rule table in evaluation order
    Rules,

    /// Classify a single subject/sender offline
    Check {
        /// Subject line to classify
        #[arg(long)]
        subject: String,

        /// Sender (From header)
        #[arg(long)]
        sender: Option<String>,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Command-line overrides for the `run` subcommand
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub dry_run: bool,
    pub max_results: Option<u32>,
    pub query: Option<String>,
    pub no_spam_filter: bool,
}

impl RunOverrides {
    /// Fold the overrides into `config` and re-validate
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if self.dry_run {
            config.execution.dry_run = true;
        }
        if let Some(max_results) = self.max_results {
            config.scan.max_results = max_results;
        }
        if let Some(query) = &self.query {
            config.scan.query = query.clone();
        }
        if self.no_spam_filter {
            config.spam.enabled = false;
        }
        config.validate()
    }
}

/// Spinner helper using indicatif (draws on stderr)
pub struct ProgressReporter {
    spinner_style: ProgressStyle,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed:>6}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        Self { spinner_style }
    }

    pub fn add_spinner(&self, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(self.spinner_style.clone());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Clear the spinner and log its outcome
    pub fn finish_spinner(&self, pb: &ProgressBar, msg: &str) {
        pb.finish_and_clear();
        info!("{}", msg);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Authenticate, then run the triage pipeline once with the match log and
/// summary on stdout, saving the summary to `report` when given
pub async fn run_triage(
    cli: &Cli,
    overrides: &RunOverrides,
    report: Option<&Path>,
) -> Result<RunSummary> {
    let mut config = Config::load(&cli.config).await?;
    overrides.apply(&mut config)?;

    let options = RunOptions::from_config(&config);
    let scope = AuthScope::for_run(options.dry_run);
    if options.dry_run {
        info!("Running in DRY RUN mode - no labels will be applied");
    }

    let reporter = ProgressReporter::new();
    let auth_spinner = reporter.add_spinner("Authenticating with Gmail API...");
    let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache, scope).await;
    let hub = match hub {
        Ok(hub) => hub,
        Err(e) => {
            auth_spinner.finish_and_clear();
            return Err(e);
        }
    };
    reporter.finish_spinner(&auth_spinner, "Gmail API authenticated");

    let client = Arc::new(ProductionGmailClient::new(hub, scope));
    let mut runner = TriageRunner::new(client, config.rule_set(), options);

    // Unlocked handle: each write locks briefly, never across an await
    let mut out = std::io::stdout();
    runner.run_and_report(&mut out, report).await
}

/// Print the rule table, spam policy first when enabled
pub fn write_rules<W: Write>(rules: &RuleSet, out: &mut W) -> std::io::Result<()> {
    let mut position = 1;

    if let Some(spam) = rules.spam() {
        writeln!(out, "{}. {} (checked first)", position, spam.label())?;
        writeln!(out, "   senders: {}", spam.sender_patterns().join(", "))?;
        writeln!(out, "   keywords: {}", spam.keywords().join(", "))?;
        position += 1;
    }

    for rule in rules.rules() {
        writeln!(out, "{}. {}", position, rule.label())?;
        writeln!(out, "   keywords: {}", rule.terms().join(", "))?;
        position += 1;
    }

    if position == 1 {
        writeln!(out, "No rules configured.")?;
    }
    Ok(())
}

/// Classify a synthetic message built from command-line input
pub fn check_message(rules: RuleSet, subject: &str, sender: Option<&str>) -> Option<Classification> {
    let message = Message::new("check", sender.unwrap_or(NO_SENDER), subject);
    KeywordClassifier::new(rules).classify(&message)
}
