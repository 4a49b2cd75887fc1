use anyhow::Result;
use clap::Parser;
use gmail_triage::auth::{self, AuthScope};
use gmail_triage::cli::{self, Cli, Commands, RunOverrides};
use gmail_triage::config::Config;
use gmail_triage::error::GmailError;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: gmail-triage --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs; on Windows, use ring
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_triage=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_triage=info,warn"))
    };

    // stdout carries the match log; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail API...");

            if let Some(parent) = cli.token_cache.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            if *force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            let hub =
                auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache, AuthScope::Modify)
                    .await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope(AuthScope::Modify.url())
                .doit()
                .await
                .map_err(GmailError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(())
        }

        Commands::Run {
            dry_run,
            max_results,
            query,
            no_spam_filter,
            report,
        } => {
            let overrides = RunOverrides {
                dry_run: *dry_run,
                max_results: *max_results,
                query: query.clone(),
                no_spam_filter: *no_spam_filter,
            };

            cli::run_triage(&cli, &overrides, report.as_deref()).await?;
            Ok(())
        }

        Commands::Rules => {
            let config = Config::load(&cli.config).await?;
            let stdout = std::io::stdout();
            cli::write_rules(&config.rule_set(), &mut stdout.lock())?;
            Ok(())
        }

        Commands::Check { subject, sender } => {
            let config = Config::load(&cli.config).await?;
            match cli::check_message(config.rule_set(), subject, sender.as_deref()) {
                Some(classification) => println!(
                    "[{}] matched by {}",
                    classification.label, classification.reason
                ),
                None => println!("No label would be applied"),
            }
            Ok(())
        }

        Commands::InitConfig { output, force } => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(GmailError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nKey settings to review:");
            println!("  - scan.max_results: How many recent messages to examine");
            println!("  - scan.query: Gmail search filter applied to the listing");
            println!("  - spam.enabled: Whether the spam pre-filter runs first");
            println!("  - [[rules]]: Label rules, evaluated top to bottom");

            Ok(())
        }
    }
}
