//! OAuth2 consent, token caching and hub construction

use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use yup_oauth2::ApplicationSecret;

use crate::error::{GmailError, Result};

/// Read/write access needed to create and apply labels
pub const MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Read-only access, enough for listing and printing matches
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

pub type GmailHub = Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// OAuth scope requested for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// Labels may be created and applied
    Modify,
    /// Messages and labels may only be read
    ReadOnly,
}

impl AuthScope {
    /// Labeling runs need `gmail.modify`; print-only runs get by with `gmail.readonly`
    pub fn for_run(dry_run: bool) -> Self {
        if dry_run {
            AuthScope::ReadOnly
        } else {
            AuthScope::Modify
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            AuthScope::Modify => MODIFY_SCOPE,
            AuthScope::ReadOnly => READONLY_SCOPE,
        }
    }

    pub fn can_modify(&self) -> bool {
        matches!(self, AuthScope::Modify)
    }
}

/// Build an authenticated Gmail hub.
///
/// Uses the installed-app consent flow with the token persisted at
/// `token_cache_path`. A token for `scope` is fetched before returning, so a revoked consent or
/// an unreadable client secret surfaces here as [`GmailError::AuthError`]
/// rather than on the first API call.
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    token_cache_path: &Path,
    scope: AuthScope,
) -> Result<GmailHub> {
    let secret = read_application_secret(credentials_path).await?;

    // HTTPRedirect opens a browser for user authorization on first run
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path)
    .build()
    .await
    .map_err(|e| GmailError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    let _token = auth
        .token(&[scope.url()])
        .await
        .map_err(|e| GmailError::AuthError(format!("Failed to obtain token: {}", e)))?;
    info!("Obtained access token for scope {}", scope.url());

    if token_cache_path.exists() {
        secure_token_file(token_cache_path).await?;
    }

    // google-gmail1 is most reliable over HTTP/1
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| GmailError::AuthError(format!("Failed to load TLS roots: {}", e)))?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Read the application secret from `path`, or from the environment when the
/// file does not exist
pub async fn read_application_secret(path: &Path) -> Result<ApplicationSecret> {
    if !path.exists() {
        debug!("Client secret file {:?} not found, trying environment", path);
        return load_credentials_from_env().map_err(|e| {
            GmailError::AuthError(format!(
                "No client secret file at {:?} and no usable environment credentials ({})",
                path, e
            ))
        });
    }

    yup_oauth2::read_application_secret(path)
        .await
        .map_err(|e| GmailError::AuthError(format!("Failed to read credentials: {}", e)))
}

/// Environment variable holding the OAuth client ID
pub const CLIENT_ID_VAR: &str = "GMAIL_CLIENT_ID";
/// Environment variable holding the OAuth client secret
pub const CLIENT_SECRET_VAR: &str = "GMAIL_CLIENT_SECRET";
/// Optional redirect override
pub const REDIRECT_URI_VAR: &str = "GMAIL_REDIRECT_URI";

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";
const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GmailError::ConfigError(format!("{} not set", name)))
}

/// Build an installed-app secret from `GMAIL_CLIENT_ID`, `GMAIL_CLIENT_SECRET`
/// and (optionally) `GMAIL_REDIRECT_URI`
pub fn load_credentials_from_env() -> Result<ApplicationSecret> {
    let client_id = required_var(CLIENT_ID_VAR)?;
    let client_secret = required_var(CLIENT_SECRET_VAR)?;
    let redirect_uri =
        env::var(REDIRECT_URI_VAR).unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());

    Ok(ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: GOOGLE_AUTH_URI.to_string(),
        token_uri: GOOGLE_TOKEN_URI.to_string(),
        redirect_uris: vec![redirect_uri],
        ..Default::default()
    })
}

/// Restrict the token cache to the owner (0600)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows uses ACLs; the file is left as created
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}
