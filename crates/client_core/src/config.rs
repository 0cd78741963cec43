use std::{fmt, fs, io, path::Path, time::Duration};

use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_SETTINGS_FILE: &str = "sonarqube.toml";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub token: Option<String>,
    pub tls_insecure_skip_verify: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:9000".into(),
            user: None,
            pass: None,
            token: None,
            tls_insecure_skip_verify: false,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tls_insecure_skip_verify", &self.tls_insecure_skip_verify)
            .finish()
    }
}

/// Reads `path` (a missing file means defaults) and applies environment
/// overrides on top.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SONARQUBE_HOST") {
        settings.host = v;
    }
    if let Some(v) = lookup("SONAR_HOST") {
        settings.host = v;
    }

    if let Some(v) = lookup("SONAR_USER") {
        settings.user = Some(v);
    }
    if let Some(v) = lookup("SONAR_PASS") {
        settings.pass = Some(v);
    }
    if let Some(v) = lookup("SONAR_TOKEN") {
        settings.token = Some(v);
    }

    if let Some(v) = lookup("SONAR_TLS_INSECURE_SKIP_VERIFY") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.tls_insecure_skip_verify = true,
            "0" | "false" | "no" => settings.tls_insecure_skip_verify = false,
            _ => {}
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// User token, sent as the basic-auth login with an empty password.
    Token(String),
    Basic { user: String, pass: String },
}

impl Credentials {
    fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        if let Some(token) = settings.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Self::Token(token.to_string()));
        }
        match (settings.user.as_deref(), settings.pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Ok(Self::Basic {
                user: user.to_string(),
                pass: pass.to_string(),
            }),
            _ => Err(ClientError::MissingCredentials),
        }
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Token(token) => request.basic_auth(token, Some("")),
            Self::Basic { user, pass } => request.basic_auth(user, Some(pass)),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("pass", &"<redacted>")
                .finish(),
        }
    }
}

/// Validated connection handle shared by every resource operation.
#[derive(Debug, Clone)]
pub struct ProviderConfiguration {
    base_url: Url,
    http: Client,
    credentials: Credentials,
}

impl ProviderConfiguration {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = parse_host(&settings.host)?;
        let credentials = Credentials::from_settings(settings)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(settings.tls_insecure_skip_verify)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self {
            base_url,
            http,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Resolves an API path such as `api/qualitygates/select` under the
    /// host, keeping any context path the host carries.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

fn parse_host(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidHost {
        host: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host name".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
