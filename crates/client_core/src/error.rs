use reqwest::{Method, StatusCode};
use shared::domain::AssociationIdError;
use thiserror::Error;

use crate::resource::ReadOutcome;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{caller}: request to {url} failed")]
    Transport {
        caller: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "{caller}: {method} {url} returned {actual}, expected {expected}{}",
        describe_messages(.messages)
    )]
    UnexpectedStatus {
        caller: &'static str,
        method: Method,
        url: String,
        expected: StatusCode,
        actual: StatusCode,
        messages: Vec<String>,
    },
    #[error(transparent)]
    InvalidId(#[from] AssociationIdError),
    #[error("could not confirm {id} on the server ({outcome:?})")]
    Unverified { id: String, outcome: ReadOutcome },
    #[error("{resource} has no id; it has not been created")]
    MissingId { resource: &'static str },
    #[error("invalid SonarQube host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
    #[error("no SonarQube credentials configured; set a token, or a user and pass")]
    MissingCredentials,
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

fn describe_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}
