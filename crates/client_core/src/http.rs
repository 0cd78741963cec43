use reqwest::{Method, Response, StatusCode};
use shared::error::ApiErrorBody;
use tracing::{debug, error};
use url::Url;

use crate::{config::ProviderConfiguration, error::ClientError};

/// Sends one authenticated request and hands back the response only when
/// the server answered with `expected`.
///
/// On any other status the body is drained and SonarQube's `errors[].msg`
/// entries are attached to the returned error.
pub async fn http_request(
    config: &ProviderConfiguration,
    method: Method,
    url: Url,
    expected: StatusCode,
    caller: &'static str,
) -> Result<Response, ClientError> {
    debug!(caller, %method, %url, "sonarqube: sending request");

    let request = config
        .credentials()
        .apply(config.http().request(method.clone(), url.clone()));
    let response = request.send().await.map_err(|source| {
        error!(caller, %method, %url, error = %source, "sonarqube: request failed");
        ClientError::Transport {
            caller,
            url: url.to_string(),
            source,
        }
    })?;

    let actual = response.status();
    if actual == expected {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let messages = ApiErrorBody::messages_from(&body);
    error!(
        caller,
        %method,
        %url,
        status = actual.as_u16(),
        expected = expected.as_u16(),
        ?messages,
        "sonarqube: unexpected response status"
    );
    Err(ClientError::UnexpectedStatus {
        caller,
        method,
        url: url.to_string(),
        expected,
        actual,
        messages,
    })
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
