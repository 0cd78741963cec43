use serde::{Deserialize, Serialize};

/// One entry of the `errors` array SonarQube returns on failed web API calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub msg: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorMessage>,
}

impl ApiErrorBody {
    /// Messages from a raw response body. Bodies that are not SonarQube
    /// error documents yield nothing.
    pub fn messages_from(raw: &[u8]) -> Vec<String> {
        serde_json::from_slice::<Self>(raw)
            .map(|body| body.errors.into_iter().map(|e| e.msg).collect())
            .unwrap_or_default()
    }
}
