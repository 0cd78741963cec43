use serde::{Deserialize, Serialize};

use crate::domain::ProjectKey;

pub const SELECT_PATH: &str = "api/qualitygates/select";
pub const SEARCH_PATH: &str = "api/qualitygates/search";
pub const DESELECT_PATH: &str = "api/qualitygates/deselect";

pub const GATE_ID_PARAM: &str = "gateId";
pub const PROJECT_KEY_PARAM: &str = "projectKey";

/// A project listed by `api/qualitygates/search`. Only the key is read;
/// every other field the server sends is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub key: ProjectKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ProjectRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl SearchResponse {
    pub fn find(&self, project_key: &ProjectKey) -> Option<&ProjectRecord> {
        self.results.iter().find(|record| &record.key == project_key)
    }

    /// True when the server reports more projects than this page lists.
    pub fn is_partial(&self) -> bool {
        self.paging.is_some_and(|paging| paging.total > self.results.len() as u64)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
