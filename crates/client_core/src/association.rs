use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{AssociationId, GateId, ProjectKey},
    protocol::{
        SearchResponse, DESELECT_PATH, GATE_ID_PARAM, PROJECT_KEY_PARAM, SEARCH_PATH,
        SELECT_PATH,
    },
};
use tracing::{error, info, warn};

use crate::{
    config::ProviderConfiguration,
    error::ClientError,
    http::http_request,
    resource::{AttributeSchema, ReadOutcome, Resource},
};

pub const RESOURCE_TYPE: &str = "sonarqube_qualitygate_project_association";

const CREATE_CALLER: &str = "qualitygate_project_association.create";
const READ_CALLER: &str = "qualitygate_project_association.read";
const DELETE_CALLER: &str = "qualitygate_project_association.delete";

const GATEID: &str = "gateid";
const PROJECTKEY: &str = "projectkey";

const SCHEMA: &[AttributeSchema] = &[
    AttributeSchema {
        name: GATEID,
        required: true,
        force_new: true,
    },
    AttributeSchema {
        name: PROJECTKEY,
        required: true,
        force_new: true,
    },
];

fn is_force_new(name: &str) -> bool {
    SCHEMA.iter().any(|attr| attr.name == name && attr.force_new)
}

/// State record of one association, owned by the caller between operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationState {
    pub id: Option<AssociationId>,
    pub gateid: GateId,
    pub projectkey: ProjectKey,
}

impl AssociationState {
    /// State for an association that has not been created yet.
    pub fn planned(gateid: impl Into<GateId>, projectkey: impl Into<ProjectKey>) -> Self {
        Self {
            id: None,
            gateid: gateid.into(),
            projectkey: projectkey.into(),
        }
    }

    pub fn from_id(id: AssociationId) -> Self {
        Self {
            gateid: id.gate_id.clone(),
            projectkey: id.project_key.clone(),
            id: Some(id),
        }
    }

    /// Attributes whose change forces the association to be replaced.
    pub fn replacement_reasons(&self, planned: &Self) -> Vec<&'static str> {
        // Destructured so a new attribute fails to compile until handled here.
        let Self {
            id: _,
            gateid,
            projectkey,
        } = planned;
        let diffs = [
            (GATEID, &self.gateid != gateid),
            (PROJECTKEY, &self.projectkey != projectkey),
        ];
        diffs
            .into_iter()
            .filter(|&(name, changed)| changed && is_force_new(name))
            .map(|(name, _)| name)
            .collect()
    }

    fn association_url(&self, config: &ProviderConfiguration, path: &str) -> url::Url {
        let mut url = config.endpoint(path);
        url.query_pairs_mut()
            .append_pair(GATE_ID_PARAM, self.gateid.as_str())
            .append_pair(PROJECT_KEY_PARAM, self.projectkey.as_str());
        url
    }
}

/// Binds a quality gate to a project through `api/qualitygates/select`,
/// refreshes it from `api/qualitygates/search` and unbinds it through
/// `api/qualitygates/deselect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityGateProjectAssociation;

#[async_trait]
impl Resource for QualityGateProjectAssociation {
    type State = AssociationState;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &'static [AttributeSchema] {
        SCHEMA
    }

    async fn create(
        &self,
        config: &ProviderConfiguration,
        state: &mut AssociationState,
    ) -> Result<(), ClientError> {
        // Reject pairs whose id would not split back into the same two parts.
        let id: AssociationId = AssociationId::new(state.gateid.clone(), state.projectkey.clone())
            .to_string()
            .parse()?;

        let url = state.association_url(config, SELECT_PATH);
        http_request(config, Method::POST, url, StatusCode::NO_CONTENT, CREATE_CALLER).await?;

        info!(
            gate_id = %id.gate_id,
            project_key = %id.project_key,
            "qualitygate: associated project"
        );
        state.id = Some(id);
        Ok(())
    }

    async fn read(
        &self,
        config: &ProviderConfiguration,
        state: &mut AssociationState,
    ) -> Result<ReadOutcome, ClientError> {
        let Some(id) = state.id.clone() else {
            return Err(ClientError::MissingId {
                resource: RESOURCE_TYPE,
            });
        };

        let mut url = config.endpoint(SEARCH_PATH);
        url.query_pairs_mut().append_pair(GATE_ID_PARAM, id.gate_id.as_str());
        let response =
            http_request(config, Method::GET, url.clone(), StatusCode::OK, READ_CALLER).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                caller: READ_CALLER,
                url: url.to_string(),
                source,
            })?;

        let search: SearchResponse = match serde_json::from_slice(&body) {
            Ok(search) => search,
            Err(err) => {
                error!(
                    caller = READ_CALLER,
                    gate_id = %id.gate_id,
                    error = %err,
                    "qualitygate: failed to decode search response"
                );
                return Ok(ReadOutcome::Undecodable);
            }
        };

        match search.find(&id.project_key) {
            Some(record) => {
                state.gateid = id.gate_id.clone();
                state.projectkey = record.key.clone();
                Ok(ReadOutcome::Found)
            }
            None if search.is_partial() => {
                warn!(
                    gate_id = %id.gate_id,
                    project_key = %id.project_key,
                    listed = search.results.len(),
                    "qualitygate: project not on the returned search page; keeping state"
                );
                Ok(ReadOutcome::Incomplete)
            }
            None => {
                warn!(
                    gate_id = %id.gate_id,
                    project_key = %id.project_key,
                    "qualitygate: association no longer present on server"
                );
                state.id = None;
                Ok(ReadOutcome::Missing)
            }
        }
    }

    async fn delete(
        &self,
        config: &ProviderConfiguration,
        state: &AssociationState,
    ) -> Result<(), ClientError> {
        let url = state.association_url(config, DESELECT_PATH);
        http_request(config, Method::POST, url, StatusCode::NO_CONTENT, DELETE_CALLER).await?;

        info!(
            gate_id = %state.gateid,
            project_key = %state.projectkey,
            "qualitygate: dissociated project"
        );
        Ok(())
    }

    async fn import(
        &self,
        config: &ProviderConfiguration,
        id: &str,
    ) -> Result<Option<AssociationState>, ClientError> {
        let id: AssociationId = id.parse()?;
        let mut state = AssociationState::from_id(id.clone());
        match self.read(config, &mut state).await? {
            ReadOutcome::Found => Ok(Some(state)),
            ReadOutcome::Missing => Ok(None),
            outcome @ (ReadOutcome::Undecodable | ReadOutcome::Incomplete) => {
                Err(ClientError::Unverified {
                    id: id.to_string(),
                    outcome,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/association_tests.rs"]
mod tests;
