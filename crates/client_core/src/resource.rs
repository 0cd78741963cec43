use async_trait::async_trait;

use crate::{config::ProviderConfiguration, error::ClientError};

/// What a refresh learned about the remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The object exists and the state was refreshed from it.
    Found,
    /// The server answered but no longer lists the object. The state id was
    /// cleared so the caller drops it.
    Missing,
    /// The response body could not be decoded; the state was left untouched.
    Undecodable,
    /// The object is not on the page the server returned, but the server
    /// reports more results than that page holds. The state was left
    /// untouched.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub required: bool,
    /// Changing the value can only be applied by delete + create.
    pub force_new: bool,
}

/// Create/read/delete lifecycle of one remote resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    type State: Send + Sync;

    fn type_name(&self) -> &'static str;
    fn schema(&self) -> &'static [AttributeSchema];

    async fn create(
        &self,
        config: &ProviderConfiguration,
        state: &mut Self::State,
    ) -> Result<(), ClientError>;

    async fn read(
        &self,
        config: &ProviderConfiguration,
        state: &mut Self::State,
    ) -> Result<ReadOutcome, ClientError>;

    /// Removes the remote object. The caller discards its state on `Ok`.
    async fn delete(
        &self,
        config: &ProviderConfiguration,
        state: &Self::State,
    ) -> Result<(), ClientError>;

    /// Builds state for an existing remote object from its id, after
    /// confirming it on the server. `Ok(None)` means the server does not know
    /// the object; a response that confirms nothing is an error.
    async fn import(
        &self,
        config: &ProviderConfiguration,
        id: &str,
    ) -> Result<Option<Self::State>, ClientError>;
}
