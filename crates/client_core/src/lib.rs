//! Client for managing SonarQube quality gate / project associations.
//!
//! Every operation takes a [`ProviderConfiguration`] by reference and a
//! caller-owned state record, performs exactly one HTTP call and folds the
//! result back into the state.

pub mod association;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;

pub use association::{AssociationState, QualityGateProjectAssociation};
pub use config::{load_settings, Credentials, ProviderConfiguration, Settings};
pub use error::ClientError;
pub use resource::{AttributeSchema, ReadOutcome, Resource};
