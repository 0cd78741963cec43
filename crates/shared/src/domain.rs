use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the gate id and the project key in an [`AssociationId`].
pub const ID_SEPARATOR: char = '/';

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(GateId);
key_newtype!(ProjectKey);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationIdError {
    #[error("association id '{0}' must have the form <gateId>/<projectKey>")]
    Malformed(String),
    #[error("association id '{0}' has an empty gate id or project key")]
    EmptyPart(String),
}

/// Identifier of a quality gate / project binding, serialized as
/// `<gateId>/<projectKey>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociationId {
    pub gate_id: GateId,
    pub project_key: ProjectKey,
}

impl AssociationId {
    pub fn new(gate_id: GateId, project_key: ProjectKey) -> Self {
        Self {
            gate_id,
            project_key,
        }
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ID_SEPARATOR}{}", self.gate_id, self.project_key)
    }
}

impl FromStr for AssociationId {
    type Err = AssociationIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(ID_SEPARATOR);
        let (Some(gate_id), Some(project_key), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AssociationIdError::Malformed(raw.to_string()));
        };
        if gate_id.is_empty() || project_key.is_empty() {
            return Err(AssociationIdError::EmptyPart(raw.to_string()));
        }
        Ok(Self::new(gate_id.into(), project_key.into()))
    }
}

impl Serialize for AssociationId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssociationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
