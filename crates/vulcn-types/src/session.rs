//! The `Session` data model (spec.md §3).

use std::collections::HashMap;

use crate::ids::SessionId;
use crate::step::Step;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub steps: Vec<Step>,
    pub metadata: HashMap<String, String>,
}

impl Session {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            steps,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
