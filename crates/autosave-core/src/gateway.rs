//! Collaborator contracts consumed by the engine.
//!
//! Implementations own transport, authentication and timeout policy; the engine
//! only awaits them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::descriptor::OptionKind;
use crate::error::GatewayError;
use crate::payload::SubmissionPayload;
use crate::value::RawValue;

/// One entry of a master-data option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    /// Display label.
    pub label: String,
    /// Submitted value.
    pub value: String,
    /// Parent id used by autofill (for example a city's province).
    #[serde(default)]
    pub parent: Option<String>,
}

impl OptionEntry {
    /// Entry without a parent.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            parent: None,
        }
    }

    /// Attach a parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Server-sourced initial values for a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline(HashMap<String, RawValue>);

impl Baseline {
    /// Empty baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Value for `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.0.get(field)
    }
}

/// Sends single-field partial updates.
#[async_trait]
pub trait FieldSubmitter: Send + Sync {
    /// Persist one field; retries after supersession must not double-apply.
    async fn submit_single_field(&self, payload: SubmissionPayload) -> Result<(), GatewayError>;
}

/// Supplies the initial values for a form.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// Load the baseline for the form identified by `form`.
    async fn load_baseline(&self, form: &'static str) -> Result<Baseline, GatewayError>;
}

/// Supplies master-data option lists.
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch the full, ordered list for `kind`.
    async fn fetch_option_list(&self, kind: OptionKind) -> Result<Vec<OptionEntry>, GatewayError>;
}

/// Bundle of collaborators handed to a session.
#[derive(Clone)]
pub struct Gateways {
    /// Submission collaborator.
    pub submitter: Arc<dyn FieldSubmitter>,
    /// Baseline collaborator.
    pub baseline: Arc<dyn BaselineSource>,
    /// Option-list collaborator.
    pub options: Arc<dyn OptionSource>,
}

impl Gateways {
    /// Use one object for every collaborator role.
    #[must_use]
    pub fn shared<G>(gateway: Arc<G>) -> Self
    where
        G: FieldSubmitter + BaselineSource + OptionSource + 'static,
    {
        Self {
            submitter: gateway.clone(),
            baseline: gateway.clone(),
            options: gateway,
        }
    }
}
