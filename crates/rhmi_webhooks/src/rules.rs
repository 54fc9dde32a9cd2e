// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

//! Admission webhook rules, built as plain values.
//!
//! ```
//! use rhmi_webhooks::RuleWithOperations;
//!
//! let rule = RuleWithOperations::new()
//!     .one_resource("integreatly.org", "v1alpha1", "rhmis")
//!     .namespaced_scope()
//!     .for_create()
//!     .for_update();
//! assert_eq!(rule.operations.len(), 2);
//! ```
use k8s_openapi::api::admissionregistration::v1 as admissionregistration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    #[serde(rename = "CREATE")]
    Create,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "*")]
    All,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "CREATE",
            OperationType::Update => "UPDATE",
            OperationType::Delete => "DELETE",
            OperationType::All => "*",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeType {
    Cluster,
    Namespaced,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Cluster => "Cluster",
            ScopeType::Namespaced => "Namespaced",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub api_groups: Vec<String>,
    pub api_versions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeType>,
}

/// A [`Rule`] together with the operations it matches.
///
/// Every builder method takes the rule by value and returns the updated rule, so a partially
/// built rule can be cloned and extended without affecting the original.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWithOperations {
    pub operations: Vec<OperationType>,
    #[serde(flatten)]
    pub rule: Rule,
}

impl RuleWithOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches exactly one resource of one API group and version.
    pub fn one_resource(mut self, api_group: &str, api_version: &str, resource: &str) -> Self {
        self.rule.api_groups = vec![api_group.to_string()];
        self.rule.api_versions = vec![api_version.to_string()];
        self.rule.resources = vec![resource.to_string()];
        self
    }

    pub fn namespaced_scope(mut self) -> Self {
        self.rule.scope = Some(ScopeType::Namespaced);
        self
    }

    pub fn cluster_scope(mut self) -> Self {
        self.rule.scope = Some(ScopeType::Cluster);
        self
    }

    pub fn for_create(self) -> Self {
        self.with_operation(OperationType::Create)
    }

    pub fn for_update(self) -> Self {
        self.with_operation(OperationType::Update)
    }

    pub fn for_delete(self) -> Self {
        self.with_operation(OperationType::Delete)
    }

    pub fn for_all(self) -> Self {
        self.with_operation(OperationType::All)
    }

    fn with_operation(mut self, operation: OperationType) -> Self {
        self.operations.push(operation);
        self
    }
}

impl From<RuleWithOperations> for admissionregistration::RuleWithOperations {
    fn from(value: RuleWithOperations) -> Self {
        let rule = value.rule;
        admissionregistration::RuleWithOperations {
            api_groups: Some(rule.api_groups),
            api_versions: Some(rule.api_versions),
            operations: Some(
                value
                    .operations
                    .iter()
                    .map(|operation| operation.as_str().to_string())
                    .collect(),
            ),
            resources: Some(rule.resources),
            scope: rule.scope.map(|scope| scope.as_str().to_string()),
        }
    }
}
