// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

//! Observed controller state, as handed from the reconciliation layer to the metrics publisher.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A snapshot of everything the controller knows about the installation at the end of a
/// reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationState {
    pub installation: Installation,
    /// The outcome of the user actions attempted during the pass. The previous batch is
    /// discarded when a new state is published.
    #[serde(default)]
    pub user_actions: Vec<UserAction>,
}

impl InstallationState {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub name: String,
    pub namespace: String,
    /// The time the installation was first created. Published as the value of the version series.
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub spec: InstallationSpec,
    #[serde(default)]
    pub status: InstallationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallationSpec {
    #[serde(rename = "type")]
    pub installation_type: String,
    /// Kept as a string since the controller accepts arbitrary values here.
    pub use_cluster_storage: String,
    pub master_url: String,
    pub namespace_prefix: String,
    pub routing_subdomain: String,
    pub operators_in_product_namespace: bool,
    pub self_signed_certs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallationStatus {
    /// The current stage. Empty until the controller has assigned one.
    pub stage: String,
    pub version: String,
    pub to_version: String,
    pub preflight_status: PreflightStatus,
    pub quota: String,
    pub to_quota: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightStatus {
    #[default]
    InProgress,
    Success,
    Fail,
}

impl PreflightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreflightStatus::InProgress => "in_progress",
            PreflightStatus::Success => "success",
            PreflightStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for PreflightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a CRUD action performed on behalf of a user in 3scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub username: String,
    pub action: String,
    /// The HTTP status code returned by the 3scale API.
    pub status: u16,
}
