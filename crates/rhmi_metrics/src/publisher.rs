// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::error::MetricsError;
use crate::keyed::KeyedGauge;
use crate::latched::{LatchedGauge, Mirrored};
use crate::registry::MetricsRegistry;
use rhmi_common::models::{Installation, PreflightStatus, UserAction};

/// Handles to every family describing an installation.
///
/// The RHMI and RHOAM families carry the same state for the two product names and are updated
/// together.
#[derive(Clone, Debug)]
pub struct InstallationMetrics {
    pub operator_version: LatchedGauge,
    pub status_available: LatchedGauge,
    pub info: LatchedGauge,
    pub status: Mirrored,
    pub versions: Mirrored,
    pub preflight_status: Mirrored,
    pub threescale_user_action: KeyedGauge,
    pub quota: LatchedGauge,
}

impl InstallationMetrics {
    pub fn register(registry: &mut MetricsRegistry) -> Result<Self, MetricsError> {
        let operator_version: LatchedGauge = registry.register(
            "integreatly_version_info",
            "Integreatly operator information",
            &["operator_version", "version"],
        )?;
        let status_available: LatchedGauge =
            registry.register("rhmi_status_available", "RHMI status available", &[])?;
        let info: LatchedGauge = registry.register(
            "rhmi_spec",
            "RHMI info variables",
            &[
                "use_cluster_storage",
                "master_url",
                "installation_type",
                "operator_name",
                "namespace",
                "namespace_prefix",
                "operators_in_product_namespace",
                "routing_subdomain",
                "self_signed_certs",
            ],
        )?;

        let mut status: Vec<LatchedGauge> = Vec::new();
        let mut versions: Vec<LatchedGauge> = Vec::new();
        let mut preflight_status: Vec<LatchedGauge> = Vec::new();
        for product in ["rhmi", "rhoam"] {
            let label = product.to_uppercase();
            status.push(
                registry
                    .register::<LatchedGauge>(
                        &format!("{product}_status"),
                        &format!("{label} status of an installation"),
                        &["stage"],
                    )?
                    .requiring("stage")?,
            );
            versions.push(registry.register(
                &format!("{product}_version"),
                &format!("{label} versions"),
                &["stage", "version", "to_version"],
            )?);
            preflight_status.push(registry.register(
                &format!("{product}_preflight_status"),
                &format!("Preflight status of an {label} installation"),
                &["status"],
            )?);
        }

        let threescale_user_action: KeyedGauge = registry.register(
            "threescale_user_action",
            "Status of user CRUD action in 3scale",
            &["username", "action"],
        )?;
        let quota: LatchedGauge = registry.register(
            "rhoam_quota",
            "Status of the current quota config",
            &["stage", "quota", "to_quota"],
        )?;

        Ok(Self {
            operator_version,
            status_available,
            info,
            status: Mirrored::new(status),
            versions: Mirrored::new(versions),
            preflight_status: Mirrored::new(preflight_status),
            threescale_user_action,
            quota,
        })
    }

    pub fn set_operator_version(&self, version: &str) {
        self.operator_version.replace(&[version, version], 1);
    }

    pub fn set_status_available(&self, available: bool) {
        self.status_available.set(available as i64);
    }

    /// Exposes the installation spec as labels of a single series.
    pub fn set_info(&self, installation: &Installation) {
        let spec = &installation.spec;
        self.info.replace(
            &[
                spec.use_cluster_storage.as_str(),
                spec.master_url.as_str(),
                spec.installation_type.as_str(),
                installation.name.as_str(),
                installation.namespace.as_str(),
                spec.namespace_prefix.as_str(),
                bool_label(spec.operators_in_product_namespace),
                spec.routing_subdomain.as_str(),
                bool_label(spec.self_signed_certs),
            ],
            1,
        );
    }

    pub fn set_status(&self, installation: &Installation) {
        self.set_stage(&installation.status.stage);
    }

    /// Publishes the current stage. An empty stage removes the series.
    pub fn set_stage(&self, stage: &str) {
        self.status.replace(&[stage], 1);
    }

    /// Publishes the current version transition. The value is the epoch timestamp in seconds
    /// at which the installation was first observed.
    pub fn set_versions(
        &self,
        stage: &str,
        version: &str,
        to_version: &str,
        first_install_timestamp: i64,
    ) {
        self.versions
            .replace(&[stage, version, to_version], first_install_timestamp);
    }

    pub fn set_preflight_status(&self, status: PreflightStatus) {
        self.preflight_status
            .replace(&[status.as_str()], preflight_value(status));
    }

    pub fn set_threescale_user_action(&self, http_status: u16, username: &str, action: &str) {
        self.threescale_user_action
            .set(&[username, action], i64::from(http_status));
    }

    pub fn reset_threescale_user_action(&self) {
        self.threescale_user_action.reset_all();
    }

    /// Replaces all user action series with the given batch.
    pub fn set_threescale_user_actions(&self, actions: &[UserAction]) {
        self.threescale_user_action.replace_all::<[&str; 2], &str>(
            actions.iter().map(|action| {
                (
                    [action.username.as_str(), action.action.as_str()],
                    i64::from(action.status),
                )
            }),
        );
    }

    pub fn set_quota(&self, stage: &str, quota: &str, to_quota: &str) {
        self.quota.replace(&[stage, quota, to_quota], 1);
    }
}

// -1 -> Fail
//  0 -> In Progress
//  1 -> Success
fn preflight_value(status: PreflightStatus) -> i64 {
    match status {
        PreflightStatus::Fail => -1,
        PreflightStatus::InProgress => 0,
        PreflightStatus::Success => 1,
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
