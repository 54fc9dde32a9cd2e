// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use color_eyre::eyre::{self, Context};
use k8s_openapi::api::admissionregistration::v1 as admissionregistration;
use rhmi_webhooks::RuleWithOperations;

const API_GROUP: &str = "integreatly.org";
const API_VERSION: &str = "v1alpha1";

/// The rules the operator registers its validating webhooks with.
pub(crate) fn operator_rules() -> Vec<RuleWithOperations> {
    vec![RuleWithOperations::new()
        .one_resource(API_GROUP, API_VERSION, "rhmis")
        .namespaced_scope()
        .for_create()
        .for_update()
        .for_delete()]
}

pub(crate) fn print_rules() -> eyre::Result<()> {
    let rules: Vec<admissionregistration::RuleWithOperations> =
        operator_rules().into_iter().map(Into::into).collect();
    let output = serde_json::to_string_pretty(&rules).context("unable to serialize the rules")?;
    println!("{output}");
    Ok(())
}
