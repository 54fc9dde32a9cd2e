// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

pub mod rules;

pub use rules::{OperationType, Rule, RuleWithOperations, ScopeType};
