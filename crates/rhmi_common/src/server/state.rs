// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use crate::models::InstallationState;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("unable to read the installation state file")]
    Io(#[from] std::io::Error),
    #[error("unable to parse the installation state file")]
    Parse(#[from] toml::de::Error),
}

/// Reads the installation state document written by the controller.
pub async fn read_installation_state<P: AsRef<Path>>(
    path: P,
) -> Result<InstallationState, StateError> {
    let content = tokio::fs::read_to_string(path).await?;
    let state = InstallationState::from_toml(&content)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_fail_when_file_is_missing() {
        let result = read_installation_state("/nonexistent/rhmi-state.toml").await;

        assert!(matches!(result, Err(StateError::Io(_))));
    }

    #[tokio::test]
    async fn should_read_state_file() {
        let path = std::env::temp_dir().join(format!("rhmi-state-{}.toml", std::process::id()));
        tokio::fs::write(
            &path,
            "[installation]\nname = \"rhoam\"\nnamespace = \"redhat-rhmi-operator\"\n",
        )
        .await
        .unwrap();

        let state = read_installation_state(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(state.installation.name, "rhoam");
        assert_eq!(state.installation.namespace, "redhat-rhmi-operator");
    }

    #[tokio::test]
    async fn should_fail_on_malformed_state() {
        let path =
            std::env::temp_dir().join(format!("rhmi-state-bad-{}.toml", std::process::id()));
        tokio::fs::write(&path, "installation = 5\n").await.unwrap();

        let result = read_installation_state(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(matches!(result, Err(StateError::Parse(_))));
    }
}
