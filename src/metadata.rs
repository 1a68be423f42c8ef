//! Service identity read from the project properties file.
//!
//! ```json
//! {"title": "orders", "version": "1.0", "domain": "tech",
//!  "boundedContext": "sales", "serviceId": "orders.api"}
//! ```
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{KeyPathError, Result};

pub const PROJECT_PROPERTIES_PATH_ENV: &str = "PROJECT_PROPERTIES_PATH";
pub const TASK_ID_ENV: &str = "MESOS_TASK_ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub title: String,
    pub version: String,
    pub domain: String,
    pub bounded_context: String,
    pub service_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_repository: Option<String>,
}

/// Public projection served as service info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub title: String,
    pub version: String,
    pub domain: String,
}

impl ServiceMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        crate::path_de::from_slice_with_path(bytes)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|error| {
            KeyPathError::Metadata(format!(
                "could not read project properties file {}: {error}",
                path.display()
            ))
        })?;
        let metadata = Self::from_slice(&bytes)?;
        info!(path = %path.display(), service_id = %metadata.service_id, "loaded service metadata");
        Ok(metadata)
    }

    /// Load from the file named by `PROJECT_PROPERTIES_PATH`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(PROJECT_PROPERTIES_PATH_ENV)
            .map(PathBuf::from)
            .ok_or_else(|| KeyPathError::Metadata(format!("{PROJECT_PROPERTIES_PATH_ENV} must be set")))?;
        Self::from_path(path)
    }

    /// Scheduler task id when running under one, otherwise a fresh UUID.
    pub fn task_id(&self) -> String {
        match std::env::var(TASK_ID_ENV) {
            Ok(id) if !id.is_empty() => id,
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                debug!(%id, "{TASK_ID_ENV} unset, generated task id");
                id
            }
        }
    }

    pub fn info(&self) -> InfoResponse {
        InfoResponse::from(self)
    }
}

impl From<&ServiceMetadata> for InfoResponse {
    fn from(metadata: &ServiceMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            version: metadata.version.clone(),
            domain: metadata.domain.clone(),
        }
    }
}
