use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::{
    Artifact, ArtifactTag, Content, ContentTag, Host, ObjectId, OsAccount, Person, Report, TagName,
};
use crate::Error;

/// The complete contents of a case, as stored in a snapshot file.
///
/// This is what the `json://` backend reads, and what
/// [super::MemoryCaseService] keeps in memory.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseSnapshot {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    /// Data source id to host id.
    #[serde(default)]
    pub data_source_hosts: BTreeMap<ObjectId, ObjectId>,
    #[serde(default)]
    pub tag_names: Vec<TagName>,
    #[serde(default)]
    pub content_tags: Vec<ContentTag>,
    #[serde(default)]
    pub artifact_tags: Vec<ArtifactTag>,
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub os_accounts: Vec<OsAccount>,
}

impl CaseSnapshot {
    #[instrument(skip_all, fields(snapshot.path = %path.as_ref().display()), err)]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = tokio::fs::read(path.as_ref()).await?;
        let snapshot: CaseSnapshot = serde_json::from_slice(&data)?;
        debug!(
            content = snapshot.content.len(),
            artifacts = snapshot.artifacts.len(),
            "loaded case snapshot"
        );
        Ok(snapshot)
    }

    #[instrument(skip_all, fields(snapshot.path = %path.as_ref().display()), err)]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let data = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path.as_ref(), data).await?;
        Ok(())
    }
}
