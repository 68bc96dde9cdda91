use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::{debug, instrument};

use casetree_casestore::model::{ArtifactType, FileExclusions};

use crate::Error;

/// How the root of the tree is organized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Fixed headers: data sources, views, results, tags, reports.
    #[default]
    ByDataType,
    /// One group per person (or host), each holding its data sources.
    ByPersonHost,
}

impl FromStr for GroupingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_data_type" | "data-type" => Ok(GroupingMode::ByDataType),
            "by_person_host" | "person-host" => Ok(GroupingMode::ByPersonHost),
            other => Err(Error::Config(format!("unknown grouping mode: {}", other))),
        }
    }
}

/// Upper bounds on how many children an expensive listing may produce.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactCaps {
    /// Cap for artifact types without an entry in `per_type`.
    pub default: usize,
    /// Keyed by artifact type name, e.g. `TSK_KEYWORD_HIT`.
    pub per_type: BTreeMap<String, usize>,
    pub deleted_files: usize,
    /// Cap for each extension listing under "File Types".
    pub files_by_type: usize,
}

impl Default for ArtifactCaps {
    fn default() -> Self {
        Self {
            default: 2_000,
            per_type: BTreeMap::from([
                ("TSK_KEYWORD_HIT".to_string(), 15_000),
                ("TSK_WEB_CACHE".to_string(), 10_000),
            ]),
            deleted_files: 10_000,
            files_by_type: 10_000,
        }
    }
}

impl ArtifactCaps {
    pub fn for_type(&self, artifact_type: &ArtifactType) -> usize {
        self.per_type
            .get(&artifact_type.name)
            .copied()
            .unwrap_or(self.default)
    }
}

/// Which files to leave out of a subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentFilter {
    /// Hide files found in a known-good hash set.
    pub hide_known: bool,
    pub hide_slack: bool,
}

impl From<ContentFilter> for FileExclusions {
    fn from(value: ContentFilter) -> Self {
        FileExclusions {
            known: value.hide_known,
            slack: value.hide_slack,
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    pub grouping: GroupingMode,

    /// Minimum time between two event-triggered refreshes of one listing.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub refresh_interval: Duration,

    pub artifact_caps: ArtifactCaps,

    /// Applied below the data source nodes.
    pub data_sources_tree: ContentFilter,
    /// Applied to the file listings under Views.
    pub views_tree: ContentFilter,

    /// How many nodes may be annotated at the same time. 0 disables
    /// annotations.
    pub decoration_workers: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            grouping: GroupingMode::default(),
            refresh_interval: Duration::from_secs(5),
            artifact_caps: ArtifactCaps::default(),
            data_sources_tree: ContentFilter::default(),
            views_tree: ContentFilter {
                hide_known: true,
                hide_slack: true,
            },
            decoration_workers: 4,
        }
    }
}

impl TreeConfig {
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    #[instrument(skip_all, fields(config.path = %path.as_ref().display()), err)]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_toml(&data)?;
        debug!(?config, "loaded tree config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::{GroupingMode, TreeConfig};
    use casetree_casestore::model::{artifact_type_ids, standard_artifact_type};

    #[test]
    fn empty_is_default() {
        assert_eq!(TreeConfig::default(), TreeConfig::from_toml("").unwrap());
    }

    #[test]
    fn parse_full() {
        let config = TreeConfig::from_toml(
            r#"
            grouping = "by_person_host"
            refresh_interval = 2
            decoration_workers = 0

            [artifact_caps]
            default = 500
            deleted_files = 100

            [artifact_caps.per_type]
            TSK_KEYWORD_HIT = 50

            [data_sources_tree]
            hide_known = true
            "#,
        )
        .expect("must parse");

        assert_eq!(GroupingMode::ByPersonHost, config.grouping);
        assert_eq!(Duration::from_secs(2), config.refresh_interval);
        assert_eq!(0, config.decoration_workers);
        assert!(config.data_sources_tree.hide_known);
        assert!(!config.data_sources_tree.hide_slack);

        let keyword = standard_artifact_type(artifact_type_ids::KEYWORD_HIT).unwrap();
        let history = standard_artifact_type(artifact_type_ids::WEB_HISTORY).unwrap();
        assert_eq!(50, config.artifact_caps.for_type(keyword));
        assert_eq!(500, config.artifact_caps.for_type(history));
        assert_eq!(100, config.artifact_caps.deleted_files);
    }

    #[test]
    fn default_caps() {
        let caps = TreeConfig::default().artifact_caps;
        let lookup = |id| caps.for_type(standard_artifact_type(id).unwrap());

        assert_eq!(2_000, lookup(artifact_type_ids::WEB_HISTORY));
        assert_eq!(15_000, lookup(artifact_type_ids::KEYWORD_HIT));
        assert_eq!(10_000, lookup(artifact_type_ids::WEB_CACHE));
        assert_eq!(10_000, caps.deleted_files);
        assert_eq!(10_000, caps.files_by_type);
    }

    #[rstest]
    #[case::unknown_field("colour = \"blue\"")]
    #[case::unknown_grouping("grouping = \"by_moon_phase\"")]
    #[case::negative_interval("refresh_interval = -1")]
    #[case::unknown_nested_field("[views_tree]\nhide_everything = true")]
    fn parse_invalid(#[case] input: &str) {
        assert!(TreeConfig::from_toml(input).is_err());
    }

    #[rstest]
    #[case::snake("by_person_host", Some(GroupingMode::ByPersonHost))]
    #[case::short("data-type", Some(GroupingMode::ByDataType))]
    #[case::garbage("sideways", None)]
    fn grouping_from_str(#[case] input: &str, #[case] expected: Option<GroupingMode>) {
        assert_eq!(expected, input.parse().ok());
    }

    #[tokio::test]
    async fn load_from_file() {
        let tmpdir = TempDir::new().unwrap();
        let path = tmpdir.path().join("tree.toml");
        tokio::fs::write(&path, "refresh_interval = 9\n").await.unwrap();

        let config = TreeConfig::load(&path).await.unwrap();
        assert_eq!(Duration::from_secs(9), config.refresh_interval);

        assert!(TreeConfig::load(tmpdir.path().join("missing.toml"))
            .await
            .is_err());
    }
}
