use async_trait::async_trait;

use crate::model::{
    Artifact, ArtifactCategory, ArtifactTag, ArtifactType, Content, ContentTag, DataSourceFilter,
    FileExclusions, FileQuery, Host, ObjectId, OsAccount, Person, Report, TagName,
};
use crate::Error;

mod from_addr;
mod memory;
mod snapshot;
#[cfg(test)]
pub mod tests;

pub use self::from_addr::from_addr;
pub use self::memory::MemoryCaseService;
pub use self::snapshot::CaseSnapshot;

/// Read access to the entities of one case.
///
/// Implementations must be safe for concurrent reads from many tree
/// branches. Nothing in here mutates the case.
#[async_trait]
pub trait CaseService: Send + Sync {
    /// Looks up a single content object. Ok(None) if it doesn't exist.
    async fn get_content(&self, id: ObjectId) -> Result<Option<Content>, Error>;

    /// Returns the direct storage children of a content object, in storage
    /// order. An unknown parent is an [Error::InvalidRequest].
    async fn get_children(&self, parent: ObjectId) -> Result<Vec<Content>, Error>;

    /// The slash-separated path of a content object from its data source
    /// down, e.g. `/image.E01/vol2/Users/file.txt`.
    async fn get_unique_path(&self, id: ObjectId) -> Result<String, Error>;

    /// All data sources, in the order they were added.
    async fn get_data_sources(&self) -> Result<Vec<Content>, Error>;

    async fn get_hosts(&self) -> Result<Vec<Host>, Error>;

    async fn get_persons(&self) -> Result<Vec<Person>, Error>;

    /// Hosts associated with the given person. `None` returns the hosts
    /// not associated with any person.
    async fn get_hosts_for_person(&self, person: Option<ObjectId>) -> Result<Vec<Host>, Error>;

    async fn get_data_sources_for_host(&self, host: ObjectId) -> Result<Vec<Content>, Error>;

    /// Artifact types that have at least one artifact (restricted to the
    /// data source, if given).
    async fn get_artifact_types_in_use(
        &self,
        category: ArtifactCategory,
        filter: DataSourceFilter,
    ) -> Result<Vec<ArtifactType>, Error>;

    /// Up to `limit` artifacts of a type, in id order.
    async fn get_artifacts_of_type(
        &self,
        type_id: i32,
        filter: DataSourceFilter,
        limit: usize,
    ) -> Result<Vec<Artifact>, Error>;

    async fn get_count_of_type(&self, type_id: i32, filter: DataSourceFilter)
        -> Result<u64, Error>;

    /// Artifacts whose source is the given content object.
    async fn get_artifacts_for_content(&self, content: ObjectId) -> Result<Vec<Artifact>, Error>;

    async fn get_tag_names_in_use(&self) -> Result<Vec<TagName>, Error>;

    async fn get_content_tags(&self, tag_name: ObjectId) -> Result<Vec<ContentTag>, Error>;

    async fn get_artifact_tags(&self, tag_name: ObjectId) -> Result<Vec<ArtifactTag>, Error>;

    /// Tags applied to a single content object.
    async fn get_content_tags_for(&self, content: ObjectId) -> Result<Vec<ContentTag>, Error>;

    /// Up to `limit` files matching the query and not excluded, in id
    /// order.
    async fn find_files(
        &self,
        query: &FileQuery,
        filter: DataSourceFilter,
        exclude: FileExclusions,
        limit: usize,
    ) -> Result<Vec<Content>, Error>;

    async fn get_reports(&self) -> Result<Vec<Report>, Error>;

    async fn get_os_accounts(&self, filter: DataSourceFilter) -> Result<Vec<OsAccount>, Error>;
}
