//! Tree-level identities.
//!
//! A [Key] is what a listing is made of. Two listings computed at different
//! times are diffed by key, so everything in here is `Eq + Hash` and
//! carries exactly the data that makes a node distinct.
use std::fmt;

use casetree_casestore::model::{
    artifact_type_ids, ArtifactCategory, ArtifactTag, ArtifactType, Content, ContentTag,
    DataSourceFilter, Entity, Host, OsAccount, Person, Report, TagName,
};

use crate::config::GroupingMode;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Entity(Entity),
    Item(TreeItem),
}

impl From<Entity> for Key {
    fn from(value: Entity) -> Self {
        Key::Entity(value)
    }
}

impl From<Content> for Key {
    fn from(value: Content) -> Self {
        Key::Entity(Entity::Content(value))
    }
}

impl From<TreeItem> for Key {
    fn from(value: TreeItem) -> Self {
        Key::Item(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Entity(Entity::Content(c)) => write!(f, "{} {} ({})", c.kind, c.id, c.name),
            Key::Entity(Entity::Artifact(a)) => {
                write!(f, "artifact {} ({})", a.id, a.artifact_type.name)
            }
            Key::Item(item) => write!(f, "{:?}", item),
        }
    }
}

/// The extension groups shown under "File Types".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileTypeCategory {
    Images,
    Videos,
    Audio,
    Archives,
    Documents,
    Executables,
}

impl FileTypeCategory {
    pub const ALL: [FileTypeCategory; 6] = [
        FileTypeCategory::Images,
        FileTypeCategory::Videos,
        FileTypeCategory::Audio,
        FileTypeCategory::Archives,
        FileTypeCategory::Documents,
        FileTypeCategory::Executables,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FileTypeCategory::Images => "Images",
            FileTypeCategory::Videos => "Videos",
            FileTypeCategory::Audio => "Audio",
            FileTypeCategory::Archives => "Archives",
            FileTypeCategory::Documents => "Documents",
            FileTypeCategory::Executables => "Executable",
        }
    }

    /// Lower-case, without the leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileTypeCategory::Images => &[
                "jpg", "jpeg", "png", "psd", "nef", "tiff", "bmp", "tec", "tif", "webp", "gif",
            ],
            FileTypeCategory::Videos => &[
                "aaf", "3gp", "asf", "avi", "m1v", "m2v", "m4v", "mp4", "mov", "mpeg", "mpg",
                "mpe", "rm", "swf", "vob", "wmv", "mkv",
            ],
            FileTypeCategory::Audio => &[
                "aiff", "aif", "flac", "wav", "m4a", "ape", "wma", "mp2", "mp1", "mp3", "aac",
                "m4p", "ogg",
            ],
            FileTypeCategory::Archives => &[
                "zip", "rar", "7zip", "7z", "arj", "tar", "gzip", "bzip", "bzip2", "cab", "jar",
                "cpio", "ar", "gz", "tgz", "bz2",
            ],
            FileTypeCategory::Documents => &[
                "doc", "docx", "odt", "xls", "xlsx", "ppt", "pptx", "pdf", "txt", "rtf", "htm",
                "html",
            ],
            FileTypeCategory::Executables => &["exe", "dll", "bat", "cmd", "com"],
        }
    }
}

/// Synthetic structural markers: headers and groupings that are not stored
/// in the case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeItem {
    /// The invisible root, listing the top level for a grouping mode.
    Root(GroupingMode),
    DataSources,
    Views(DataSourceFilter),
    FileTypes(DataSourceFilter),
    FileTypeCategory(FileTypeCategory, DataSourceFilter),
    DeletedFiles(DataSourceFilter),
    DataArtifacts(DataSourceFilter),
    AnalysisResults(DataSourceFilter),
    /// One artifact type, listing its artifacts.
    ArtifactType {
        artifact_type: ArtifactType,
        filter: DataSourceFilter,
    },
    OsAccounts(DataSourceFilter),
    OsAccount(OsAccount),
    Tags,
    TagName(TagName),
    /// "File Tags" below a tag name.
    ContentTags(TagName),
    /// "Result Tags" below a tag name.
    ArtifactTags(TagName),
    ContentTag(ContentTag),
    ArtifactTag(ArtifactTag),
    Reports,
    Report(Report),
    /// `None` collects the hosts without a person.
    PersonGroup(Option<Person>),
    Host(Host),
    /// A data source below its host.
    DataSourceGroup(Content),
}

/// The type listed for both interesting file and interesting artifact hits.
pub fn interesting_items_type() -> ArtifactType {
    ArtifactType::new(
        artifact_type_ids::INTERESTING_FILE_HIT,
        "TSK_INTERESTING_ITEM",
        "Interesting Items",
        ArtifactCategory::AnalysisResult,
    )
}

/// The artifact type ids a type entry of the tree lists.
pub fn listed_type_ids(artifact_type: &ArtifactType) -> Vec<i32> {
    match artifact_type.id {
        artifact_type_ids::INTERESTING_FILE_HIT | artifact_type_ids::INTERESTING_ARTIFACT_HIT => {
            vec![
                artifact_type_ids::INTERESTING_FILE_HIT,
                artifact_type_ids::INTERESTING_ARTIFACT_HIT,
            ]
        }
        id => vec![id],
    }
}
