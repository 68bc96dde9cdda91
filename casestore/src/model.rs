//! The entities stored in a case.
//!
//! Everything in here is plain data. The tree engine only ever reads these,
//! writes happen through the concrete [crate::caseservice] backends.
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Case-scoped, stable object identifier.
pub type ObjectId = i64;

/// Restricts a query to one data source. `None` means no filtering.
pub type DataSourceFilter = Option<ObjectId>;

/// The closed set of storage content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Image,
    VolumeSystem,
    Volume,
    Pool,
    FileSystem,
    Directory,
    File,
    LayoutFile,
    DerivedFile,
    LocalFile,
    VirtualDirectory,
    LocalDirectory,
    SlackFile,
    LocalFilesDataSource,
    Unsupported,
}

impl ContentKind {
    pub const ALL: [ContentKind; 15] = [
        ContentKind::Image,
        ContentKind::VolumeSystem,
        ContentKind::Volume,
        ContentKind::Pool,
        ContentKind::FileSystem,
        ContentKind::Directory,
        ContentKind::File,
        ContentKind::LayoutFile,
        ContentKind::DerivedFile,
        ContentKind::LocalFile,
        ContentKind::VirtualDirectory,
        ContentKind::LocalDirectory,
        ContentKind::SlackFile,
        ContentKind::LocalFilesDataSource,
        ContentKind::Unsupported,
    ];

    /// Kinds that can be the top of a data source.
    pub fn is_data_source(&self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::LocalFilesDataSource)
    }

    pub fn is_directory(&self) -> bool {
        matches!(
            self,
            ContentKind::Directory | ContentKind::VirtualDirectory | ContentKind::LocalDirectory
        )
    }

    /// Kinds backed by a file-like record (these carry size, known status
    /// and the deleted flag).
    pub fn is_file_like(&self) -> bool {
        matches!(
            self,
            ContentKind::Directory
                | ContentKind::File
                | ContentKind::LayoutFile
                | ContentKind::DerivedFile
                | ContentKind::LocalFile
                | ContentKind::VirtualDirectory
                | ContentKind::LocalDirectory
                | ContentKind::SlackFile
        )
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentKind::Image => "image",
            ContentKind::VolumeSystem => "volume_system",
            ContentKind::Volume => "volume",
            ContentKind::Pool => "pool",
            ContentKind::FileSystem => "file_system",
            ContentKind::Directory => "directory",
            ContentKind::File => "file",
            ContentKind::LayoutFile => "layout_file",
            ContentKind::DerivedFile => "derived_file",
            ContentKind::LocalFile => "local_file",
            ContentKind::VirtualDirectory => "virtual_directory",
            ContentKind::LocalDirectory => "local_directory",
            ContentKind::SlackFile => "slack_file",
            ContentKind::LocalFilesDataSource => "local_files_data_source",
            ContentKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Hash-set lookup result of a file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownStatus {
    #[default]
    Unknown,
    Known,
    Notable,
}

/// A structural content object: image, volume, file system, file...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Content {
    pub id: ObjectId,
    pub name: String,
    pub kind: ContentKind,
    #[serde(default)]
    pub parent: Option<ObjectId>,
    pub data_source: ObjectId,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub known: KnownStatus,
    /// Set on the root directory of a file system.
    #[serde(default)]
    pub root: bool,
    /// Set when the metadata of the file is unallocated.
    #[serde(default)]
    pub deleted: bool,
}

impl Content {
    pub fn new(
        id: ObjectId,
        name: impl Into<String>,
        kind: ContentKind,
        parent: Option<ObjectId>,
        data_source: ObjectId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parent,
            data_source,
            size: 0,
            known: KnownStatus::Unknown,
            root: false,
            deleted: false,
        }
    }

    /// The "." and ".." entries of a directory. These have no children in
    /// storage.
    pub fn is_dot_dir(&self) -> bool {
        self.kind == ContentKind::Directory && (self.name == "." || self.name == "..")
    }

    /// The lower-cased extension of the name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    DataArtifact,
    AnalysisResult,
}

/// The type of an artifact. Identity is the numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactType {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub category: ArtifactCategory,
}

impl ArtifactType {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        display_name: impl Into<String>,
        category: ArtifactCategory,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: display_name.into(),
            category,
        }
    }
}

/// Ids of the builtin artifact types.
pub mod artifact_type_ids {
    pub const GEN_INFO: i32 = 1;
    pub const WEB_BOOKMARK: i32 = 2;
    pub const WEB_COOKIE: i32 = 3;
    pub const WEB_HISTORY: i32 = 4;
    pub const WEB_DOWNLOAD: i32 = 5;
    pub const INSTALLED_PROG: i32 = 8;
    pub const KEYWORD_HIT: i32 = 9;
    pub const HASHSET_HIT: i32 = 10;
    pub const INTERESTING_FILE_HIT: i32 = 12;
    pub const EMAIL_MSG: i32 = 13;
    pub const ACCOUNT: i32 = 39;
    pub const INTERESTING_ARTIFACT_HIT: i32 = 40;
    pub const ASSOCIATED_OBJECT: i32 = 59;
    pub const WEB_CACHE: i32 = 62;
    pub const DOWNLOAD_SOURCE: i32 = 64;
    pub const DATA_SOURCE_USAGE: i32 = 65;
    pub const TL_EVENT: i32 = 69;
}

lazy_static! {
    /// The builtin artifact types, as every case knows them.
    pub static ref STANDARD_ARTIFACT_TYPES: Vec<ArtifactType> = {
        use artifact_type_ids::*;
        use ArtifactCategory::*;
        vec![
            ArtifactType::new(GEN_INFO, "TSK_GEN_INFO", "General Info", DataArtifact),
            ArtifactType::new(WEB_BOOKMARK, "TSK_WEB_BOOKMARK", "Web Bookmarks", DataArtifact),
            ArtifactType::new(WEB_COOKIE, "TSK_WEB_COOKIE", "Web Cookies", DataArtifact),
            ArtifactType::new(WEB_HISTORY, "TSK_WEB_HISTORY", "Web History", DataArtifact),
            ArtifactType::new(WEB_DOWNLOAD, "TSK_WEB_DOWNLOAD", "Web Downloads", DataArtifact),
            ArtifactType::new(INSTALLED_PROG, "TSK_INSTALLED_PROG", "Installed Programs", DataArtifact),
            ArtifactType::new(KEYWORD_HIT, "TSK_KEYWORD_HIT", "Keyword Hits", AnalysisResult),
            ArtifactType::new(HASHSET_HIT, "TSK_HASHSET_HIT", "Hashset Hits", AnalysisResult),
            ArtifactType::new(INTERESTING_FILE_HIT, "TSK_INTERESTING_FILE_HIT", "Interesting Files", AnalysisResult),
            ArtifactType::new(EMAIL_MSG, "TSK_EMAIL_MSG", "E-Mail Messages", DataArtifact),
            ArtifactType::new(ACCOUNT, "TSK_ACCOUNT", "Accounts", DataArtifact),
            ArtifactType::new(INTERESTING_ARTIFACT_HIT, "TSK_INTERESTING_ARTIFACT_HIT", "Interesting Results", AnalysisResult),
            ArtifactType::new(ASSOCIATED_OBJECT, "TSK_ASSOCIATED_OBJECT", "Associated Object", DataArtifact),
            ArtifactType::new(WEB_CACHE, "TSK_WEB_CACHE", "Web Cache", DataArtifact),
            ArtifactType::new(DOWNLOAD_SOURCE, "TSK_DOWNLOAD_SOURCE", "Download Source", DataArtifact),
            ArtifactType::new(DATA_SOURCE_USAGE, "TSK_DATA_SOURCE_USAGE", "Data Source Usage", DataArtifact),
            ArtifactType::new(TL_EVENT, "TSK_TL_EVENT", "Timeline Event", DataArtifact),
        ]
    };
}

/// Looks up a builtin artifact type by id.
pub fn standard_artifact_type(id: i32) -> Option<&'static ArtifactType> {
    STANDARD_ARTIFACT_TYPES.iter().find(|t| t.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A typed record asserted against a content object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ObjectId,
    pub artifact_type: ArtifactType,
    /// The content this artifact was derived from.
    pub source: ObjectId,
    pub data_source: ObjectId,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    pub id: ObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub person: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagName {
    pub id: ObjectId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentTag {
    pub id: ObjectId,
    pub tag_name: TagName,
    pub content: ObjectId,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactTag {
    pub id: ObjectId,
    pub tag_name: TagName,
    pub artifact: ObjectId,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Report {
    pub id: ObjectId,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OsAccount {
    pub id: ObjectId,
    pub login_name: String,
    pub data_source: ObjectId,
}

/// Any object that can appear in a case and be asked for its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Content(Content),
    Artifact(Artifact),
}

impl Entity {
    pub fn id(&self) -> ObjectId {
        match self {
            Entity::Content(c) => c.id,
            Entity::Artifact(a) => a.id,
        }
    }
}

impl From<Content> for Entity {
    fn from(value: Content) -> Self {
        Entity::Content(value)
    }
}

impl From<Artifact> for Entity {
    fn from(value: Artifact) -> Self {
        Entity::Artifact(value)
    }
}

/// Which files a [crate::caseservice::CaseService::find_files] call selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileQuery {
    /// Files whose lower-cased extension is one of these.
    Extensions(Vec<String>),
    /// Files with unallocated metadata.
    Deleted,
}

/// Files a [crate::caseservice::CaseService::find_files] call leaves out.
/// Exclusions apply before the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileExclusions {
    /// Files found in a known-good hash set.
    pub known: bool,
    pub slack: bool,
}

impl FileExclusions {
    pub fn excludes(&self, c: &Content) -> bool {
        (self.known && c.known == KnownStatus::Known)
            || (self.slack && c.kind == ContentKind::SlackFile)
    }
}
