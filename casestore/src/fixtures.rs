//! Cases used in tests, here and in the tree engine.
use std::collections::BTreeMap;

use async_trait::async_trait;
use lazy_static::lazy_static;

use crate::caseservice::{CaseService, CaseSnapshot, MemoryCaseService};
use crate::model::{
    artifact_type_ids, standard_artifact_type, Artifact, ArtifactCategory, ArtifactTag,
    ArtifactType, Content, ContentKind, ContentTag, DataSourceFilter, FileExclusions, FileQuery,
    Host, KnownStatus, ObjectId, OsAccount, Person, Report, TagName,
};
use crate::Error;

/// Image(1) → VolumeSystem(2) → Volume(3) → FileSystem(4) → root dir(5)
/// → {File "A"(6), File "B"(7), Directory "."(8)}
pub const IMAGE_ID: ObjectId = 1;
pub const VOLUME_SYSTEM_ID: ObjectId = 2;
pub const VOLUME_ID: ObjectId = 3;
pub const FILE_SYSTEM_ID: ObjectId = 4;
pub const ROOT_DIR_ID: ObjectId = 5;
pub const FILE_A_ID: ObjectId = 6;
pub const FILE_B_ID: ObjectId = 7;
pub const DOT_DIR_ID: ObjectId = 8;

/// A logical file set with two files and a carved-files folder.
pub const LOCAL_FILES_ID: ObjectId = 20;
/// A disk image with two volumes, the first one holding a file system.
pub const MULTI_VOLUME_IMAGE_ID: ObjectId = 30;
pub const USERS_DIR_ID: ObjectId = 36;
pub const DELETED_DOC_ID: ObjectId = 37;
pub const KNOWN_EXE_ID: ObjectId = 38;
pub const SLACK_ID: ObjectId = 39;

pub const PERSON_BOB_ID: ObjectId = 200;
pub const PERSON_UNNAMED_ID: ObjectId = 201;
pub const PERSON_ALICE_ID: ObjectId = 202;

pub const HOST_WORKSTATION_ID: ObjectId = 300;
pub const HOST_LAPTOP_ID: ObjectId = 301;
pub const HOST_SERVER_ID: ObjectId = 302;
pub const HOST_UNNAMED_ID: ObjectId = 303;

fn content(
    id: ObjectId,
    name: &str,
    kind: ContentKind,
    parent: Option<ObjectId>,
    data_source: ObjectId,
) -> Content {
    Content::new(id, name, kind, parent, data_source)
}

fn artifact(id: ObjectId, type_id: i32, source: ObjectId, data_source: ObjectId) -> Artifact {
    Artifact {
        id,
        artifact_type: standard_artifact_type(type_id)
            .expect("standard type must exist")
            .clone(),
        source,
        data_source,
        attributes: vec![],
    }
}

lazy_static! {
    pub static ref SKIP_SPLICE_CONTENT: Vec<Content> = {
        let mut root = content(ROOT_DIR_ID, "", ContentKind::Directory, Some(FILE_SYSTEM_ID), IMAGE_ID);
        root.root = true;
        vec![
            content(IMAGE_ID, "disk.E01", ContentKind::Image, None, IMAGE_ID),
            content(VOLUME_SYSTEM_ID, "", ContentKind::VolumeSystem, Some(IMAGE_ID), IMAGE_ID),
            content(VOLUME_ID, "vol1", ContentKind::Volume, Some(VOLUME_SYSTEM_ID), IMAGE_ID),
            content(FILE_SYSTEM_ID, "", ContentKind::FileSystem, Some(VOLUME_ID), IMAGE_ID),
            root,
            content(FILE_A_ID, "A", ContentKind::File, Some(ROOT_DIR_ID), IMAGE_ID),
            content(FILE_B_ID, "B", ContentKind::File, Some(ROOT_DIR_ID), IMAGE_ID),
            content(DOT_DIR_ID, ".", ContentKind::Directory, Some(ROOT_DIR_ID), IMAGE_ID),
        ]
    };

    pub static ref EXTRA_CONTENT: Vec<Content> = {
        let ds = LOCAL_FILES_ID;
        let img = MULTI_VOLUME_IMAGE_ID;

        let mut root = content(35, "", ContentKind::Directory, Some(34), img);
        root.root = true;
        let mut deleted = content(DELETED_DOC_ID, "deleted.doc", ContentKind::File, Some(USERS_DIR_ID), img);
        deleted.deleted = true;
        let mut known = content(KNOWN_EXE_ID, "known.exe", ContentKind::File, Some(USERS_DIR_ID), img);
        known.known = KnownStatus::Known;
        known.size = 4096;

        vec![
            content(ds, "logical_files", ContentKind::LocalFilesDataSource, None, ds),
            content(21, "notes.txt", ContentKind::LocalFile, Some(ds), ds),
            content(22, "photo.JPG", ContentKind::LocalFile, Some(ds), ds),
            content(23, "$CarvedFiles", ContentKind::VirtualDirectory, Some(ds), ds),
            content(24, "f0001.jpg", ContentKind::LayoutFile, Some(23), ds),
            content(img, "laptop.E01", ContentKind::Image, None, img),
            content(31, "", ContentKind::VolumeSystem, Some(img), img),
            content(32, "vol1", ContentKind::Volume, Some(31), img),
            content(33, "vol2", ContentKind::Volume, Some(31), img),
            content(34, "", ContentKind::FileSystem, Some(32), img),
            root,
            content(USERS_DIR_ID, "Users", ContentKind::Directory, Some(35), img),
            deleted,
            known,
            content(SLACK_ID, "known.exe-slack", ContentKind::SlackFile, Some(USERS_DIR_ID), img),
            content(40, "Unallocated", ContentKind::Unsupported, Some(33), img),
        ]
    };

    pub static ref TAG_NOTABLE: TagName = TagName { id: 400, display_name: "Notable Item".into() };
    pub static ref TAG_FOLLOW_UP: TagName = TagName { id: 401, display_name: "Follow Up".into() };
}

/// A case holding only the skip-splice graph.
pub fn skip_splice_snapshot() -> CaseSnapshot {
    CaseSnapshot {
        content: SKIP_SPLICE_CONTENT.clone(),
        ..Default::default()
    }
}

/// A case exercising every subtree: three data sources, artifacts of
/// both categories, persons and hosts, tags, a report and OS accounts.
pub fn populated_snapshot() -> CaseSnapshot {
    use artifact_type_ids::*;

    let mut content = SKIP_SPLICE_CONTENT.clone();
    content.extend(EXTRA_CONTENT.iter().cloned());

    CaseSnapshot {
        content,
        artifacts: vec![
            artifact(100, WEB_HISTORY, FILE_A_ID, IMAGE_ID),
            artifact(101, KEYWORD_HIT, FILE_B_ID, IMAGE_ID),
            artifact(102, INTERESTING_FILE_HIT, DELETED_DOC_ID, MULTI_VOLUME_IMAGE_ID),
            artifact(103, INTERESTING_ARTIFACT_HIT, KNOWN_EXE_ID, MULTI_VOLUME_IMAGE_ID),
            artifact(104, GEN_INFO, FILE_A_ID, IMAGE_ID),
            artifact(105, EMAIL_MSG, 21, LOCAL_FILES_ID),
            artifact(106, WEB_HISTORY, 22, LOCAL_FILES_ID),
        ],
        persons: vec![
            Person { id: PERSON_BOB_ID, name: Some("Bob".into()) },
            Person { id: PERSON_UNNAMED_ID, name: None },
            Person { id: PERSON_ALICE_ID, name: Some("alice".into()) },
        ],
        hosts: vec![
            Host { id: HOST_WORKSTATION_ID, name: Some("workstation".into()), person: Some(PERSON_BOB_ID) },
            Host { id: HOST_LAPTOP_ID, name: Some("laptop".into()), person: Some(PERSON_ALICE_ID) },
            Host { id: HOST_SERVER_ID, name: Some("Server".into()), person: None },
            Host { id: HOST_UNNAMED_ID, name: None, person: None },
        ],
        data_source_hosts: BTreeMap::from([
            (IMAGE_ID, HOST_WORKSTATION_ID),
            (LOCAL_FILES_ID, HOST_SERVER_ID),
            (MULTI_VOLUME_IMAGE_ID, HOST_LAPTOP_ID),
        ]),
        tag_names: vec![TAG_NOTABLE.clone(), TAG_FOLLOW_UP.clone()],
        content_tags: vec![ContentTag {
            id: 500,
            tag_name: TAG_NOTABLE.clone(),
            content: FILE_A_ID,
            comment: Some("check this".into()),
        }],
        artifact_tags: vec![ArtifactTag {
            id: 501,
            tag_name: TAG_FOLLOW_UP.clone(),
            artifact: 101,
            comment: None,
        }],
        reports: vec![Report {
            id: 600,
            name: "HTML Report".into(),
            path: "/cases/demo/Reports/report.html".into(),
        }],
        os_accounts: vec![
            OsAccount { id: 700, login_name: "alice".into(), data_source: MULTI_VOLUME_IMAGE_ID },
            OsAccount { id: 701, login_name: "Administrator".into(), data_source: IMAGE_ID },
        ],
    }
}

pub fn populated_service() -> MemoryCaseService {
    MemoryCaseService::from_snapshot(populated_snapshot())
}

/// A case with `count` artifacts of one custom type, all on file A.
pub fn many_artifacts_service(artifact_type: &ArtifactType, count: usize) -> MemoryCaseService {
    let svc = MemoryCaseService::from_snapshot(skip_splice_snapshot());
    for i in 0..count {
        svc.add_artifact(Artifact {
            id: 10_000 + i as ObjectId,
            artifact_type: artifact_type.clone(),
            source: FILE_A_ID,
            data_source: IMAGE_ID,
            attributes: vec![],
        });
    }
    svc
}

/// A [CaseService] whose storage is gone: every call fails.
#[derive(Clone, Default)]
pub struct FailingCaseService;

fn unavailable<T>() -> Result<T, Error> {
    Err(Error::StorageError("case database unavailable".into()))
}

#[async_trait]
impl CaseService for FailingCaseService {
    async fn get_content(&self, _id: ObjectId) -> Result<Option<Content>, Error> {
        unavailable()
    }
    async fn get_children(&self, _parent: ObjectId) -> Result<Vec<Content>, Error> {
        unavailable()
    }
    async fn get_unique_path(&self, _id: ObjectId) -> Result<String, Error> {
        unavailable()
    }
    async fn get_data_sources(&self) -> Result<Vec<Content>, Error> {
        unavailable()
    }
    async fn get_hosts(&self) -> Result<Vec<Host>, Error> {
        unavailable()
    }
    async fn get_persons(&self) -> Result<Vec<Person>, Error> {
        unavailable()
    }
    async fn get_hosts_for_person(&self, _person: Option<ObjectId>) -> Result<Vec<Host>, Error> {
        unavailable()
    }
    async fn get_data_sources_for_host(&self, _host: ObjectId) -> Result<Vec<Content>, Error> {
        unavailable()
    }
    async fn get_artifact_types_in_use(
        &self,
        _category: ArtifactCategory,
        _filter: DataSourceFilter,
    ) -> Result<Vec<ArtifactType>, Error> {
        unavailable()
    }
    async fn get_artifacts_of_type(
        &self,
        _type_id: i32,
        _filter: DataSourceFilter,
        _limit: usize,
    ) -> Result<Vec<Artifact>, Error> {
        unavailable()
    }
    async fn get_count_of_type(
        &self,
        _type_id: i32,
        _filter: DataSourceFilter,
    ) -> Result<u64, Error> {
        unavailable()
    }
    async fn get_artifacts_for_content(&self, _content: ObjectId) -> Result<Vec<Artifact>, Error> {
        unavailable()
    }
    async fn get_tag_names_in_use(&self) -> Result<Vec<TagName>, Error> {
        unavailable()
    }
    async fn get_content_tags(&self, _tag_name: ObjectId) -> Result<Vec<ContentTag>, Error> {
        unavailable()
    }
    async fn get_artifact_tags(&self, _tag_name: ObjectId) -> Result<Vec<ArtifactTag>, Error> {
        unavailable()
    }
    async fn get_content_tags_for(&self, _content: ObjectId) -> Result<Vec<ContentTag>, Error> {
        unavailable()
    }
    async fn find_files(
        &self,
        _query: &FileQuery,
        _filter: DataSourceFilter,
        _exclude: FileExclusions,
        _limit: usize,
    ) -> Result<Vec<Content>, Error> {
        unavailable()
    }
    async fn get_reports(&self) -> Result<Vec<Report>, Error> {
        unavailable()
    }
    async fn get_os_accounts(&self, _filter: DataSourceFilter) -> Result<Vec<OsAccount>, Error> {
        unavailable()
    }
}
