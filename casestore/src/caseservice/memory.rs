use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{instrument, warn};

use super::{CaseService, CaseSnapshot};
use crate::model::{
    Artifact, ArtifactCategory, ArtifactTag, ArtifactType, Content, ContentTag, DataSourceFilter,
    FileExclusions, FileQuery, Host, ObjectId, OsAccount, Person, Report, TagName,
};
use crate::Error;

/// A [CaseService] keeping the whole case in memory.
///
/// Besides serving reads, this exposes the writes ingest would do, so
/// tests and the snapshot backend can populate it.
#[derive(Clone, Default)]
pub struct MemoryCaseService {
    db: Arc<RwLock<CaseData>>,
}

#[derive(Default)]
struct CaseData {
    /// Keyed by id, which is also storage order.
    content: BTreeMap<ObjectId, Content>,
    children: BTreeMap<ObjectId, BTreeSet<ObjectId>>,
    artifacts: BTreeMap<ObjectId, Artifact>,
    persons: BTreeMap<ObjectId, Person>,
    hosts: BTreeMap<ObjectId, Host>,
    data_source_hosts: BTreeMap<ObjectId, ObjectId>,
    tag_names: BTreeMap<ObjectId, TagName>,
    content_tags: BTreeMap<ObjectId, ContentTag>,
    artifact_tags: BTreeMap<ObjectId, ArtifactTag>,
    reports: BTreeMap<ObjectId, Report>,
    os_accounts: BTreeMap<ObjectId, OsAccount>,
}

fn matches_filter(data_source: ObjectId, filter: DataSourceFilter) -> bool {
    filter.map_or(true, |ds| ds == data_source)
}

impl MemoryCaseService {
    pub fn from_snapshot(snapshot: CaseSnapshot) -> Self {
        let svc = Self::default();
        {
            let mut db = svc.db.write();
            for c in snapshot.content {
                db.insert_content(c);
            }
            db.artifacts = snapshot.artifacts.into_iter().map(|a| (a.id, a)).collect();
            db.persons = snapshot.persons.into_iter().map(|p| (p.id, p)).collect();
            db.hosts = snapshot.hosts.into_iter().map(|h| (h.id, h)).collect();
            db.data_source_hosts = snapshot.data_source_hosts;
            db.tag_names = snapshot.tag_names.into_iter().map(|t| (t.id, t)).collect();
            db.content_tags = snapshot
                .content_tags
                .into_iter()
                .map(|t| (t.id, t))
                .collect();
            db.artifact_tags = snapshot
                .artifact_tags
                .into_iter()
                .map(|t| (t.id, t))
                .collect();
            db.reports = snapshot.reports.into_iter().map(|r| (r.id, r)).collect();
            db.os_accounts = snapshot.os_accounts.into_iter().map(|a| (a.id, a)).collect();
        }
        svc
    }

    pub fn snapshot(&self) -> CaseSnapshot {
        let db = self.db.read();
        CaseSnapshot {
            content: db.content.values().cloned().collect(),
            artifacts: db.artifacts.values().cloned().collect(),
            persons: db.persons.values().cloned().collect(),
            hosts: db.hosts.values().cloned().collect(),
            data_source_hosts: db.data_source_hosts.clone(),
            tag_names: db.tag_names.values().cloned().collect(),
            content_tags: db.content_tags.values().cloned().collect(),
            artifact_tags: db.artifact_tags.values().cloned().collect(),
            reports: db.reports.values().cloned().collect(),
            os_accounts: db.os_accounts.values().cloned().collect(),
        }
    }

    pub fn add_content(&self, content: Content) {
        self.db.write().insert_content(content)
    }

    pub fn add_artifact(&self, artifact: Artifact) {
        self.db.write().artifacts.insert(artifact.id, artifact);
    }

    pub fn add_person(&self, person: Person) {
        self.db.write().persons.insert(person.id, person);
    }

    /// Removes a person. Their hosts become ungrouped.
    pub fn remove_person(&self, id: ObjectId) {
        let mut db = self.db.write();
        db.persons.remove(&id);
        for host in db.hosts.values_mut() {
            if host.person == Some(id) {
                host.person = None;
            }
        }
    }

    pub fn add_host(&self, host: Host) {
        self.db.write().hosts.insert(host.id, host);
    }

    pub fn remove_host(&self, id: ObjectId) {
        let mut db = self.db.write();
        db.hosts.remove(&id);
        db.data_source_hosts.retain(|_, h| *h != id);
    }

    pub fn set_host_person(&self, host: ObjectId, person: Option<ObjectId>) -> Result<(), Error> {
        let mut db = self.db.write();
        if let Some(p) = person {
            if !db.persons.contains_key(&p) {
                return Err(Error::InvalidRequest(format!("unknown person {}", p)));
            }
        }
        let host = db
            .hosts
            .get_mut(&host)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown host {}", host)))?;
        host.person = person;
        Ok(())
    }

    pub fn set_data_source_host(&self, data_source: ObjectId, host: ObjectId) {
        self.db.write().data_source_hosts.insert(data_source, host);
    }

    pub fn add_tag_name(&self, tag_name: TagName) {
        self.db.write().tag_names.insert(tag_name.id, tag_name);
    }

    pub fn add_content_tag(&self, tag: ContentTag) {
        let mut db = self.db.write();
        db.tag_names.insert(tag.tag_name.id, tag.tag_name.clone());
        db.content_tags.insert(tag.id, tag);
    }

    pub fn remove_content_tag(&self, id: ObjectId) {
        self.db.write().content_tags.remove(&id);
    }

    pub fn add_artifact_tag(&self, tag: ArtifactTag) {
        let mut db = self.db.write();
        db.tag_names.insert(tag.tag_name.id, tag.tag_name.clone());
        db.artifact_tags.insert(tag.id, tag);
    }

    pub fn remove_artifact_tag(&self, id: ObjectId) {
        self.db.write().artifact_tags.remove(&id);
    }

    pub fn add_report(&self, report: Report) {
        self.db.write().reports.insert(report.id, report);
    }

    pub fn add_os_account(&self, account: OsAccount) {
        self.db.write().os_accounts.insert(account.id, account);
    }
}

impl CaseData {
    fn insert_content(&mut self, content: Content) {
        if let Some(parent) = content.parent {
            self.children.entry(parent).or_default().insert(content.id);
        }
        self.content.insert(content.id, content);
    }

    fn data_sources(&self) -> impl Iterator<Item = &Content> {
        self.content
            .values()
            .filter(|c| c.parent.is_none() && c.kind.is_data_source())
    }
}

#[async_trait]
impl CaseService for MemoryCaseService {
    #[instrument(skip(self))]
    async fn get_content(&self, id: ObjectId) -> Result<Option<Content>, Error> {
        Ok(self.db.read().content.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_children(&self, parent: ObjectId) -> Result<Vec<Content>, Error> {
        let db = self.db.read();
        if !db.content.contains_key(&parent) {
            return Err(Error::InvalidRequest(format!(
                "unknown content object {}",
                parent
            )));
        }

        let Some(ids) = db.children.get(&parent) else {
            return Ok(vec![]);
        };

        let mut children = Vec::with_capacity(ids.len());
        for id in ids {
            match db.content.get(id) {
                Some(c) => children.push(c.clone()),
                None => {
                    warn!(child.id = id, "dangling child reference");
                    return Err(Error::StorageError(format!(
                        "child {} of {} is missing",
                        id, parent
                    )));
                }
            }
        }
        Ok(children)
    }

    #[instrument(skip(self))]
    async fn get_unique_path(&self, id: ObjectId) -> Result<String, Error> {
        let db = self.db.read();
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let c = db
                .content
                .get(&cur)
                .ok_or_else(|| Error::InvalidRequest(format!("unknown content object {}", cur)))?;
            names.push(c.name.as_str());
            if names.len() > db.content.len() {
                return Err(Error::StorageError(format!(
                    "parent cycle while resolving path of {}",
                    id
                )));
            }
            current = c.parent;
        }

        let mut path = String::new();
        // structural layers without a name don't show up in paths
        for name in names.iter().rev().filter(|n| !n.is_empty()) {
            path.push('/');
            path.push_str(name);
        }
        Ok(path)
    }

    #[instrument(skip(self))]
    async fn get_data_sources(&self) -> Result<Vec<Content>, Error> {
        Ok(self.db.read().data_sources().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_hosts(&self) -> Result<Vec<Host>, Error> {
        Ok(self.db.read().hosts.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_persons(&self) -> Result<Vec<Person>, Error> {
        Ok(self.db.read().persons.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_hosts_for_person(&self, person: Option<ObjectId>) -> Result<Vec<Host>, Error> {
        Ok(self
            .db
            .read()
            .hosts
            .values()
            .filter(|h| h.person == person)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_data_sources_for_host(&self, host: ObjectId) -> Result<Vec<Content>, Error> {
        let db = self.db.read();
        Ok(db
            .data_sources()
            .filter(|ds| db.data_source_hosts.get(&ds.id) == Some(&host))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_artifact_types_in_use(
        &self,
        category: ArtifactCategory,
        filter: DataSourceFilter,
    ) -> Result<Vec<ArtifactType>, Error> {
        let db = self.db.read();
        let mut types: BTreeMap<i32, ArtifactType> = BTreeMap::new();
        for a in db.artifacts.values() {
            if a.artifact_type.category == category && matches_filter(a.data_source, filter) {
                types
                    .entry(a.artifact_type.id)
                    .or_insert_with(|| a.artifact_type.clone());
            }
        }
        Ok(types.into_values().collect())
    }

    #[instrument(skip(self))]
    async fn get_artifacts_of_type(
        &self,
        type_id: i32,
        filter: DataSourceFilter,
        limit: usize,
    ) -> Result<Vec<Artifact>, Error> {
        Ok(self
            .db
            .read()
            .artifacts
            .values()
            .filter(|a| a.artifact_type.id == type_id && matches_filter(a.data_source, filter))
            .take(limit)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_count_of_type(
        &self,
        type_id: i32,
        filter: DataSourceFilter,
    ) -> Result<u64, Error> {
        Ok(self
            .db
            .read()
            .artifacts
            .values()
            .filter(|a| a.artifact_type.id == type_id && matches_filter(a.data_source, filter))
            .count() as u64)
    }

    #[instrument(skip(self))]
    async fn get_artifacts_for_content(&self, content: ObjectId) -> Result<Vec<Artifact>, Error> {
        Ok(self
            .db
            .read()
            .artifacts
            .values()
            .filter(|a| a.source == content)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_tag_names_in_use(&self) -> Result<Vec<TagName>, Error> {
        let db = self.db.read();
        let in_use: BTreeSet<ObjectId> = db
            .content_tags
            .values()
            .map(|t| t.tag_name.id)
            .chain(db.artifact_tags.values().map(|t| t.tag_name.id))
            .collect();
        Ok(db
            .tag_names
            .values()
            .filter(|t| in_use.contains(&t.id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_content_tags(&self, tag_name: ObjectId) -> Result<Vec<ContentTag>, Error> {
        Ok(self
            .db
            .read()
            .content_tags
            .values()
            .filter(|t| t.tag_name.id == tag_name)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_artifact_tags(&self, tag_name: ObjectId) -> Result<Vec<ArtifactTag>, Error> {
        Ok(self
            .db
            .read()
            .artifact_tags
            .values()
            .filter(|t| t.tag_name.id == tag_name)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_content_tags_for(&self, content: ObjectId) -> Result<Vec<ContentTag>, Error> {
        Ok(self
            .db
            .read()
            .content_tags
            .values()
            .filter(|t| t.content == content)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_files(
        &self,
        query: &FileQuery,
        filter: DataSourceFilter,
        exclude: FileExclusions,
        limit: usize,
    ) -> Result<Vec<Content>, Error> {
        let db = self.db.read();
        let files = db
            .content
            .values()
            .filter(|c| c.kind.is_file_like() && !c.is_dot_dir())
            .filter(|c| matches_filter(c.data_source, filter))
            .filter(|c| match query {
                FileQuery::Extensions(exts) => {
                    !c.kind.is_directory()
                        && c.extension()
                            .map_or(false, |ext| exts.iter().any(|e| *e == ext))
                }
                FileQuery::Deleted => c.deleted,
            })
            .filter(|c| !exclude.excludes(c));
        Ok(files.take(limit).cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_reports(&self) -> Result<Vec<Report>, Error> {
        Ok(self.db.read().reports.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_os_accounts(&self, filter: DataSourceFilter) -> Result<Vec<OsAccount>, Error> {
        Ok(self
            .db
            .read()
            .os_accounts
            .values()
            .filter(|a| matches_filter(a.data_source, filter))
            .cloned()
            .collect())
    }
}
