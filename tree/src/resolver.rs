//! Turns storage hierarchy into the child keys the tree shows.
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument, trace, warn};

use casetree_casestore::caseservice::CaseService;
use casetree_casestore::model::{
    Artifact, ArtifactType, Content, ContentKind, DataSourceFilter, ObjectId,
};

use crate::config::ArtifactCaps;
use crate::key::listed_type_ids;

/// Guards against parent cycles in a corrupt case.
const MAX_SPLICE_DEPTH: usize = 32;

/// Unique paths of content objects, filled in while resolving children so
/// node property sheets don't have to query for them.
#[derive(Clone, Default)]
pub struct PathCache {
    paths: Arc<RwLock<HashMap<ObjectId, String>>>,
}

impl PathCache {
    pub fn get(&self, id: ObjectId) -> Option<String> {
        self.paths.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up and caches the paths of all given objects that aren't
    /// cached yet. Failures only mean the path stays unknown.
    pub async fn warm(&self, service: &dyn CaseService, contents: &[Content]) {
        for c in contents {
            if self.paths.read().contains_key(&c.id) {
                continue;
            }
            match service.get_unique_path(c.id).await {
                Ok(path) => {
                    self.paths.write().insert(c.id, path);
                }
                Err(e) => trace!(content.id = c.id, err = %e, "unable to get unique path"),
            }
        }
    }
}

/// Resolves the visible children of a content object, eliding the layers
/// of the storage hierarchy that are not meant to be navigated on their own.
///
/// Volume systems, file systems and the root directory of a file system
/// are skipped: their children take their place, in order. A volume system
/// holding exactly one volume is skipped along with that volume. "." and
/// ".." are emitted as they are and never looked into.
pub struct ContentResolver<'a> {
    service: &'a dyn CaseService,
    paths: Option<&'a PathCache>,
}

impl<'a> ContentResolver<'a> {
    pub fn new(service: &'a dyn CaseService) -> Self {
        Self {
            service,
            paths: None,
        }
    }

    pub fn with_path_cache(mut self, paths: &'a PathCache) -> Self {
        self.paths = Some(paths);
        self
    }

    async fn children_of(&self, parent: ObjectId) -> Vec<Content> {
        match self.service.get_children(parent).await {
            Ok(children) => children,
            Err(e) => {
                warn!(parent.id = parent, err = %e, "unable to list children, showing none");
                vec![]
            }
        }
    }

    /// Children of a spliced volume system: its volumes, or the contents of
    /// its only volume.
    async fn volume_system_children(&self, volume_system: ObjectId) -> Vec<Content> {
        let volumes = self.children_of(volume_system).await;
        match volumes.as_slice() {
            [only] if only.kind == ContentKind::Volume => {
                trace!(volume.id = only.id, "splicing single volume");
                self.children_of(only.id).await
            }
            _ => volumes,
        }
    }

    #[instrument(skip_all, fields(parent.id = parent.id, parent.kind = %parent.kind))]
    pub async fn child_keys(&self, parent: &Content) -> Vec<Content> {
        if parent.is_dot_dir() {
            return vec![];
        }

        let mut out = Vec::new();
        let mut stack = vec![self.children_of(parent.id).await.into_iter()];

        while let Some(top) = stack.last_mut() {
            let Some(child) = top.next() else {
                stack.pop();
                continue;
            };

            if !is_spliced(&child) {
                out.push(child);
                continue;
            }

            if stack.len() >= MAX_SPLICE_DEPTH {
                warn!(content.id = child.id, "structural nesting too deep, not descending");
                continue;
            }

            let spliced = if child.kind == ContentKind::VolumeSystem {
                self.volume_system_children(child.id).await
            } else {
                self.children_of(child.id).await
            };
            trace!(content.id = child.id, kind = %child.kind, "splicing");
            stack.push(spliced.into_iter());
        }

        if let Some(paths) = self.paths {
            paths.warm(self.service, &out).await;
        }

        debug!(children = out.len(), "resolved children");
        out
    }
}

/// Pure structural containers, replaced by their children.
fn is_spliced(c: &Content) -> bool {
    match c.kind {
        ContentKind::VolumeSystem | ContentKind::FileSystem => true,
        ContentKind::Directory => c.root && !c.is_dot_dir(),
        _ => false,
    }
}

/// Lists artifacts of a type, bounded by the configured caps.
pub struct ArtifactResolver<'a> {
    service: &'a dyn CaseService,
    caps: &'a ArtifactCaps,
}

impl<'a> ArtifactResolver<'a> {
    pub fn new(service: &'a dyn CaseService, caps: &'a ArtifactCaps) -> Self {
        Self { service, caps }
    }

    #[instrument(skip_all, fields(artifact_type = %artifact_type.name, filter = ?filter))]
    pub async fn artifact_keys(
        &self,
        artifact_type: &ArtifactType,
        filter: DataSourceFilter,
    ) -> Vec<Artifact> {
        let cap = self.caps.for_type(artifact_type);
        let mut out: Vec<Artifact> = Vec::new();

        for type_id in listed_type_ids(artifact_type) {
            let remaining = cap.saturating_sub(out.len());
            if remaining == 0 {
                break;
            }
            match self
                .service
                .get_artifacts_of_type(type_id, filter, remaining)
                .await
            {
                Ok(artifacts) => out.extend(artifacts),
                Err(e) => {
                    warn!(type_id, err = %e, "unable to list artifacts, showing none")
                }
            }
        }

        // stores are not trusted to honor the limit
        if out.len() > cap {
            debug!(cap, found = out.len(), "truncating artifact listing");
            out.truncate(cap);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ArtifactResolver, ContentResolver, PathCache};
    use crate::config::ArtifactCaps;
    use casetree_casestore::caseservice::{CaseService, MemoryCaseService};
    use casetree_casestore::fixtures::*;
    use casetree_casestore::model::{ArtifactCategory, ArtifactType, Content};

    async fn names(svc: &dyn CaseService, id: i64) -> Vec<String> {
        let parent = svc.get_content(id).await.unwrap().unwrap();
        ContentResolver::new(svc)
            .child_keys(&parent)
            .await
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[tokio::test]
    async fn skip_splice() {
        let svc = MemoryCaseService::from_snapshot(skip_splice_snapshot());
        // volume system, volume, file system and root dir are elided,
        // "." is emitted as is.
        assert_eq!(vec!["A", "B", "."], names(&svc, IMAGE_ID).await);
    }

    #[tokio::test]
    async fn dot_dir_not_descended() {
        let svc = MemoryCaseService::from_snapshot(skip_splice_snapshot());
        // a "." entry that (wrongly) has children in storage still shows none
        svc.add_content(Content::new(
            99,
            "ghost",
            casetree_casestore::model::ContentKind::File,
            Some(DOT_DIR_ID),
            IMAGE_ID,
        ));
        assert!(names(&svc, DOT_DIR_ID).await.is_empty());
    }

    #[tokio::test]
    async fn idempotent() {
        let svc = populated_service();
        for id in [IMAGE_ID, LOCAL_FILES_ID, MULTI_VOLUME_IMAGE_ID, USERS_DIR_ID] {
            assert_eq!(names(&svc, id).await, names(&svc, id).await);
        }
    }

    #[tokio::test]
    async fn multiple_volumes_are_shown() {
        let svc = populated_service();
        assert_eq!(
            vec!["vol1", "vol2"],
            names(&svc, MULTI_VOLUME_IMAGE_ID).await
        );
        // below a volume, file system and root dir are still elided
        assert_eq!(vec!["Users"], names(&svc, 32).await);
    }

    #[tokio::test]
    async fn storage_failure_is_empty() {
        let svc = FailingCaseService;
        let parent = SKIP_SPLICE_CONTENT[0].clone();
        assert!(ContentResolver::new(&svc)
            .child_keys(&parent)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn path_cache_warmup() {
        let svc = MemoryCaseService::from_snapshot(skip_splice_snapshot());
        let paths = PathCache::default();
        let parent = svc.get_content(IMAGE_ID).await.unwrap().unwrap();

        ContentResolver::new(&svc)
            .with_path_cache(&paths)
            .child_keys(&parent)
            .await;

        assert_eq!(3, paths.len());
        assert_eq!(Some("/disk.E01/vol1/A".to_string()), paths.get(FILE_A_ID));
    }

    #[tokio::test]
    async fn cap_enforced() {
        let custom = ArtifactType::new(
            9001,
            "TSK_CUSTOM",
            "Custom",
            ArtifactCategory::DataArtifact,
        );
        let svc = many_artifacts_service(&custom, 20_000);
        let caps = ArtifactCaps::default();

        let artifacts = ArtifactResolver::new(&svc, &caps)
            .artifact_keys(&custom, None)
            .await;
        assert_eq!(2_000, artifacts.len());
    }

    #[tokio::test]
    async fn interesting_hits_merged() {
        let svc = populated_service();
        let caps = ArtifactCaps::default();

        let ids: Vec<_> = ArtifactResolver::new(&svc, &caps)
            .artifact_keys(&crate::key::interesting_items_type(), None)
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(vec![102, 103], ids);
    }
}
