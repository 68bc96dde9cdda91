use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{instrument, warn};

use casetree_casestore::caseservice::CaseService;
use casetree_casestore::model::{
    artifact_type_ids, ArtifactCategory, ArtifactType, DataSourceFilter, Entity,
};
use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::ChildFactory;
use crate::config::ContentFilter;
use crate::context::TreeContext;
use crate::key::{interesting_items_type, listed_type_ids, Key, TreeItem};
use crate::node::Node;
use crate::nodes::{build_content_node, build_item_node};
use crate::resolver::ArtifactResolver;
use crate::Error;

/// Types never listed on their own. Their artifacts are shown elsewhere, or
/// not meant to be browsed.
const IGNORED_TYPES: [i32; 5] = [
    artifact_type_ids::GEN_INFO,
    artifact_type_ids::DATA_SOURCE_USAGE,
    artifact_type_ids::DOWNLOAD_SOURCE,
    artifact_type_ids::TL_EVENT,
    artifact_type_ids::ASSOCIATED_OBJECT,
];

/// The artifact types of one category that have artifacts, shown as
/// "Name (count)".
pub struct ArtifactTypesChildren {
    ctx: TreeContext,
    category: ArtifactCategory,
    filter: DataSourceFilter,
    counts: Mutex<HashMap<i32, u64>>,
}

impl ArtifactTypesChildren {
    pub fn new(ctx: TreeContext, category: ArtifactCategory, filter: DataSourceFilter) -> Self {
        Self {
            ctx,
            category,
            filter,
            counts: Default::default(),
        }
    }

    async fn count(&self, service: &dyn CaseService, artifact_type: &ArtifactType) -> u64 {
        let mut total = 0;
        for type_id in listed_type_ids(artifact_type) {
            match service.get_count_of_type(type_id, self.filter).await {
                Ok(n) => total += n,
                Err(e) => warn!(type_id, err = %e, "unable to count artifacts"),
            }
        }
        total
    }

    fn label(&self, node: &Node) {
        if let Key::Item(TreeItem::ArtifactType { artifact_type, .. }) = node.key() {
            let count = self
                .counts
                .lock()
                .get(&artifact_type.id)
                .copied()
                .unwrap_or_default();
            node.set_display_name(format!("{} ({})", artifact_type.display_name, count));
        }
    }
}

#[async_trait]
impl ChildFactory for ArtifactTypesChildren {
    fn name(&self) -> &'static str {
        "artifact_types"
    }

    #[instrument(skip_all, fields(category = ?self.category, filter = ?self.filter))]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        let in_use = or_empty(
            self.name(),
            "get_artifact_types_in_use",
            service
                .get_artifact_types_in_use(self.category, self.filter)
                .await,
        );

        let mut types: Vec<ArtifactType> = Vec::with_capacity(in_use.len());
        for t in in_use {
            if IGNORED_TYPES.contains(&t.id) {
                continue;
            }
            let t = match t.id {
                // both kinds of interesting hits share one entry
                artifact_type_ids::INTERESTING_FILE_HIT
                | artifact_type_ids::INTERESTING_ARTIFACT_HIT => interesting_items_type(),
                _ => t,
            };
            if !types.iter().any(|seen| seen.id == t.id) {
                types.push(t);
            }
        }
        types.sort_by_cached_key(|t| t.display_name.to_lowercase());

        let counts = join_all(types.iter().map(|t| self.count(service.as_ref(), t))).await;
        *self.counts.lock() = types.iter().map(|t| t.id).zip(counts).collect();

        types
            .into_iter()
            .map(|artifact_type| {
                TreeItem::ArtifactType {
                    artifact_type,
                    filter: self.filter,
                }
                .into()
            })
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        let node = build_item_node(&self.ctx, key)?;
        self.label(&node);
        Ok(node)
    }

    fn update_node(&self, node: &Node) {
        self.label(node);
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        event.is_ingest_job_end() || event.added_category() == Some(self.category)
    }
}

/// The artifacts of one type, up to the configured cap.
pub struct ArtifactsChildren {
    ctx: TreeContext,
    artifact_type: ArtifactType,
    filter: DataSourceFilter,
}

impl ArtifactsChildren {
    pub fn new(ctx: TreeContext, artifact_type: ArtifactType, filter: DataSourceFilter) -> Self {
        Self {
            ctx,
            artifact_type,
            filter,
        }
    }
}

#[async_trait]
impl ChildFactory for ArtifactsChildren {
    fn name(&self) -> &'static str {
        "artifacts"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        ArtifactResolver::new(service.as_ref(), &self.ctx.config().artifact_caps)
            .artifact_keys(&self.artifact_type, self.filter)
            .await
            .into_iter()
            .map(|a| Key::Entity(Entity::Artifact(a)))
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_content_node(&self.ctx, ContentFilter::default(), key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        match event {
            CaseEvent::DataAdded { artifact_type } => {
                listed_type_ids(&self.artifact_type).contains(&artifact_type.id)
            }
            e => e.is_ingest_job_end(),
        }
    }
}
