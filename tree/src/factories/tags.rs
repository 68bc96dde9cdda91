use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::{join, join_all};
use parking_lot::Mutex;
use tracing::{instrument, trace};

use casetree_casestore::caseservice::CaseService;
use casetree_casestore::model::{ObjectId, TagName};
use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::ChildFactory;
use crate::context::TreeContext;
use crate::key::{Key, TreeItem};
use crate::node::Node;
use crate::nodes::build_item_node;
use crate::Error;

/// Tag names that are in use, sorted, with the number of tagged items.
pub struct TagNamesChildren {
    ctx: TreeContext,
    counts: Mutex<HashMap<ObjectId, usize>>,
}

impl TagNamesChildren {
    pub fn new(ctx: TreeContext) -> Self {
        Self {
            ctx,
            counts: Default::default(),
        }
    }

    /// Items tagged with `tag_name`, files and results together.
    async fn count(&self, service: &dyn CaseService, tag_name: &TagName) -> usize {
        let (content, artifact) = join(
            service.get_content_tags(tag_name.id),
            service.get_artifact_tags(tag_name.id),
        )
        .await;
        or_empty(self.name(), "get_content_tags", content).len()
            + or_empty(self.name(), "get_artifact_tags", artifact).len()
    }

    fn label(&self, node: &Node) {
        if let Key::Item(TreeItem::TagName(tag_name)) = node.key() {
            let count = self.counts.lock().get(&tag_name.id).copied().unwrap_or(0);
            node.set_display_name(format!("{} ({})", tag_name.display_name, count));
        }
    }
}

#[async_trait]
impl ChildFactory for TagNamesChildren {
    fn name(&self) -> &'static str {
        "tag_names"
    }

    #[instrument(skip_all)]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        let mut names = or_empty(
            self.name(),
            "get_tag_names_in_use",
            service.get_tag_names_in_use().await,
        );
        names.sort_by_cached_key(|t| t.display_name.to_lowercase());

        let counts = join_all(names.iter().map(|t| self.count(service.as_ref(), t))).await;
        *self.counts.lock() = names.iter().map(|t| t.id).zip(counts).collect();

        names.into_iter().map(|t| TreeItem::TagName(t).into()).collect()
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
        event.is_tag_change()
    }
}

/// "File Tags" and "Result Tags" of one tag name.
pub struct TagTypesChildren {
    ctx: TreeContext,
    tag_name: TagName,
    counts: Mutex<(usize, usize)>,
}

impl TagTypesChildren {
    pub fn new(ctx: TreeContext, tag_name: TagName) -> Self {
        Self {
            ctx,
            tag_name,
            counts: Default::default(),
        }
    }

    fn label(&self, node: &Node) {
        let (content, artifact) = *self.counts.lock();
        match node.key() {
            Key::Item(TreeItem::ContentTags(_)) => {
                node.set_display_name(format!("{} ({})", node.name(), content))
            }
            Key::Item(TreeItem::ArtifactTags(_)) => {
                node.set_display_name(format!("{} ({})", node.name(), artifact))
            }
            _ => {}
        }
    }
}

#[async_trait]
impl ChildFactory for TagTypesChildren {
    fn name(&self) -> &'static str {
        "tag_types"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        if let Some(service) = self.ctx.service() {
            let content = or_empty(
                self.name(),
                "get_content_tags",
                service.get_content_tags(self.tag_name.id).await,
            );
            let artifact = or_empty(
                self.name(),
                "get_artifact_tags",
                service.get_artifact_tags(self.tag_name.id).await,
            );
            *self.counts.lock() = (content.len(), artifact.len());
        }

        vec![
            TreeItem::ContentTags(self.tag_name.clone()).into(),
            TreeItem::ArtifactTags(self.tag_name.clone()).into(),
        ]
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
        event.is_tag_change()
    }
}

/// The content tags of one tag name, named after the tagged file.
pub struct ContentTagsChildren {
    ctx: TreeContext,
    tag_name: TagName,
    file_names: Mutex<HashMap<ObjectId, String>>,
}

impl ContentTagsChildren {
    pub fn new(ctx: TreeContext, tag_name: TagName) -> Self {
        Self {
            ctx,
            tag_name,
            file_names: Default::default(),
        }
    }

    fn label(&self, node: &Node) {
        if let Key::Item(TreeItem::ContentTag(tag)) = node.key() {
            if let Some(name) = self.file_names.lock().get(&tag.content) {
                node.set_display_name(name.clone());
            }
        }
    }
}

#[async_trait]
impl ChildFactory for ContentTagsChildren {
    fn name(&self) -> &'static str {
        "content_tags"
    }

    #[instrument(skip_all, fields(tag_name = %self.tag_name.display_name))]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        let tags = or_empty(
            self.name(),
            "get_content_tags",
            service.get_content_tags(self.tag_name.id).await,
        );

        let mut file_names = HashMap::with_capacity(tags.len());
        for tag in &tags {
            match service.get_content(tag.content).await {
                Ok(Some(c)) => {
                    file_names.insert(c.id, c.name);
                }
                Ok(None) => trace!(content.id = tag.content, "tagged content is gone"),
                Err(e) => trace!(content.id = tag.content, err = %e, "unable to name tagged content"),
            }
        }
        *self.file_names.lock() = file_names;

        tags.into_iter().map(|t| TreeItem::ContentTag(t).into()).collect()
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
        matches!(
            event,
            CaseEvent::ContentTagAdded { .. } | CaseEvent::ContentTagDeleted { .. }
        )
    }
}

/// The artifact tags of one tag name.
pub struct ArtifactTagsChildren {
    ctx: TreeContext,
    tag_name: TagName,
}

impl ArtifactTagsChildren {
    pub fn new(ctx: TreeContext, tag_name: TagName) -> Self {
        Self { ctx, tag_name }
    }
}

#[async_trait]
impl ChildFactory for ArtifactTagsChildren {
    fn name(&self) -> &'static str {
        "artifact_tags"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        or_empty(
            self.name(),
            "get_artifact_tags",
            service.get_artifact_tags(self.tag_name.id).await,
        )
        .into_iter()
        .map(|t| TreeItem::ArtifactTag(t).into())
        .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        matches!(
            event,
            CaseEvent::ArtifactTagAdded { .. } | CaseEvent::ArtifactTagDeleted { .. }
        )
    }
}
