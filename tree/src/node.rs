//! The tree's node model.
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::trace;

use casetree_casestore::model::{ContentKind, Entity};

use crate::children::{ChildFactory, Children};
use crate::context::TreeContext;
use crate::decoration::{Annotations, Decoration};
use crate::key::Key;
use crate::visitor::{ContentVisitor, ItemVisitor};
use crate::Error;

/// The kind of a node. Every content kind and every tree item has exactly
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
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
    Artifact,

    Root,
    DataSources,
    Views,
    FileTypes,
    FileTypeCategory,
    DeletedFiles,
    DataArtifacts,
    AnalysisResults,
    ArtifactType,
    OsAccounts,
    OsAccount,
    Tags,
    TagName,
    ContentTags,
    ArtifactTags,
    ContentTag,
    ArtifactTag,
    Reports,
    Report,
    PersonGroup,
    Host,
    DataSourceGroup,
}

impl From<ContentKind> for NodeKind {
    fn from(value: ContentKind) -> Self {
        match value {
            ContentKind::Image => NodeKind::Image,
            ContentKind::VolumeSystem => NodeKind::VolumeSystem,
            ContentKind::Volume => NodeKind::Volume,
            ContentKind::Pool => NodeKind::Pool,
            ContentKind::FileSystem => NodeKind::FileSystem,
            ContentKind::Directory => NodeKind::Directory,
            ContentKind::File => NodeKind::File,
            ContentKind::LayoutFile => NodeKind::LayoutFile,
            ContentKind::DerivedFile => NodeKind::DerivedFile,
            ContentKind::LocalFile => NodeKind::LocalFile,
            ContentKind::VirtualDirectory => NodeKind::VirtualDirectory,
            ContentKind::LocalDirectory => NodeKind::LocalDirectory,
            ContentKind::SlackFile => NodeKind::SlackFile,
            ContentKind::LocalFilesDataSource => NodeKind::LocalFilesDataSource,
            ContentKind::Unsupported => NodeKind::Unsupported,
        }
    }
}

/// One row of a node's property sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub value: String,
}

impl Property {
    pub fn new(name: &'static str, value: impl ToString) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

/// A visible element of the tree, bound to exactly one [Key].
///
/// Nodes with a [ChildFactory] are expandable. Their children are created
/// on the first [Node::expand] and live until [Node::collapse] or until
/// the node is dropped.
pub struct Node {
    key: Key,
    kind: NodeKind,
    name: String,
    display_name: RwLock<String>,
    icon: &'static str,
    item_type: String,
    properties: Vec<Property>,

    factory: Option<Arc<dyn ChildFactory>>,
    children: Mutex<Option<Arc<Children>>>,

    ctx: TreeContext,
    decoration: Option<Decoration>,
}

impl Node {
    pub fn new(ctx: TreeContext, key: Key, kind: NodeKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key,
            kind,
            display_name: RwLock::new(name.clone()),
            name,
            icon: "images/file-icon.png",
            item_type: String::new(),
            properties: Vec::new(),
            factory: None,
            children: Mutex::new(None),
            ctx,
            decoration: None,
        }
    }

    pub fn with_display_name(self, display_name: impl Into<String>) -> Self {
        *self.display_name.write() = display_name.into();
        self
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_property(mut self, name: &'static str, value: impl ToString) -> Self {
        self.properties.push(Property::new(name, value));
        self
    }

    pub fn with_children(mut self, factory: impl ChildFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn with_decoration(mut self, decoration: Option<Decoration>) -> Self {
        self.decoration = decoration;
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The stable name, used for lookups and sorting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name as shown, which may change (counts).
    pub fn display_name(&self) -> String {
        self.display_name.read().clone()
    }

    pub fn set_display_name(&self, display_name: impl Into<String>) {
        *self.display_name.write() = display_name.into();
    }

    pub fn icon(&self) -> &'static str {
        self.icon
    }

    /// Nodes sharing a column layout share this string.
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// The property sheet. Locations come from the tree's path cache and
    /// show up once known.
    pub fn properties(&self) -> Vec<Property> {
        let mut props = self.properties.clone();
        if let Key::Entity(Entity::Content(c)) = &self.key {
            if let Some(path) = self.ctx.paths().get(c.id) {
                props.push(Property::new("Location", path));
            }
        }
        props
    }

    pub fn is_leaf(&self) -> bool {
        self.factory.is_none()
    }

    /// The children, creating them on first call.
    pub async fn expand(&self) -> Result<Arc<[Arc<Node>]>, Error> {
        let Some(factory) = &self.factory else {
            return Ok(Arc::from(Vec::new()));
        };

        let existing = self.children.lock().clone();
        let children = match existing {
            Some(children) => children,
            None => {
                let attached = Children::attach(factory.clone(), &self.ctx).await?;
                // a concurrent expand may have attached first, ours is dropped then
                self.children.lock().get_or_insert(attached).clone()
            }
        };

        children.nodes().await
    }

    /// The live children, if expanded.
    pub fn children(&self) -> Option<Arc<Children>> {
        self.children.lock().clone()
    }

    /// Drops the children, their listeners and everything below.
    pub fn collapse(&self) {
        let children = self.children.lock().take();
        if let Some(children) = children {
            trace!(node = %self.key, "collapsing");
            children.dispose();
        }
    }

    /// Background annotations, once available.
    pub fn annotations(&self) -> Option<Annotations> {
        self.decoration.as_ref().and_then(Decoration::get)
    }

    pub fn watch_annotations(&self) -> Option<watch::Receiver<Option<Annotations>>> {
        self.decoration.as_ref().map(Decoration::watch)
    }

    /// Dispatches on the key: entities go to the [ContentVisitor] side,
    /// tree items to the [ItemVisitor] side.
    pub fn accept<V, T>(&self, visitor: &mut V) -> T
    where
        V: ContentVisitor<Output = T> + ItemVisitor<Output = T>,
    {
        match &self.key {
            Key::Entity(entity) => ContentVisitor::visit_entity(visitor, entity),
            Key::Item(item) => ItemVisitor::visit_item(visitor, item),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("display_name", &*self.display_name.read())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.collapse();
    }
}
