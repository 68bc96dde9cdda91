use async_trait::async_trait;
use tracing::{debug, instrument};

use casetree_casestore::model::{DataSourceFilter, FileQuery};
use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::ChildFactory;
use crate::context::TreeContext;
use crate::key::{FileTypeCategory, Key, TreeItem};
use crate::node::Node;
use crate::nodes::{build_content_node, build_item_node};
use crate::visitor::{ContentVisitor, ShowContent};
use crate::Error;

/// "File Types" and "Deleted Files".
pub struct ViewsChildren {
    ctx: TreeContext,
    filter: DataSourceFilter,
}

impl ViewsChildren {
    pub fn new(ctx: TreeContext, filter: DataSourceFilter) -> Self {
        Self { ctx, filter }
    }
}

#[async_trait]
impl ChildFactory for ViewsChildren {
    fn name(&self) -> &'static str {
        "views"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        vec![
            TreeItem::FileTypes(self.filter).into(),
            TreeItem::DeletedFiles(self.filter).into(),
        ]
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }
}

/// One entry per extension category.
pub struct FileTypesChildren {
    ctx: TreeContext,
    filter: DataSourceFilter,
}

impl FileTypesChildren {
    pub fn new(ctx: TreeContext, filter: DataSourceFilter) -> Self {
        Self { ctx, filter }
    }
}

#[async_trait]
impl ChildFactory for FileTypesChildren {
    fn name(&self) -> &'static str {
        "file_types"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        FileTypeCategory::ALL
            .iter()
            .map(|c| TreeItem::FileTypeCategory(*c, self.filter).into())
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }
}

/// Files matching a query, at most `cap` of them.
pub struct FilesChildren {
    ctx: TreeContext,
    query: FileQuery,
    filter: DataSourceFilter,
    cap: usize,
}

impl FilesChildren {
    pub fn new(ctx: TreeContext, query: FileQuery, filter: DataSourceFilter, cap: usize) -> Self {
        Self {
            ctx,
            query,
            filter,
            cap,
        }
    }
}

#[async_trait]
impl ChildFactory for FilesChildren {
    fn name(&self) -> &'static str {
        "files"
    }

    #[instrument(skip_all, fields(query = ?self.query, filter = ?self.filter, cap = self.cap))]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        // hidden files must not take up room below the cap
        let views_tree = self.ctx.config().views_tree;
        let mut files = or_empty(
            self.name(),
            "find_files",
            service
                .find_files(&self.query, self.filter, views_tree.into(), self.cap)
                .await,
        );
        if files.len() > self.cap {
            debug!(found = files.len(), "truncating file listing");
            files.truncate(self.cap);
        }

        let mut show = ShowContent::new(views_tree);
        files
            .into_iter()
            .filter(|c| show.visit_content(c))
            .map(Key::from)
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_content_node(&self.ctx, self.ctx.config().views_tree, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        matches!(event, CaseEvent::DataSourceAdded { .. }) || event.is_ingest_job_end()
    }
}
