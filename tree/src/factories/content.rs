use async_trait::async_trait;
use tracing::instrument;

use casetree_casestore::model::Content;

use crate::children::ChildFactory;
use crate::config::ContentFilter;
use crate::context::TreeContext;
use crate::key::Key;
use crate::node::Node;
use crate::nodes::build_content_node;
use crate::resolver::ContentResolver;
use crate::visitor::{ContentVisitor, ShowContent};
use crate::Error;

/// The storage children of a content object, with structural layers
/// spliced out and the subtree's content filter applied.
pub struct ContentChildren {
    ctx: TreeContext,
    parent: Content,
    filter: ContentFilter,
}

impl ContentChildren {
    pub fn new(ctx: TreeContext, parent: Content, filter: ContentFilter) -> Self {
        Self {
            ctx,
            parent,
            filter,
        }
    }
}

#[async_trait]
impl ChildFactory for ContentChildren {
    fn name(&self) -> &'static str {
        "content"
    }

    #[instrument(skip_all, fields(parent.id = self.parent.id))]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        let mut show = ShowContent::new(self.filter);

        ContentResolver::new(service.as_ref())
            .with_path_cache(self.ctx.paths())
            .child_keys(&self.parent)
            .await
            .into_iter()
            .filter(|c| show.visit_content(c))
            .map(Key::from)
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_content_node(&self.ctx, self.filter, key)
    }
}
