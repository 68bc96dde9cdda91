use async_trait::async_trait;
use tracing::instrument;

use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::{ChildFactory, ChildrenMode};
use crate::context::TreeContext;
use crate::key::Key;
use crate::node::Node;
use crate::nodes::build_content_node;
use crate::Error;

/// All data sources of the case, in storage order.
pub struct DataSourcesChildren {
    ctx: TreeContext,
}

impl DataSourcesChildren {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChildFactory for DataSourcesChildren {
    fn name(&self) -> &'static str {
        "data_sources"
    }

    fn mode(&self) -> ChildrenMode {
        ChildrenMode::Keys
    }

    #[instrument(skip_all)]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        or_empty(self.name(), "get_data_sources", service.get_data_sources().await)
            .into_iter()
            .map(Key::from)
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_content_node(&self.ctx, self.ctx.config().data_sources_tree, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        matches!(event, CaseEvent::DataSourceAdded { .. })
    }
}
