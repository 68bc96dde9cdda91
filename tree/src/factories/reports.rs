use async_trait::async_trait;

use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::{ChildFactory, ChildrenMode};
use crate::context::TreeContext;
use crate::key::{Key, TreeItem};
use crate::node::Node;
use crate::nodes::build_item_node;
use crate::Error;

pub struct ReportsChildren {
    ctx: TreeContext,
}

impl ReportsChildren {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChildFactory for ReportsChildren {
    fn name(&self) -> &'static str {
        "reports"
    }

    fn mode(&self) -> ChildrenMode {
        ChildrenMode::Keys
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        or_empty(self.name(), "get_reports", service.get_reports().await)
            .into_iter()
            .map(|r| TreeItem::Report(r).into())
            .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        matches!(event, CaseEvent::ReportAdded { .. })
    }
}
