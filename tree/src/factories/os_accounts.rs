use async_trait::async_trait;

use casetree_casestore::model::DataSourceFilter;
use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::ChildFactory;
use crate::context::TreeContext;
use crate::key::{Key, TreeItem};
use crate::node::Node;
use crate::nodes::build_item_node;
use crate::Error;

pub struct OsAccountsChildren {
    ctx: TreeContext,
    filter: DataSourceFilter,
}

impl OsAccountsChildren {
    pub fn new(ctx: TreeContext, filter: DataSourceFilter) -> Self {
        Self { ctx, filter }
    }
}

#[async_trait]
impl ChildFactory for OsAccountsChildren {
    fn name(&self) -> &'static str {
        "os_accounts"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        or_empty(
            self.name(),
            "get_os_accounts",
            service.get_os_accounts(self.filter).await,
        )
        .into_iter()
        .map(|a| TreeItem::OsAccount(a).into())
        .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        event.is_ingest_job_end()
    }
}
