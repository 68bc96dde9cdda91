use async_trait::async_trait;
use tracing::instrument;

use casetree_casestore::model::{Content, ObjectId};
use casetree_casestore::CaseEvent;

use super::or_empty;
use crate::children::{ChildFactory, ChildrenMode};
use crate::context::TreeContext;
use crate::key::{Key, TreeItem};
use crate::node::Node;
use crate::nodes::{build_item_node, build_node};
use crate::root::grouping_order;
use crate::Error;

/// The hosts of one person, or the hosts without a person for `None`.
pub struct PersonHostsChildren {
    ctx: TreeContext,
    person: Option<ObjectId>,
}

impl PersonHostsChildren {
    pub fn new(ctx: TreeContext, person: Option<ObjectId>) -> Self {
        Self { ctx, person }
    }
}

#[async_trait]
impl ChildFactory for PersonHostsChildren {
    fn name(&self) -> &'static str {
        "person_hosts"
    }

    fn mode(&self) -> ChildrenMode {
        ChildrenMode::Keys
    }

    #[instrument(skip_all, fields(person = ?self.person))]
    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        let mut hosts = or_empty(
            self.name(),
            "get_hosts_for_person",
            service.get_hosts_for_person(self.person).await,
        );
        hosts.sort_by(|a, b| grouping_order(a.name.as_deref(), b.name.as_deref()));
        hosts.into_iter().map(|h| TreeItem::Host(h).into()).collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        event.is_host_or_person_change()
    }
}

/// The data sources of one host.
pub struct HostDataSourcesChildren {
    ctx: TreeContext,
    host: ObjectId,
}

impl HostDataSourcesChildren {
    pub fn new(ctx: TreeContext, host: ObjectId) -> Self {
        Self { ctx, host }
    }
}

#[async_trait]
impl ChildFactory for HostDataSourcesChildren {
    fn name(&self) -> &'static str {
        "host_data_sources"
    }

    fn mode(&self) -> ChildrenMode {
        ChildrenMode::Keys
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };
        or_empty(
            self.name(),
            "get_data_sources_for_host",
            service.get_data_sources_for_host(self.host).await,
        )
        .into_iter()
        .map(|ds| TreeItem::DataSourceGroup(ds).into())
        .collect()
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        true
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        matches!(event, CaseEvent::DataSourceAdded { .. }) || event.is_host_or_person_change()
    }
}

/// What is shown for one data source below its host: the data source
/// itself, then its views and results.
pub struct DataSourceGroupChildren {
    ctx: TreeContext,
    data_source: Content,
}

impl DataSourceGroupChildren {
    pub fn new(ctx: TreeContext, data_source: Content) -> Self {
        Self { ctx, data_source }
    }
}

#[async_trait]
impl ChildFactory for DataSourceGroupChildren {
    fn name(&self) -> &'static str {
        "data_source_group"
    }

    async fn compute_keys(&self) -> Vec<Key> {
        let filter = Some(self.data_source.id);
        vec![
            Key::from(self.data_source.clone()),
            TreeItem::Views(filter).into(),
            TreeItem::DataArtifacts(filter).into(),
            TreeItem::AnalysisResults(filter).into(),
            TreeItem::OsAccounts(filter).into(),
        ]
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_node(&self.ctx, self.ctx.config().data_sources_tree, key)
    }
}
