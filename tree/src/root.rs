//! The top of the tree, organized by one of the [GroupingMode]s.
use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, instrument};

use casetree_casestore::model::Person;
use casetree_casestore::{Case, CaseEvent};

use crate::children::{ChildFactory, ChildrenMode};
use crate::config::{GroupingMode, TreeConfig};
use crate::context::TreeContext;
use crate::factories::or_empty;
use crate::key::{Key, TreeItem};
use crate::node::Node;
use crate::nodes::build_item_node;
use crate::Error;

/// Sort order of person and host groups: case-insensitive by name, unnamed
/// ones last.
pub fn grouping_order(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The top-level listing.
pub struct RootChildren {
    ctx: TreeContext,
    mode: GroupingMode,
}

impl RootChildren {
    pub fn new(ctx: TreeContext, mode: GroupingMode) -> Self {
        Self { ctx, mode }
    }

    async fn person_host_keys(&self) -> Vec<Key> {
        let Some(service) = self.ctx.service() else {
            return vec![];
        };

        let mut persons: Vec<Person> =
            or_empty(self.name(), "get_persons", service.get_persons().await);
        let mut keys: Vec<Key> = Vec::new();

        if persons.is_empty() {
            let mut hosts = or_empty(self.name(), "get_hosts", service.get_hosts().await);
            hosts.sort_by(|a, b| grouping_order(a.name.as_deref(), b.name.as_deref()));
            keys.extend(hosts.into_iter().map(|h| Key::from(TreeItem::Host(h))));
        } else {
            persons.sort_by(|a, b| grouping_order(a.name.as_deref(), b.name.as_deref()));
            keys.extend(
                persons
                    .into_iter()
                    .map(|p| Key::from(TreeItem::PersonGroup(Some(p)))),
            );

            let ungrouped = or_empty(
                self.name(),
                "get_hosts_for_person",
                service.get_hosts_for_person(None).await,
            );
            if !ungrouped.is_empty() {
                keys.push(TreeItem::PersonGroup(None).into());
            }
        }

        keys.push(TreeItem::Reports.into());
        keys
    }
}

#[async_trait]
impl ChildFactory for RootChildren {
    fn name(&self) -> &'static str {
        "root"
    }

    fn mode(&self) -> ChildrenMode {
        match self.mode {
            GroupingMode::ByDataType => ChildrenMode::Lazy,
            GroupingMode::ByPersonHost => ChildrenMode::Keys,
        }
    }

    #[instrument(skip_all, fields(mode = ?self.mode))]
    async fn compute_keys(&self) -> Vec<Key> {
        match self.mode {
            GroupingMode::ByDataType => vec![
                TreeItem::DataSources.into(),
                TreeItem::Views(None).into(),
                TreeItem::DataArtifacts(None).into(),
                TreeItem::AnalysisResults(None).into(),
                TreeItem::OsAccounts(None).into(),
                TreeItem::Tags.into(),
                TreeItem::Reports.into(),
            ],
            GroupingMode::ByPersonHost => self.person_host_keys().await,
        }
    }

    fn create_node(&self, key: &Key) -> Result<Node, Error> {
        build_item_node(&self.ctx, key)
    }

    fn listens(&self) -> bool {
        self.mode == GroupingMode::ByPersonHost
    }

    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        event.is_host_or_person_change() || matches!(event, CaseEvent::DataSourceAdded { .. })
    }
}

/// Owns the root node of a tree over one case.
pub struct TreeRoot {
    ctx: TreeContext,
    node: RwLock<Arc<Node>>,
}

impl TreeRoot {
    pub fn new(ctx: TreeContext) -> Result<Self, Error> {
        let node = Self::build(&ctx, ctx.config().grouping)?;
        Ok(Self {
            ctx,
            node: RwLock::new(node),
        })
    }

    /// Shorthand for a tree with its own context.
    pub fn open(case: Case, config: TreeConfig) -> Result<Self, Error> {
        Self::new(TreeContext::new(case, config))
    }

    fn build(ctx: &TreeContext, mode: GroupingMode) -> Result<Arc<Node>, Error> {
        Ok(Arc::new(build_item_node(ctx, &TreeItem::Root(mode).into())?))
    }

    pub fn context(&self) -> &TreeContext {
        &self.ctx
    }

    pub fn node(&self) -> Arc<Node> {
        self.node.read().clone()
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        match self.node.read().key() {
            Key::Item(TreeItem::Root(mode)) => *mode,
            _ => self.ctx.config().grouping,
        }
    }

    /// The top-level nodes, computing them on first call.
    pub async fn children(&self) -> Result<Arc<[Arc<Node>]>, Error> {
        self.node().expand().await
    }

    /// Discards the whole tree below the root and starts over in `mode`.
    #[instrument(skip(self), err)]
    pub fn set_grouping_mode(&self, mode: GroupingMode) -> Result<(), Error> {
        if self.grouping_mode() == mode {
            return Ok(());
        }
        let node = Self::build(&self.ctx, mode)?;
        let old = std::mem::replace(&mut *self.node.write(), node);
        old.collapse();
        info!(?mode, "grouping mode changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rstest::rstest;

    use super::grouping_order;

    #[rstest]
    #[case::case_insensitive(Some("alice"), Some("Bob"), Ordering::Less)]
    #[case::equal_ignoring_case(Some("bob"), Some("BOB"), Ordering::Equal)]
    #[case::unnamed_last(None, Some("aaron"), Ordering::Greater)]
    #[case::named_first(Some("zed"), None, Ordering::Less)]
    #[case::both_unnamed(None, None, Ordering::Equal)]
    fn order(#[case] a: Option<&str>, #[case] b: Option<&str>, #[case] expected: Ordering) {
        assert_eq!(expected, grouping_order(a, b));
    }

    #[test]
    fn sorts_names() {
        let mut names = vec![Some("Bob"), None, Some("alice")];
        names.sort_by(|a, b| grouping_order(*a, *b));
        assert_eq!(vec![Some("alice"), Some("Bob"), None], names);
    }
}
