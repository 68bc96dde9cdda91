//! Scenarios over whole trees built on the fixture cases.
use std::sync::Arc;

use casetree_casestore::caseservice::CaseService;
use casetree_casestore::fixtures::populated_service;
use casetree_casestore::Case;

use crate::config::{GroupingMode, TreeConfig};
use crate::node::Node;
use crate::root::TreeRoot;

mod grouping;
mod lifecycle;
mod subtrees;

/// Annotations off, so nothing runs in the background unless a test asks.
pub(crate) fn test_config(grouping: GroupingMode) -> TreeConfig {
    TreeConfig {
        grouping,
        decoration_workers: 0,
        ..Default::default()
    }
}

pub(crate) fn open_tree(service: Arc<dyn CaseService>, config: TreeConfig) -> (Case, TreeRoot) {
    let case = Case::open("test", service);
    let root = TreeRoot::open(case.clone(), config).expect("root must build");
    (case, root)
}

pub(crate) fn populated_tree(grouping: GroupingMode) -> (Case, TreeRoot) {
    open_tree(Arc::new(populated_service()), test_config(grouping))
}

pub(crate) fn display_names(nodes: &[Arc<Node>]) -> Vec<String> {
    nodes.iter().map(|n| n.display_name()).collect()
}

/// Expands `node` and returns the child with the given stable name.
pub(crate) async fn child(node: &Node, name: &str) -> Arc<Node> {
    node.expand()
        .await
        .expect("must expand")
        .iter()
        .find(|n| n.name() == name)
        .cloned()
        .unwrap_or_else(|| panic!("no child named {name:?} below {:?}", node.name()))
}

/// Follows a path of stable names from the root.
pub(crate) async fn walk(root: &TreeRoot, path: &[&str]) -> Arc<Node> {
    let mut node = root.node();
    for name in path {
        node = child(&node, name).await;
    }
    node
}

pub(crate) async fn child_names(node: &Node) -> Vec<String> {
    display_names(&node.expand().await.expect("must expand"))
}
