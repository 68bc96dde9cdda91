use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;

use casetree_casestore::caseservice::MemoryCaseService;
use casetree_casestore::fixtures::*;
use casetree_casestore::model::Person;
use casetree_casestore::CaseEvent;

use super::{child_names, open_tree, populated_tree, test_config, walk};
use crate::config::GroupingMode;
use crate::key::{Key, TreeItem};

#[rstest]
#[case::by_data_type(
    GroupingMode::ByDataType,
    &["Data Sources", "Views", "Data Artifacts", "Analysis Results", "OS Accounts", "Tags", "Reports"]
)]
#[case::by_person_host(
    GroupingMode::ByPersonHost,
    &["alice", "Bob", "Unnamed Person", "Unknown Persons", "Reports"]
)]
#[tokio::test]
async fn top_level(#[case] mode: GroupingMode, #[case] expected: &[&str]) {
    let (_case, root) = populated_tree(mode);
    assert_eq!(expected, child_names(&root.node()).await);
}

#[tokio::test]
async fn persons_sorted_unnamed_last() {
    let (_case, root) = populated_tree(GroupingMode::ByPersonHost);
    let persons: Vec<Option<String>> = root
        .children()
        .await
        .unwrap()
        .iter()
        .filter_map(|n| match n.key() {
            Key::Item(TreeItem::PersonGroup(Some(p))) => Some(p.name.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(
        vec![Some("alice".to_string()), Some("Bob".to_string()), None],
        persons
    );
}

#[tokio::test]
async fn hosts_and_data_source_groups() {
    let (_case, root) = populated_tree(GroupingMode::ByPersonHost);

    let ungrouped = walk(&root, &["Unknown Persons"]).await;
    assert_eq!(vec!["Server", "Unnamed Host"], child_names(&ungrouped).await);

    let group = walk(&root, &["alice", "laptop", "laptop.E01"]).await;
    assert_eq!(
        vec![
            "laptop.E01",
            "Views",
            "Data Artifacts",
            "Analysis Results",
            "OS Accounts"
        ],
        child_names(&group).await
    );

    // everything below the group is restricted to its data source
    let results = walk(&root, &["alice", "laptop", "laptop.E01", "Analysis Results"]).await;
    assert_eq!(vec!["Interesting Items (2)"], child_names(&results).await);
    let accounts = walk(&root, &["alice", "laptop", "laptop.E01", "OS Accounts"]).await;
    assert_eq!(vec!["alice"], child_names(&accounts).await);
    let data = walk(&root, &["alice", "laptop", "laptop.E01", "Data Artifacts"]).await;
    assert!(child_names(&data).await.is_empty());

    // the data source itself is browsable as usual
    let image = walk(&root, &["alice", "laptop", "laptop.E01", "laptop.E01"]).await;
    assert_eq!(vec!["vol1", "vol2"], child_names(&image).await);
}

#[tokio::test]
async fn hosts_without_persons() {
    let service = populated_service();
    for id in [PERSON_BOB_ID, PERSON_UNNAMED_ID, PERSON_ALICE_ID] {
        service.remove_person(id);
    }
    let (_case, root) = open_tree(
        Arc::new(service),
        test_config(GroupingMode::ByPersonHost),
    );

    assert_eq!(
        vec!["laptop", "Server", "workstation", "Unnamed Host", "Reports"],
        child_names(&root.node()).await
    );
}

#[tokio::test]
async fn no_ungrouped_bucket_when_every_host_has_a_person() {
    let service = populated_service();
    service.remove_host(HOST_SERVER_ID);
    service.remove_host(HOST_UNNAMED_ID);
    let (_case, root) = open_tree(
        Arc::new(service),
        test_config(GroupingMode::ByPersonHost),
    );

    assert_eq!(
        vec!["alice", "Bob", "Unnamed Person", "Reports"],
        child_names(&root.node()).await
    );
}

#[tokio::test]
async fn empty_case_by_person_host() {
    let (_case, root) = open_tree(
        Arc::new(MemoryCaseService::default()),
        test_config(GroupingMode::ByPersonHost),
    );
    assert_eq!(vec!["Reports"], child_names(&root.node()).await);
}

#[tokio::test]
async fn switching_mode_rebuilds() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);
    let old = root.node();
    let data_sources = walk(&root, &["Data Sources"]).await;
    data_sources.expand().await.unwrap();

    // same mode, nothing happens
    root.set_grouping_mode(GroupingMode::ByDataType).unwrap();
    assert!(Arc::ptr_eq(&old, &root.node()));

    root.set_grouping_mode(GroupingMode::ByPersonHost).unwrap();
    assert_eq!(GroupingMode::ByPersonHost, root.grouping_mode());
    assert!(!Arc::ptr_eq(&old, &root.node()));
    assert!(old.children().is_none(), "old tree must be collapsed");
    assert!(data_sources.children().is_none());

    assert_eq!(
        vec!["alice", "Bob", "Unnamed Person", "Unknown Persons", "Reports"],
        child_names(&root.node()).await
    );
}

#[tokio::test(start_paused = true)]
async fn person_added() {
    let service = Arc::new(populated_service());
    let (case, root) = open_tree(service.clone(), test_config(GroupingMode::ByPersonHost));
    let before = root.children().await.unwrap();

    service.add_person(Person {
        id: 210,
        name: Some("carol".into()),
    });
    case.publish(CaseEvent::PersonsAdded(vec![210]));
    tokio::time::sleep(Duration::from_secs(6)).await;

    let after = root.children().await.unwrap();
    assert_eq!(
        vec!["alice", "Bob", "carol", "Unnamed Person", "Unknown Persons", "Reports"],
        super::display_names(&after)
    );
    assert!(Arc::ptr_eq(&before[0], &after[0]));
}
