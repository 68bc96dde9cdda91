use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use casetree_casestore::fixtures::*;
use casetree_casestore::model::{Content, ContentKind};
use casetree_casestore::CaseEvent;

use super::{child_names, open_tree, populated_tree, test_config, walk};
use crate::config::GroupingMode;

#[tokio::test(start_paused = true)]
async fn collapse_drops_subscription() {
    let (case, root) = populated_tree(GroupingMode::ByDataType);
    // the by-data-type top level doesn't listen
    root.children().await.unwrap();
    assert_eq!(0, case.events().receiver_count());

    let data_sources = walk(&root, &["Data Sources"]).await;
    data_sources.expand().await.unwrap();
    assert_eq!(1, case.events().receiver_count());
    assert!(data_sources.children().unwrap().is_subscribed());

    data_sources.collapse();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(0, case.events().receiver_count());

    // expanding again starts over
    assert_eq!(3, data_sources.expand().await.unwrap().len());
    assert_eq!(1, case.events().receiver_count());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_tree_releases_everything() {
    let (case, root) = populated_tree(GroupingMode::ByPersonHost);
    walk(&root, &["alice", "laptop"]).await.expand().await.unwrap();
    assert!(case.events().receiver_count() >= 3);

    drop(root);
    sleep(Duration::from_millis(1)).await;
    assert_eq!(0, case.events().receiver_count());
}

#[tokio::test(start_paused = true)]
async fn case_close_stops_bridges() {
    let service = Arc::new(populated_service());
    let (case, root) = open_tree(service.clone(), test_config(GroupingMode::ByDataType));
    let data_sources = walk(&root, &["Data Sources"]).await;
    let before = data_sources.expand().await.unwrap();

    service.add_content(Content::new(50, "phone.bin", ContentKind::Image, None, 50));
    case.publish(CaseEvent::DataSourceAdded { data_source: 50 });
    case.close();
    sleep(Duration::from_secs(10)).await;

    assert_eq!(0, case.events().receiver_count());
    // the pending refresh was dropped, the listing is as it was
    assert_eq!(before.len(), data_sources.children().unwrap().snapshot().len());

    // new listings of a closed case are empty, without error
    let reports = walk(&root, &["Reports"]).await;
    assert!(child_names(&reports).await.is_empty());
}

#[tokio::test]
async fn annotations_arrive_in_background() {
    let config = crate::config::TreeConfig {
        decoration_workers: 2,
        ..test_config(GroupingMode::ByDataType)
    };
    let (_case, root) = open_tree(Arc::new(populated_service()), config);
    let file_a = walk(&root, &["Data Sources", "disk.E01", "A"]).await;

    let mut rx = file_a.watch_annotations().expect("files are annotated");
    rx.wait_for(|a| a.is_some()).await.unwrap();

    let annotations = file_a.annotations().unwrap();
    assert_eq!(vec!["Notable Item".to_string()], annotations.tags);
    assert!(annotations.has_comment);
    assert_eq!(2, annotations.result_count);

    // headers have nothing to annotate
    assert!(walk(&root, &["Reports"]).await.annotations().is_none());
}
