use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use casetree_casestore::caseservice::{CaseSnapshot, MemoryCaseService};
use casetree_casestore::fixtures::*;
use casetree_casestore::model::{
    artifact_type_ids, standard_artifact_type, Content, ContentKind, KnownStatus,
};

use super::{child_names, open_tree, populated_tree, test_config, walk};
use crate::config::{ArtifactCaps, ContentFilter, GroupingMode, TreeConfig};

fn config_with(data_sources_tree: ContentFilter, views_tree: ContentFilter) -> TreeConfig {
    TreeConfig {
        data_sources_tree,
        views_tree,
        ..test_config(GroupingMode::ByDataType)
    }
}

const SHOW_ALL: ContentFilter = ContentFilter {
    hide_known: false,
    hide_slack: false,
};
const HIDE_ALL: ContentFilter = ContentFilter {
    hide_known: true,
    hide_slack: true,
};

#[tokio::test]
async fn data_sources_skip_structure() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);

    let disk = walk(&root, &["Data Sources", "disk.E01"]).await;
    assert_eq!(vec!["A", "B", "."], child_names(&disk).await);
    let dot = walk(&root, &["Data Sources", "disk.E01", "."]).await;
    assert!(dot.is_leaf());

    let logical = walk(&root, &["Data Sources", "logical_files"]).await;
    assert_eq!(
        vec!["notes.txt", "photo.JPG", "$CarvedFiles"],
        child_names(&logical).await
    );
    let vol2 = walk(&root, &["Data Sources", "laptop.E01", "vol2"]).await;
    assert_eq!(vec!["Unallocated"], child_names(&vol2).await);
}

#[rstest]
#[case::shown(SHOW_ALL, &["deleted.doc", "known.exe", "known.exe-slack"])]
#[case::hidden(HIDE_ALL, &["deleted.doc"])]
#[case::only_slack_hidden(ContentFilter { hide_known: false, hide_slack: true }, &["deleted.doc", "known.exe"])]
#[tokio::test]
async fn data_sources_tree_filter(#[case] filter: ContentFilter, #[case] expected: &[&str]) {
    let (_case, root) = open_tree(
        Arc::new(populated_service()),
        config_with(filter, SHOW_ALL),
    );
    let users = walk(&root, &["Data Sources", "laptop.E01", "vol1", "Users"]).await;
    assert_eq!(expected, child_names(&users).await);
}

#[rstest]
#[case::images("Images", SHOW_ALL, &["photo.JPG", "f0001.jpg"])]
#[case::executables_shown("Executable", SHOW_ALL, &["known.exe"])]
#[case::executables_hidden("Executable", HIDE_ALL, &[])]
#[case::documents("Documents", HIDE_ALL, &["notes.txt", "deleted.doc"])]
#[tokio::test]
async fn file_types(#[case] category: &str, #[case] filter: ContentFilter, #[case] expected: &[&str]) {
    let (_case, root) = open_tree(
        Arc::new(populated_service()),
        config_with(SHOW_ALL, filter),
    );
    let node = walk(&root, &["Views", "File Types", category]).await;
    assert_eq!(expected, child_names(&node).await);
}

#[tokio::test]
async fn views() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);
    let views = walk(&root, &["Views"]).await;
    assert_eq!(vec!["File Types", "Deleted Files"], child_names(&views).await);

    let file_types = walk(&root, &["Views", "File Types"]).await;
    assert_eq!(
        vec!["Images", "Videos", "Audio", "Archives", "Documents", "Executable"],
        child_names(&file_types).await
    );

    let deleted = walk(&root, &["Views", "Deleted Files"]).await;
    assert_eq!(vec!["deleted.doc"], child_names(&deleted).await);
}

#[tokio::test]
async fn artifact_type_lists() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);

    // general info is never listed on its own
    let data = walk(&root, &["Data Artifacts"]).await;
    assert_eq!(
        vec!["E-Mail Messages (1)", "Web History (2)"],
        child_names(&data).await
    );

    let results = walk(&root, &["Analysis Results"]).await;
    assert_eq!(
        vec!["Interesting Items (2)", "Keyword Hits (1)"],
        child_names(&results).await
    );

    // both kinds of interesting hits below the one entry
    let interesting = walk(&root, &["Analysis Results", "Interesting Items"]).await;
    let ids: Vec<String> = interesting
        .expand()
        .await
        .unwrap()
        .iter()
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(vec!["102", "103"], ids);
}

#[tokio::test]
async fn artifact_cap() {
    let history = standard_artifact_type(artifact_type_ids::WEB_HISTORY).unwrap();
    let (_case, root) = open_tree(
        Arc::new(many_artifacts_service(history, 20_000)),
        test_config(GroupingMode::ByDataType),
    );

    let data = walk(&root, &["Data Artifacts"]).await;
    assert_eq!(vec!["Web History (20000)"], child_names(&data).await);

    let listed = walk(&root, &["Data Artifacts", "Web History"]).await;
    assert_eq!(2_000, listed.expand().await.unwrap().len());
}

/// Known deleted files come first in storage order and would fill the cap
/// on their own.
fn known_first_deleted_service() -> MemoryCaseService {
    let svc = MemoryCaseService::from_snapshot(CaseSnapshot::default());
    svc.add_content(Content::new(1, "img.E01", ContentKind::Image, None, 1));
    for (id, name, known) in [
        (2, "f2", KnownStatus::Known),
        (3, "f3", KnownStatus::Known),
        (4, "f4", KnownStatus::Unknown),
        (5, "f5", KnownStatus::Unknown),
    ] {
        let mut file = Content::new(id, name, ContentKind::File, Some(1), 1);
        file.known = known;
        file.deleted = true;
        svc.add_content(file);
    }
    svc
}

#[rstest]
#[case::known_hidden(HIDE_ALL, &["f4", "f5"])]
#[case::known_shown(SHOW_ALL, &["f2", "f3"])]
#[tokio::test]
async fn hidden_files_do_not_count_against_cap(
    #[case] views_tree: ContentFilter,
    #[case] expected: &[&str],
) {
    let config = TreeConfig {
        artifact_caps: ArtifactCaps {
            deleted_files: 2,
            ..Default::default()
        },
        ..config_with(SHOW_ALL, views_tree)
    };
    let (_case, root) = open_tree(Arc::new(known_first_deleted_service()), config);

    let deleted = walk(&root, &["Views", "Deleted Files"]).await;
    assert_eq!(expected, child_names(&deleted).await);
}

#[tokio::test]
async fn tags() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);

    let tags = walk(&root, &["Tags"]).await;
    assert_eq!(
        vec!["Follow Up (1)", "Notable Item (1)"],
        child_names(&tags).await
    );

    let notable = walk(&root, &["Tags", "Notable Item"]).await;
    assert_eq!(
        vec!["File Tags (1)", "Result Tags (0)"],
        child_names(&notable).await
    );

    let file_tags = walk(&root, &["Tags", "Notable Item", "File Tags"]).await;
    let tagged = file_tags.expand().await.unwrap();
    assert_eq!(vec!["A"], super::display_names(&tagged));
    assert!(tagged[0].is_leaf());
    assert!(tagged[0]
        .properties()
        .iter()
        .any(|p| p.name == "Comment" && p.value == "check this"));

    let result_tags = walk(&root, &["Tags", "Follow Up", "Result Tags"]).await;
    assert_eq!(vec!["Result 101"], child_names(&result_tags).await);
}

#[tokio::test]
async fn reports_and_accounts() {
    let (_case, root) = populated_tree(GroupingMode::ByDataType);

    let reports = walk(&root, &["Reports"]).await;
    assert_eq!(vec!["HTML Report"], child_names(&reports).await);

    let accounts = walk(&root, &["OS Accounts"]).await;
    assert_eq!(vec!["alice", "Administrator"], child_names(&accounts).await);
}

/// Every query fails: the tree still builds, with empty branches.
#[rstest]
#[case::by_data_type(GroupingMode::ByDataType, 7)]
#[case::by_person_host(GroupingMode::ByPersonHost, 1)]
#[tokio::test]
async fn storage_failure_degrades(#[case] mode: GroupingMode, #[case] top_level: usize) {
    let (_case, root) = open_tree(Arc::new(FailingCaseService), test_config(mode));

    let children = root.children().await.expect("must not fail");
    assert_eq!(top_level, children.len());

    for node in children.iter() {
        let below = node.expand().await.expect("must not fail");
        // only the static listings have anything in them
        for n in below.iter() {
            assert!(n.expand().await.is_ok());
        }
    }
}
