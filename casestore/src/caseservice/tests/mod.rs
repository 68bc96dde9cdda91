//! This contains test scenarios that a given [CaseService] needs to pass.
//! We use [rstest] and [rstest_reuse] to provide all services we want to test
//! against, and then apply this template to all test functions.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::*;
use rstest_reuse::{self, *};
use tempfile::TempDir;

use super::{CaseService, CaseSnapshot, MemoryCaseService};
use crate::caseservice;
use crate::fixtures::*;
use crate::model::{
    artifact_type_ids, ArtifactCategory, Content, ContentKind, FileExclusions, FileQuery,
    KnownStatus,
};
use crate::Error;

async fn json_case_service() -> Arc<dyn CaseService> {
    let tmpdir = TempDir::new().unwrap();
    let path = tmpdir.path().join("case.json");
    populated_snapshot().save(&path).await.unwrap();

    // the snapshot is read once, so the directory can go away afterwards.
    caseservice::from_addr(&format!("json://{}", path.to_str().unwrap()))
        .await
        .unwrap()
}

/// This produces a template, which will be applied to all individual test functions.
/// See https://github.com/la10736/rstest/issues/130#issuecomment-968864832
#[template]
#[rstest]
#[case::memory(Arc::new(populated_service()) as Arc<dyn CaseService>)]
#[case::json(json_case_service().await)]
pub fn case_services(#[case] case_service: Arc<dyn CaseService>) {}

#[apply(case_services)]
#[tokio::test]
async fn children_in_storage_order(case_service: Arc<dyn CaseService>) {
    let names: Vec<String> = case_service
        .get_children(ROOT_DIR_ID)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(vec!["A", "B", "."], names);

    // leaves have no children, but are known
    assert_eq!(Ok(vec![]), case_service.get_children(FILE_A_ID).await);
}

#[apply(case_services)]
#[tokio::test]
async fn children_of_unknown_parent(case_service: Arc<dyn CaseService>) {
    assert!(matches!(
        case_service.get_children(9999).await,
        Err(Error::InvalidRequest(_))
    ));
    assert_eq!(Ok(None), case_service.get_content(9999).await);
}

#[apply(case_services)]
#[tokio::test]
async fn unique_path(case_service: Arc<dyn CaseService>) {
    assert_eq!(
        "/disk.E01/vol1/A",
        case_service.get_unique_path(FILE_A_ID).await.unwrap()
    );
    assert_eq!(
        "/disk.E01",
        case_service.get_unique_path(IMAGE_ID).await.unwrap()
    );
}

#[apply(case_services)]
#[tokio::test]
async fn data_sources_and_hosts(case_service: Arc<dyn CaseService>) {
    let ids: Vec<_> = case_service
        .get_data_sources()
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(vec![IMAGE_ID, LOCAL_FILES_ID, MULTI_VOLUME_IMAGE_ID], ids);

    let ungrouped: Vec<_> = case_service
        .get_hosts_for_person(None)
        .await
        .unwrap()
        .iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(vec![HOST_SERVER_ID, HOST_UNNAMED_ID], ungrouped);

    let of_laptop: Vec<_> = case_service
        .get_data_sources_for_host(HOST_LAPTOP_ID)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(vec![MULTI_VOLUME_IMAGE_ID], of_laptop);

    assert_eq!(3, case_service.get_persons().await.unwrap().len());
}

#[apply(case_services)]
#[tokio::test]
async fn artifacts_filtered_and_limited(case_service: Arc<dyn CaseService>) {
    use artifact_type_ids::*;

    let type_ids: Vec<_> = case_service
        .get_artifact_types_in_use(ArtifactCategory::DataArtifact, None)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(vec![GEN_INFO, WEB_HISTORY, EMAIL_MSG], type_ids);

    let type_ids: Vec<_> = case_service
        .get_artifact_types_in_use(ArtifactCategory::AnalysisResult, Some(IMAGE_ID))
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(vec![KEYWORD_HIT], type_ids);

    assert_eq!(Ok(2), case_service.get_count_of_type(WEB_HISTORY, None).await);
    assert_eq!(
        Ok(1),
        case_service
            .get_count_of_type(WEB_HISTORY, Some(LOCAL_FILES_ID))
            .await
    );
    assert_eq!(
        1,
        case_service
            .get_artifacts_of_type(WEB_HISTORY, None, 1)
            .await
            .unwrap()
            .len()
    );
}

#[apply(case_services)]
#[tokio::test]
async fn tags(case_service: Arc<dyn CaseService>) {
    let names: Vec<_> = case_service
        .get_tag_names_in_use()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.display_name)
        .collect();
    assert_eq!(vec!["Notable Item", "Follow Up"], names);

    assert_eq!(
        1,
        case_service
            .get_content_tags(TAG_NOTABLE.id)
            .await
            .unwrap()
            .len()
    );
    assert!(case_service
        .get_content_tags(TAG_FOLLOW_UP.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        1,
        case_service
            .get_content_tags_for(FILE_A_ID)
            .await
            .unwrap()
            .len()
    );
}

#[apply(case_services)]
#[tokio::test]
async fn find_files(case_service: Arc<dyn CaseService>) {
    let images: Vec<_> = case_service
        .find_files(
            &FileQuery::Extensions(vec!["jpg".into(), "png".into()]),
            None,
            FileExclusions::default(),
            100,
        )
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(vec!["photo.JPG", "f0001.jpg"], images);

    let deleted: Vec<_> = case_service
        .find_files(&FileQuery::Deleted, None, FileExclusions::default(), 100)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(vec![DELETED_DOC_ID], deleted);
}

#[tokio::test]
async fn writes_are_visible() {
    let svc = MemoryCaseService::from_snapshot(CaseSnapshot::default());
    svc.add_person(crate::model::Person {
        id: 1,
        name: Some("Carol".into()),
    });
    svc.add_host(crate::model::Host {
        id: 2,
        name: None,
        person: None,
    });
    svc.set_host_person(2, Some(1)).unwrap();
    assert_eq!(1, svc.get_hosts_for_person(Some(1)).await.unwrap().len());

    assert!(matches!(
        svc.set_host_person(2, Some(77)),
        Err(Error::InvalidRequest(_))
    ));

    svc.remove_person(1);
    assert_eq!(1, svc.get_hosts_for_person(None).await.unwrap().len());
}

#[rstest]
#[case::nothing_excluded(FileExclusions::default(), vec![11, 12])]
#[case::known_excluded(FileExclusions { known: true, slack: false }, vec![13, 14])]
#[case::both_excluded(FileExclusions { known: true, slack: true }, vec![13])]
#[tokio::test]
async fn exclusions_apply_before_limit(
    #[case] exclude: FileExclusions,
    #[case] expected: Vec<crate::model::ObjectId>,
) {
    let svc = MemoryCaseService::from_snapshot(CaseSnapshot::default());
    svc.add_content(Content::new(10, "img", ContentKind::Image, None, 10));
    for (id, kind, known) in [
        (11, ContentKind::File, KnownStatus::Known),
        (12, ContentKind::File, KnownStatus::Known),
        (13, ContentKind::File, KnownStatus::Unknown),
        (14, ContentKind::SlackFile, KnownStatus::Unknown),
    ] {
        let mut file = Content::new(id, format!("f{id}"), kind, Some(10), 10);
        file.known = known;
        file.deleted = true;
        svc.add_content(file);
    }

    let found: Vec<_> = svc
        .find_files(&FileQuery::Deleted, None, exclude, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(expected, found);
}
