//! The two dispatch families, one over stored entities and one over
//! synthetic tree items.
//!
//! Every `visit_*` method defaults to `default_visit`, so a visitor only
//! overrides what it cares about. The `visit_entity`/`visit_item` entry
//! points do the (exhaustive) dispatch.
use casetree_casestore::model::{
    Artifact, ArtifactTag, ArtifactType, Content, ContentKind, ContentTag, DataSourceFilter,
    Entity, Host, KnownStatus, OsAccount, Person, Report, TagName,
};

use crate::config::{ContentFilter, GroupingMode};
use crate::key::{FileTypeCategory, TreeItem};

/// A borrowed [Entity].
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Content(&'a Content),
    Artifact(&'a Artifact),
}

pub trait ContentVisitor {
    type Output;

    fn default_visit(&mut self, entity: EntityRef<'_>) -> Self::Output;

    fn visit_image(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_volume_system(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_volume(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_pool(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_file_system(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_directory(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_file(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_layout_file(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_derived_file(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_local_file(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_virtual_directory(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_local_directory(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_slack_file(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_local_files_data_source(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_unsupported(&mut self, c: &Content) -> Self::Output {
        self.default_visit(EntityRef::Content(c))
    }
    fn visit_artifact(&mut self, a: &Artifact) -> Self::Output {
        self.default_visit(EntityRef::Artifact(a))
    }

    fn visit_content(&mut self, c: &Content) -> Self::Output {
        match c.kind {
            ContentKind::Image => self.visit_image(c),
            ContentKind::VolumeSystem => self.visit_volume_system(c),
            ContentKind::Volume => self.visit_volume(c),
            ContentKind::Pool => self.visit_pool(c),
            ContentKind::FileSystem => self.visit_file_system(c),
            ContentKind::Directory => self.visit_directory(c),
            ContentKind::File => self.visit_file(c),
            ContentKind::LayoutFile => self.visit_layout_file(c),
            ContentKind::DerivedFile => self.visit_derived_file(c),
            ContentKind::LocalFile => self.visit_local_file(c),
            ContentKind::VirtualDirectory => self.visit_virtual_directory(c),
            ContentKind::LocalDirectory => self.visit_local_directory(c),
            ContentKind::SlackFile => self.visit_slack_file(c),
            ContentKind::LocalFilesDataSource => self.visit_local_files_data_source(c),
            ContentKind::Unsupported => self.visit_unsupported(c),
        }
    }

    fn visit_entity(&mut self, entity: &Entity) -> Self::Output {
        match entity {
            Entity::Content(c) => self.visit_content(c),
            Entity::Artifact(a) => self.visit_artifact(a),
        }
    }
}

pub trait ItemVisitor {
    type Output;

    fn default_visit(&mut self, item: &TreeItem) -> Self::Output;

    fn visit_root(&mut self, mode: GroupingMode) -> Self::Output {
        self.default_visit(&TreeItem::Root(mode))
    }
    fn visit_data_sources(&mut self) -> Self::Output {
        self.default_visit(&TreeItem::DataSources)
    }
    fn visit_views(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::Views(filter))
    }
    fn visit_file_types(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::FileTypes(filter))
    }
    fn visit_file_type_category(
        &mut self,
        category: FileTypeCategory,
        filter: DataSourceFilter,
    ) -> Self::Output {
        self.default_visit(&TreeItem::FileTypeCategory(category, filter))
    }
    fn visit_deleted_files(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::DeletedFiles(filter))
    }
    fn visit_data_artifacts(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::DataArtifacts(filter))
    }
    fn visit_analysis_results(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::AnalysisResults(filter))
    }
    fn visit_artifact_type(
        &mut self,
        artifact_type: &ArtifactType,
        filter: DataSourceFilter,
    ) -> Self::Output {
        self.default_visit(&TreeItem::ArtifactType {
            artifact_type: artifact_type.clone(),
            filter,
        })
    }
    fn visit_os_accounts(&mut self, filter: DataSourceFilter) -> Self::Output {
        self.default_visit(&TreeItem::OsAccounts(filter))
    }
    fn visit_os_account(&mut self, account: &OsAccount) -> Self::Output {
        self.default_visit(&TreeItem::OsAccount(account.clone()))
    }
    fn visit_tags(&mut self) -> Self::Output {
        self.default_visit(&TreeItem::Tags)
    }
    fn visit_tag_name(&mut self, tag_name: &TagName) -> Self::Output {
        self.default_visit(&TreeItem::TagName(tag_name.clone()))
    }
    fn visit_content_tags(&mut self, tag_name: &TagName) -> Self::Output {
        self.default_visit(&TreeItem::ContentTags(tag_name.clone()))
    }
    fn visit_artifact_tags(&mut self, tag_name: &TagName) -> Self::Output {
        self.default_visit(&TreeItem::ArtifactTags(tag_name.clone()))
    }
    fn visit_content_tag(&mut self, tag: &ContentTag) -> Self::Output {
        self.default_visit(&TreeItem::ContentTag(tag.clone()))
    }
    fn visit_artifact_tag(&mut self, tag: &ArtifactTag) -> Self::Output {
        self.default_visit(&TreeItem::ArtifactTag(tag.clone()))
    }
    fn visit_reports(&mut self) -> Self::Output {
        self.default_visit(&TreeItem::Reports)
    }
    fn visit_report(&mut self, report: &Report) -> Self::Output {
        self.default_visit(&TreeItem::Report(report.clone()))
    }
    fn visit_person_group(&mut self, person: Option<&Person>) -> Self::Output {
        self.default_visit(&TreeItem::PersonGroup(person.cloned()))
    }
    fn visit_host(&mut self, host: &Host) -> Self::Output {
        self.default_visit(&TreeItem::Host(host.clone()))
    }
    fn visit_data_source_group(&mut self, data_source: &Content) -> Self::Output {
        self.default_visit(&TreeItem::DataSourceGroup(data_source.clone()))
    }

    fn visit_item(&mut self, item: &TreeItem) -> Self::Output {
        match item {
            TreeItem::Root(mode) => self.visit_root(*mode),
            TreeItem::DataSources => self.visit_data_sources(),
            TreeItem::Views(filter) => self.visit_views(*filter),
            TreeItem::FileTypes(filter) => self.visit_file_types(*filter),
            TreeItem::FileTypeCategory(category, filter) => {
                self.visit_file_type_category(*category, *filter)
            }
            TreeItem::DeletedFiles(filter) => self.visit_deleted_files(*filter),
            TreeItem::DataArtifacts(filter) => self.visit_data_artifacts(*filter),
            TreeItem::AnalysisResults(filter) => self.visit_analysis_results(*filter),
            TreeItem::ArtifactType {
                artifact_type,
                filter,
            } => self.visit_artifact_type(artifact_type, *filter),
            TreeItem::OsAccounts(filter) => self.visit_os_accounts(*filter),
            TreeItem::OsAccount(account) => self.visit_os_account(account),
            TreeItem::Tags => self.visit_tags(),
            TreeItem::TagName(tag_name) => self.visit_tag_name(tag_name),
            TreeItem::ContentTags(tag_name) => self.visit_content_tags(tag_name),
            TreeItem::ArtifactTags(tag_name) => self.visit_artifact_tags(tag_name),
            TreeItem::ContentTag(tag) => self.visit_content_tag(tag),
            TreeItem::ArtifactTag(tag) => self.visit_artifact_tag(tag),
            TreeItem::Reports => self.visit_reports(),
            TreeItem::Report(report) => self.visit_report(report),
            TreeItem::PersonGroup(person) => self.visit_person_group(person.as_ref()),
            TreeItem::Host(host) => self.visit_host(host),
            TreeItem::DataSourceGroup(data_source) => self.visit_data_source_group(data_source),
        }
    }
}

/// Decides whether a content object is listed, given the hide-known and
/// hide-slack preferences of the subtree.
pub struct ShowContent {
    filter: ContentFilter,
}

impl ShowContent {
    pub fn new(filter: ContentFilter) -> Self {
        Self { filter }
    }

    fn shown_file(&self, c: &Content) -> bool {
        !(self.filter.hide_known && c.known == KnownStatus::Known)
    }
}

impl ContentVisitor for ShowContent {
    type Output = bool;

    fn default_visit(&mut self, _entity: EntityRef<'_>) -> bool {
        true
    }

    fn visit_file(&mut self, c: &Content) -> bool {
        self.shown_file(c)
    }
    fn visit_layout_file(&mut self, c: &Content) -> bool {
        self.shown_file(c)
    }
    fn visit_derived_file(&mut self, c: &Content) -> bool {
        self.shown_file(c)
    }
    fn visit_local_file(&mut self, c: &Content) -> bool {
        self.shown_file(c)
    }
    fn visit_directory(&mut self, c: &Content) -> bool {
        // "." and ".." carry the known status of their target
        c.is_dot_dir() || self.shown_file(c)
    }
    fn visit_slack_file(&mut self, c: &Content) -> bool {
        !self.filter.hide_slack && self.shown_file(c)
    }
}

/// Whether a node for the entity can ever have children.
pub struct MayHaveChildren;

impl ContentVisitor for MayHaveChildren {
    type Output = bool;

    fn default_visit(&mut self, entity: EntityRef<'_>) -> bool {
        match entity {
            EntityRef::Content(c) => !c.is_dot_dir(),
            EntityRef::Artifact(_) => false,
        }
    }

    fn visit_file(&mut self, _c: &Content) -> bool {
        false
    }
    fn visit_layout_file(&mut self, _c: &Content) -> bool {
        false
    }
    fn visit_derived_file(&mut self, _c: &Content) -> bool {
        false
    }
    fn visit_local_file(&mut self, _c: &Content) -> bool {
        false
    }
    fn visit_slack_file(&mut self, _c: &Content) -> bool {
        false
    }
    fn visit_unsupported(&mut self, _c: &Content) -> bool {
        false
    }
}

/// Human readable kind of an entity, shown in property sheets.
pub struct ContentKindName;

impl ContentVisitor for ContentKindName {
    type Output = &'static str;

    fn default_visit(&mut self, entity: EntityRef<'_>) -> &'static str {
        match entity {
            EntityRef::Content(_) => "File",
            EntityRef::Artifact(_) => "Result",
        }
    }

    fn visit_image(&mut self, _c: &Content) -> &'static str {
        "Image"
    }
    fn visit_volume_system(&mut self, _c: &Content) -> &'static str {
        "Volume System"
    }
    fn visit_volume(&mut self, _c: &Content) -> &'static str {
        "Volume"
    }
    fn visit_pool(&mut self, _c: &Content) -> &'static str {
        "Pool"
    }
    fn visit_file_system(&mut self, _c: &Content) -> &'static str {
        "File System"
    }
    fn visit_directory(&mut self, _c: &Content) -> &'static str {
        "Directory"
    }
    fn visit_virtual_directory(&mut self, _c: &Content) -> &'static str {
        "Virtual Directory"
    }
    fn visit_local_directory(&mut self, _c: &Content) -> &'static str {
        "Local Directory"
    }
    fn visit_local_files_data_source(&mut self, _c: &Content) -> &'static str {
        "Logical File Set"
    }
    fn visit_unsupported(&mut self, _c: &Content) -> &'static str {
        "Unsupported Content"
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ContentKindName, ContentVisitor, MayHaveChildren, ShowContent};
    use crate::config::ContentFilter;
    use casetree_casestore::model::{Content, ContentKind, Entity, KnownStatus};

    fn file(kind: ContentKind, known: KnownStatus) -> Content {
        let mut c = Content::new(1, "x.bin", kind, None, 1);
        c.known = known;
        c
    }

    #[rstest]
    #[case::nothing_hidden(false, false, ContentKind::File, KnownStatus::Known, true)]
    #[case::known_hidden(true, false, ContentKind::File, KnownStatus::Known, false)]
    #[case::notable_not_hidden(true, false, ContentKind::File, KnownStatus::Notable, true)]
    #[case::known_local_hidden(true, false, ContentKind::LocalFile, KnownStatus::Known, false)]
    #[case::slack_hidden(false, true, ContentKind::SlackFile, KnownStatus::Unknown, false)]
    #[case::slack_shown(false, false, ContentKind::SlackFile, KnownStatus::Unknown, true)]
    #[case::images_never_hidden(true, true, ContentKind::Image, KnownStatus::Known, true)]
    fn show_content(
        #[case] hide_known: bool,
        #[case] hide_slack: bool,
        #[case] kind: ContentKind,
        #[case] known: KnownStatus,
        #[case] expected: bool,
    ) {
        let mut v = ShowContent::new(ContentFilter {
            hide_known,
            hide_slack,
        });
        assert_eq!(expected, v.visit_content(&file(kind, known)));
    }

    #[test]
    fn may_have_children() {
        let dir = Content::new(1, "Users", ContentKind::Directory, None, 1);
        let dot = Content::new(2, "..", ContentKind::Directory, None, 1);
        let f = Content::new(3, "a.txt", ContentKind::File, None, 1);

        assert!(MayHaveChildren.visit_content(&dir));
        assert!(!MayHaveChildren.visit_content(&dot));
        assert!(!MayHaveChildren.visit_content(&f));
    }

    #[test]
    fn kind_names_go_through_entity() {
        let img = Entity::Content(Content::new(1, "disk", ContentKind::Image, None, 1));
        let derived = Entity::Content(Content::new(2, "d", ContentKind::DerivedFile, None, 1));
        assert_eq!("Image", ContentKindName.visit_entity(&img));
        // not overridden, handled by the fallback
        assert_eq!("File", ContentKindName.visit_entity(&derived));
    }
}
