//! Terminal node builders: map every key to its node.
//!
//! Both builders override every branch of their visitor family. Reaching
//! `default_visit` means a key from the other family, which is a bug in the
//! calling factory and reported as [Error::UnhandledKey].
use casetree_casestore::model::{
    artifact_type_ids, Artifact, ArtifactCategory, ArtifactTag, ArtifactType, Content,
    ContentTag, DataSourceFilter, FileQuery, Host, KnownStatus, OsAccount, Person, Report,
    TagName,
};

use crate::config::{ContentFilter, GroupingMode};
use crate::context::TreeContext;
use crate::factories::{
    ArtifactTagsChildren, ArtifactTypesChildren, ArtifactsChildren, ContentChildren,
    ContentTagsChildren, DataSourceGroupChildren, DataSourcesChildren, FileTypesChildren,
    FilesChildren, HostDataSourcesChildren, OsAccountsChildren, PersonHostsChildren,
    ReportsChildren, TagNamesChildren, TagTypesChildren, ViewsChildren,
};
use crate::key::{FileTypeCategory, Key, TreeItem};
use crate::node::{Node, NodeKind};
use crate::root::RootChildren;
use crate::visitor::{ContentKindName, ContentVisitor, EntityRef, ItemVisitor, MayHaveChildren};
use crate::Error;

pub const UNKNOWN_PERSONS: &str = "Unknown Persons";
pub const UNNAMED_PERSON: &str = "Unnamed Person";
pub const UNNAMED_HOST: &str = "Unnamed Host";

/// Builds the node for a content object or artifact.
pub struct ContentNodeBuilder {
    ctx: TreeContext,
    filter: ContentFilter,
}

impl ContentNodeBuilder {
    /// `filter` is passed on to the children of the nodes built.
    pub fn new(ctx: TreeContext, filter: ContentFilter) -> Self {
        Self { ctx, filter }
    }

    fn content_node(&self, c: &Content, icon: &'static str, item_type: &str) -> Node {
        let mut node = Node::new(self.ctx.clone(), c.clone().into(), c.kind.into(), &c.name)
            .with_icon(icon)
            .with_item_type(item_type)
            .with_property("Name", &c.name)
            .with_property("Type", ContentKindName.visit_content(c));

        if c.kind.is_file_like() {
            node = node
                .with_property("Size", c.size)
                .with_property("Known", known_label(c.known))
                .with_decoration(self.ctx.decorator().decorate(c));
        }
        if MayHaveChildren.visit_content(c) {
            node = node.with_children(ContentChildren::new(
                self.ctx.clone(),
                c.clone(),
                self.filter,
            ));
        }
        node
    }

    fn file_node(&self, c: &Content, icon: &'static str) -> Node {
        let icon = if c.deleted {
            "images/file-icon-deleted.png"
        } else {
            icon
        };
        self.content_node(c, icon, "AbstractFile")
    }
}

fn known_label(known: KnownStatus) -> &'static str {
    match known {
        KnownStatus::Unknown => "unknown",
        KnownStatus::Known => "known",
        KnownStatus::Notable => "notable",
    }
}

impl ContentVisitor for ContentNodeBuilder {
    type Output = Result<Node, Error>;

    fn default_visit(&mut self, entity: EntityRef<'_>) -> Self::Output {
        let key = match entity {
            EntityRef::Content(c) => Key::from(c.clone()),
            EntityRef::Artifact(a) => Key::Entity(a.clone().into()),
        };
        Err(unhandled("ContentNodeBuilder", &key))
    }

    fn visit_image(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/hard-drive-icon.jpg", "Image"))
    }
    fn visit_volume_system(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/vs-icon.png", "VolumeSystem"))
    }
    fn visit_volume(&mut self, c: &Content) -> Self::Output {
        let node = self.content_node(c, "images/vol-icon.png", "Volume");
        Ok(if c.name.is_empty() {
            node.with_display_name(format!("vol{}", c.id))
        } else {
            node
        })
    }
    fn visit_pool(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/pool-icon.png", "Pool"))
    }
    fn visit_file_system(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/fs-icon.png", "FileSystem"))
    }
    fn visit_directory(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/Folder-icon.png"))
    }
    fn visit_file(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/file-icon.png"))
    }
    fn visit_layout_file(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/carved-file-x-icon-16.png"))
    }
    fn visit_derived_file(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/file-icon.png"))
    }
    fn visit_local_file(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/file-icon.png"))
    }
    fn visit_virtual_directory(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/folder-icon-virtual.png"))
    }
    fn visit_local_directory(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/Folder-icon.png"))
    }
    fn visit_slack_file(&mut self, c: &Content) -> Self::Output {
        Ok(self.file_node(c, "images/file-icon.png"))
    }
    fn visit_local_files_data_source(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/fileset-icon-16.png", "LocalFilesDataSource"))
    }
    fn visit_unsupported(&mut self, c: &Content) -> Self::Output {
        Ok(self.content_node(c, "images/warning16.png", "UnsupportedContent"))
    }

    fn visit_artifact(&mut self, a: &Artifact) -> Self::Output {
        let display_name = a
            .attributes
            .first()
            .map(|attr| attr.value.clone())
            .unwrap_or_else(|| format!("{} {}", a.artifact_type.display_name, a.id));

        let mut node = Node::new(
            self.ctx.clone(),
            Key::Entity(a.clone().into()),
            NodeKind::Artifact,
            a.id.to_string(),
        )
        .with_display_name(display_name)
        .with_icon(artifact_type_icon(&a.artifact_type))
        .with_item_type(format!("Artifact:{}", a.artifact_type.name))
        .with_property("Type", &a.artifact_type.display_name)
        .with_property("Source", a.source)
        .with_property("Data Source", a.data_source);
        for attr in &a.attributes {
            node = node.with_property("Attribute", format!("{}: {}", attr.name, attr.value));
        }
        Ok(node)
    }
}

pub fn artifact_type_icon(artifact_type: &ArtifactType) -> &'static str {
    match artifact_type.id {
        artifact_type_ids::KEYWORD_HIT => "images/keyword_hits.png",
        artifact_type_ids::HASHSET_HIT => "images/hashset_hits.png",
        artifact_type_ids::INTERESTING_FILE_HIT | artifact_type_ids::INTERESTING_ARTIFACT_HIT => {
            "images/interesting_item.png"
        }
        artifact_type_ids::WEB_HISTORY => "images/history.png",
        artifact_type_ids::WEB_BOOKMARK => "images/bookmarks.png",
        artifact_type_ids::WEB_COOKIE => "images/cookies.png",
        artifact_type_ids::WEB_DOWNLOAD => "images/downloads.png",
        artifact_type_ids::EMAIL_MSG => "images/mail-icon-16.png",
        artifact_type_ids::ACCOUNT => "images/accounts.png",
        _ => "images/artifact-icon.png",
    }
}

/// Builds the node for a tree item.
pub struct ItemNodeBuilder {
    ctx: TreeContext,
}

impl ItemNodeBuilder {
    pub fn new(ctx: TreeContext) -> Self {
        Self { ctx }
    }

    fn header(&self, item: TreeItem, kind: NodeKind, name: &str, icon: &'static str) -> Node {
        Node::new(self.ctx.clone(), item.into(), kind, name)
            .with_icon(icon)
            .with_item_type(name)
    }
}

pub fn person_display_name(person: Option<&Person>) -> &str {
    match person {
        None => UNKNOWN_PERSONS,
        Some(p) => p.name.as_deref().unwrap_or(UNNAMED_PERSON),
    }
}

pub fn host_display_name(host: &Host) -> &str {
    host.name.as_deref().unwrap_or(UNNAMED_HOST)
}

impl ItemVisitor for ItemNodeBuilder {
    type Output = Result<Node, Error>;

    fn default_visit(&mut self, item: &TreeItem) -> Self::Output {
        Err(unhandled("ItemNodeBuilder", &Key::Item(item.clone())))
    }

    fn visit_root(&mut self, mode: GroupingMode) -> Self::Output {
        Ok(self
            .header(TreeItem::Root(mode), NodeKind::Root, "Root", "images/case.png")
            .with_children(RootChildren::new(self.ctx.clone(), mode)))
    }

    fn visit_data_sources(&mut self) -> Self::Output {
        Ok(self
            .header(
                TreeItem::DataSources,
                NodeKind::DataSources,
                "Data Sources",
                "images/image.png",
            )
            .with_children(DataSourcesChildren::new(self.ctx.clone())))
    }

    fn visit_views(&mut self, filter: DataSourceFilter) -> Self::Output {
        Ok(self
            .header(
                TreeItem::Views(filter),
                NodeKind::Views,
                "Views",
                "images/views.png",
            )
            .with_children(ViewsChildren::new(self.ctx.clone(), filter)))
    }

    fn visit_file_types(&mut self, filter: DataSourceFilter) -> Self::Output {
        Ok(self
            .header(
                TreeItem::FileTypes(filter),
                NodeKind::FileTypes,
                "File Types",
                "images/file_types.png",
            )
            .with_children(FileTypesChildren::new(self.ctx.clone(), filter)))
    }

    fn visit_file_type_category(
        &mut self,
        category: FileTypeCategory,
        filter: DataSourceFilter,
    ) -> Self::Output {
        let query = FileQuery::Extensions(
            category
                .extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        );
        let cap = self.ctx.config().artifact_caps.files_by_type;
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::FileTypeCategory(category, filter).into(),
            NodeKind::FileTypeCategory,
            category.display_name(),
        )
        .with_icon("images/file-filter-icon.png")
        .with_item_type("FileTypeCategory")
        .with_property("Extensions", category.extensions().join(", "))
        .with_children(FilesChildren::new(self.ctx.clone(), query, filter, cap)))
    }

    fn visit_deleted_files(&mut self, filter: DataSourceFilter) -> Self::Output {
        let cap = self.ctx.config().artifact_caps.deleted_files;
        Ok(self
            .header(
                TreeItem::DeletedFiles(filter),
                NodeKind::DeletedFiles,
                "Deleted Files",
                "images/file-icon-deleted.png",
            )
            .with_children(FilesChildren::new(
                self.ctx.clone(),
                FileQuery::Deleted,
                filter,
                cap,
            )))
    }

    fn visit_data_artifacts(&mut self, filter: DataSourceFilter) -> Self::Output {
        Ok(self
            .header(
                TreeItem::DataArtifacts(filter),
                NodeKind::DataArtifacts,
                "Data Artifacts",
                "images/extracted_content.png",
            )
            .with_item_type("ArtifactCategory")
            .with_children(ArtifactTypesChildren::new(
                self.ctx.clone(),
                ArtifactCategory::DataArtifact,
                filter,
            )))
    }

    fn visit_analysis_results(&mut self, filter: DataSourceFilter) -> Self::Output {
        Ok(self
            .header(
                TreeItem::AnalysisResults(filter),
                NodeKind::AnalysisResults,
                "Analysis Results",
                "images/analysis_result.png",
            )
            .with_item_type("ArtifactCategory")
            .with_children(ArtifactTypesChildren::new(
                self.ctx.clone(),
                ArtifactCategory::AnalysisResult,
                filter,
            )))
    }

    fn visit_artifact_type(
        &mut self,
        artifact_type: &ArtifactType,
        filter: DataSourceFilter,
    ) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::ArtifactType {
                artifact_type: artifact_type.clone(),
                filter,
            }
            .into(),
            NodeKind::ArtifactType,
            &artifact_type.display_name,
        )
        .with_icon(artifact_type_icon(artifact_type))
        .with_item_type("ArtifactType")
        .with_property("Type", &artifact_type.name)
        .with_children(ArtifactsChildren::new(
            self.ctx.clone(),
            artifact_type.clone(),
            filter,
        )))
    }

    fn visit_os_accounts(&mut self, filter: DataSourceFilter) -> Self::Output {
        Ok(self
            .header(
                TreeItem::OsAccounts(filter),
                NodeKind::OsAccounts,
                "OS Accounts",
                "images/os-account.png",
            )
            .with_children(OsAccountsChildren::new(self.ctx.clone(), filter)))
    }

    fn visit_os_account(&mut self, account: &OsAccount) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::OsAccount(account.clone()).into(),
            NodeKind::OsAccount,
            &account.login_name,
        )
        .with_icon("images/os-account.png")
        .with_item_type("OsAccount")
        .with_property("Login Name", &account.login_name)
        .with_property("Data Source", account.data_source))
    }

    fn visit_tags(&mut self) -> Self::Output {
        Ok(self
            .header(
                TreeItem::Tags,
                NodeKind::Tags,
                "Tags",
                "images/tag-folder-blue-icon-16.png",
            )
            .with_children(TagNamesChildren::new(self.ctx.clone())))
    }

    fn visit_tag_name(&mut self, tag_name: &TagName) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::TagName(tag_name.clone()).into(),
            NodeKind::TagName,
            &tag_name.display_name,
        )
        .with_icon("images/tag-folder-blue-icon-16.png")
        .with_item_type("TagName")
        .with_children(TagTypesChildren::new(self.ctx.clone(), tag_name.clone())))
    }

    fn visit_content_tags(&mut self, tag_name: &TagName) -> Self::Output {
        Ok(self
            .header(
                TreeItem::ContentTags(tag_name.clone()),
                NodeKind::ContentTags,
                "File Tags",
                "images/tag-folder-blue-icon-16.png",
            )
            .with_item_type("TagType")
            .with_children(ContentTagsChildren::new(self.ctx.clone(), tag_name.clone())))
    }

    fn visit_artifact_tags(&mut self, tag_name: &TagName) -> Self::Output {
        Ok(self
            .header(
                TreeItem::ArtifactTags(tag_name.clone()),
                NodeKind::ArtifactTags,
                "Result Tags",
                "images/tag-folder-blue-icon-16.png",
            )
            .with_item_type("TagType")
            .with_children(ArtifactTagsChildren::new(self.ctx.clone(), tag_name.clone())))
    }

    fn visit_content_tag(&mut self, tag: &ContentTag) -> Self::Output {
        let mut node = Node::new(
            self.ctx.clone(),
            TreeItem::ContentTag(tag.clone()).into(),
            NodeKind::ContentTag,
            tag.id.to_string(),
        )
        .with_display_name(format!("File {}", tag.content))
        .with_icon("images/blue-tag-icon-16.png")
        .with_item_type("ContentTag")
        .with_property("Tag", &tag.tag_name.display_name)
        .with_property("File", tag.content);
        if let Some(comment) = &tag.comment {
            node = node.with_property("Comment", comment);
        }
        Ok(node)
    }

    fn visit_artifact_tag(&mut self, tag: &ArtifactTag) -> Self::Output {
        let mut node = Node::new(
            self.ctx.clone(),
            TreeItem::ArtifactTag(tag.clone()).into(),
            NodeKind::ArtifactTag,
            tag.id.to_string(),
        )
        .with_display_name(format!("Result {}", tag.artifact))
        .with_icon("images/green-tag-icon-16.png")
        .with_item_type("ArtifactTag")
        .with_property("Tag", &tag.tag_name.display_name)
        .with_property("Result", tag.artifact);
        if let Some(comment) = &tag.comment {
            node = node.with_property("Comment", comment);
        }
        Ok(node)
    }

    fn visit_reports(&mut self) -> Self::Output {
        Ok(self
            .header(
                TreeItem::Reports,
                NodeKind::Reports,
                "Reports",
                "images/report_16.png",
            )
            .with_children(ReportsChildren::new(self.ctx.clone())))
    }

    fn visit_report(&mut self, report: &Report) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::Report(report.clone()).into(),
            NodeKind::Report,
            &report.name,
        )
        .with_icon("images/report_16.png")
        .with_item_type("Report")
        .with_property("Path", &report.path))
    }

    fn visit_person_group(&mut self, person: Option<&Person>) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::PersonGroup(person.cloned()).into(),
            NodeKind::PersonGroup,
            person_display_name(person),
        )
        .with_icon("images/person.png")
        .with_item_type("Person")
        .with_children(PersonHostsChildren::new(
            self.ctx.clone(),
            person.map(|p| p.id),
        )))
    }

    fn visit_host(&mut self, host: &Host) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::Host(host.clone()).into(),
            NodeKind::Host,
            host_display_name(host),
        )
        .with_icon("images/host.png")
        .with_item_type("Host")
        .with_children(HostDataSourcesChildren::new(self.ctx.clone(), host.id)))
    }

    fn visit_data_source_group(&mut self, data_source: &Content) -> Self::Output {
        Ok(Node::new(
            self.ctx.clone(),
            TreeItem::DataSourceGroup(data_source.clone()).into(),
            NodeKind::DataSourceGroup,
            &data_source.name,
        )
        .with_icon("images/image.png")
        .with_item_type("DataSourceGroup")
        .with_children(DataSourceGroupChildren::new(
            self.ctx.clone(),
            data_source.clone(),
        )))
    }
}

/// Builds the node for any key.
pub fn build_node(ctx: &TreeContext, filter: ContentFilter, key: &Key) -> Result<Node, Error> {
    match key {
        Key::Entity(entity) => ContentNodeBuilder::new(ctx.clone(), filter).visit_entity(entity),
        Key::Item(item) => ItemNodeBuilder::new(ctx.clone()).visit_item(item),
    }
}

fn unhandled(builder: &'static str, key: &Key) -> Error {
    Error::UnhandledKey {
        builder,
        key: key.to_string(),
    }
}

/// Builds the node for an entity key. Tree items are rejected.
pub fn build_content_node(
    ctx: &TreeContext,
    filter: ContentFilter,
    key: &Key,
) -> Result<Node, Error> {
    match key {
        Key::Entity(entity) => ContentNodeBuilder::new(ctx.clone(), filter).visit_entity(entity),
        Key::Item(_) => Err(unhandled("ContentNodeBuilder", key)),
    }
}

/// Builds the node for a tree item key. Entities are rejected.
pub fn build_item_node(ctx: &TreeContext, key: &Key) -> Result<Node, Error> {
    match key {
        Key::Item(item) => ItemNodeBuilder::new(ctx.clone()).visit_item(item),
        Key::Entity(_) => Err(unhandled("ItemNodeBuilder", key)),
    }
}
