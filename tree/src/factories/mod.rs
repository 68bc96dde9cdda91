//! The [crate::children::ChildFactory] implementations, one per kind of
//! listing.
//!
//! Factories never fail on storage errors: a failed query is logged and the
//! listing shows what could be retrieved.
use tracing::warn;

mod artifacts;
mod content;
mod data_sources;
mod hosts;
mod os_accounts;
mod reports;
mod tags;
mod views;

pub use self::artifacts::{ArtifactTypesChildren, ArtifactsChildren};
pub use self::content::ContentChildren;
pub use self::data_sources::DataSourcesChildren;
pub use self::hosts::{DataSourceGroupChildren, HostDataSourcesChildren, PersonHostsChildren};
pub use self::os_accounts::OsAccountsChildren;
pub use self::reports::ReportsChildren;
pub use self::tags::{ArtifactTagsChildren, ContentTagsChildren, TagNamesChildren, TagTypesChildren};
pub use self::views::{FileTypesChildren, FilesChildren, ViewsChildren};

/// Unwraps a query result, or logs and returns the default.
pub(crate) fn or_empty<T: Default>(
    factory: &'static str,
    query: &'static str,
    res: Result<T, casetree_casestore::Error>,
) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            warn!(factory, query, err = %e, "query failed, showing nothing");
            T::default()
        }
    }
}
