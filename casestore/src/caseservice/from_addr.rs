use std::sync::Arc;

use url::Url;

use crate::Error;

use super::{CaseService, CaseSnapshot, MemoryCaseService};

/// Constructs a new instance of a [CaseService] from an URI.
///
/// The following URIs are supported:
/// - `memory:`
///   Uses an empty in-memory case.
/// - `json:///absolute/path/to/case.json`
///   Loads a case snapshot file into memory. The file is only read once,
///   later writes to it are not observed.
pub async fn from_addr(uri: &str) -> Result<Arc<dyn CaseService>, Error> {
    let url =
        Url::parse(uri).map_err(|e| Error::StorageError(format!("unable to parse url: {}", e)))?;

    let case_service: Arc<dyn CaseService> = match url.scheme() {
        "memory" => {
            // memory doesn't support host or path in the URL.
            if url.has_host() || !url.path().is_empty() {
                return Err(Error::StorageError("invalid url".to_string()));
            }
            Arc::new(MemoryCaseService::default())
        }
        "json" => {
            // A path is required, a host is not allowed.
            if url.has_host() {
                return Err(Error::StorageError("no host allowed".to_string()));
            }
            if url.path().is_empty() || url.path() == "/" {
                return Err(Error::StorageError("snapshot path missing".to_string()));
            }

            let snapshot = CaseSnapshot::load(url.path()).await?;
            Arc::new(MemoryCaseService::from_snapshot(snapshot))
        }
        _ => {
            return Err(Error::StorageError(format!(
                "unknown scheme: {}",
                url.scheme()
            )))
        }
    };
    Ok(case_service)
}
