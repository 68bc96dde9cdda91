use std::sync::Arc;

use casetree_casestore::caseservice::CaseService;
use casetree_casestore::Case;
use tracing::debug;

use crate::config::TreeConfig;
use crate::decoration::Decorator;
use crate::resolver::PathCache;

/// Everything the nodes of one tree share. Cloning is cheap.
#[derive(Clone)]
pub struct TreeContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    case: Case,
    config: TreeConfig,
    paths: PathCache,
    decorator: Decorator,
}

impl TreeContext {
    pub fn new(case: Case, config: TreeConfig) -> Self {
        let decorator = Decorator::new(case.clone(), config.decoration_workers);
        Self {
            inner: Arc::new(ContextInner {
                case,
                config,
                paths: PathCache::default(),
                decorator,
            }),
        }
    }

    pub fn case(&self) -> &Case {
        &self.inner.case
    }

    pub fn config(&self) -> &TreeConfig {
        &self.inner.config
    }

    pub fn paths(&self) -> &PathCache {
        &self.inner.paths
    }

    pub fn decorator(&self) -> &Decorator {
        &self.inner.decorator
    }

    /// The store, unless the case was closed in the meantime. Listings
    /// computed for a closed case are empty.
    pub fn service(&self) -> Option<Arc<dyn CaseService>> {
        match self.inner.case.service() {
            Ok(service) => Some(service.clone()),
            Err(e) => {
                debug!(err = %e, "not querying");
                None
            }
        }
    }
}
