use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::caseservice::CaseService;
use crate::events::{CaseEvent, CaseEventBus};
use crate::Error;

/// An open case: the store handle plus the notifications about it.
///
/// Cloning is cheap, all clones refer to the same case.
#[derive(Clone)]
pub struct Case {
    inner: Arc<CaseInner>,
}

struct CaseInner {
    name: String,
    service: Arc<dyn CaseService>,
    events: CaseEventBus,
    open: AtomicBool,
}

impl Case {
    pub fn open(name: impl Into<String>, service: Arc<dyn CaseService>) -> Self {
        let name = name.into();
        info!(case.name = %name, "opened case");
        Self {
            inner: Arc::new(CaseInner {
                name,
                service,
                events: CaseEventBus::default(),
                open: AtomicBool::new(true),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    pub fn events(&self) -> &CaseEventBus {
        &self.inner.events
    }

    pub fn publish(&self, event: CaseEvent) {
        self.inner.events.publish(event)
    }

    /// The store handle, for callers that must not act on a closed case.
    pub fn service(&self) -> Result<&Arc<dyn CaseService>, Error> {
        if !self.is_open() {
            return Err(Error::NoCurrentCase);
        }
        Ok(&self.inner.service)
    }

    /// Marks the case closed and tells every listener. Closing twice is a
    /// no-op.
    pub fn close(&self) {
        if self.inner.open.swap(false, Ordering::AcqRel) {
            info!(case.name = %self.inner.name, "closing case");
            self.inner
                .events
                .publish(CaseEvent::CurrentCaseChanged { open: false });
        }
    }
}

impl std::fmt::Debug for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.inner.name)
            .field("open", &self.is_open())
            .finish()
    }
}
