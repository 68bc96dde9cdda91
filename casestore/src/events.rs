use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::model::{ArtifactCategory, ArtifactType, ObjectId};

/// Capacity of the event channel. Slow receivers that fall further behind
/// than this observe a lag instead of blocking publishers.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// A change to the case, published after the corresponding write became
/// visible through the [crate::caseservice::CaseService].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseEvent {
    DataSourceAdded { data_source: ObjectId },
    HostsAdded(Vec<ObjectId>),
    HostsRemoved(Vec<ObjectId>),
    HostsUpdated(Vec<ObjectId>),
    PersonsAdded(Vec<ObjectId>),
    PersonsRemoved(Vec<ObjectId>),
    PersonsUpdated(Vec<ObjectId>),
    HostsAddedToPerson { person: ObjectId, hosts: Vec<ObjectId> },
    HostsRemovedFromPerson { person: ObjectId, hosts: Vec<ObjectId> },
    ReportAdded { report: ObjectId },
    IngestJobCompleted { data_source: ObjectId },
    IngestJobCancelled { data_source: ObjectId },
    /// New artifacts of the given type were written.
    DataAdded { artifact_type: ArtifactType },
    ContentTagAdded { tag: ObjectId },
    ContentTagDeleted { tag: ObjectId },
    ArtifactTagAdded { tag: ObjectId },
    ArtifactTagDeleted { tag: ObjectId },
    /// `open` is false once the current case was closed.
    CurrentCaseChanged { open: bool },
}

impl CaseEvent {
    /// A stable name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CaseEvent::DataSourceAdded { .. } => "DATA_SOURCE_ADDED",
            CaseEvent::HostsAdded(_) => "HOSTS_ADDED",
            CaseEvent::HostsRemoved(_) => "HOSTS_DELETED",
            CaseEvent::HostsUpdated(_) => "HOSTS_UPDATED",
            CaseEvent::PersonsAdded(_) => "PERSONS_ADDED",
            CaseEvent::PersonsRemoved(_) => "PERSONS_DELETED",
            CaseEvent::PersonsUpdated(_) => "PERSONS_UPDATED",
            CaseEvent::HostsAddedToPerson { .. } => "HOSTS_ADDED_TO_PERSON",
            CaseEvent::HostsRemovedFromPerson { .. } => "HOSTS_REMOVED_FROM_PERSON",
            CaseEvent::ReportAdded { .. } => "REPORT_ADDED",
            CaseEvent::IngestJobCompleted { .. } => "INGEST_JOB_COMPLETED",
            CaseEvent::IngestJobCancelled { .. } => "INGEST_JOB_CANCELLED",
            CaseEvent::DataAdded { .. } => "DATA_ADDED",
            CaseEvent::ContentTagAdded { .. } => "CONTENT_TAG_ADDED",
            CaseEvent::ContentTagDeleted { .. } => "CONTENT_TAG_DELETED",
            CaseEvent::ArtifactTagAdded { .. } => "BLACKBOARD_ARTIFACT_TAG_ADDED",
            CaseEvent::ArtifactTagDeleted { .. } => "BLACKBOARD_ARTIFACT_TAG_DELETED",
            CaseEvent::CurrentCaseChanged { .. } => "CURRENT_CASE",
        }
    }

    /// Events that change the set of hosts, persons, or the mapping between
    /// them.
    pub fn is_host_or_person_change(&self) -> bool {
        matches!(
            self,
            CaseEvent::HostsAdded(_)
                | CaseEvent::HostsRemoved(_)
                | CaseEvent::HostsUpdated(_)
                | CaseEvent::PersonsAdded(_)
                | CaseEvent::PersonsRemoved(_)
                | CaseEvent::PersonsUpdated(_)
                | CaseEvent::HostsAddedToPerson { .. }
                | CaseEvent::HostsRemovedFromPerson { .. }
        )
    }

    pub fn is_ingest_job_end(&self) -> bool {
        matches!(
            self,
            CaseEvent::IngestJobCompleted { .. } | CaseEvent::IngestJobCancelled { .. }
        )
    }

    pub fn is_tag_change(&self) -> bool {
        matches!(
            self,
            CaseEvent::ContentTagAdded { .. }
                | CaseEvent::ContentTagDeleted { .. }
                | CaseEvent::ArtifactTagAdded { .. }
                | CaseEvent::ArtifactTagDeleted { .. }
        )
    }

    /// The category of the artifacts added, for [CaseEvent::DataAdded].
    pub fn added_category(&self) -> Option<ArtifactCategory> {
        match self {
            CaseEvent::DataAdded { artifact_type } => Some(artifact_type.category),
            _ => None,
        }
    }
}

/// Fan-out of [CaseEvent]s to any number of listeners.
///
/// Publishing never blocks. Publishing without any listener is not an error.
#[derive(Debug, Clone)]
pub struct CaseEventBus {
    tx: broadcast::Sender<CaseEvent>,
}

impl Default for CaseEventBus {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}

impl CaseEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: CaseEvent) {
        trace!(event = event.name(), "publishing case event");
        if self.tx.send(event).is_err() {
            debug!("no listeners for case event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers. Used to check listeners are not leaked.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
