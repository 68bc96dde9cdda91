//! Background annotation of nodes that are already shown.
//!
//! Each annotated node owns a [Decoration]. Dropping it (the node went
//! away) aborts the task, so results never land on a stale node.
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{instrument, trace, warn};

use casetree_casestore::model::{Content, ObjectId};
use casetree_casestore::Case;

/// What is known about a content object beyond its own record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Display names of the tags applied, sorted, without duplicates.
    pub tags: Vec<String>,
    /// Whether any of the tags carries a comment.
    pub has_comment: bool,
    /// Number of artifacts derived from the object.
    pub result_count: usize,
}

/// Spawns annotation tasks, at most `workers` at a time.
#[derive(Clone)]
pub struct Decorator {
    case: Case,
    permits: Option<Arc<Semaphore>>,
}

impl Decorator {
    /// With `workers == 0` nothing is ever annotated.
    pub fn new(case: Case, workers: usize) -> Self {
        Self {
            case,
            permits: (workers > 0).then(|| Arc::new(Semaphore::new(workers))),
        }
    }

    /// Starts annotating a content object. Returns None when annotations
    /// are disabled or there's no runtime to run on.
    pub fn decorate(&self, content: &Content) -> Option<Decoration> {
        let permits = self.permits.clone()?;
        let runtime = tokio::runtime::Handle::try_current().ok()?;

        let (tx, rx) = watch::channel(None);
        let case = self.case.clone();
        let id = content.id;

        let handle = runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if let Some(annotations) = annotate(&case, id).await {
                // nobody listening is fine, the value is kept
                tx.send_replace(Some(annotations));
            }
        });

        Some(Decoration { rx, handle })
    }
}

#[instrument(skip(case))]
async fn annotate(case: &Case, id: ObjectId) -> Option<Annotations> {
    // the case might have been closed while we waited for a permit
    let Ok(service) = case.service() else {
        trace!("case closed, not annotating");
        return None;
    };

    let tags = match service.get_content_tags_for(id).await {
        Ok(tags) => tags,
        Err(e) => {
            warn!(err = %e, "unable to get tags");
            return None;
        }
    };
    let result_count = match service.get_artifacts_for_content(id).await {
        Ok(artifacts) => artifacts.len(),
        Err(e) => {
            warn!(err = %e, "unable to get results");
            return None;
        }
    };

    let has_comment = tags
        .iter()
        .any(|t| t.comment.as_deref().is_some_and(|c| !c.is_empty()));
    let mut names: Vec<String> = tags.into_iter().map(|t| t.tag_name.display_name).collect();
    names.sort();
    names.dedup();

    Some(Annotations {
        tags: names,
        has_comment,
        result_count,
    })
}

/// A running or finished annotation task, owned by its node.
pub struct Decoration {
    rx: watch::Receiver<Option<Annotations>>,
    handle: JoinHandle<()>,
}

impl Decoration {
    /// The annotations, once the task finished.
    pub fn get(&self) -> Option<Annotations> {
        self.rx.borrow().clone()
    }

    /// Notifies when the annotations arrive.
    pub fn watch(&self) -> watch::Receiver<Option<Annotations>> {
        self.rx.clone()
    }
}

impl Drop for Decoration {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
