//! The one mechanism every expandable node uses to turn a key listing into
//! nodes.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, instrument};

use casetree_casestore::CaseEvent;

use crate::bridge::{self, Refresher, Subscription};
use crate::context::TreeContext;
use crate::key::Key;
use crate::node::Node;
use crate::reconcile::{reconcile, Slot};
use crate::Error;

/// How a listing gets computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildrenMode {
    /// Computed as soon as the listing is attached, and kept current from
    /// case events. For small collections that change often.
    Keys,
    /// Computed on first access, and afterwards only on refresh. For large
    /// or expensive collections.
    Lazy,
}

/// Produces the keys of a listing and the node for each key.
#[async_trait]
pub trait ChildFactory: Send + Sync {
    /// A name for logs.
    fn name(&self) -> &'static str;

    fn mode(&self) -> ChildrenMode {
        ChildrenMode::Lazy
    }

    /// Computes the current keys, in display order. Storage failures are
    /// expected to be handled in here and show up as missing keys.
    async fn compute_keys(&self) -> Vec<Key>;

    /// Builds the node for a key. Fails for keys this factory doesn't know
    /// how to show.
    fn create_node(&self, key: &Key) -> Result<Node, Error>;

    /// Whether the listing needs to be recomputed after this event. A
    /// factory returning true for any event gets a listener attached.
    fn is_refresh_required(&self, _event: &CaseEvent) -> bool {
        false
    }

    /// Whether this factory reacts to events at all.
    fn listens(&self) -> bool {
        false
    }

    /// Called for nodes carried over by a refresh, to update what may have
    /// changed without changing the key (counts in display names).
    fn update_node(&self, _node: &Node) {}
}

#[derive(Default)]
struct State {
    entries: Vec<(Key, Arc<Node>)>,
    computed: bool,
}

/// The live listing of one expanded node.
pub struct Children {
    factory: Arc<dyn ChildFactory>,
    state: tokio::sync::Mutex<State>,
    /// Published listing, replaced in one step by each reconciliation.
    visible: RwLock<Arc<[Arc<Node>]>>,
    subscription: Mutex<Option<Subscription>>,
    disposed: AtomicBool,
}

impl Children {
    fn new(factory: Arc<dyn ChildFactory>) -> Self {
        Self {
            factory,
            state: Default::default(),
            visible: RwLock::new(Arc::from(Vec::new())),
            subscription: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Creates the listing for a factory, attaching a listener if the
    /// factory wants one. In [ChildrenMode::Keys] the keys are computed
    /// right away.
    #[instrument(skip_all, fields(factory = factory.name()), err)]
    pub async fn attach(
        factory: Arc<dyn ChildFactory>,
        ctx: &TreeContext,
    ) -> Result<Arc<Children>, Error> {
        let mode = factory.mode();
        let listens = factory.listens();
        let children = Arc::new(Children::new(factory));

        // a closed case publishes nothing anymore
        if listens && ctx.case().is_open() {
            let sub = bridge::subscribe(
                ctx.case(),
                Arc::downgrade(&children),
                ctx.config().refresh_interval,
            );
            *children.subscription.lock() = Some(sub);
        }

        if mode == ChildrenMode::Keys {
            children.nodes().await?;
        }
        Ok(children)
    }

    /// A listing without listener, computed on first access.
    pub fn detached(factory: Arc<dyn ChildFactory>) -> Arc<Children> {
        Arc::new(Children::new(factory))
    }

    pub fn factory_name(&self) -> &'static str {
        self.factory.name()
    }

    /// The listing, computing it first if this is the first access.
    pub async fn nodes(&self) -> Result<Arc<[Arc<Node>]>, Error> {
        {
            let mut state = self.state.lock().await;
            if !state.computed {
                let keys = self.factory.compute_keys().await;
                self.apply(&mut state, keys)?;
            }
        }
        Ok(self.snapshot())
    }

    /// The last published listing, without computing anything.
    pub fn snapshot(&self) -> Arc<[Arc<Node>]> {
        self.visible.read().clone()
    }

    /// Recomputes the keys and reconciles the listing with them.
    #[instrument(skip_all, fields(factory = self.factory.name()), err)]
    pub async fn refresh(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        let keys = self.factory.compute_keys().await;
        self.apply(&mut state, keys)
    }

    /// Reconciles the listing with the given keys.
    pub async fn set_keys(&self, keys: Vec<Key>) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        self.apply(&mut state, keys)
    }

    /// Whether a listener is attached.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.lock().is_some()
    }

    fn apply(&self, state: &mut State, keys: Vec<Key>) -> Result<(), Error> {
        if self.disposed.load(Ordering::Acquire) {
            return Ok(());
        }

        let rec = reconcile(state.entries.clone(), keys);
        let (kept, created, disposed) = (rec.kept(), rec.created(), rec.disposed.len());

        // nothing is published unless every node could be built
        let mut entries = Vec::with_capacity(rec.slots.len());
        for slot in rec.slots {
            match slot {
                Slot::Keep(key, node) => {
                    self.factory.update_node(&node);
                    entries.push((key, node));
                }
                Slot::Create(key) => {
                    let node = self.factory.create_node(&key)?;
                    entries.push((key, Arc::new(node)));
                }
            }
        }

        for node in rec.disposed {
            node.collapse();
        }

        let visible: Arc<[Arc<Node>]> = entries.iter().map(|(_, n)| n.clone()).collect();
        {
            // checked under the lock dispose() clears, so a dispose during
            // node creation is never overwritten
            let mut published = self.visible.write();
            if self.disposed.load(Ordering::Acquire) {
                drop(published);
                state.entries.clear();
                for (_, node) in entries {
                    node.collapse();
                }
                return Ok(());
            }
            *published = visible;
        }
        state.entries = entries;
        state.computed = true;

        debug!(
            factory = self.factory.name(),
            kept, created, disposed, "reconciled listing"
        );
        Ok(())
    }

    /// Stops listening and disposes all nodes. The listing stays empty
    /// afterwards.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.subscription.lock().take();

        let visible = std::mem::replace(&mut *self.visible.write(), Arc::from(Vec::new()));
        for node in visible.iter() {
            node.collapse();
        }
        // a reconciliation in flight clears the entries itself
        if let Ok(mut state) = self.state.try_lock() {
            state.entries.clear();
        }
    }
}

impl Drop for Children {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[async_trait]
impl Refresher for Children {
    fn is_refresh_required(&self, event: &CaseEvent) -> bool {
        self.factory.is_refresh_required(event)
    }

    async fn refresh_from_event(&self) {
        if let Err(e) = self.refresh().await {
            error!(factory = self.factory.name(), err = %e, "refresh failed");
        }
    }
}
