//! Diffing a listing against a freshly computed key list.
use std::collections::HashMap;
use std::collections::HashSet;

use crate::key::Key;

/// What to put at one position of the new listing.
#[derive(Debug)]
pub enum Slot<N> {
    /// The key was listed before, its node is carried over.
    Keep(Key, N),
    /// The key is new, a node needs to be created.
    Create(Key),
}

impl<N> Slot<N> {
    pub fn key(&self) -> &Key {
        match self {
            Slot::Keep(key, _) | Slot::Create(key) => key,
        }
    }
}

#[derive(Debug)]
pub struct Reconciliation<N> {
    /// One slot per distinct new key, in the order of the new keys.
    pub slots: Vec<Slot<N>>,
    /// Nodes whose key is gone, in their previous order.
    pub disposed: Vec<N>,
}

impl<N> Reconciliation<N> {
    pub fn kept(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Keep(..)))
            .count()
    }

    pub fn created(&self) -> usize {
        self.slots.len() - self.kept()
    }
}

/// Matches `existing` (key, node) pairs against `new_keys`.
///
/// Nodes of keys present in both are handed back untouched. If `new_keys`
/// holds a key more than once only its first occurrence is used. If
/// `existing` does, the later nodes are disposed.
pub fn reconcile<N>(existing: Vec<(Key, N)>, new_keys: Vec<Key>) -> Reconciliation<N> {
    let mut disposed_slots: Vec<Option<N>> = Vec::with_capacity(existing.len());
    let mut by_key: HashMap<Key, usize> = HashMap::with_capacity(existing.len());

    let mut previous: Vec<Option<(Key, N)>> = Vec::with_capacity(existing.len());
    for (idx, (key, node)) in existing.into_iter().enumerate() {
        if by_key.contains_key(&key) {
            disposed_slots.push(Some(node));
            previous.push(None);
            continue;
        }
        by_key.insert(key.clone(), idx);
        disposed_slots.push(None);
        previous.push(Some((key, node)));
    }

    let mut seen: HashSet<Key> = HashSet::with_capacity(new_keys.len());
    let mut slots = Vec::with_capacity(new_keys.len());
    for key in new_keys {
        if seen.contains(&key) {
            continue;
        }
        match by_key.get(&key).and_then(|idx| previous[*idx].take()) {
            Some((_, node)) => slots.push(Slot::Keep(key.clone(), node)),
            None => slots.push(Slot::Create(key.clone())),
        }
        seen.insert(key);
    }

    // whatever wasn't taken lost its key
    let disposed = previous
        .into_iter()
        .zip(disposed_slots)
        .filter_map(|(prev, dup)| prev.map(|(_, node)| node).or(dup))
        .collect();

    Reconciliation { slots, disposed }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{reconcile, Slot};
    use crate::key::{Key, TreeItem};
    use casetree_casestore::model::Report;

    fn key(id: i64) -> Key {
        Key::Item(TreeItem::Report(Report {
            id,
            name: format!("report {}", id),
            path: String::new(),
        }))
    }

    #[test]
    fn keep_create_dispose() {
        let existing = vec![(key(1), "one"), (key(2), "two"), (key(3), "three")];
        let rec = reconcile(existing, vec![key(2), key(3), key(4)]);

        assert_eq!(2, rec.kept());
        assert_eq!(1, rec.created());
        assert_eq!(vec!["one"], rec.disposed);

        let described: Vec<_> = rec
            .slots
            .iter()
            .map(|s| match s {
                Slot::Keep(k, n) => (k.clone(), Some(*n)),
                Slot::Create(k) => (k.clone(), None),
            })
            .collect();
        assert_eq!(
            vec![
                (key(2), Some("two")),
                (key(3), Some("three")),
                (key(4), None)
            ],
            described
        );
    }

    #[test]
    fn order_follows_new_keys() {
        let rec = reconcile(vec![(key(1), 1), (key(2), 2)], vec![key(2), key(1)]);
        let keys: Vec<_> = rec.slots.iter().map(|s| s.key().clone()).collect();
        assert_eq!(vec![key(2), key(1)], keys);
        assert!(rec.disposed.is_empty());
    }

    #[test]
    fn duplicates() {
        let rec = reconcile(
            vec![(key(1), "a"), (key(1), "b")],
            vec![key(1), key(5), key(1), key(5)],
        );
        assert_eq!(2, rec.slots.len());
        assert!(matches!(rec.slots[0], Slot::Keep(_, "a")));
        assert!(matches!(rec.slots[1], Slot::Create(_)));
        assert_eq!(vec!["b"], rec.disposed);
    }

    #[test]
    fn empty() {
        let rec = reconcile::<()>(vec![], vec![]);
        assert!(rec.slots.is_empty());
        assert!(rec.disposed.is_empty());

        let rec = reconcile(vec![(key(1), 1)], vec![]);
        assert_eq!(vec![1], rec.disposed);
    }
}
