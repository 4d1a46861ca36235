use std::sync::Arc;

/// An entity that lives in an [`OrderedCollection`] under a dense order.
pub trait OrderedEntity: Clone {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

/// Result of a same-collection reindex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexOutcome {
    /// The target resolved to the entity's current slot; nothing changed.
    Unchanged,
    /// The entity moved from `from` to `to`; everything between shifted by one.
    Moved { from: usize, to: usize },
}

/// A sibling group ordered by dense integers: a collection of size N always
/// holds orders `0..N`, and the backing slice is kept so that slice index
/// equals the `order` field.
///
/// Storage is shared (`Arc`), so cloning a collection is cheap; the first
/// mutation after a clone copies the entries. That is what makes whole-board
/// snapshots affordable on every drag gesture.
#[derive(Debug, Clone)]
pub struct OrderedCollection<T> {
    entries: Arc<Vec<T>>,
}

impl<T: OrderedEntity> OrderedCollection<T> {
    pub fn new() -> Self {
        OrderedCollection {
            entries: Arc::new(Vec::new()),
        }
    }

    /// Build a collection from entries in arbitrary order.
    ///
    /// Entries are sorted by their stored `order` (ties keep their relative
    /// position) and then renumbered densely. This is the normalization
    /// applied to every sibling group arriving from the server: server truth
    /// wins on relative order, density is re-established locally.
    pub fn from_unsorted(mut entries: Vec<T>) -> Self {
        entries.sort_by_key(|e| e.order());
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.set_order(index);
        }
        OrderedCollection {
            entries: Arc::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        Arc::make_mut(&mut self.entries)
            .iter_mut()
            .find(|e| e.id() == id)
    }

    /// Current slot of the entity, which is also its `order`.
    pub fn position_of(&self, id: &T::Id) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.position_of(id).is_some()
    }

    /// Move a member to `new_index` (clamped to the last slot), shifting only
    /// the members between the old and new slot by one.
    ///
    /// This is a single pass with no re-sort: when the entity moves toward
    /// the front, members in `[to, from)` shift up; toward the back, members
    /// in `(from, to]` shift down. Returns `None` when `id` is not a member.
    pub fn reindex_on_move(&mut self, id: &T::Id, new_index: usize) -> Option<ReindexOutcome> {
        let from = self.position_of(id)?;
        let to = new_index.min(self.entries.len() - 1);
        if from == to {
            return Some(ReindexOutcome::Unchanged);
        }

        let entries = Arc::make_mut(&mut self.entries);
        if from < to {
            for entry in &mut entries[from + 1..=to] {
                let order = entry.order();
                entry.set_order(order - 1);
            }
            entries[from].set_order(to);
            entries[from..=to].rotate_left(1);
        } else {
            for entry in &mut entries[to..from] {
                let order = entry.order();
                entry.set_order(order + 1);
            }
            entries[from].set_order(to);
            entries[to..=from].rotate_right(1);
        }
        debug_assert!(self.is_dense());
        Some(ReindexOutcome::Moved { from, to })
    }

    /// Remove a member, closing the order gap it leaves behind.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let index = self.position_of(id)?;
        let entries = Arc::make_mut(&mut self.entries);
        let removed = entries.remove(index);
        for entry in &mut entries[index..] {
            let order = entry.order();
            entry.set_order(order - 1);
        }
        debug_assert!(self.is_dense());
        Some(removed)
    }

    /// Insert an entity at `index` (clamped to the end), opening an order gap
    /// for it. Inserting into an empty collection always lands at slot 0.
    /// Returns the slot the entity actually landed in.
    pub fn insert_at(&mut self, mut entity: T, index: usize) -> usize {
        let index = index.min(self.entries.len());
        let entries = Arc::make_mut(&mut self.entries);
        for entry in &mut entries[index..] {
            let order = entry.order();
            entry.set_order(order + 1);
        }
        entity.set_order(index);
        entries.insert(index, entity);
        debug_assert!(self.is_dense());
        index
    }

    /// Append an entity at the end.
    pub fn push(&mut self, entity: T) -> usize {
        let end = self.entries.len();
        self.insert_at(entity, end)
    }

    /// True when the order multiset is exactly `{0, 1, .., len - 1}` and
    /// matches slice positions.
    pub fn is_dense(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(index, entry)| entry.order() == index)
    }
}

impl<T: OrderedEntity> Default for OrderedCollection<T> {
    fn default() -> Self {
        OrderedCollection::new()
    }
}

impl<T: PartialEq> PartialEq for OrderedCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        order: usize,
    }

    impl Item {
        fn new(id: &str, order: usize) -> Item {
            Item {
                id: id.to_string(),
                order,
            }
        }
    }

    impl OrderedEntity for Item {
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }

        fn order(&self) -> usize {
            self.order
        }

        fn set_order(&mut self, order: usize) {
            self.order = order;
        }
    }

    fn sample() -> OrderedCollection<Item> {
        OrderedCollection::from_unsorted(vec![
            Item::new("w", 0),
            Item::new("x", 1),
            Item::new("y", 2),
            Item::new("z", 3),
        ])
    }

    fn ids(collection: &OrderedCollection<Item>) -> Vec<&str> {
        collection.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_from_unsorted_normalizes_gaps_and_duplicates() {
        let collection = OrderedCollection::from_unsorted(vec![
            Item::new("a", 7),
            Item::new("b", 2),
            Item::new("c", 2),
            Item::new("d", 0),
        ]);
        // Relative order by stored value, ties keep arrival order.
        assert_eq!(ids(&collection), vec!["d", "b", "c", "a"]);
        assert!(collection.is_dense());
    }

    #[test]
    fn test_reindex_toward_front_shifts_between() {
        let mut collection = sample();
        let outcome = collection.reindex_on_move(&"z".to_string(), 0);
        assert_eq!(outcome, Some(ReindexOutcome::Moved { from: 3, to: 0 }));
        assert_eq!(ids(&collection), vec!["z", "w", "x", "y"]);
        assert!(collection.is_dense());
    }

    #[test]
    fn test_reindex_toward_back_shifts_between() {
        let mut collection = sample();
        let outcome = collection.reindex_on_move(&"w".to_string(), 2);
        assert_eq!(outcome, Some(ReindexOutcome::Moved { from: 0, to: 2 }));
        assert_eq!(ids(&collection), vec!["x", "y", "w", "z"]);
        assert!(collection.is_dense());
    }

    #[test]
    fn test_reindex_only_touches_members_between() {
        let mut collection = sample();
        collection.reindex_on_move(&"x".to_string(), 2).unwrap();
        // w and z sit outside [from, to] and keep their slots.
        assert_eq!(collection.position_of(&"w".to_string()), Some(0));
        assert_eq!(collection.position_of(&"z".to_string()), Some(3));
    }

    #[test]
    fn test_reindex_same_slot_is_unchanged() {
        let mut collection = sample();
        let before = collection.clone();
        let outcome = collection.reindex_on_move(&"x".to_string(), 1);
        assert_eq!(outcome, Some(ReindexOutcome::Unchanged));
        assert_eq!(collection, before);
    }

    #[test]
    fn test_reindex_clamps_past_the_end() {
        let mut collection = sample();
        let outcome = collection.reindex_on_move(&"w".to_string(), 99);
        assert_eq!(outcome, Some(ReindexOutcome::Moved { from: 0, to: 3 }));
        assert_eq!(ids(&collection), vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn test_reindex_unknown_member() {
        let mut collection = sample();
        assert_eq!(collection.reindex_on_move(&"nope".to_string(), 0), None);
    }

    #[test]
    fn test_reindex_single_member_collection() {
        let mut collection = OrderedCollection::from_unsorted(vec![Item::new("only", 0)]);
        let outcome = collection.reindex_on_move(&"only".to_string(), 5);
        assert_eq!(outcome, Some(ReindexOutcome::Unchanged));
    }

    #[test]
    fn test_reindex_round_trip_restores_everything() {
        let mut collection = sample();
        let before = collection.clone();
        collection.reindex_on_move(&"x".to_string(), 3).unwrap();
        collection.reindex_on_move(&"x".to_string(), 1).unwrap();
        assert_eq!(collection, before);
    }

    #[test]
    fn test_remove_closes_the_gap() {
        let mut collection = sample();
        let removed = collection.remove(&"x".to_string()).unwrap();
        assert_eq!(removed.id, "x");
        assert_eq!(ids(&collection), vec!["w", "y", "z"]);
        assert!(collection.is_dense());
        assert_eq!(collection.remove(&"x".to_string()), None);
    }

    #[test]
    fn test_insert_opens_a_gap() {
        let mut collection = sample();
        let landed = collection.insert_at(Item::new("v", 0), 2);
        assert_eq!(landed, 2);
        assert_eq!(ids(&collection), vec!["w", "x", "v", "y", "z"]);
        assert!(collection.is_dense());
    }

    #[test]
    fn test_insert_clamps_to_the_end() {
        let mut collection = sample();
        let landed = collection.insert_at(Item::new("v", 0), 42);
        assert_eq!(landed, 4);
        assert_eq!(ids(&collection), vec!["w", "x", "y", "z", "v"]);
    }

    #[test]
    fn test_insert_into_empty_lands_at_zero() {
        let mut collection: OrderedCollection<Item> = OrderedCollection::new();
        let landed = collection.insert_at(Item::new("first", 9), 7);
        assert_eq!(landed, 0);
        assert_eq!(collection.get(&"first".to_string()).unwrap().order, 0);
    }

    #[test]
    fn test_clone_shares_until_written() {
        let mut collection = sample();
        let snapshot = collection.clone();
        collection.reindex_on_move(&"z".to_string(), 0).unwrap();
        // The snapshot is untouched by writes to the original.
        assert_eq!(ids(&snapshot), vec!["w", "x", "y", "z"]);
        assert_eq!(ids(&collection), vec!["z", "w", "x", "y"]);
    }
}
