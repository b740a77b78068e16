//! Insertion Order Module
//!
//! Tracks the order in which keys were first inserted, for oldest-first
//! eviction. Reads never reorder keys, and overwriting a key keeps its
//! original position.

use std::collections::VecDeque;

// == Insertion Order ==
/// Keys in insertion order.
///
/// - Front = Oldest inserted
/// - Back = Newest inserted
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Insert ==
    /// Appends a key as the newest. A key already tracked keeps its place.
    pub fn insert(&mut self, key: &str) {
        if !self.contains(key) {
            self.order.push_back(key.to_string());
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the oldest inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_insert_keeps_first_position() {
        let mut order = InsertionOrder::new();

        order.insert("key1");
        order.insert("key2");
        order.insert("key3");

        // Re-inserting key1 must not make it newest
        order.insert("key1");

        assert_eq!(order.len(), 3);
        assert_eq!(order.peek_oldest(), Some(&"key1".to_string()));
    }

    #[test]
    fn test_pop_oldest() {
        let mut order = InsertionOrder::new();

        order.insert("a");
        order.insert("b");
        order.insert("c");

        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_pop_empty() {
        let mut order = InsertionOrder::new();
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_remove() {
        let mut order = InsertionOrder::new();

        order.insert("key1");
        order.insert("key2");
        order.insert("key3");

        order.remove("key2");
        order.remove("nonexistent");

        assert_eq!(order.len(), 2);
        assert!(!order.contains("key2"));
        let keys: Vec<&String> = order.iter().collect();
        assert_eq!(keys, vec!["key1", "key3"]);
    }

    #[test]
    fn test_removed_key_reinserted_as_newest() {
        let mut order = InsertionOrder::new();

        order.insert("a");
        order.insert("b");
        order.remove("a");
        order.insert("a");

        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.pop_oldest(), Some("a".to_string()));
    }
}
