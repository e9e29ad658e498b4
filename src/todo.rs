use uuid::Uuid;

/// One entry in the todo panel. Lives only in memory, lost on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoItem {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

/// In-memory todo list backing the todo panel.
#[derive(Debug, Default)]
pub struct TodoStore {
    items: Vec<TodoItem>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new pending item; blank text is ignored.
    pub fn add(&mut self, text: &str) -> Option<&TodoItem> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.items.push(TodoItem {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
        });
        self.items.last()
    }

    /// Flip the completed flag. Returns the new state, or None if no such item.
    pub fn toggle(&mut self, id: Uuid) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    /// Remove an item. Returns true when something was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Item at a 1-based display position, as rendered in the panel.
    pub fn at_position(&self, position: usize) -> Option<&TodoItem> {
        position.checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_list() {
        let mut store = TodoStore::new();
        assert!(store.is_empty());

        store.add("buy apples");
        store.add("water plants");
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items()[0].text, "buy apples");
        assert_eq!(store.pending_count(), 2);
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut store = TodoStore::new();
        assert!(store.add("   ").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = TodoStore::new();
        let first = store.add("one").unwrap().id;
        let second = store.add("two").unwrap().id;
        assert_ne!(first, second);
    }

    #[test]
    fn test_toggle_and_counts() {
        let mut store = TodoStore::new();
        let id = store.add("buy apples").unwrap().id;

        assert_eq!(store.toggle(id), Some(true));
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.completed_count(), 1);

        assert_eq!(store.toggle(id), Some(false));
        assert_eq!(store.pending_count(), 1);

        assert_eq!(store.toggle(Uuid::new_v4()), None);
    }

    #[test]
    fn test_remove() {
        let mut store = TodoStore::new();
        let id = store.add("buy apples").unwrap().id;
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_position_lookup_is_one_based() {
        let mut store = TodoStore::new();
        store.add("first");
        store.add("second");
        assert_eq!(store.at_position(1).unwrap().text, "first");
        assert_eq!(store.at_position(2).unwrap().text, "second");
        assert!(store.at_position(0).is_none());
        assert!(store.at_position(3).is_none());
    }
}
