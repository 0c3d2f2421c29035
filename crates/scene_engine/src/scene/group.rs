//! Grouping nodes

use std::cell::{Cell, RefCell};

use super::node::{same_node, Node, NodeRef, NodeType, NODE_TYPE};
use super::SceneError;

/// Type of [`Group`]
pub static GROUP_TYPE: NodeType = NodeType::derived("Group", &NODE_TYPE);
/// Type of [`Switch`]
pub static SWITCH_TYPE: NodeType = NodeType::derived("Switch", &GROUP_TYPE);

/// Ordered list of child nodes.
///
/// A group owns its list but not its children, which may be shared with
/// other groups. The same child may appear more than once. Traversal visits
/// the children in index order inside a pushed state level, so property
/// changes made by one child affect its later siblings but never leak out
/// of the group.
#[derive(Debug, Default)]
pub struct Group {
    name: Option<String>,
    children: RefCell<Vec<NodeRef>>,
}

impl Group {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty group with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a group holding `children` in order
    pub fn with_children(children: impl IntoIterator<Item = NodeRef>) -> Self {
        Self {
            name: None,
            children: RefCell::new(children.into_iter().collect()),
        }
    }

    /// Add a child at the end
    pub fn append(&self, child: NodeRef) {
        self.children.borrow_mut().push(child);
    }

    /// Insert a child before `index`. `index == len()` appends.
    pub fn insert(&self, index: usize, child: NodeRef) -> Result<(), SceneError> {
        let mut children = self.children.borrow_mut();
        let len = children.len();
        if index > len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        children.insert(index, child);
        Ok(())
    }

    /// Child at `index`
    pub fn get(&self, index: usize) -> Result<NodeRef, SceneError> {
        let children = self.children.borrow();
        children.get(index).cloned().ok_or(SceneError::IndexOutOfRange {
            index,
            len: children.len(),
        })
    }

    /// Index of the first occurrence of `child`, compared by identity
    pub fn index_of(&self, child: &NodeRef) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|candidate| same_node(candidate, child))
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Remove and return the child at `index`
    pub fn remove(&self, index: usize) -> Result<NodeRef, SceneError> {
        let mut children = self.children.borrow_mut();
        let len = children.len();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        Ok(children.remove(index))
    }

    /// Remove the first occurrence of `child`. Returns whether it was present.
    pub fn remove_child(&self, child: &NodeRef) -> bool {
        match self.index_of(child) {
            Some(index) => {
                self.children.borrow_mut().remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every child
    pub fn remove_all(&self) {
        self.children.borrow_mut().clear();
    }

    /// Put `child` at `index`, returning the child it replaced
    pub fn replace(&self, index: usize, child: NodeRef) -> Result<NodeRef, SceneError> {
        let mut children = self.children.borrow_mut();
        let len = children.len();
        match children.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, child)),
            None => Err(SceneError::IndexOutOfRange { index, len }),
        }
    }

    /// Replace the first occurrence of `old` with `new`. Returns whether
    /// `old` was present.
    pub fn replace_child(&self, old: &NodeRef, new: NodeRef) -> bool {
        match self.index_of(old) {
            Some(index) => {
                self.children.borrow_mut()[index] = new;
                true
            }
            None => false,
        }
    }

    /// Iterator over the direct children.
    ///
    /// The iterator reads the list one index at a time, so the group may be
    /// edited between steps; it then sees the list as it is at each step.
    pub fn children(&self) -> Children<'_> {
        Children { group: self, next: 0 }
    }
}

impl Node for Group {
    fn node_type(&self) -> &'static NodeType {
        &GROUP_TYPE
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn as_group(&self) -> Option<&Group> {
        Some(self)
    }
}

/// Iterator over the children of a [`Group`]
#[derive(Debug, Clone)]
pub struct Children<'a> {
    group: &'a Group,
    next: usize,
}

impl Iterator for Children<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let child = self.group.children.borrow().get(self.next).cloned()?;
        self.next += 1;
        Some(child)
    }
}

/// Which children a [`Switch`] traverses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchChoice {
    /// None of them
    #[default]
    None,
    /// All of them, like a plain group
    All,
    /// Only the child at this index. Out-of-range indices traverse nothing.
    Child(usize),
}

/// Group that traverses none, all, or one of its children
#[derive(Debug, Default)]
pub struct Switch {
    group: Group,
    choice: Cell<SwitchChoice>,
}

impl Switch {
    /// Create an empty switch traversing nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a switch over `children` with an initial choice
    pub fn with_children(children: impl IntoIterator<Item = NodeRef>, choice: SwitchChoice) -> Self {
        Self {
            group: Group::with_children(children),
            choice: Cell::new(choice),
        }
    }

    pub fn choice(&self) -> SwitchChoice {
        self.choice.get()
    }

    pub fn set_choice(&self, choice: SwitchChoice) {
        self.choice.set(choice);
    }

    /// The child list
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Indices the current choice selects, clamped to the child count
    pub fn selected(&self) -> std::ops::Range<usize> {
        let len = self.group.len();
        match self.choice.get() {
            SwitchChoice::None => 0..0,
            SwitchChoice::All => 0..len,
            SwitchChoice::Child(index) if index < len => index..index + 1,
            SwitchChoice::Child(_) => 0..0,
        }
    }
}

impl Node for Switch {
    fn node_type(&self) -> &'static NodeType {
        &SWITCH_TYPE
    }

    fn name(&self) -> Option<&str> {
        self.group.name()
    }

    fn as_group(&self) -> Option<&Group> {
        Some(&self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn leaf() -> NodeRef {
        Rc::new(Group::new())
    }

    #[test]
    fn test_insert_then_index_of() {
        let group = Group::with_children([leaf(), leaf()]);
        let child = leaf();

        group.insert(1, Rc::clone(&child)).unwrap();
        assert_eq!(group.index_of(&child), Some(1));
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_insert_at_front_is_found_at_zero() {
        let group = Group::with_children([leaf(), leaf()]);
        let child = leaf();

        group.insert(0, Rc::clone(&child)).unwrap();
        assert_eq!(group.index_of(&child), Some(0));
        assert!(same_node(&group.get(0).unwrap(), &child));
    }

    #[test]
    fn test_remove_only_occurrence_forgets_child() {
        let child = leaf();
        let group = Group::with_children([leaf(), Rc::clone(&child), leaf()]);

        assert!(group.remove_child(&child));
        assert_eq!(group.index_of(&child), None);
        assert_eq!(group.len(), 2);
        assert!(!group.remove_child(&child));
    }

    #[test]
    fn test_replace_then_get_returns_new_child() {
        let old = leaf();
        let new = leaf();
        let group = Group::with_children([Rc::clone(&old), leaf()]);

        group.replace(0, Rc::clone(&new)).unwrap();
        let current = group.get(0).unwrap();
        assert!(same_node(&current, &new));
        assert!(!same_node(&current, &old));
    }

    #[test]
    fn test_insert_at_len_appends_and_past_len_fails() {
        let group = Group::with_children([leaf()]);
        assert!(group.insert(1, leaf()).is_ok());
        assert_eq!(
            group.insert(5, leaf()),
            Err(SceneError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_remove_shrinks_and_shifts() {
        let first = leaf();
        let second = leaf();
        let group = Group::with_children([Rc::clone(&first), Rc::clone(&second)]);

        let removed = group.remove(0).unwrap();
        assert!(same_node(&removed, &first));
        assert_eq!(group.len(), 1);
        assert_eq!(group.index_of(&second), Some(0));
        assert!(group.remove(1).is_err());
    }

    #[test]
    fn test_replace_keeps_len() {
        let old = leaf();
        let new = leaf();
        let group = Group::with_children([leaf(), Rc::clone(&old)]);

        let replaced = group.replace(1, Rc::clone(&new)).unwrap();
        assert!(same_node(&replaced, &old));
        assert_eq!(group.len(), 2);
        assert_eq!(group.index_of(&new), Some(1));
        assert_eq!(group.index_of(&old), None);
    }

    #[test]
    fn test_duplicates_resolve_to_first_occurrence() {
        let shared = leaf();
        let group = Group::with_children([leaf(), Rc::clone(&shared), Rc::clone(&shared)]);

        assert_eq!(group.index_of(&shared), Some(1));
        assert!(group.remove_child(&shared));
        assert_eq!(group.index_of(&shared), Some(1));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_missing_child_operations_are_noops() {
        let group = Group::with_children([leaf()]);
        let stranger = leaf();

        assert!(!group.remove_child(&stranger));
        assert!(!group.replace_child(&stranger, leaf()));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_children_iterator_is_restartable() {
        let group = Group::with_children([leaf(), leaf(), leaf()]);
        assert_eq!(group.children().count(), 3);
        assert_eq!(group.children().count(), 3);

        group.remove_all();
        assert!(group.is_empty());
        assert_eq!(group.children().count(), 0);
    }

    #[test]
    fn test_switch_selection() {
        let switch = Switch::with_children([leaf(), leaf(), leaf()], SwitchChoice::Child(1));
        assert_eq!(switch.selected(), 1..2);

        switch.set_choice(SwitchChoice::All);
        assert_eq!(switch.selected(), 0..3);

        switch.set_choice(SwitchChoice::Child(7));
        assert!(switch.selected().is_empty());

        switch.set_choice(SwitchChoice::None);
        assert!(switch.selected().is_empty());
    }
}
