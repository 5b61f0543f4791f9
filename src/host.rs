//! Boundary to the environment that displays text.
//!
//! The replacer never walks a UI tree itself. It asks a [`HostAdapter`] for
//! the fragments currently shown and hands back replacement text.

use std::fmt;

/// Opaque identifier of a displayed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u64);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of displayed text as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTextFragment {
    pub id: FragmentId,
    pub text: String,
    /// `false` for fragments that exist but are currently hidden.
    pub visible: bool,
}

/// Operations the replacer needs from the display layer.
pub trait HostAdapter {
    /// Fragments currently alive. Hidden fragments are included only when
    /// `include_inactive` is set.
    fn list_visible_text(&self, include_inactive: bool) -> Vec<LiveTextFragment>;

    /// Replaces the text of fragment `id`. Returns `false` if the fragment
    /// no longer exists.
    fn apply_text(&mut self, id: FragmentId, text: &str) -> bool;

    /// Current text of fragment `id`, if it still exists.
    fn fragment_text(&self, id: FragmentId) -> Option<String> {
        self.list_visible_text(true)
            .into_iter()
            .find(|fragment| fragment.id == id)
            .map(|fragment| fragment.text)
    }
}

/// Host adapter backed by an in-memory list of fragments.
///
/// Used by the command-line front end, where each input line is a fragment,
/// and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    /// Fragments in insertion order.
    fragments: Vec<LiveTextFragment>,
    /// Id handed out to the next fragment.
    next_id: u64,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible fragment.
    pub fn push(&mut self, text: impl Into<String>) -> FragmentId {
        self.insert(text.into(), true)
    }

    /// Adds a hidden fragment.
    pub fn push_hidden(&mut self, text: impl Into<String>) -> FragmentId {
        self.insert(text.into(), false)
    }

    /// Removes a fragment, as if the host destroyed it.
    pub fn remove(&mut self, id: FragmentId) -> Option<LiveTextFragment> {
        let index = self.fragments.iter().position(|fragment| fragment.id == id)?;
        Some(self.fragments.remove(index))
    }

    /// Current text of `id`.
    #[must_use]
    pub fn text(&self, id: FragmentId) -> Option<&str> {
        self.fragments.iter().find(|fragment| fragment.id == id).map(|f| f.text.as_str())
    }

    #[must_use]
    pub fn fragments(&self) -> &[LiveTextFragment] {
        &self.fragments
    }

    /// Inserts a fragment with a fresh id.
    fn insert(&mut self, text: String, visible: bool) -> FragmentId {
        let id = FragmentId(self.next_id);
        self.next_id += 1;
        self.fragments.push(LiveTextFragment { id, text, visible });
        id
    }
}

impl HostAdapter for MemoryHost {
    fn list_visible_text(&self, include_inactive: bool) -> Vec<LiveTextFragment> {
        self.fragments
            .iter()
            .filter(|fragment| fragment.visible || include_inactive)
            .cloned()
            .collect()
    }

    fn apply_text(&mut self, id: FragmentId, text: &str) -> bool {
        match self.fragments.iter_mut().find(|fragment| fragment.id == id) {
            Some(fragment) => {
                text.clone_into(&mut fragment.text);
                true
            }
            None => false,
        }
    }
}
