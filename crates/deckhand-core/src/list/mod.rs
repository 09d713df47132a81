//! Text list loading
//!
//! List files are newline-delimited, UTF-8, with `#` comments and an
//! `@include <path>` directive. The same grammar, extended with typed
//! `<kind>:<value>` lines, is used for app-set manifests.

mod directive;
mod loader;

use std::collections::HashSet;
use std::hash::Hash;

pub use directive::Directive;
pub use loader::{IncludeContext, load, load_list};

pub(crate) use loader::walk;

/// Keep the first occurrence of each item, preserving order.
pub fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Ordered, duplicate-free sequence of identifiers.
///
/// Order is first-seen order across all contributing lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedActionSet {
    items: Vec<String>,
}

impl ResolvedActionSet {
    /// Concatenate sequences in order and drop repeats.
    pub fn from_sequences<I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        Self {
            items: dedup_preserving_order(sequences.into_iter().flatten()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<'a> IntoIterator for &'a ResolvedActionSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
