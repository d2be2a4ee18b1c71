//! Named file/assembly references and the insertion-ordered list that
//! holds them.

use serde::{Deserialize, Serialize};

/// A file that ships with the update package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Path relative to the update root. Unique within a list,
    /// compared ASCII-case-insensitively.
    pub name: String,
    /// Optional target subpath the installer copies the file into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Byte count, present only when the reference was validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Base64 SHA-1 content digest, present only when validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl FileReference {
    pub fn new(name: impl Into<String>, destination: Option<&str>) -> Self {
        Self {
            name: name.into(),
            destination: destination.map(str::to_owned),
            size: None,
            digest: None,
        }
    }
}

/// An assembly that ships with the update package. Same shape as a
/// [`FileReference`] but kept as a distinct type: only the deployment
/// encoder understands assemblies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl AssemblyReference {
    pub fn new(name: impl Into<String>, destination: Option<&str>) -> Self {
        Self {
            name: name.into(),
            destination: destination.map(str::to_owned),
            size: None,
            digest: None,
        }
    }
}

/// Lookup key shared by both reference kinds.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for FileReference {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for AssemblyReference {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Insertion-ordered list of named references.
///
/// Storage is allocated lazily: a fresh list owns nothing until the first
/// `push` or an explicit `set_capacity`, and [`ReferenceList::clear`]
/// discards the storage entirely rather than just emptying it. Capacity is
/// a reservation hint only — it never shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceList<R> {
    items: Option<Vec<R>>,
}

impl<R> Default for ReferenceList<R> {
    fn default() -> Self {
        Self { items: None }
    }
}

impl<R: Named> ReferenceList<R> {
    pub fn new() -> Self {
        Self { items: None }
    }

    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current reservation, 0 while storage is unallocated.
    pub fn capacity(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::capacity)
    }

    /// Reserve room for at least `capacity` items. A no-op for 0, and
    /// never lowers an already-larger reservation.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity == 0 {
            return;
        }
        match &mut self.items {
            Some(items) => {
                if capacity > items.capacity() {
                    items.reserve(capacity - items.len());
                }
            }
            None => self.items = Some(Vec::with_capacity(capacity)),
        }
    }

    /// Append a reference and return its index.
    pub fn push(&mut self, item: R) -> usize {
        let items = self.items.get_or_insert_with(Vec::new);
        items.push(item);
        items.len() - 1
    }

    /// Index of the first reference whose name matches
    /// ASCII-case-insensitively.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items
            .as_ref()?
            .iter()
            .position(|item| item.name().eq_ignore_ascii_case(name))
    }

    /// Remove by index. Returns false when the index is out of bounds or
    /// the list was never allocated.
    pub fn remove_at(&mut self, index: usize) -> bool {
        match &mut self.items {
            Some(items) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Remove the first name match, if any.
    pub fn remove_named(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => self.remove_at(index),
            None => false,
        }
    }

    /// Drop the underlying storage entirely.
    pub fn clear(&mut self) {
        self.items = None;
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.items.as_ref()?.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.items.iter().flat_map(|items| items.iter())
    }
}
