/// Ordered set of distinct names with a fixed capacity.
///
/// Used for the browsed subreddits and for the genre tags. Every mutation
/// that would break an invariant (duplicate, over capacity, blank name,
/// unknown name on removal) is a no-op reported through the `bool` return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    names: Vec<String>,
    capacity: usize,
}

impl Selection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a selection from `names`, dropping duplicates and anything past capacity.
    pub fn from_names<I, S>(capacity: usize, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::with_capacity(capacity);
        for name in names {
            selection.add(name.as_ref());
        }
        selection
    }

    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.is_full() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|existing| existing == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes `name` if selected, adds it otherwise.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.remove(name)
        } else {
            self.add(name)
        }
    }

    pub fn list(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.names.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Known names matching `query` (case-insensitive substring) that are not selected yet.
pub fn filter_suggestions(query: &str, known: &[String], selection: &Selection) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    known
        .iter()
        .filter(|name| !selection.contains(name))
        .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
