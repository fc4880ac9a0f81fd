//! Caller-supplied key/value data merged next to the logged value.

use crate::classify::LogArg;

/// Ordered bag of named values, built fresh for each logging call.
#[derive(Default)]
pub struct ContextBag<'a> {
    entries: Vec<(String, &'a dyn LogArg)>,
}

impl<'a> ContextBag<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`, replacing the value of an existing entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: &'a dyn LogArg) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: &'a dyn LogArg) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a dyn LogArg)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<'a, K: Into<String>> FromIterator<(K, &'a dyn LogArg)> for ContextBag<'a> {
    fn from_iter<I: IntoIterator<Item = (K, &'a dyn LogArg)>>(iter: I) -> Self {
        let mut bag = ContextBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl core::fmt::Debug for ContextBag<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.type_name())))
            .finish()
    }
}
