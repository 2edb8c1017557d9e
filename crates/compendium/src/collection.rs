//! Typed read-only collections with id lookup and name search.

use std::collections::HashMap;

use herosmith_domain::DomainError;

/// Anything a collection can hold: addressed by a stable string id,
/// searchable by display name.
pub trait ContentEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_content_entry {
    ($($ty:ty),+ $(,)?) => {
        $(impl ContentEntry for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }
        })+
    };
}

impl_content_entry!(
    herosmith_domain::Race,
    herosmith_domain::Class,
    herosmith_domain::Feat,
    herosmith_domain::Spell,
    herosmith_domain::Weapon,
    herosmith_domain::Armor,
    herosmith_domain::SkillDef,
);

/// An indexed, read-only collection of one content type.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entity_type: &'static str,
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: ContentEntry> Collection<T> {
    /// Build a collection; a duplicated id keeps the first entry and logs.
    pub fn new(entity_type: &'static str, entries: Vec<T>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.contains_key(entry.id()) {
                tracing::warn!(entity_type, id = entry.id(), "duplicate content id");
                continue;
            }
            index.insert(entry.id().to_string(), position);
        }
        Self {
            entity_type,
            entries,
            index,
        }
    }

    /// Lookup by id.
    pub fn get_by_id(&self, id: &str) -> Result<&T, DomainError> {
        self.index
            .get(id)
            .map(|&position| &self.entries[position])
            .ok_or_else(|| DomainError::not_found(self.entity_type, id))
    }

    /// Lookup several ids, preserving order; fails on the first missing id.
    pub fn get_by_ids<'a, I>(&self, ids: I) -> Result<Vec<&T>, DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter().map(|id| self.get_by_id(id)).collect()
    }

    /// Case-insensitive substring search over names and ids.
    pub fn search(&self, query: &str) -> Vec<&T> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                entry.name().to_lowercase().contains(&needle)
                    || entry.id().to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
