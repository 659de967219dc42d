//! Flat tag → value mapping produced by the decoders

use emv_core::TagId;

/// Insertion-ordered flat mapping from tag to raw value
///
/// A tag keeps the position of its first occurrence; a later occurrence of
/// the same tag replaces the value (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlvMap {
    entries: Vec<(TagId, Vec<u8>)>,
}

impl TlvMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value of a tag
    ///
    /// # Returns
    /// The previous value, if the tag was already present.
    pub fn insert(&mut self, tag: TagId, value: Vec<u8>) -> Option<Vec<u8>> {
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((tag, value));
                None
            }
        }
    }

    /// Get the value of a tag
    pub fn get(&self, tag: &TagId) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_slice())
    }

    /// Get the value of a tag given as hex text (`"9F10"`)
    pub fn get_by_text(&self, tag: &str) -> Option<&[u8]> {
        tag.parse().ok().and_then(|t| self.get(&t))
    }

    /// Whether the tag was decoded
    pub fn contains(&self, tag: &TagId) -> bool {
        self.get(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(tag, value)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&TagId, &[u8])> {
        self.entries.iter().map(|(t, v)| (t, v.as_slice()))
    }

    /// Tags in first-seen order
    pub fn tags(&self) -> impl Iterator<Item = &TagId> {
        self.entries.iter().map(|(t, _)| t)
    }
}

impl IntoIterator for TlvMap {
    type Item = (TagId, Vec<u8>);
    type IntoIter = std::vec::IntoIter<(TagId, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(TagId, Vec<u8>)> for TlvMap {
    fn from_iter<I: IntoIterator<Item = (TagId, Vec<u8>)>>(iter: I) -> Self {
        let mut map = TlvMap::new();
        for (tag, value) in iter {
            map.insert(tag, value);
        }
        map
    }
}
