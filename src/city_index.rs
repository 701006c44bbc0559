//! Maps city names to stable, densely-assigned [`CityId`]s.
//!
//! Backed by an [`indexmap::IndexSet`] rather than a plain `HashMap`: its
//! insertion-order indices *are* the city ids for free, so interning a city
//! and discovering its id are the same lookup instead of two.

use indexmap::IndexSet;

use crate::error::{MapError, MapResult};
use crate::ids::CityId;

/// A city name is valid iff it is non-empty and contains no byte in `0..=31`
/// nor the `;` field separator.
pub fn is_valid_city_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b > 31 && b != b';')
}

#[derive(Debug, Default)]
pub struct CityIndex {
    names: IndexSet<Box<str>>,
}

impl CityIndex {
    pub fn new() -> Self {
        Self { names: IndexSet::new() }
    }

    /// Inserts `name` if absent and returns its id either way.
    ///
    /// Rejects invalid names without mutating the index.
    pub fn intern(&mut self, name: &str) -> MapResult<CityId> {
        if !is_valid_city_name(name) {
            return Err(MapError::InvalidCityName);
        }
        if let Some(idx) = self.names.get_index_of(name) {
            return Ok(CityId::from(idx));
        }
        let (idx, _) = self.names.insert_full(name.into());
        Ok(CityId::from(idx))
    }

    pub fn lookup(&self, name: &str) -> Option<CityId> {
        self.names.get_index_of(name).map(CityId::from)
    }

    pub fn name_of(&self, id: CityId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_assigns_dense_ids_in_insertion_order() {
        let mut idx = CityIndex::new();
        let a = idx.intern("A").unwrap();
        let b = idx.intern("B").unwrap();
        let a2 = idx.intern("A").unwrap();
        assert_eq!(a.0, 0);
        assert_eq!(b.0, 1);
        assert_eq!(a, a2);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn name_of_round_trips() {
        let mut idx = CityIndex::new();
        let a = idx.intern("Warsaw").unwrap();
        assert_eq!(idx.name_of(a), "Warsaw");
        assert_eq!(idx.lookup("Warsaw"), Some(a));
        assert_eq!(idx.lookup("Krakow"), None);
    }

    #[test]
    fn rejects_empty_and_forbidden_bytes() {
        let mut idx = CityIndex::new();
        assert!(idx.intern("").is_err());
        assert!(idx.intern("A;B").is_err());
        assert!(idx.intern("A\x01B").is_err());
        assert_eq!(idx.len(), 0);
    }

    #[test]
    fn accepts_non_ascii_bytes() {
        let mut idx = CityIndex::new();
        assert!(idx.intern("Łódź").is_ok());
    }
}
