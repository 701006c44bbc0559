//! Strongly typed identifier wrappers.
//!
//! Keeping city and route identifiers as distinct types instead of bare
//! `u32`/`usize` stops them from being accidentally swapped at a call site —
//! the compiler rejects a [`RouteId`] passed where a [`CityId`] is expected.

use std::fmt;

/// Stable index of a city, assigned in insertion order by [`crate::city_index::CityIndex`].
///
/// Dense: valid ids for a map with `n` cities are exactly `0..n`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CityId(pub u32);

impl CityId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CityId({})", self.0)
    }
}

impl From<usize> for CityId {
    fn from(n: usize) -> Self {
        CityId(n as u32)
    }
}

/// Numbered national route, constrained to `1..=999` by every constructor
/// that builds one (see [`crate::route_store::MIN_ROUTE_ID`] / `MAX_ROUTE_ID`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct RouteId(pub u32);

impl RouteId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
