//! Error types for the routing engine.
//!
//! These are used internally to distinguish failure causes for logging; the
//! public [`crate::map::RoadMap`] API collapses every variant down to a plain
//! `bool`/`String` at the boundary.

use thiserror::Error;

use crate::ids::RouteId;

/// Everything that can go wrong when mutating or querying a [`crate::map::RoadMap`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("city name is empty or contains a forbidden byte")]
    InvalidCityName,

    #[error("no such city")]
    UnknownCity,

    #[error("the two endpoints are the same city")]
    IdenticalCities,

    #[error("a road already exists between these cities")]
    RoadAlreadyExists,

    #[error("no road exists between these cities")]
    NoSuchRoad,

    #[error("road length must be in 1..=u32::MAX")]
    InvalidLength,

    #[error("year must be nonzero")]
    InvalidYear,

    #[error("repair year precedes the road's current year")]
    YearRegression,

    #[error("route id must be in 1..=999")]
    InvalidRouteId,

    #[error("route {0} already exists")]
    DuplicateRouteId(RouteId),

    #[error("no such route")]
    UnknownRoute,

    #[error("city is already on this route")]
    CityAlreadyOnRoute,

    #[error("no admissible path exists")]
    Unreachable,

    #[error("more than one path ties for best — ambiguous")]
    Ambiguous,

    #[error("a declared route would repeat a city")]
    CycleInDeclaration,

    #[error("declared road length doesn't match the existing road")]
    RoadLengthMismatch,
}

pub type MapResult<T> = Result<T, MapError>;
