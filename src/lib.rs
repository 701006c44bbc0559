//! National road map: a routing engine over cities, bidirectional roads and
//! numbered national routes, plus the line-oriented protocol that drives it.

pub mod city_index;
pub mod cli;
pub mod description;
pub mod error;
pub mod graph;
pub mod ids;
pub mod map;
pub mod pathfinder;
pub mod route_store;

pub use error::{MapError, MapResult};
pub use map::RoadMap;
