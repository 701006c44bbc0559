//! `RoadMap`: the public API tying the city index, road graph, pathfinder
//! and route store together into the operations a national road map
//! supports (`addRoad`, `repairRoad`, `newRoute`, `extendRoute`,
//! `removeRoute`, `removeRoad`, plus route declaration and description).

use itertools::Itertools;

use crate::city_index::{is_valid_city_name, CityIndex};
use crate::description;
use crate::error::{MapError, MapResult};
use crate::graph::Graph;
use crate::ids::{CityId, RouteId};
use crate::pathfinder;
use crate::route_store::{is_valid_route_id, Route, RouteStore};

#[derive(Debug, Default)]
pub struct RoadMap {
    cities: CityIndex,
    graph: Graph,
    routes: RouteStore,
}

/// One segment of an explicit route declaration: the road leading from the
/// previous waypoint to `city`, with `length`/`year` describing that road.
/// The very first waypoint of a declaration has no preceding segment.
#[derive(Debug, Clone)]
pub struct RouteSegment {
    pub city: String,
    pub length: u32,
    pub year: i32,
}

impl RoadMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rid` on every edge along `path`.
    fn mark_path(&mut self, path: &[CityId], rid: RouteId) {
        for (a, b) in path.iter().copied().tuple_windows() {
            self.graph.mark_route(a, b, rid);
        }
    }

    pub fn add_road(&mut self, city1: &str, city2: &str, length: u32, year: i32) -> bool {
        match self.add_road_impl(city1, city2, length, year) {
            Ok(()) => {
                log::trace!("addRoad {}-{} accepted (length={}, year={})", city1, city2, length, year);
                true
            }
            Err(e) => {
                log::debug!("addRoad {}-{} rejected: {}", city1, city2, e);
                false
            }
        }
    }

    fn add_road_impl(&mut self, city1: &str, city2: &str, length: u32, year: i32) -> MapResult<()> {
        if length == 0 {
            return Err(MapError::InvalidLength);
        }
        if year == 0 {
            return Err(MapError::InvalidYear);
        }
        if !is_valid_city_name(city1) || !is_valid_city_name(city2) {
            return Err(MapError::InvalidCityName);
        }
        if city1 == city2 {
            return Err(MapError::IdenticalCities);
        }
        if let (Some(a), Some(b)) = (self.cities.lookup(city1), self.cities.lookup(city2)) {
            if self.graph.road(a, b).is_some() {
                return Err(MapError::RoadAlreadyExists);
            }
        }
        let a = self.cities.intern(city1)?;
        let b = self.cities.intern(city2)?;
        self.graph.ensure_city(a);
        self.graph.ensure_city(b);
        self.graph.add_road(a, b, length, year)?;
        Ok(())
    }

    pub fn repair_road(&mut self, city1: &str, city2: &str, year: i32) -> bool {
        match self.repair_road_impl(city1, city2, year) {
            Ok(()) => {
                log::trace!("repairRoad {}-{} accepted (year={})", city1, city2, year);
                true
            }
            Err(e) => {
                log::debug!("repairRoad {}-{} rejected: {}", city1, city2, e);
                false
            }
        }
    }

    fn repair_road_impl(&mut self, city1: &str, city2: &str, year: i32) -> MapResult<()> {
        if year == 0 {
            return Err(MapError::InvalidYear);
        }
        if city1 == city2 {
            return Err(MapError::IdenticalCities);
        }
        if !is_valid_city_name(city1) || !is_valid_city_name(city2) {
            return Err(MapError::InvalidCityName);
        }
        let a = self.cities.lookup(city1).ok_or(MapError::UnknownCity)?;
        let b = self.cities.lookup(city2).ok_or(MapError::UnknownCity)?;
        self.graph.repair_road(a, b, year)
    }

    pub fn new_route(&mut self, route_id: u32, city1: &str, city2: &str) -> bool {
        match self.new_route_impl(route_id, city1, city2) {
            Ok(()) => {
                log::debug!("newRoute {} {}-{} accepted", route_id, city1, city2);
                true
            }
            Err(e) => {
                log::debug!("newRoute {} {}-{} rejected: {}", route_id, city1, city2, e);
                false
            }
        }
    }

    fn new_route_impl(&mut self, route_id: u32, city1: &str, city2: &str) -> MapResult<()> {
        if !is_valid_route_id(route_id) {
            return Err(MapError::InvalidRouteId);
        }
        let rid = RouteId(route_id);
        if self.routes.contains(rid) {
            return Err(MapError::DuplicateRouteId(rid));
        }
        if !is_valid_city_name(city1) || !is_valid_city_name(city2) {
            return Err(MapError::InvalidCityName);
        }
        if city1 == city2 {
            return Err(MapError::IdenticalCities);
        }
        let a = self.cities.lookup(city1).ok_or(MapError::UnknownCity)?;
        let b = self.cities.lookup(city2).ok_or(MapError::UnknownCity)?;

        let outcome = pathfinder::search(&self.graph, self.cities.len(), a, b, None);
        outcome.check()?;
        let path = outcome.path();

        self.mark_path(&path, rid);
        self.routes.insert(Route { id: rid, cities: path });
        Ok(())
    }

    pub fn extend_route(&mut self, route_id: u32, city: &str) -> bool {
        match self.extend_route_impl(route_id, city) {
            Ok(()) => {
                log::debug!("extendRoute {} {} accepted", route_id, city);
                true
            }
            Err(e) => {
                log::debug!("extendRoute {} {} rejected: {}", route_id, city, e);
                false
            }
        }
    }

    fn extend_route_impl(&mut self, route_id: u32, city: &str) -> MapResult<()> {
        if !is_valid_route_id(route_id) {
            return Err(MapError::InvalidRouteId);
        }
        let rid = RouteId(route_id);
        if !is_valid_city_name(city) {
            return Err(MapError::InvalidCityName);
        }
        let route = self.routes.get(rid).ok_or(MapError::UnknownRoute)?.clone();
        let city_id = self.cities.lookup(city).ok_or(MapError::UnknownCity)?;
        if route.contains(city_id) {
            return Err(MapError::CityAlreadyOnRoute);
        }

        let n = self.cities.len();
        let forward = pathfinder::search(&self.graph, n, route.last(), city_id, Some((rid, &route)));
        let backward = pathfinder::search(&self.graph, n, city_id, route.first(), Some((rid, &route)));
        let forward_ok = forward.check().is_ok();
        let backward_ok = backward.check().is_ok();

        let extend_forward = match (forward_ok, backward_ok) {
            (true, true) => {
                if forward.ties_with(&backward) {
                    return Err(MapError::Ambiguous);
                }
                forward.beats(&backward)
            }
            (true, false) => true,
            (false, true) => false,
            (false, false) => return Err(MapError::Unreachable),
        };

        let mut route = route;
        if extend_forward {
            let path = forward.path();
            self.mark_path(&path, rid);
            route.cities.extend_from_slice(&path[1..]);
        } else {
            let path = backward.path();
            self.mark_path(&path, rid);
            let mut new_cities = path[..path.len() - 1].to_vec();
            new_cities.extend_from_slice(&route.cities);
            route.cities = new_cities;
        }
        self.routes.insert(route);
        Ok(())
    }

    pub fn remove_route(&mut self, route_id: u32) -> bool {
        match self.remove_route_impl(route_id) {
            Ok(()) => {
                log::debug!("removeRoute {} accepted", route_id);
                true
            }
            Err(e) => {
                log::debug!("removeRoute {} rejected: {}", route_id, e);
                false
            }
        }
    }

    fn remove_route_impl(&mut self, route_id: u32) -> MapResult<()> {
        if !is_valid_route_id(route_id) {
            return Err(MapError::InvalidRouteId);
        }
        let rid = RouteId(route_id);
        let route = self.routes.remove(rid).ok_or(MapError::UnknownRoute)?;
        for w in route.cities.windows(2) {
            self.graph.unmark_route(w[0], w[1], rid);
        }
        Ok(())
    }

    pub fn remove_road(&mut self, city1: &str, city2: &str) -> bool {
        match self.remove_road_impl(city1, city2) {
            Ok(()) => {
                log::debug!("removeRoad {}-{} accepted", city1, city2);
                true
            }
            Err(e) => {
                log::debug!("removeRoad {}-{} rejected: {}", city1, city2, e);
                false
            }
        }
    }

    fn remove_road_impl(&mut self, city1: &str, city2: &str) -> MapResult<()> {
        if !is_valid_city_name(city1) || !is_valid_city_name(city2) {
            return Err(MapError::InvalidCityName);
        }
        if city1 == city2 {
            return Err(MapError::IdenticalCities);
        }
        let a = self.cities.lookup(city1).ok_or(MapError::UnknownCity)?;
        let b = self.cities.lookup(city2).ok_or(MapError::UnknownCity)?;
        if self.graph.road(a, b).is_none() {
            return Err(MapError::NoSuchRoad);
        }
        let routes_on_edge = self.graph.road(a, b).unwrap().routes.clone();
        let n = self.cities.len();

        // Feasibility pass: find every affected route's replacement path
        // without mutating anything. A single unreplaceable route aborts
        // the whole removal.
        let mut plans = Vec::with_capacity(routes_on_edge.len());
        for r in routes_on_edge {
            let route = self.routes.get(r).expect("edge names a route that must exist");
            let (index, from, to) =
                find_segment(route, a, b).expect("route listed on this edge must contain it");
            let outcome = pathfinder::search(&self.graph, n, from, to, Some((r, route)));
            outcome.check()?;
            plans.push((r, index, outcome));
        }

        // Commit pass: splice each route's replacement path in and register
        // the new edges, then finally drop the old road.
        for (r, index, outcome) in plans {
            let path = outcome.path();
            self.mark_path(&path, r);
            let route = self.routes.get_mut(r).expect("checked above");
            let mut spliced = route.cities[..index].to_vec();
            spliced.extend_from_slice(&path);
            spliced.extend_from_slice(&route.cities[index + 2..]);
            route.cities = spliced;
        }

        self.graph.remove_road(a, b);
        Ok(())
    }

    /// Registers an explicit route declaration: `waypoints[0].city` is the
    /// route's first city, and each later element names the road leading to
    /// it from the previous one. Existing roads along the way must match
    /// the declared length and may only have their year advanced; missing
    /// roads are created. Nothing is mutated unless every segment checks
    /// out first.
    pub fn declare_route(&mut self, route_id: u32, first_city: &str, waypoints: &[RouteSegment]) -> bool {
        match self.declare_route_impl(route_id, first_city, waypoints) {
            Ok(()) => {
                log::debug!("explicit route declaration {} accepted ({} waypoints)", route_id, waypoints.len());
                true
            }
            Err(e) => {
                log::debug!("explicit route declaration {} rejected: {}", route_id, e);
                false
            }
        }
    }

    fn declare_route_impl(
        &mut self,
        route_id: u32,
        first_city: &str,
        waypoints: &[RouteSegment],
    ) -> MapResult<()> {
        if !is_valid_route_id(route_id) {
            return Err(MapError::InvalidRouteId);
        }
        let rid = RouteId(route_id);
        if self.routes.contains(rid) {
            return Err(MapError::DuplicateRouteId(rid));
        }
        if waypoints.is_empty() {
            return Err(MapError::IdenticalCities);
        }
        if !is_valid_city_name(first_city) {
            return Err(MapError::InvalidCityName);
        }
        for w in waypoints {
            if !is_valid_city_name(&w.city) {
                return Err(MapError::InvalidCityName);
            }
            if w.length == 0 {
                return Err(MapError::InvalidLength);
            }
            if w.year == 0 {
                return Err(MapError::InvalidYear);
            }
        }

        let mut names: Vec<&str> = Vec::with_capacity(waypoints.len() + 1);
        names.push(first_city);
        names.extend(waypoints.iter().map(|w| w.city.as_str()));
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                if names[i] == names[j] {
                    return Err(MapError::CycleInDeclaration);
                }
            }
        }

        // Validate every segment against whatever road already exists,
        // without creating or repairing anything yet.
        for (i, w) in waypoints.iter().enumerate() {
            let from = names[i];
            let to = &w.city;
            if let (Some(a), Some(b)) = (self.cities.lookup(from), self.cities.lookup(to)) {
                if let Some(road) = self.graph.road(a, b) {
                    if road.length != w.length {
                        return Err(MapError::RoadLengthMismatch);
                    }
                    if w.year < road.year {
                        return Err(MapError::YearRegression);
                    }
                }
            }
        }

        // Commit: intern every city, then create or repair each road.
        let mut ids = Vec::with_capacity(names.len());
        for name in &names {
            ids.push(self.cities.intern(name)?);
            self.graph.ensure_city(*ids.last().unwrap());
        }
        for (i, w) in waypoints.iter().enumerate() {
            let (from, to) = (ids[i], ids[i + 1]);
            if self.graph.road(from, to).is_some() {
                self.graph.repair_road(from, to, w.year)?;
            } else {
                self.graph.add_road(from, to, w.length, w.year)?;
            }
            self.graph.mark_route(from, to, rid);
        }

        self.routes.insert(Route { id: rid, cities: ids });
        Ok(())
    }

    #[cfg(test)]
    fn road_gone(&self, city1: &str, city2: &str) -> bool {
        let a = self.cities.lookup(city1).unwrap();
        let b = self.cities.lookup(city2).unwrap();
        self.graph.road(a, b).is_none()
    }

    /// Empty string for an unregistered, out-of-range, or unknown route id.
    pub fn get_route_description(&self, route_id: u32) -> String {
        if !is_valid_route_id(route_id) {
            return String::new();
        }
        match self.routes.get(RouteId(route_id)) {
            Some(route) => description::describe(route, &self.graph, &self.cities),
            None => String::new(),
        }
    }
}

/// Finds the adjacent pair `(cities[i], cities[i + 1])` in `route` matching
/// `{a, b}` in either orientation, returning the index and the pair in the
/// orientation the route actually stores them.
fn find_segment(route: &Route, a: CityId, b: CityId) -> Option<(usize, CityId, CityId)> {
    for i in 0..route.cities.len().saturating_sub(1) {
        let (x, y) = (route.cities[i], route.cities[i + 1]);
        if (x == a && y == b) || (x == b && y == a) {
            return Some((i, x, y));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_road_then_new_route_then_describe() {
        let mut map = RoadMap::new();
        assert!(map.add_road("A", "B", 10, 2000));
        assert!(map.add_road("B", "C", 5, 1990));
        assert!(map.new_route(100, "A", "C"));
        assert_eq!(map.get_route_description(100), "100;A;10;2000;B;5;1990;C");
    }

    #[test]
    fn add_road_rejects_duplicates_and_bad_fields() {
        let mut map = RoadMap::new();
        assert!(map.add_road("A", "B", 10, 2000));
        assert!(!map.add_road("A", "B", 10, 2000));
        assert!(!map.add_road("A", "A", 10, 2000));
        assert!(!map.add_road("C", "D", 0, 2000));
        assert!(!map.add_road("C", "D", 10, 0));
    }

    #[test]
    fn new_route_requires_existing_cities_and_unique_id() {
        let mut map = RoadMap::new();
        assert!(!map.new_route(1, "A", "B"));
        map.add_road("A", "B", 10, 2000);
        assert!(map.new_route(1, "A", "B"));
        assert!(!map.new_route(1, "A", "B"));
        assert!(!map.new_route(0, "A", "B"));
        assert!(!map.new_route(1000, "A", "B"));
    }

    #[test]
    fn extend_route_appends_and_rejects_repeat_city() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 2000);
        map.add_road("B", "C", 5, 1990);
        map.new_route(1, "A", "B");
        assert!(map.extend_route(1, "C"));
        assert_eq!(map.get_route_description(1), "1;A;10;2000;B;5;1990;C");
        assert!(!map.extend_route(1, "A"));
    }

    #[test]
    fn remove_route_unregisters_without_touching_roads() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 2000);
        map.new_route(1, "A", "B");
        assert!(map.remove_route(1));
        assert_eq!(map.get_route_description(1), "");
        assert!(map.repair_road("A", "B", 2001));
    }

    #[test]
    fn remove_road_reroutes_through_a_detour() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 2000);
        map.add_road("B", "C", 10, 2000);
        map.add_road("A", "D", 50, 2000);
        map.add_road("D", "C", 50, 2000);
        map.new_route(1, "A", "C");
        assert_eq!(map.get_route_description(1), "1;A;10;2000;B;10;2000;C");
        assert!(map.remove_road("A", "B"));
        assert_eq!(map.get_route_description(1), "1;A;50;2000;D;50;2000;C");
        assert!(map.road_gone("A", "B"));
    }

    #[test]
    fn remove_road_fails_whole_operation_if_any_route_is_unrepairable() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 2000);
        map.new_route(1, "A", "B");
        assert!(!map.remove_road("A", "B"));
        assert_eq!(map.get_route_description(1), "1;A;10;2000;B");
    }

    #[test]
    fn declare_route_creates_missing_roads_and_repairs_existing_ones() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 1980);
        let waypoints = vec![
            RouteSegment { city: "B".into(), length: 10, year: 1995 },
            RouteSegment { city: "C".into(), length: 20, year: 2001 },
        ];
        assert!(map.declare_route(7, "A", &waypoints));
        assert_eq!(map.get_route_description(7), "7;A;10;1995;B;20;2001;C");
    }

    #[test]
    fn declare_route_rejects_length_mismatch_without_mutating() {
        let mut map = RoadMap::new();
        map.add_road("A", "B", 10, 1980);
        let waypoints = vec![RouteSegment { city: "B".into(), length: 11, year: 1995 }];
        assert!(!map.declare_route(7, "A", &waypoints));
        assert_eq!(map.get_route_description(7), "");
        // The existing road must be untouched.
        assert!(!map.repair_road("A", "B", 1970));
    }

    #[test]
    fn declare_route_rejects_a_cycle() {
        let mut map = RoadMap::new();
        let waypoints = vec![
            RouteSegment { city: "B".into(), length: 10, year: 2000 },
            RouteSegment { city: "A".into(), length: 5, year: 2000 },
        ];
        assert!(!map.declare_route(1, "A", &waypoints));
    }
}
