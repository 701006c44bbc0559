//! Renders a route to its canonical textual description.

use crate::city_index::CityIndex;
use crate::graph::Graph;
use crate::route_store::Route;

/// `routeId;name(c1);len(c1,c2);year(c1,c2);name(c2);...;name(ck)`.
///
/// Every field is joined by `;` with no trailing separator.
pub fn describe(route: &Route, graph: &Graph, cities: &CityIndex) -> String {
    let mut out = String::new();
    out.push_str(&route.id.to_string());

    let mut tail = route.first();
    for window in route.cities.windows(2) {
        let a = window[0];
        let road = graph.road(a, window[1]).expect("route segment must have a live road");
        out.push(';');
        out.push_str(cities.name_of(a));
        out.push(';');
        out.push_str(&road.length.to_string());
        out.push(';');
        out.push_str(&road.year.to_string());
        tail = road.other(a);
    }
    out.push(';');
    out.push_str(cities.name_of(tail));
    out
}
