//! The core shortest-path search: minimize total length, break ties by
//! maximizing the oldest (minimum-year) edge on the path, and flag any
//! further tie as ambiguous.
//!
//! This is a label-correcting relaxation (Bellman-Ford/SPFA style) over a
//! FIFO queue rather than a priority queue: the tie-break criterion is not
//! monotone along a path the way Dijkstra's edge weights are (a later,
//! younger edge can still be the new "oldest" winner for an already-settled
//! vertex), so a strict priority order buys nothing here and a plain
//! `VecDeque` is both simpler and matches the relaxation rules below
//! one-for-one.

use std::collections::VecDeque;

use crate::error::MapError;
use crate::graph::Graph;
use crate::ids::{CityId, RouteId};
use crate::route_store::Route;

/// The minimum edge year seen so far along a best-known path, with an
/// explicit "no edge yet" sentinel distinct from any real year.
///
/// `Unconstrained` only ever occurs at the source vertex itself (a
/// zero-length prefix has no edges to be the minimum of); everywhere else it
/// behaves as dropping out of the `min` the moment the first real edge
/// combines with it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Oldest {
    Unconstrained,
    Year(i32),
}

impl Oldest {
    fn extend(self, edge_year: i32) -> Oldest {
        match self {
            Oldest::Unconstrained => Oldest::Year(edge_year),
            Oldest::Year(y) => Oldest::Year(y.min(edge_year)),
        }
    }

    /// `true` iff `self` is a strictly younger (larger) minimum-year than
    /// `other` — i.e. `self` describes the more desirable path.
    fn is_younger_than(self, other: Oldest) -> bool {
        match (self, other) {
            (Oldest::Unconstrained, Oldest::Unconstrained) => false,
            (Oldest::Unconstrained, Oldest::Year(_)) => true,
            (Oldest::Year(_), Oldest::Unconstrained) => false,
            (Oldest::Year(a), Oldest::Year(b)) => a > b,
        }
    }
}

/// Sentinel for "no path found yet".
const DIST_INF: u64 = u64::MAX;

/// Full per-vertex result of a search, before interpretation by a caller.
pub struct SpfaOutcome {
    dist: Vec<u64>,
    oldest: Vec<Oldest>,
    unique: Vec<bool>,
    prev: Vec<Option<CityId>>,
    target: CityId,
}

impl SpfaOutcome {
    pub fn dist_to_target(&self) -> u64 {
        self.dist[self.target.index()]
    }

    pub fn oldest_to_target(&self) -> Oldest {
        self.oldest[self.target.index()]
    }

    pub fn is_unique(&self) -> bool {
        self.unique[self.target.index()]
    }

    pub fn is_reachable(&self) -> bool {
        self.dist_to_target() != DIST_INF
    }

    /// `Ok(())` when this outcome names a usable best path to the target;
    /// otherwise the specific reason it doesn't.
    pub fn check(&self) -> Result<(), MapError> {
        if !self.is_reachable() {
            Err(MapError::Unreachable)
        } else if !self.is_unique() {
            Err(MapError::Ambiguous)
        } else {
            Ok(())
        }
    }

    /// Total length of the path named by this outcome, using `u64` since the
    /// sum of per-segment `u32` lengths can exceed `u32::MAX`.
    pub fn len(&self) -> u64 {
        self.dist_to_target()
    }

    /// Orders two outcomes by the composite rule used by `extendRoute` to
    /// pick between extending forward or backward: smaller length wins,
    /// then a younger oldest-year wins. Both sides must already have passed
    /// [`check`](Self::check).
    pub fn beats(&self, other: &Self) -> bool {
        if self.dist_to_target() != other.dist_to_target() {
            self.dist_to_target() < other.dist_to_target()
        } else {
            self.oldest_to_target().is_younger_than(other.oldest_to_target())
        }
    }

    pub fn ties_with(&self, other: &Self) -> bool {
        self.dist_to_target() == other.dist_to_target()
            && self.oldest_to_target() == other.oldest_to_target()
    }

    /// Reconstructs the path from the search's source to `target`, inclusive
    /// of both endpoints, by walking `prev` backwards.
    pub fn path(&self) -> Vec<CityId> {
        let mut path = vec![self.target];
        let mut cur = self.target;
        while let Some(p) = self.prev[cur.index()] {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }
}

/// A neighbor `v` of the vertex currently being relaxed is inadmissible
/// under forbidden-route `r` iff `v` is on route `r` and it isn't the
/// special case of arriving at the target directly from the source.
fn admissible(v: CityId, u: CityId, s: CityId, t: CityId, forbidden: Option<&Route>) -> bool {
    match forbidden {
        None => true,
        Some(route) => {
            if !route.contains(v) {
                true
            } else {
                v == t && u != s
            }
        }
    }
}

/// Runs the tie-broken shortest-path search from `s` to `t`.
///
/// `forbidden` is the route being extended/repaired, if any; `None` means
/// no route is forbidden (every vertex is admissible).
pub fn search(
    graph: &Graph,
    num_cities: usize,
    s: CityId,
    t: CityId,
    forbidden: Option<(RouteId, &Route)>,
) -> SpfaOutcome {
    let forbidden_route = forbidden.map(|(_, route)| route);
    log::trace!(
        "spfa search {} -> {} over {} cities (forbidden route: {:?})",
        s,
        t,
        num_cities,
        forbidden.map(|(rid, _)| rid)
    );

    let mut dist = vec![DIST_INF; num_cities];
    let mut oldest = vec![Oldest::Unconstrained; num_cities];
    let mut unique = vec![false; num_cities];
    let mut prev: Vec<Option<CityId>> = vec![None; num_cities];
    let mut in_queue = vec![false; num_cities];

    dist[s.index()] = 0;
    unique[s.index()] = true;

    let mut queue: VecDeque<CityId> = VecDeque::new();
    queue.push_back(s);
    in_queue[s.index()] = true;
    let mut pops = 0u64;

    while let Some(u) = queue.pop_front() {
        pops += 1;
        in_queue[u.index()] = false;
        let du = dist[u.index()];
        let ou = oldest[u.index()];
        let uu = unique[u.index()];

        for (v, road) in graph.neighbors(u) {
            if !admissible(v, u, s, t, forbidden_route) {
                continue;
            }
            let cand_len = du + road.length as u64;
            let cand_old = ou.extend(road.year);

            if cand_len < dist[v.index()] {
                dist[v.index()] = cand_len;
                oldest[v.index()] = cand_old;
                prev[v.index()] = Some(u);
                unique[v.index()] = uu;
                if !in_queue[v.index()] {
                    queue.push_back(v);
                    in_queue[v.index()] = true;
                }
            } else if cand_len == dist[v.index()] {
                if cand_old.is_younger_than(oldest[v.index()]) {
                    oldest[v.index()] = cand_old;
                    prev[v.index()] = Some(u);
                    unique[v.index()] = uu;
                    // No re-enqueue: dist didn't change, so v's own
                    // downstream relaxations already saw its best dist; any
                    // further oldest-only improvement is caught on later
                    // pops of v's other predecessors.
                } else if cand_old == oldest[v.index()] && prev[v.index()] != Some(u) {
                    unique[v.index()] = false;
                }
                // cand_old < oldest[v]: strictly worse, ignore.
            }
            // cand_len > dist[v]: strictly worse, ignore.
        }
    }

    log::trace!("spfa settled after {} queue pops, dist[target]={}", pops, dist[t.index()]);
    SpfaOutcome { dist, oldest, unique, prev, target: t }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CityId;
    use crate::route_store::Route;

    fn cid(n: u32) -> CityId {
        CityId(n)
    }

    #[test]
    fn simple_two_hop_path() {
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 10, 2000).unwrap();
        g.add_road(cid(1), cid(2), 10, 2000).unwrap();
        let out = search(&g, 3, cid(0), cid(2), None);
        out.check().unwrap();
        assert_eq!(out.len(), 20);
        assert_eq!(out.path(), vec![cid(0), cid(1), cid(2)]);
    }

    #[test]
    fn tie_broken_by_oldest_year() {
        // A-X-B: years 2000/2000 (oldest=2000); A-Y-B: years 1990/2000 (oldest=1990).
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 5, 2000).unwrap(); // A-X
        g.add_road(cid(1), cid(2), 5, 2000).unwrap(); // X-B
        g.add_road(cid(0), cid(3), 5, 1990).unwrap(); // A-Y
        g.add_road(cid(3), cid(2), 5, 2000).unwrap(); // Y-B
        let out = search(&g, 4, cid(0), cid(2), None);
        out.check().unwrap();
        assert_eq!(out.path(), vec![cid(0), cid(1), cid(2)]);
    }

    #[test]
    fn exact_tie_is_ambiguous() {
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 5, 2000).unwrap();
        g.add_road(cid(1), cid(2), 5, 2000).unwrap();
        g.add_road(cid(0), cid(3), 5, 2000).unwrap();
        g.add_road(cid(3), cid(2), 5, 2000).unwrap();
        let out = search(&g, 4, cid(0), cid(2), None);
        assert_eq!(out.check(), Err(MapError::Ambiguous));
    }

    #[test]
    fn unreachable_target() {
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 5, 2000).unwrap();
        g.ensure_city(cid(2));
        let out = search(&g, 3, cid(0), cid(2), None);
        assert_eq!(out.check(), Err(MapError::Unreachable));
    }

    #[test]
    fn forbidden_route_blocks_interior_but_allows_target() {
        // A-B-C on route 1; a separate A-D-C detour exists.
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 5, 2000).unwrap(); // A-B
        g.add_road(cid(1), cid(2), 5, 2000).unwrap(); // B-C
        g.add_road(cid(0), cid(3), 100, 2000).unwrap(); // A-D (longer)
        g.add_road(cid(3), cid(2), 100, 2000).unwrap(); // D-C
        let route = Route { id: crate::ids::RouteId(1), cities: vec![cid(0), cid(1), cid(2)] };
        // Searching A -> C forbidding route 1 must avoid B (interior, not the target).
        let out = search(&g, 4, cid(0), cid(2), Some((route.id, &route)));
        out.check().unwrap();
        assert_eq!(out.path(), vec![cid(0), cid(3), cid(2)]);
    }

    #[test]
    fn forbidden_route_blocks_a_direct_single_hop_onto_the_target() {
        // Replacing edge A-C (both endpoints on the route) must not let the
        // search just reuse that same direct edge as a trivial "replacement".
        let mut g = Graph::new();
        g.add_road(cid(0), cid(2), 5, 2000).unwrap(); // A-C direct, the edge being replaced
        let route = Route { id: crate::ids::RouteId(1), cities: vec![cid(0), cid(2)] };
        let out = search(&g, 3, cid(0), cid(2), Some((route.id, &route)));
        assert_eq!(out.check(), Err(MapError::Unreachable));
    }

    #[test]
    fn forbidden_route_allows_the_target_once_an_intermediate_hop_is_taken() {
        // A-B-C, with C on the route (the search target) but B not on it:
        // arriving at C via B (u = B != s = A) is admissible.
        let mut g = Graph::new();
        g.add_road(cid(0), cid(1), 5, 2000).unwrap(); // A-B
        g.add_road(cid(1), cid(2), 5, 2000).unwrap(); // B-C
        let route = Route { id: crate::ids::RouteId(1), cities: vec![cid(0), cid(2)] };
        let out = search(&g, 3, cid(0), cid(2), Some((route.id, &route)));
        out.check().unwrap();
        assert_eq!(out.path(), vec![cid(0), cid(1), cid(2)]);
    }
}
