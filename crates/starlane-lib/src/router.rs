//! Cost-weighted A* routing over a dynamically expanded jump graph.
//!
//! Nodes are star systems; an edge exists between any two systems closer
//! than the current effective jump range, which a neutron supercharge
//! quadruples. Neighbours are resolved lazily against an in-memory working
//! set preloaded from the store: one range scan over the bounding box of the
//! endpoints, cut down to a generous cylinder around the origin-destination
//! axis. Querying the store per expansion instead was tried and is slower by
//! orders of magnitude.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::thread;

use crossbeam_channel::bounded;
use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::codec::IndexedSystem;
use crate::dump::SystemRecord;
use crate::error::{Error, Result};
use crate::geom::{self, Position};
use crate::ship::ShipModel;
use crate::store::{ScanBounds, SpatialStore};

/// Base time cost of one jump.
const JUMP_COST: f64 = 101.0;

/// Credited back when the target can supercharge the following jump.
const NEUTRON_DISCOUNT: f64 = 100.0;

/// Range multiplier granted by a neutron supercharge.
const SUPERCHARGE_FACTOR: f64 = 4.0;

/// Fraction of the effective range below which non-neutron candidates are
/// dropped, forcing long jumps.
const ANNULUS_INNER_FRACTION: f64 = 0.90;

/// Preload cylinder radius in multiples of the unladen jump range.
/// Generous on purpose: neutron chains detour well off the straight axis.
const CYLINDER_RANGE_FACTOR: f64 = 10.0;

/// Capacity of the channel between the store scan and the preload filter.
const PRELOAD_BUFFER: usize = 1_024;

const TREE_BUCKET_SIZE: usize = 32;

type PositionTree = KdTree<f64, u64, 3, TREE_BUCKET_SIZE, u32>;

/// Result of one search.
///
/// `found == false` means no path exists inside the working set; the
/// systems are empty and the cost is zero. On success the first system is
/// the origin, the last is the destination, and every consecutive pair is
/// within the effective range of the earlier system.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub systems: Vec<IndexedSystem>,
    pub cost: f64,
    pub found: bool,
}

impl Route {
    fn not_found() -> Self {
        Self {
            systems: Vec::new(),
            cost: 0.0,
            found: false,
        }
    }
}

/// Per-system search state, created when the system enters the working set
/// and mutated only by [`Router::path`].
struct Node {
    system: IndexedSystem,
    ship: ShipModel,
    g: f64,
    parent: Option<u64>,
    closed: bool,
}

impl Node {
    fn new(system: IndexedSystem, ship: ShipModel) -> Self {
        Self {
            system,
            ship,
            g: f64::INFINITY,
            parent: None,
            closed: false,
        }
    }
}

/// Open-set entry; min-ordered by `f`, ties broken by insertion order.
struct OpenEntry {
    f: f64,
    seq: u64,
    id: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// One route search: origin, destination, and the working set between them.
///
/// The working set is owned by this search and must not be shared between
/// concurrent routes.
pub struct Router {
    nodes: HashMap<u64, Node>,
    tree: PositionTree,
    origin: IndexedSystem,
    goal: IndexedSystem,
    origin_pos: Position,
    goal_pos: Position,
    distance: f64,
    systems_checked: u64,
}

impl Router {
    /// Resolve both endpoints by name and preload the working set.
    ///
    /// The store scan streams through a bounded channel while this thread
    /// applies the cylinder filter and builds the position tree; the two
    /// endpoints are inserted unconditionally so they can never be pruned.
    pub fn new(
        store: &SpatialStore,
        ship: ShipModel,
        from_name: &str,
        to_name: &str,
    ) -> Result<Self> {
        let from = store.system_by_name(from_name)?;
        let to = store.system_by_name(to_name)?;

        let origin = index_entry(&from);
        let goal = index_entry(&to);
        let origin_pos = from.coords;
        let goal_pos = to.coords;
        let distance = origin_pos.distance_to(&goal_pos);

        let bounds = ScanBounds::from_corners(&origin_pos, &goal_pos);
        let radius = ship.jump_range() * CYLINDER_RANGE_FACTOR;

        let mut nodes: HashMap<u64, Node> = HashMap::new();
        let mut tree = PositionTree::new();
        let mut add = |nodes: &mut HashMap<u64, Node>, tree: &mut PositionTree,
                       system: IndexedSystem| {
            if !nodes.contains_key(&system.id64) {
                tree.add(&[system.x, system.y, system.z], system.id64);
                nodes.insert(system.id64, Node::new(system, ship));
            }
        };

        thread::scope(|scope| -> Result<()> {
            let (tx, rx) = bounded::<IndexedSystem>(PRELOAD_BUFFER);
            let producer = scope.spawn(move || store.scan_into(&bounds, &tx));

            for system in rx {
                if system.id64 == origin.id64 || system.id64 == goal.id64 {
                    continue;
                }
                if !geom::in_cylinder(&origin_pos, &goal_pos, radius, &system.position()) {
                    continue;
                }
                add(&mut nodes, &mut tree, system);
            }

            match producer.join() {
                Ok(result) => result,
                Err(_) => Err(Error::WorkerPanicked),
            }
        })?;

        add(&mut nodes, &mut tree, origin);
        add(&mut nodes, &mut tree, goal);

        debug!(
            working_set = nodes.len(),
            distance, radius, "router initialised"
        );

        Ok(Self {
            nodes,
            tree,
            origin,
            goal,
            origin_pos,
            goal_pos,
            distance,
            systems_checked: 0,
        })
    }

    pub fn origin(&self) -> IndexedSystem {
        self.origin
    }

    pub fn destination(&self) -> IndexedSystem {
        self.goal
    }

    /// Straight-line distance between the endpoints, in light-years.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Candidate edges examined so far.
    pub fn systems_checked(&self) -> u64 {
        self.systems_checked
    }

    /// Run the search and return the cheapest path found.
    pub fn path(&mut self) -> Route {
        for node in self.nodes.values_mut() {
            node.g = f64::INFINITY;
            node.parent = None;
            node.closed = false;
        }

        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;

        let origin_id = self.origin.id64;
        let goal_id = self.goal.id64;
        if let Some(node) = self.nodes.get_mut(&origin_id) {
            node.g = 0.0;
            open.push(OpenEntry {
                f: self.distance,
                seq,
                id: origin_id,
            });
        }

        while let Some(entry) = open.pop() {
            let (current_g, current_ship) = {
                let Some(node) = self.nodes.get_mut(&entry.id) else {
                    continue;
                };
                if node.closed {
                    continue;
                }
                node.closed = true;
                (node.g, node.ship)
            };

            if entry.id == goal_id {
                return self.reconstruct(goal_id);
            }

            for (next_id, jump_distance) in self.neighbours_of(entry.id) {
                let Some(next) = self.nodes.get(&next_id) else {
                    continue;
                };
                if next.closed {
                    continue;
                }

                let mut cost = JUMP_COST;
                if next.system.is_neutron {
                    cost -= NEUTRON_DISCOUNT;
                }

                // A candidate the tank cannot cover is silently dropped.
                let Ok(mut arrived) = current_ship.jump(jump_distance) else {
                    continue;
                };
                if next.system.is_scoopable {
                    arrived = arrived.refuel();
                }

                let tentative = current_g + cost;
                let heuristic = next.system.position().distance_to(&self.goal_pos);
                if let Some(next) = self.nodes.get_mut(&next_id) {
                    if tentative < next.g {
                        next.g = tentative;
                        next.parent = Some(entry.id);
                        next.ship = arrived;
                        seq += 1;
                        open.push(OpenEntry {
                            f: tentative + heuristic,
                            seq,
                            id: next_id,
                        });
                    }
                }
            }
        }

        Route::not_found()
    }

    /// Systems reachable from `id` in one jump under the annulus filter.
    ///
    /// The inner sphere rejects short non-neutron hops; it is disabled
    /// entirely when either endpoint sits inside the outer sphere so the
    /// target can never be filtered away.
    fn neighbours_of(&mut self, id: u64) -> Vec<(u64, f64)> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let center = node.system.position();
        let mut effective_range = node.ship.jump_range();
        if node.system.is_neutron {
            effective_range *= SUPERCHARGE_FACTOR;
        }

        let mut inner_radius = effective_range * ANNULUS_INNER_FRACTION;
        if geom::in_sphere(&self.goal_pos, &center, effective_range)
            || geom::in_sphere(&self.origin_pos, &center, effective_range)
        {
            inner_radius = 0.0;
        }

        let hits = self.tree.within::<SquaredEuclidean>(
            &[center.x, center.y, center.z],
            effective_range * effective_range,
        );

        let mut out = Vec::with_capacity(hits.len());
        for hit in hits {
            let next_id = hit.item;
            if next_id == id {
                continue;
            }
            let Some(next) = self.nodes.get(&next_id) else {
                continue;
            };
            let position = next.system.position();
            if !geom::in_sphere(&position, &center, effective_range) {
                continue;
            }
            if inner_radius > 0.0
                && geom::in_sphere(&position, &center, inner_radius)
                && !next.system.is_neutron
            {
                continue;
            }
            self.systems_checked += 1;
            out.push((next_id, center.distance_to(&position)));
        }
        out
    }

    fn reconstruct(&self, goal_id: u64) -> Route {
        let mut systems = Vec::new();
        let mut cursor = Some(goal_id);
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(&id) else {
                break;
            };
            systems.push(node.system);
            cursor = node.parent;
        }
        systems.reverse();

        let cost = self.nodes.get(&goal_id).map(|node| node.g).unwrap_or(0.0);
        Route {
            systems,
            cost,
            found: true,
        }
    }
}

fn index_entry(record: &SystemRecord) -> IndexedSystem {
    IndexedSystem {
        id64: record.id64,
        x: record.coords.x,
        y: record.coords.y,
        z: record.coords.z,
        is_neutron: record.has_neutron_in_range(),
        is_scoopable: record.has_scoopable_in_range(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_entries_order_by_f_then_insertion() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry {
            f: 5.0,
            seq: 0,
            id: 1,
        });
        heap.push(OpenEntry {
            f: 3.0,
            seq: 1,
            id: 2,
        });
        heap.push(OpenEntry {
            f: 3.0,
            seq: 2,
            id: 3,
        });

        assert_eq!(heap.pop().map(|entry| entry.id), Some(2));
        assert_eq!(heap.pop().map(|entry| entry.id), Some(3));
        assert_eq!(heap.pop().map(|entry| entry.id), Some(1));
    }
}
