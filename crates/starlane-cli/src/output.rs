//! Structured route output for machine consumption.

use serde::Serialize;
use starlane_lib::{IndexedSystem, Route, Router, SpatialStore};

/// Serialisable summary of one route query.
#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub found: bool,
    pub cost: f64,
    pub distance_ly: f64,
    pub systems_checked: u64,
    pub hops: Vec<RouteHop>,
}

/// One hop of a found route.
#[derive(Debug, Serialize)]
pub struct RouteHop {
    pub id64: u64,
    /// Resolved from the galaxy store; absent if the record is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub supercharge: bool,
    pub refuel: bool,
    /// Distance from the previous hop; zero for the origin.
    pub leg_ly: f64,
}

impl RouteSummary {
    pub fn build(store: &SpatialStore, router: &Router, route: &Route) -> Self {
        let mut previous: Option<IndexedSystem> = None;
        let hops = route
            .systems
            .iter()
            .map(|system| {
                let leg_ly = previous
                    .map(|prev| prev.position().distance_to(&system.position()))
                    .unwrap_or(0.0);
                previous = Some(*system);

                RouteHop {
                    id64: system.id64,
                    name: store.system_by_id(system.id64).ok().map(|record| record.name),
                    x: system.x,
                    y: system.y,
                    z: system.z,
                    supercharge: system.is_neutron,
                    refuel: system.is_scoopable,
                    leg_ly,
                }
            })
            .collect();

        Self {
            found: route.found,
            cost: route.cost,
            distance_ly: router.distance(),
            systems_checked: router.systems_checked(),
            hops,
        }
    }
}
