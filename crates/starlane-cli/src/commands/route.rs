use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use starlane_lib::{FsdRating, IndexedSystem, Router, ShipModel, SpatialStore};

use crate::output::RouteSummary;

/// Ship parameters; defaults are a jump-fitted Anaconda.
#[derive(Args, Debug)]
pub struct ShipArgs {
    /// Fuel tank size in tons.
    #[arg(long, default_value_t = 32.0)]
    pub fuel_tank: f64,

    /// Full operating mass in tons.
    #[arg(long, default_value_t = 346.9)]
    pub mass: f64,

    /// FSD optimal mass in tons.
    #[arg(long, default_value_t = 1692.6)]
    pub fsd_optimal_mass: f64,

    /// Maximum fuel per jump in tons.
    #[arg(long, default_value_t = 5.0)]
    pub max_fuel_per_jump: f64,

    /// Guardian FSD booster bonus in light-years.
    #[arg(long, default_value_t = 10.5)]
    pub guardian_booster: f64,

    /// Fuel scoop rate in kg/s.
    #[arg(long, default_value_t = 878.0)]
    pub scoop_rate: f64,

    /// FSD rating letter (A-E).
    #[arg(long, default_value = "A")]
    pub fsd_rating: String,

    /// FSD class (2-8).
    #[arg(long, default_value_t = 5)]
    pub fsd_class: u8,
}

impl ShipArgs {
    fn build(&self) -> Result<ShipModel> {
        let rating: FsdRating = self.fsd_rating.parse()?;
        let ship = ShipModel::new(
            self.fuel_tank,
            self.mass,
            self.fsd_optimal_mass,
            self.max_fuel_per_jump,
            self.guardian_booster,
            self.scoop_rate,
            rating,
            self.fsd_class,
        )?;
        Ok(ship)
    }
}

pub fn run(
    index_db: &Path,
    galaxy_db: &Path,
    from: &str,
    to: &str,
    json: bool,
    args: &ShipArgs,
) -> Result<()> {
    if from.eq_ignore_ascii_case(to) {
        bail!("origin and destination are the same system");
    }

    let ship = args.build()?;
    let store = SpatialStore::open(index_db, galaxy_db, true)
        .context("unable to open store read-only; run `starlane import` first")?;

    let mut router = Router::new(&store, ship, from, to)
        .with_context(|| format!("unable to plan {from} -> {to}"))?;

    if json {
        let route = router.path();
        let summary = RouteSummary::build(&store, &router, &route);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Jump range: {:.2} ly", ship.jump_range());

    let origin = router.origin();
    let destination = router.destination();
    println!(
        "Start: {} at ({:.3}, {:.3}, {:.3})",
        origin.id64, origin.x, origin.y, origin.z
    );
    println!(
        "End: {} at ({:.3}, {:.3}, {:.3})",
        destination.id64, destination.x, destination.y, destination.z
    );
    println!("Distance: {:.1} ly", router.distance());

    let route = router.path();
    if !route.found {
        println!("No path found.");
        return Ok(());
    }

    println!(
        "Found path with cost {} after {} candidate checks",
        route.cost,
        router.systems_checked()
    );

    let mut previous: Option<IndexedSystem> = None;
    for (hop, system) in route.systems.iter().enumerate() {
        let leg = previous
            .map(|prev| prev.position().distance_to(&system.position()))
            .unwrap_or(0.0);
        let name = store
            .system_by_id(system.id64)
            .map(|record| record.name)
            .unwrap_or_else(|_| "<unknown>".to_string());

        println!(
            "[{hop}] SUPERCHARGE: {} REFUEL: {} {} ({:.1} ly)",
            flag(system.is_neutron),
            flag(system.is_scoopable),
            name,
            leg
        );
        previous = Some(*system);
    }

    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        "N"
    }
}
