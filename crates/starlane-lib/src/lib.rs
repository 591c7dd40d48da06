//! Shortest-time interstellar routing over a galaxy-scale spatial index.
//!
//! This crate imports galaxy dumps into an embedded key-value store indexed
//! by quantised coordinates, then answers route queries between named star
//! systems with a cost-weighted A* search that exploits the neutron-star
//! supercharge mechanic (a one-shot 4x range boost for the jump after
//! passing through a neutron system).
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use starlane_lib::{FsdRating, Router, ShipModel, SpatialStore};
//!
//! # fn main() -> starlane_lib::Result<()> {
//! // Import time: stream dump records into the store.
//! // (A CLI collaborator parses the dump; the store consumes records.)
//!
//! // Query time: reopen read-only and search.
//! let store = SpatialStore::open(Path::new("index.db"), Path::new("galaxy.db"), true)?;
//! let ship = ShipModel::new(32.0, 346.9, 1692.6, 5.0, 10.5, 878.0, FsdRating::A, 5)?;
//! let mut router = Router::new(&store, ship, "Sol", "Colonia")?;
//! let route = router.path();
//! if route.found {
//!     println!("{} jumps, cost {}", route.systems.len() - 1, route.cost);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`codec`] — order-preserving coordinate keys and the fixed row layout.
//! - [`store`] — the two embedded databases: spatial index and full records.
//! - [`loader`] — batching import pipeline behind
//!   [`SpatialStore::insert_system`].
//! - [`ship`] — FSD fuel physics; immutable value semantics.
//! - [`router`] — the A* search with cylinder preload and annulus pruning.

pub mod codec;
pub mod dump;
pub mod error;
pub mod geom;
mod loader;
pub mod router;
pub mod ship;
pub mod store;

pub use codec::IndexedSystem;
pub use dump::{Body, SystemRecord, MAX_STAR_DISTANCE_LS, SCOOPABLE_CLASSES};
pub use error::{Error, Result};
pub use geom::Position;
pub use router::{Route, Router};
pub use ship::{FsdRating, ShipModel};
pub use store::{ScanBounds, SpatialStore};
