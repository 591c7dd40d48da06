//! Durable spatial store over two embedded B+tree databases.
//!
//! `index.db` holds the spatial tree: one `root` bucket keyed by the 24-byte
//! composite coordinate key (X key, Y key, Z key, each order-preserving).
//! The three-level X -> Y -> Z nesting is walked with cursor seeks: scanning
//! a box seeks to the lowest in-range key and skip-seeks to the next X or Y
//! prefix the moment a lower axis runs past its bound, so only buckets that
//! can contain matching points are ever touched.
//!
//! `galaxy.db` holds the full dump: a `systems` bucket keyed by big-endian
//! id64 with the record JSON, and a `names` bucket mapping the uppercased
//! name to the id64.
//!
//! Records are written exclusively through the bulk loader during an import
//! run; the store is reopened read-only for routing and never mutated during
//! queries.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition};
use tracing::debug;

use crate::codec::{self, IndexedSystem};
use crate::dump::SystemRecord;
use crate::error::{Error, Result};
use crate::geom::Position;
use crate::loader::LoaderState;

pub(crate) const INDEX_BUCKET: TableDefinition<&[u8], &[u8]> = TableDefinition::new("root");
pub(crate) const SYSTEMS_BUCKET: TableDefinition<&[u8], &[u8]> = TableDefinition::new("systems");
pub(crate) const NAMES_BUCKET: TableDefinition<&str, &[u8]> = TableDefinition::new("names");

/// Inclusive axis-aligned box for range scans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl ScanBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64, min_z: f64, max_z: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_corners(a: &Position, b: &Position) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
            min_z: a.z.min(b.z),
            max_z: a.z.max(b.z),
        }
    }

    /// Cube of the given half-side around a center point.
    pub fn around(center: &Position, half_side: f64) -> Self {
        Self {
            min_x: center.x - half_side,
            max_x: center.x + half_side,
            min_y: center.y - half_side,
            max_y: center.y + half_side,
            min_z: center.z - half_side,
            max_z: center.z + half_side,
        }
    }
}

/// Handle over the index and galaxy databases.
///
/// The handle is safe to share across threads; the engine serialises write
/// transactions internally. A second process holding the files causes
/// `open` to fail rather than block.
pub struct SpatialStore {
    pub(crate) index: Arc<Database>,
    pub(crate) galaxy: Arc<Database>,
    read_only: bool,
    loader: Mutex<LoaderState>,
}

impl SpatialStore {
    /// Open (or, in write mode, create) the store files.
    ///
    /// Write mode prepares the buckets up front so that later readers never
    /// observe a half-initialised schema.
    pub fn open(index_path: &Path, galaxy_path: &Path, read_only: bool) -> Result<Self> {
        let (index, galaxy) = if read_only {
            (Database::open(index_path)?, Database::open(galaxy_path)?)
        } else {
            let index = Database::create(index_path)?;
            let galaxy = Database::create(galaxy_path)?;
            prepare_index(&index)?;
            prepare_galaxy(&galaxy)?;
            (index, galaxy)
        };

        debug!(
            index = %index_path.display(),
            galaxy = %galaxy_path.display(),
            read_only,
            "opened spatial store"
        );

        Ok(Self {
            index: Arc::new(index),
            galaxy: Arc::new(galaxy),
            read_only,
            loader: Mutex::new(LoaderState::Idle),
        })
    }

    /// Queue one dump record for import.
    ///
    /// The first call starts the loader pipeline; subsequent calls feed the
    /// same pipeline. Blocks when the bounded input channel is full.
    pub fn insert_system(&self, record: SystemRecord) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        let input = {
            let mut state = self.loader.lock().map_err(|_| Error::WorkerPanicked)?;
            state.sender(&self.index, &self.galaxy)?
        };
        input.send(record).map_err(|_| Error::WorkerPanicked)
    }

    /// Signal end-of-stream, drain the loader, and surface batch failures.
    ///
    /// Individual batch failures never stop the import; they are collected
    /// and reported here in aggregate.
    pub fn finish_insert(&self) -> Result<()> {
        let mut state = self.loader.lock().map_err(|_| Error::WorkerPanicked)?;
        state.finish()
    }

    /// Look a system up by name, case-insensitively.
    ///
    /// The match is exact on the uppercased key; `Col 285` does not resolve
    /// to `Col 285 Sector AB-C`.
    pub fn system_by_name(&self, name: &str) -> Result<SystemRecord> {
        let key = codec::name_key(name);
        let read = self.galaxy.begin_read()?;
        let names = read.open_table(NAMES_BUCKET)?;

        let id64 = {
            let guard = names
                .get(key.as_str())?
                .ok_or_else(|| Error::UnknownSystem {
                    name: name.to_string(),
                })?;
            let bytes: [u8; 8] = guard.value().try_into().map_err(|_| Error::Malformed {
                what: "name entry",
                detail: format!("value for {key:?} is not an 8-byte id64"),
            })?;
            u64::from_be_bytes(bytes)
        };

        system_by_id_in(&read, id64)
    }

    /// Fetch the full record for an id64.
    pub fn system_by_id(&self, id64: u64) -> Result<SystemRecord> {
        let read = self.galaxy.begin_read()?;
        system_by_id_in(&read, id64)
    }

    /// Collect every indexed system whose quantised coordinates fall inside
    /// the inclusive box.
    pub fn scan(&self, bounds: &ScanBounds) -> Result<Vec<IndexedSystem>> {
        let mut out = Vec::new();
        self.for_each_in_box(bounds, &mut |system| {
            out.push(system);
            true
        })?;
        Ok(out)
    }

    /// Streaming variant of [`scan`](Self::scan) feeding a channel, for use
    /// as the producer half of a preload pipeline. Stops early without error
    /// when the receiving side hangs up.
    pub fn scan_into(&self, bounds: &ScanBounds, out: &Sender<IndexedSystem>) -> Result<()> {
        self.for_each_in_box(bounds, &mut |system| out.send(system).is_ok())
    }

    /// Walk the index over the box in (Kx, Ky, Kz) order, invoking the
    /// visitor per row until it returns false or the box is exhausted.
    fn for_each_in_box(
        &self,
        bounds: &ScanBounds,
        visit: &mut dyn FnMut(IndexedSystem) -> bool,
    ) -> Result<()> {
        let kx_min = codec::encode_coordinate(bounds.min_x);
        let kx_max = codec::encode_coordinate(bounds.max_x);
        let ky_min = codec::encode_coordinate(bounds.min_y);
        let ky_max = codec::encode_coordinate(bounds.max_y);
        let kz_min = codec::encode_coordinate(bounds.min_z);
        let kz_max = codec::encode_coordinate(bounds.max_z);

        let read = self.index.begin_read()?;
        let table = read.open_table(INDEX_BUCKET)?;

        let mut seek = compose_key(&kx_min, &ky_min, &kz_min);
        'seek: loop {
            let start = seek;
            let mut range = table.range(start.as_slice()..)?;
            loop {
                let Some(entry) = range.next() else {
                    return Ok(());
                };
                let (key_guard, value_guard) = entry?;
                let (kx, ky, kz) = split_key(key_guard.value())?;

                // Past the X range: nothing further can match.
                if kx > kx_max {
                    return Ok(());
                }
                // Below the Y range within this X bucket: seek forward to it.
                if ky < ky_min {
                    seek = compose_key(&kx, &ky_min, &kz_min);
                    continue 'seek;
                }
                // Past the Y range: this X bucket is exhausted.
                if ky > ky_max {
                    let Some(next_x) = bump(&kx) else {
                        return Ok(());
                    };
                    seek = compose_key(&next_x, &ky_min, &kz_min);
                    continue 'seek;
                }
                if kz < kz_min {
                    seek = compose_key(&kx, &ky, &kz_min);
                    continue 'seek;
                }
                if kz > kz_max {
                    seek = match bump(&ky) {
                        Some(next_y) => compose_key(&kx, &next_y, &kz_min),
                        None => match bump(&kx) {
                            Some(next_x) => compose_key(&next_x, &ky_min, &kz_min),
                            None => return Ok(()),
                        },
                    };
                    continue 'seek;
                }

                for system in codec::decode_leaf(value_guard.value())? {
                    if !visit(system) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn system_by_id_in(read: &ReadTransaction, id64: u64) -> Result<SystemRecord> {
    let systems = read.open_table(SYSTEMS_BUCKET)?;
    let guard = systems
        .get(id64.to_be_bytes().as_slice())?
        .ok_or(Error::UnknownSystemId { id64 })?;
    let record = serde_json::from_slice(guard.value())?;
    Ok(record)
}

fn prepare_index(db: &Database) -> Result<()> {
    let tx = db.begin_write()?;
    tx.open_table(INDEX_BUCKET)?;
    tx.commit()?;
    Ok(())
}

fn prepare_galaxy(db: &Database) -> Result<()> {
    let tx = db.begin_write()?;
    tx.open_table(SYSTEMS_BUCKET)?;
    tx.open_table(NAMES_BUCKET)?;
    tx.commit()?;
    Ok(())
}

fn compose_key(kx: &[u8; 8], ky: &[u8; 8], kz: &[u8; 8]) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[0..8].copy_from_slice(kx);
    key[8..16].copy_from_slice(ky);
    key[16..24].copy_from_slice(kz);
    key
}

fn split_key(key: &[u8]) -> Result<([u8; 8], [u8; 8], [u8; 8])> {
    if key.len() != 24 {
        return Err(Error::Malformed {
            what: "index key",
            detail: format!("expected 24 bytes, got {}", key.len()),
        });
    }
    Ok((
        key[0..8].try_into().expect("8-byte slice"),
        key[8..16].try_into().expect("8-byte slice"),
        key[16..24].try_into().expect("8-byte slice"),
    ))
}

/// Next coordinate key after `key`, or None at the end of the axis.
fn bump(key: &[u8; 8]) -> Option<[u8; 8]> {
    u64::from_be_bytes(*key)
        .checked_add(1)
        .map(u64::to_be_bytes)
}
