//! Bulk loader: batches the dump stream into write transactions.
//!
//! One producer (the caller's parser) feeds a bounded channel. A dispatcher
//! classifies each record and fans it out to two single-threaded batch
//! writers, one per database, so the index and the galaxy store fill in
//! parallel. Batch failures are collected on a separate channel and
//! reported once, at `finish_insert`; the stream always drains.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use redb::{Database, Durability, ReadableTable, Table};
use tracing::{debug, warn};

use crate::codec::{self, IndexedSystem};
use crate::dump::SystemRecord;
use crate::error::{Error, Result};
use crate::store::{INDEX_BUCKET, NAMES_BUCKET, SYSTEMS_BUCKET};

/// Records per write transaction.
const BATCH_SIZE: usize = 10_000;

/// Capacity of the loader channels; the producer blocks when writers lag.
const CHANNEL_BUFFER: usize = 1_024;

/// Import pipeline lifecycle. The pipeline starts on the first insert and
/// must never be started twice for one handle.
pub(crate) enum LoaderState {
    Idle,
    Running(Pipeline),
    Finished,
}

impl LoaderState {
    /// Hand out the input channel, starting the pipeline if this is the
    /// first insert on the handle.
    pub(crate) fn sender(
        &mut self,
        index: &Arc<Database>,
        galaxy: &Arc<Database>,
    ) -> Result<Sender<SystemRecord>> {
        match self {
            LoaderState::Running(pipeline) => Ok(pipeline.input.clone()),
            LoaderState::Finished => Err(Error::ImportFinished),
            LoaderState::Idle => {
                let pipeline = Pipeline::start(Arc::clone(index), Arc::clone(galaxy));
                let input = pipeline.input.clone();
                *self = LoaderState::Running(pipeline);
                Ok(input)
            }
        }
    }

    /// Close the input, join all workers, and return the aggregated errors.
    pub(crate) fn finish(&mut self) -> Result<()> {
        match std::mem::replace(self, LoaderState::Finished) {
            LoaderState::Idle | LoaderState::Finished => Ok(()),
            LoaderState::Running(pipeline) => pipeline.join(),
        }
    }
}

pub(crate) struct Pipeline {
    input: Sender<SystemRecord>,
    dispatcher: JoinHandle<()>,
    collector: JoinHandle<Vec<Error>>,
}

impl Pipeline {
    fn start(index: Arc<Database>, galaxy: Arc<Database>) -> Self {
        let (input_tx, input_rx) = bounded::<SystemRecord>(CHANNEL_BUFFER);
        let (err_tx, err_rx) = unbounded::<Error>();

        let collector = thread::spawn(move || err_rx.into_iter().collect());

        let dispatcher = thread::spawn(move || {
            let (index_tx, index_rx) = bounded::<IndexedSystem>(CHANNEL_BUFFER);
            let (galaxy_tx, galaxy_rx) = bounded::<SystemRecord>(CHANNEL_BUFFER);

            let index_errors = err_tx.clone();
            let index_writer = thread::spawn(move || {
                batch_writer(index_rx, index_errors, |batch, durability| {
                    write_index_batch(&index, batch, durability)
                });
            });

            let galaxy_errors = err_tx.clone();
            let galaxy_writer = thread::spawn(move || {
                batch_writer(galaxy_rx, galaxy_errors, |batch, durability| {
                    write_galaxy_batch(&galaxy, batch, durability)
                });
            });

            let mut consumed: u64 = 0;
            for record in input_rx {
                let row = IndexedSystem {
                    id64: record.id64,
                    x: record.coords.x,
                    y: record.coords.y,
                    z: record.coords.z,
                    is_neutron: record.has_neutron_in_range(),
                    is_scoopable: record.has_scoopable_in_range(),
                };
                if index_tx.send(row).is_err() || galaxy_tx.send(record).is_err() {
                    break;
                }
                consumed += 1;
            }
            drop(index_tx);
            drop(galaxy_tx);

            for writer in [index_writer, galaxy_writer] {
                if writer.join().is_err() {
                    let _ = err_tx.send(Error::WorkerPanicked);
                }
            }
            debug!(records = consumed, "bulk load input drained");
        });

        Self {
            input: input_tx,
            dispatcher,
            collector,
        }
    }

    fn join(self) -> Result<()> {
        let Pipeline {
            input,
            dispatcher,
            collector,
        } = self;
        drop(input);

        let mut errors = Vec::new();
        if dispatcher.join().is_err() {
            errors.push(Error::WorkerPanicked);
        }
        match collector.join() {
            Ok(collected) => errors.extend(collected),
            Err(_) => errors.push(Error::WorkerPanicked),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Import { errors })
        }
    }
}

/// Drain a channel into batches and commit each in one write transaction.
///
/// Steady-state batches commit with eventual durability; the tail batch at
/// end-of-stream commits durably, which also seals everything before it.
fn batch_writer<T>(
    input: Receiver<T>,
    errors: Sender<Error>,
    mut write: impl FnMut(&[T], Durability) -> Result<()>,
) {
    let mut batch: Vec<T> = Vec::with_capacity(BATCH_SIZE);
    for item in input {
        batch.push(item);
        if batch.len() == BATCH_SIZE {
            if let Err(err) = write(&batch, Durability::Eventual) {
                warn!(error = %err, "batch write failed");
                let _ = errors.send(err);
            }
            batch.clear();
        }
    }
    if let Err(err) = write(&batch, Durability::Immediate) {
        warn!(error = %err, "tail batch write failed");
        let _ = errors.send(err);
    }
}

fn write_index_batch(db: &Database, batch: &[IndexedSystem], durability: Durability) -> Result<()> {
    let mut tx = db.begin_write()?;
    tx.set_durability(durability);
    {
        let mut table = tx.open_table(INDEX_BUCKET)?;
        for system in batch {
            let key = codec::leaf_key(system.x, system.y, system.z);
            upsert_leaf(&mut table, &key, system)?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Default policy: the leaf holds a length-prefixed list and an insert
/// replaces the row with the same id64 or appends.
#[cfg(not(feature = "single-occupancy"))]
fn upsert_leaf(
    table: &mut Table<'_, &[u8], &[u8]>,
    key: &[u8; 24],
    system: &IndexedSystem,
) -> Result<()> {
    let mut rows = match table.get(key.as_slice())? {
        Some(guard) => codec::decode_rows(guard.value())?,
        None => Vec::new(),
    };
    match rows.iter().position(|row| row.id64 == system.id64) {
        Some(found) => rows[found] = *system,
        None => rows.push(*system),
    }
    table.insert(key.as_slice(), codec::encode_rows(&rows).as_slice())?;
    Ok(())
}

/// `single-occupancy` policy: one row per leaf, later inserts overwrite.
#[cfg(feature = "single-occupancy")]
fn upsert_leaf(
    table: &mut Table<'_, &[u8], &[u8]>,
    key: &[u8; 24],
    system: &IndexedSystem,
) -> Result<()> {
    table.insert(key.as_slice(), codec::encode_row(system).as_slice())?;
    Ok(())
}

fn write_galaxy_batch(db: &Database, batch: &[SystemRecord], durability: Durability) -> Result<()> {
    let mut tx = db.begin_write()?;
    tx.set_durability(durability);
    {
        let mut systems = tx.open_table(SYSTEMS_BUCKET)?;
        let mut names = tx.open_table(NAMES_BUCKET)?;
        for record in batch {
            let value = serde_json::to_vec(record)?;
            systems.insert(record.id64.to_be_bytes().as_slice(), value.as_slice())?;
            names.insert(
                codec::name_key(&record.name).as_str(),
                record.id64.to_be_bytes().as_slice(),
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}
