#![allow(dead_code)]

use std::path::Path;

use starlane_lib::{Body, Position, SpatialStore, SystemRecord};

pub fn open_rw(dir: &Path) -> SpatialStore {
    SpatialStore::open(&dir.join("index.db"), &dir.join("galaxy.db"), false)
        .expect("open store for writing")
}

pub fn reopen_ro(dir: &Path) -> SpatialStore {
    SpatialStore::open(&dir.join("index.db"), &dir.join("galaxy.db"), true)
        .expect("reopen store read-only")
}

pub fn import(store: &SpatialStore, records: impl IntoIterator<Item = SystemRecord>) {
    for record in records {
        store.insert_system(record).expect("queue record");
    }
    store.finish_insert().expect("drain loader");
}

pub fn system(id64: u64, name: &str, x: f64, y: f64, z: f64) -> SystemRecord {
    SystemRecord {
        id64,
        name: name.to_string(),
        coords: Position::new(x, y, z),
        bodies: Vec::new(),
    }
}

pub fn neutron_body() -> Body {
    Body {
        id64: 0,
        name: String::new(),
        kind: "Star".to_string(),
        sub_type: "Neutron Star".to_string(),
        distance_to_arrival: 0.0,
    }
}

pub fn scoopable_body() -> Body {
    Body {
        id64: 0,
        name: String::new(),
        kind: "Star".to_string(),
        sub_type: "G (White-Yellow) Star".to_string(),
        distance_to_arrival: 0.0,
    }
}
