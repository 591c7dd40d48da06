mod common;

use starlane_lib::{Body, Error, ScanBounds};
use tempfile::tempdir;

use common::{import, open_rw, reopen_ro, scoopable_body, system};

#[test]
fn import_classifies_and_persists_systems() {
    let dir = tempdir().expect("temp dir");
    let store = open_rw(dir.path());

    let mut sol = system(10477373803, "Sol", 0.0, 0.0, 0.0);
    sol.bodies.push(scoopable_body());
    sol.bodies.push(Body {
        id64: 36028807496337771,
        name: "Mercury".to_string(),
        kind: "Planet".to_string(),
        sub_type: "Metal-rich body".to_string(),
        distance_to_arrival: 209.972702,
    });

    let mut records = vec![sol];
    for i in 1..1000u64 {
        records.push(system(i, &format!("extra {i}"), i as f64, i as f64, i as f64));
    }
    records.push(system(10477373801, "Sol2", 0.0, 0.0, 0.0));

    import(&store, records);

    let origin = ScanBounds::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    let rows = store.scan(&origin).expect("scan");
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .any(|row| row.id64 == 10477373803 && !row.is_neutron && row.is_scoopable));
    assert!(rows
        .iter()
        .any(|row| row.id64 == 10477373801 && !row.is_neutron && !row.is_scoopable));

    // The full records, bodies included, survive in the galaxy store.
    let sol = store.system_by_name("sol").expect("lookup");
    assert_eq!(sol.bodies.len(), 2);

    let everything = ScanBounds::new(-10.0, 2000.0, -10.0, 2000.0, -10.0, 2000.0);
    assert_eq!(store.scan(&everything).expect("scan").len(), 1001);
}

#[test]
fn import_larger_than_one_batch_round_trips() {
    let dir = tempdir().expect("temp dir");
    let store = open_rw(dir.path());

    // Enough records that both writers commit mid-stream batches before
    // the durable tail flush.
    let count = 12_500u64;
    import(
        &store,
        (0..count).map(|i| system(i + 1, &format!("S{i}"), i as f64, 0.0, 0.0)),
    );

    let bounds = ScanBounds::new(0.0, count as f64, 0.0, 0.0, 0.0, 0.0);
    assert_eq!(store.scan(&bounds).expect("scan").len(), count as usize);

    // Records on both sides of the batch boundary landed.
    assert_eq!(store.system_by_name("S9999").expect("lookup").id64, 10_000);
    assert_eq!(store.system_by_name("S10000").expect("lookup").id64, 10_001);
    assert_eq!(store.system_by_name("S12499").expect("lookup").id64, 12_500);
}

#[test]
fn import_survives_a_read_only_reopen() {
    let dir = tempdir().expect("temp dir");
    {
        let store = open_rw(dir.path());
        import(
            &store,
            (0..100u64).map(|i| system(i + 1, &format!("S{i}"), i as f64, 0.0, 0.0)),
        );
    }

    let store = reopen_ro(dir.path());
    let bounds = ScanBounds::new(0.0, 99.0, 0.0, 0.0, 0.0, 0.0);
    assert_eq!(store.scan(&bounds).expect("scan").len(), 100);
    assert_eq!(store.system_by_name("S42").expect("lookup").id64, 43);
}

#[test]
fn finish_insert_is_idempotent_and_seals_the_handle() {
    let dir = tempdir().expect("temp dir");
    let store = open_rw(dir.path());

    store
        .insert_system(system(1, "Sol", 0.0, 0.0, 0.0))
        .expect("queue record");
    store.finish_insert().expect("first finish");
    store.finish_insert().expect("second finish is a no-op");

    assert!(matches!(
        store.insert_system(system(2, "Late", 1.0, 0.0, 0.0)),
        Err(Error::ImportFinished)
    ));
}

#[test]
fn finish_insert_without_inserts_is_a_no_op() {
    let dir = tempdir().expect("temp dir");
    let store = open_rw(dir.path());
    store.finish_insert().expect("nothing to drain");
}
