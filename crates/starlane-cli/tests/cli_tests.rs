use std::fs::File;
use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;

fn write_dump(path: &Path, records: &[serde_json::Value]) {
    let file = File::create(path).expect("create dump file");
    let mut encoder = GzEncoder::new(file, Compression::fast());
    writeln!(encoder, "[").expect("write");
    for (i, record) in records.iter().enumerate() {
        let comma = if i + 1 == records.len() { "" } else { "," };
        writeln!(encoder, "{record}{comma}").expect("write");
    }
    writeln!(encoder, "]").expect("write");
    encoder.finish().expect("finish gzip stream");
}

fn sample_records() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id64": 1,
            "name": "Sol",
            "coords": {"x": 0.0, "y": 0.0, "z": 0.0},
            "bodies": [{
                "id64": 1,
                "name": "Sol",
                "type": "Star",
                "subType": "G (White-Yellow) Star",
                "distanceToArrival": 0.0
            }]
        }),
        json!({
            "id64": 2,
            "name": "Beacon",
            "coords": {"x": 30.0, "y": 0.0, "z": 0.0},
            "bodies": [{
                "id64": 2,
                "name": "Beacon",
                "type": "Star",
                "subType": "Neutron Star",
                "distanceToArrival": 0.0
            }]
        }),
        json!({
            "id64": 3,
            "name": "Colonia",
            "coords": {"x": 60.0, "y": 0.0, "z": 0.0}
        }),
        json!({
            "id64": 4,
            "name": "Distant",
            "coords": {"x": 5000.0, "y": 0.0, "z": 0.0}
        }),
    ]
}

fn starlane(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("starlane").expect("binary builds");
    cmd.arg("--index-db").arg(dir.join("index.db"));
    cmd.arg("--galaxy-db").arg(dir.join("galaxy.db"));
    cmd
}

fn import_sample(dir: &Path) {
    let dump = dir.join("dump.json.gz");
    write_dump(&dump, &sample_records());

    starlane(dir)
        .arg("import")
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 4 systems."));
}

#[test]
fn import_reports_the_record_count() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());
}

#[test]
fn route_prints_each_hop_with_names() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    starlane(dir.path())
        .arg("route")
        .arg("sol")
        .arg("colonia")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found path with cost"))
        .stdout(predicate::str::contains("Sol"))
        .stdout(predicate::str::contains("Colonia"));
}

#[test]
fn route_json_emits_a_parsable_summary() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    let output = starlane(dir.path())
        .arg("route")
        .arg("Sol")
        .arg("Colonia")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(summary["found"], json!(true));
    assert_eq!(summary["cost"], json!(101.0));

    let hops = summary["hops"].as_array().expect("hops array");
    assert_eq!(hops.len(), 2);
    assert_eq!(hops[0]["name"], json!("Sol"));
    assert_eq!(hops[1]["name"], json!("Colonia"));
    assert_eq!(hops[1]["leg_ly"], json!(60.0));
}

#[test]
fn route_without_a_path_is_not_an_error() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    starlane(dir.path())
        .arg("route")
        .arg("Sol")
        .arg("Distant")
        .assert()
        .success()
        .stdout(predicate::str::contains("No path found."));
}

#[test]
fn route_to_an_unknown_system_fails() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    starlane(dir.path())
        .arg("route")
        .arg("Sol")
        .arg("Nowhere")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown system name"));
}

#[test]
fn route_to_the_same_system_is_rejected() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    starlane(dir.path())
        .arg("route")
        .arg("Sol")
        .arg("sol")
        .assert()
        .failure()
        .stderr(predicate::str::contains("same system"));
}

#[test]
fn route_rejects_an_unknown_fsd_class() {
    let dir = tempdir().expect("temp dir");
    import_sample(dir.path());

    starlane(dir.path())
        .arg("route")
        .arg("Sol")
        .arg("Colonia")
        .arg("--fsd-class")
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported FSD class"));
}
