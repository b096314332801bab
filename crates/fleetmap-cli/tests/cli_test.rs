//! End-to-end tests driving the fleetmap binary

use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tempfile::TempDir;

const POINTS: &str = r#"[
    {"id": "0", "name": "Depot", "lat": -7.2600, "lon": 112.7500, "category": "depot"},
    {"id": "r", "name": "Refill A", "lat": -7.2800, "lon": 112.7600, "category": "refill"},
    {"id": "4", "name": "Taman Bungkul", "lat": -7.2910, "lon": 112.7398, "demand": 12000},
    {"id": "7", "name": "Taman Flora", "lat": -7.2970, "lon": 112.7610, "demand": 4000}
]"#;

const RESULT: &str = r#"{
    "objective_time_min": 63.0,
    "vehicle_used": 2,
    "routes": [
        {"vehicle_id": 0, "sequence": ["0", "4", "r", "7", "0"], "total_time_min": 40.0,
         "load_profile_liters": [5000.0, 3000.0, 500.0, 5000.0, 4000.0]},
        {"vehicle_id": 1, "sequence": ["0", "7", "0"], "total_time_min": 23.0,
         "load_profile_liters": [5000.0, 4000.0, 4000.0]}
    ]
}"#;

fn fleetmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fleetmap"))
        .args(args)
        .env_remove("FLEETMAP_CATALOG_URL")
        .env_remove("FLEETMAP_ROAD_ROUTER_URL")
        .env_remove("FLEETMAP_LOOKUP_TIMEOUT_MS")
        .env_remove("FLEETMAP_VEHICLE_CAPACITY_L")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .expect("failed to run fleetmap")
}

fn fixtures(dir: &Path) -> (String, String) {
    let points = dir.join("points.json");
    let result = dir.join("result.json");
    fs::write(&points, POINTS).unwrap();
    fs::write(&result, RESULT).unwrap();
    (points.display().to_string(), result.display().to_string())
}

/// Answer one HTTP request with a JSON body; returns the base URL
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).unwrap();
    });

    format!("http://{}", addr)
}

#[test]
fn test_nearest_json() {
    let dir = TempDir::new().unwrap();
    let (points, _) = fixtures(dir.path());

    let out = fleetmap(&["--json", "nearest", "--points", &points, "--lat=-7.2911", "--lon", "112.7399"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let body: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["point_id"], "4");
    assert!(body["data"]["distance_m"].as_f64().unwrap() < 20.0);
}

#[test]
fn test_nearest_outside_tolerance() {
    let dir = TempDir::new().unwrap();
    let (points, _) = fixtures(dir.path());

    let out = fleetmap(&["--json", "nearest", "--points", &points, "--lat=-7.0", "--lon", "112.0"]);
    assert!(out.status.success());

    let body: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(body["data"]["point_id"].is_null());
}

#[test]
fn test_render_offline_to_stdout() {
    let dir = TempDir::new().unwrap();
    let (points, result) = fixtures(dir.path());

    let out = fleetmap(&["render", "--points", &points, "--result", &result, "--offline"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let scene: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(scene["type"], "FeatureCollection");
    assert!(scene["legend"].is_object());

    let features = scene["features"].as_array().unwrap();
    let routes = features.iter().filter(|f| f["properties"]["kind"] == "route").count();
    let urgency = features.iter().filter(|f| f["properties"]["kind"] == "urgency").count();
    assert!(routes > 0);
    assert_eq!(urgency, 1);
}

#[test]
fn test_render_isolated_vehicle_to_file() {
    let dir = TempDir::new().unwrap();
    let (points, result) = fixtures(dir.path());
    let target = dir.path().join("scene.geojson");
    let target_str = target.display().to_string();

    let out = fleetmap(&[
        "--json", "render", "--points", &points, "--result", &result, "--offline", "--vehicle", "1",
        "--isolate", "--out", &target_str,
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["data"]["legend"], false);
    assert_eq!(summary["data"]["vehicles"].as_array().unwrap().len(), 1);

    let scene: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    let vehicles: Vec<_> = scene["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["properties"]["kind"] == "route")
        .map(|f| f["properties"]["vehicle_id"].as_u64().unwrap())
        .collect();
    assert!(!vehicles.is_empty());
    assert!(vehicles.iter().all(|v| *v == 1));
}

#[test]
fn test_render_capacity_flag_drives_urgency() {
    let dir = TempDir::new().unwrap();
    let (points, result) = fixtures(dir.path());

    let urgency_with = |extra: &[&str]| {
        let mut args = vec!["render", "--points", points.as_str(), "--result", result.as_str(), "--offline"];
        args.extend_from_slice(extra);
        let out = fleetmap(&args);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        let scene: Value = serde_json::from_slice(&out.stdout).unwrap();
        scene["features"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["properties"]["kind"] == "urgency")
            .and_then(|f| f["properties"]["urgency"].as_f64())
            .unwrap()
    };

    // 3000 L on board when reaching the refill
    assert!((urgency_with(&[]) - 0.4).abs() < 1e-9);
    assert!((urgency_with(&["--capacity", "10000"]) - 0.7).abs() < 1e-9);
}

#[test]
fn test_render_rejects_zero_lookup_timeout() {
    let dir = TempDir::new().unwrap();
    let (points, result) = fixtures(dir.path());

    let out = fleetmap(&["render", "--points", &points, "--result", &result, "--lookup-timeout-ms", "0"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("lookup_timeout_ms"));
}

#[test]
fn test_isolate_requires_vehicle() {
    let out = fleetmap(&["render", "--result", "missing.json", "--isolate"]);
    assert!(!out.status.success());
}

#[test]
fn test_config_shows_cli_override() {
    let out = fleetmap(&["--json", "--catalog-url", "http://backend:9000", "config"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let rows: Value = serde_json::from_slice(&out.stdout).unwrap();
    let catalog = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["key"] == "catalog_url")
        .unwrap();
    assert_eq!(catalog["value"], "http://backend:9000");
    assert_eq!(catalog["source"], "Cli");
}

#[test]
fn test_optimize_prints_route_table() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("result.json");
    let target_str = target.display().to_string();
    let base = serve_once(RESULT);

    let out = fleetmap(&["--catalog-url", &base, "optimize", "--vehicles", "2", "--select", "4", "7", "--out", &target_str]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let table = String::from_utf8_lossy(&out.stdout);
    assert!(table.contains("Vehicle"));
    assert!(table.contains("Time (min)"));
    assert!(!table.contains("Shapes"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(saved["routes"].as_array().unwrap().len(), 2);
}
