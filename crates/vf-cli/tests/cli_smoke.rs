//! End-to-end runs of the `vfc` binary against a throwaway store.

use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

fn vfc(dir: &Path, args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_vfc"))
        .current_dir(dir)
        .env_remove("VENDORFACTS_LOG")
        .arg("--db")
        .arg(dir.join("facts.db"))
        .args(args)
        .output()
        .expect("vfc should start");
    assert!(
        output.status.success(),
        "vfc {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn registry_round_trip_drives_classification() {
    let dir = TempDir::new().unwrap();

    let entry = vfc(
        dir.path(),
        &[
            "registry",
            "set",
            "Tabnine",
            "--alias",
            "tabnine ai",
            "--url",
            "trust_center=https://trust.tabnine.com",
            "--url",
            "security_page=https://www.tabnine.com/security",
        ],
    );
    assert_eq!(entry["vendor_name"], "Tabnine");
    assert_eq!(entry["trust_center"], "https://trust.tabnine.com");

    let found = vfc(dir.path(), &["registry", "get", "TABNINE AI"]);
    assert_eq!(found["vendor_name"], "Tabnine");

    let vendor = vfc(
        dir.path(),
        &["classify", "https://trust.tabnine.com/soc2", "--vendor", "Tabnine"],
    );
    assert_eq!(vendor["source_type"], "vendor");
    assert_eq!(vendor["reason"], "exact_domain_match");
    assert_eq!(vendor["matched_type"], "trust_center");

    let spoof = vfc(
        dir.path(),
        &[
            "classify",
            "https://trust.tabnine.com.attacker.net/soc2",
            "--vendor",
            "Tabnine",
        ],
    );
    assert_eq!(spoof["source_type"], "third_party");
    assert_eq!(spoof["reason"], "no_match");
}

#[test]
fn empty_store_lists_nothing() {
    let dir = TempDir::new().unwrap();
    assert_eq!(vfc(dir.path(), &["fact", "list"]), Value::Array(Vec::new()));
    assert_eq!(vfc(dir.path(), &["fact", "due"]), Value::Array(Vec::new()));

    let sweep = vfc(dir.path(), &["fact", "sweep"]);
    assert_eq!(sweep["marked_stale"], 0);
}

#[test]
fn analyze_scores_candidate_urls() {
    let dir = TempDir::new().unwrap();
    let results = vfc(
        dir.path(),
        &[
            "analyze",
            "https://trust.newco.com/security",
            "https://techcrunch.com/newco-funding",
        ],
    );
    assert_eq!(results[0]["candidate_type"], "trust_center");
    assert_eq!(results[0]["tier"], "subdomain_and_path");
    assert_eq!(results[1]["candidate_type"], "unknown");
    assert!(!dir.path().join("facts.db").exists());
}
