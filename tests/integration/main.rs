//! Integration tests for ckpt

use std::fs;
use std::path::{Path, PathBuf};

/// Names of the regular files in `dir`, sorted
fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// The single cache directory under `root`
fn only_directory(root: &Path) -> PathBuf {
    let dirs: Vec<PathBuf> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(dirs.len(), 1, "expected one cache directory, found {:?}", dirs);
    dirs.into_iter().next().unwrap()
}

mod library {
    use super::*;
    use ckpt::store::inspect::{self, Listing};
    use ckpt::store::naming;
    use ciborium::Value;
    use ckpt::{
        computation, ArgumentKey, CallError, Checkpoint, CheckpointError, CkptResult, Computation,
        Custom, LogicViolation, Options, Outcome, SerializationKind,
    };
    use serde::{Deserialize, Serialize};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::TempDir;

    computation! {
        fn add(a: i64, b: i64) -> i64 {
            a + b
        }
    }

    computation! {
        fn ratio(num: f64, den: f64) -> Result<f64, String> {
            if den == 0.0 {
                return Err("division by zero".to_string());
            }
            Ok(num / den)
        }
    }

    const OFFSET: i64 = 10;

    computation! {
        fn shifted(x: i64) -> i64 {
            x + OFFSET
        }
    }

    computation! {
        fn scale(mut x: f64, factor: f64) -> f64 {
            let doubled: f64 = x * 2.0;
            x = doubled * factor;
            x
        }
    }

    computation! {
        fn classify(x: f64) -> String {
            if x.is_nan() {
                "nan".to_string()
            } else if x.is_infinite() {
                format!("infinite {}", x.signum())
            } else {
                format!("finite {x}")
            }
        }
    }

    computation! {
        fn shout(text: String) -> String {
            text.to_uppercase()
        }
    }

    static mut CALLS: u64 = 0;

    computation! {
        fn counted(x: u64) -> u64 {
            unsafe {
                CALLS += 1;
            }
            x
        }
    }

    mod stats {
        use super::AtomicU64;

        pub static HITS: AtomicU64 = AtomicU64::new(0);
    }

    computation! {
        fn tallied(x: u64) -> u64 {
            stats::HITS.fetch_add(1, Ordering::Relaxed);
            x
        }
    }

    /// Threshold check whose limit is captured from its environment
    struct AboveLimit {
        limit: i64,
    }

    impl Computation for AboveLimit {
        type Args = (i64,);
        type Output = bool;
        type Error = std::convert::Infallible;

        fn name(&self) -> &str {
            "above"
        }

        fn params(&self) -> &[&'static str] {
            &["x"]
        }

        fn source(&self) -> &str {
            "fn above(x: i64) -> bool { x > limit }"
        }

        fn call(&self, (x,): Self::Args) -> Result<bool, Self::Error> {
            Ok(x > self.limit)
        }
    }

    /// Logic violation raised by the first call of `computation`
    fn violation_of<C>(root: &Path, computation: C) -> (String, LogicViolation)
    where
        C: Computation<Args = (u64,)>,
        C::Output: Serialize + serde::de::DeserializeOwned + std::fmt::Debug,
        C::Error: std::fmt::Debug,
    {
        let cached = Checkpoint::new(root).wrap(computation).unwrap();
        match cached.call((1,)).unwrap_err() {
            CallError::Checkpoint(CheckpointError::UnsupportedLogic { name, violation }) => (name, violation),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Reading {
        station: String,
        hour: u32,
        celsius: f64,
    }

    computation! {
        fn readings(count: u32) -> Vec<Reading> {
            (0..count)
                .map(|hour| Reading {
                    station: format!("st-{}", hour % 2),
                    hour,
                    celsius: 10.0 + hour as f64 / 4.0,
                })
                .collect()
        }
    }

    mod first_version {
        ckpt::computation! {
            pub fn area(w: f64, h: f64) -> f64 {
                w * h
            }
        }
    }

    mod second_version {
        ckpt::computation! {
            pub fn area(w: f64, h: f64) -> f64 {
                w * h / 2.0
            }
        }
    }

    mod renamed_locals {
        ckpt::computation! {
            pub fn area(width: f64, height: f64) -> f64 {
                let product = width * height;
                product
            }
        }
    }

    mod original_locals {
        ckpt::computation! {
            pub fn area(w: f64, h: f64) -> f64 {
                let p = w * h;
                p
            }
        }
    }

    #[test]
    fn add_publishes_a_named_json_entry() {
        let root = TempDir::new().unwrap();
        let cached_add = Checkpoint::new(root.path())
            .serialization(SerializationKind::Json)
            .wrap(add)
            .unwrap();

        let (value, outcome) = cached_add.call_traced((1, 2)).unwrap();
        assert_eq!(value, 3);
        assert!(matches!(outcome, Outcome::Miss(_)));

        let dir = only_directory(root.path());
        let dir_name = dir.file_name().unwrap().to_str().unwrap().to_string();
        let parsed = naming::parse_directory_name(&dir_name).unwrap();
        assert_eq!(parsed.identifier, "add");
        assert_eq!(parsed.fingerprint, cached_add.identity().unwrap().fingerprint);

        let key = ArgumentKey::derive("add", &["a", "b"], &(1, 2), true).unwrap();
        assert_eq!(key.representation, "a=1,b=2");

        let files = files_in(&dir);
        assert_eq!(files.len(), 2, "{:?}", files);
        assert_eq!(files[1], "add_source.rs");
        let entry = &files[0];
        assert!(entry.starts_with("a=1,b=2_["));
        assert!(entry.ends_with(&format!("]_{}_checkpoint.json", key.hash)));
        assert_eq!(fs::read_to_string(dir.join(entry)).unwrap(), "3");

        let source = fs::read_to_string(dir.join("add_source.rs")).unwrap();
        assert!(source.contains("a + b"));

        match cached_add.call_traced((1, 2)).unwrap() {
            (3, Outcome::Hit(notice)) => {
                assert_eq!(notice.func, "add");
                assert_eq!(notice.args, "a=1,b=2");
                assert_eq!(notice.file_path, dir.join(entry));
            }
            other => panic!("expected a hit, got {:?}", other),
        }
    }

    #[test]
    fn keyword_and_positional_arguments_share_a_key() {
        let keywords = vec![("b".to_string(), Value::serialized(&2).unwrap())];
        let mixed =
            ArgumentKey::canonical("add", &["a", "b"], vec![Value::serialized(&1).unwrap()], keywords)
                .unwrap();
        let positional = ArgumentKey::derive("add", &["a", "b"], &(1, 2), true).unwrap();
        assert_eq!(mixed, positional);

        let raw = ArgumentKey::derive("add", &["a", "b"], &(1, 2), false).unwrap();
        assert_ne!(raw.hash, positional.hash);
        assert_eq!(raw.representation, "1,2_");
    }

    #[test]
    fn changed_logic_gets_a_new_directory() {
        let root = TempDir::new().unwrap();
        let settings = Checkpoint::new(root.path());

        let v1 = settings.wrap(first_version::area).unwrap();
        let v2 = settings.wrap(second_version::area).unwrap();
        assert_eq!(v1.call((3.0, 4.0)).unwrap(), 12.0);
        assert_eq!(v2.call((3.0, 4.0)).unwrap(), 6.0);

        let dirs = inspect::list_directories(root.path()).unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs.iter().all(|d| d.identifier == "area"));
        assert_ne!(dirs[0].fingerprint, dirs[1].fingerprint);
    }

    #[test]
    fn renaming_locals_reuses_the_directory() {
        let root = TempDir::new().unwrap();
        let settings = Checkpoint::new(root.path());

        let original = settings.wrap(original_locals::area).unwrap();
        let renamed = settings.wrap(renamed_locals::area).unwrap();
        assert_eq!(
            original.identity().unwrap().fingerprint,
            renamed.identity().unwrap().fingerprint
        );

        original.call((2.0, 5.0)).unwrap();
        renamed.call((2.0, 5.0)).unwrap();
        assert_eq!(inspect::list_directories(root.path()).unwrap().len(), 1);
    }

    #[test]
    fn orphaned_temp_file_is_recomputed() {
        let root = TempDir::new().unwrap();
        let cached_add = Checkpoint::new(root.path())
            .serialization(SerializationKind::Json)
            .wrap(add)
            .unwrap();
        cached_add.call((4, 5)).unwrap();

        let dir = only_directory(root.path());
        let key = ArgumentKey::derive("add", &["a", "b"], &(4, 5), true).unwrap();
        for name in files_in(&dir) {
            if name.ends_with(".json") {
                fs::remove_file(dir.join(name)).unwrap();
            }
        }
        fs::remove_dir_all(dir.join(naming::MANIFEST_DIR)).unwrap();
        let orphan = naming::temp_entry_name(&key.representation, "01-01-2020-00-00-00", &key.hash, "json");
        fs::write(dir.join(&orphan), "99").unwrap();

        let (value, outcome) = cached_add.call_traced((4, 5)).unwrap();
        assert_eq!(value, 9);
        assert!(matches!(outcome, Outcome::Miss(_)));
        assert!(dir.join(&orphan).exists());

        let entries: Vec<String> = files_in(&dir)
            .into_iter()
            .filter(|name| name.ends_with("_checkpoint.json"))
            .collect();
        assert_eq!(entries.len(), 1, "{:?}", entries);
        assert_eq!(fs::read_to_string(dir.join(&entries[0])).unwrap(), "9");

        let cache_dir = &inspect::list_directories(root.path()).unwrap()[0];
        let valid = inspect::list_entries(cache_dir)
            .unwrap()
            .into_iter()
            .filter(|listing| matches!(listing, Listing::Valid { .. }))
            .count();
        assert_eq!(valid, 1);
    }

    #[test]
    fn typed_and_mutable_parameters_memoize() {
        let root = TempDir::new().unwrap();
        let cached = Checkpoint::new(root.path()).wrap(scale).unwrap();

        let (value, outcome) = cached.call_traced((1.5, 3.0)).unwrap();
        assert_eq!(value, 9.0);
        assert!(matches!(outcome, Outcome::Miss(_)));

        let (value, outcome) = cached.call_traced((1.5, 3.0)).unwrap();
        assert_eq!(value, 9.0);
        assert!(matches!(outcome, Outcome::Hit(_)));
    }

    #[test]
    fn non_finite_floats_are_separate_entries() {
        let root = TempDir::new().unwrap();
        let cached = Checkpoint::new(root.path()).wrap(classify).unwrap();

        let inputs = [f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
        let expected = ["infinite 1", "infinite -1", "nan"];
        for (x, want) in inputs.iter().zip(expected) {
            let (value, outcome) = cached.call_traced((*x,)).unwrap();
            assert_eq!(value, want);
            assert!(matches!(outcome, Outcome::Miss(_)), "{} was served from the cache", x);
        }
        for (x, want) in inputs.iter().zip(expected) {
            let (value, outcome) = cached.call_traced((*x,)).unwrap();
            assert_eq!(value, want);
            assert!(matches!(outcome, Outcome::Hit(_)));
        }

        let hashes: HashSet<String> = inputs
            .iter()
            .map(|x| ArgumentKey::derive("classify", &["x"], &(*x,), true).unwrap().hash)
            .collect();
        assert_eq!(hashes.len(), 3);
    }

    #[test]
    fn long_arguments_fit_entry_names() {
        let root = TempDir::new().unwrap();
        let cached = Checkpoint::new(root.path())
            .serialization(SerializationKind::Json)
            .wrap(shout)
            .unwrap();
        let text = "a".repeat(200);

        let (value, outcome) = cached.call_traced((text.clone(),)).unwrap();
        assert_eq!(value, "A".repeat(200));
        assert!(matches!(outcome, Outcome::Miss(_)));

        let dir = only_directory(root.path());
        assert!(files_in(&dir).iter().all(|name| name.len() <= naming::NAME_MAX));
        assert!(matches!(cached.call_traced((text,)).unwrap().1, Outcome::Hit(_)));
    }

    #[test]
    fn captured_variable_is_rejected() {
        let root = TempDir::new().unwrap();
        let cached = Checkpoint::new(root.path())
            .wrap(AboveLimit { limit: 3 })
            .unwrap();

        let err: CheckpointError = cached.call((5,)).unwrap_err().into();
        match err {
            CheckpointError::UnsupportedLogic { name, violation } => {
                assert_eq!(name, "above");
                assert_eq!(
                    violation,
                    LogicViolation::CapturedVariable {
                        name: "limit".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(fs::read_dir(root.path()).map(|mut d| d.next().is_none()).unwrap_or(true));
    }

    #[test]
    fn global_static_access_is_rejected() {
        let root = TempDir::new().unwrap();

        let (name, violation) = violation_of(root.path(), counted);
        assert_eq!(name, "counted");
        assert_eq!(
            violation,
            LogicViolation::GlobalWrite {
                name: "CALLS".to_string()
            }
        );

        let (name, violation) = violation_of(root.path(), tallied);
        assert_eq!(name, "tallied");
        assert_eq!(
            violation,
            LogicViolation::GlobalRead {
                name: "HITS".to_string()
            }
        );
        assert_eq!(stats::HITS.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn computation_error_publishes_nothing() {
        let root = TempDir::new().unwrap();
        let cached_ratio = Checkpoint::new(root.path()).wrap(ratio).unwrap();

        match cached_ratio.call((1.0, 0.0)) {
            Err(CallError::Computation(msg)) => assert_eq!(msg, "division by zero"),
            other => panic!("unexpected result: {:?}", other),
        }
        let dir = only_directory(root.path());
        assert_eq!(files_in(&dir), vec!["ratio_source.rs"]);

        assert_eq!(cached_ratio.call((1.0, 4.0)).unwrap(), 0.25);
    }

    #[test]
    fn module_level_constant_is_rejected() {
        let root = TempDir::new().unwrap();
        let cached = Checkpoint::new(root.path()).wrap(shifted).unwrap();

        let err: CheckpointError = cached.call((1,)).unwrap_err().into();
        match err {
            CheckpointError::UnsupportedLogic { name, violation } => {
                assert_eq!(name, "shifted");
                assert_eq!(
                    violation,
                    LogicViolation::GlobalRead {
                        name: "OFFSET".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(fs::read_dir(root.path()).map(|mut d| d.next().is_none()).unwrap_or(true));
    }

    #[test]
    fn records_round_trip_through_every_tabular_strategy() {
        for kind in [SerializationKind::Csv, SerializationKind::Columnar, SerializationKind::Binary] {
            let root = TempDir::new().unwrap();
            let cached = Checkpoint::new(root.path())
                .serialization(kind)
                .wrap(readings)
                .unwrap();

            let computed = cached.call((6,)).unwrap();
            let (loaded, outcome) = cached.call_traced((6,)).unwrap();
            assert_eq!(loaded, computed, "{} round trip", kind);
            assert!(matches!(outcome, Outcome::Hit(_)));

            let dir = only_directory(root.path());
            let suffix = format!("_checkpoint.{}", kind.extension());
            assert!(files_in(&dir).iter().any(|name| name.ends_with(&suffix)));
        }
    }

    #[test]
    fn custom_strategy_is_used_end_to_end() {
        let root = TempDir::new().unwrap();
        let strategy = Custom::new(
            |value: &i64, path: &Path, _options: &Options| -> CkptResult<()> {
                fs::write(path, format!("sum:{}", value))
                    .map_err(|e| CheckpointError::encode(path, e))
            },
            |path: &Path, _options: &Options| -> CkptResult<i64> {
                let text = fs::read_to_string(path).map_err(|e| CheckpointError::decode(path, e))?;
                text.trim_start_matches("sum:")
                    .parse()
                    .map_err(|e| CheckpointError::decode(path, e))
            },
            ".txt",
        );
        let cached_add = Checkpoint::new(root.path()).serialization(strategy).wrap(add).unwrap();

        assert_eq!(cached_add.call((20, 22)).unwrap(), 42);
        let dir = only_directory(root.path());
        let entry = files_in(&dir)
            .into_iter()
            .find(|name| name.ends_with("_checkpoint.txt"))
            .unwrap();
        assert_eq!(fs::read_to_string(dir.join(entry)).unwrap(), "sum:42");

        assert!(matches!(cached_add.call_traced((20, 22)).unwrap().1, Outcome::Hit(_)));
    }

    #[test]
    fn corrupt_entry_is_reported_not_served() {
        let root = TempDir::new().unwrap();
        let cached_add = Checkpoint::new(root.path())
            .serialization(SerializationKind::Json)
            .wrap(add)
            .unwrap();
        cached_add.call((7, 8)).unwrap();

        let dir = only_directory(root.path());
        let key = ArgumentKey::derive("add", &["a", "b"], &(7, 8), true).unwrap();
        for name in files_in(&dir) {
            if name.ends_with(".json") {
                fs::remove_file(dir.join(name)).unwrap();
            }
        }
        fs::remove_dir_all(dir.join(naming::MANIFEST_DIR)).unwrap();
        fs::write(
            dir.join(format!("a=7,b=8_[not-a-date]_{}_checkpoint.json", key.hash)),
            "15",
        )
        .unwrap();

        let err: CheckpointError = cached_add.call((7, 8)).unwrap_err().into();
        assert!(matches!(err, CheckpointError::CorruptEntry { .. }));

        let cache_dir = &inspect::list_directories(root.path()).unwrap()[0];
        let listings = inspect::list_entries(cache_dir).unwrap();
        assert!(matches!(&listings[0], Listing::Corrupt { .. }));
    }
}

mod cli {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use ckpt::store::naming;
    use ckpt::{computation, Checkpoint, SerializationKind};
    use predicates::prelude::*;
    use tempfile::TempDir;

    computation! {
        fn add(a: i64, b: i64) -> i64 {
            a + b
        }
    }

    /// `ckpt` isolated from the user's configuration
    fn ckpt(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("ckpt");
        cmd.env_remove("CKPT_ROOT")
            .env_remove("CKPT_CONFIG")
            .env("CI", "1")
            .arg("--no-local")
            .arg("--config")
            .arg(home.path().join("config.toml"));
        cmd
    }

    /// A cache root with one published `add` entry
    fn populated_root() -> TempDir {
        let root = TempDir::new().unwrap();
        Checkpoint::new(root.path())
            .serialization(SerializationKind::Json)
            .wrap(add)
            .unwrap()
            .call((1, 2))
            .unwrap();
        root
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        ckpt(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("inspect and maintain checkpoint caches"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        ckpt(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ckpt"));
    }

    #[test]
    fn list_missing_root_fails_with_hint() {
        let home = TempDir::new().unwrap();
        ckpt(&home)
            .args(["list", "--root"])
            .arg(home.path().join("absent"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache root not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn list_shows_directories() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        ckpt(&home)
            .args(["list", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("add ["))
            .stdout(predicate::str::contains("1 cache directory"));
    }

    #[test]
    fn list_as_json() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        let output = ckpt(&home)
            .args(["list", "--format", "json", "--root"])
            .arg(root.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed[0]["identifier"], "add");
        assert_eq!(parsed[0]["entries"], 1);
        assert_eq!(parsed[0]["incomplete"], 0);
    }

    #[test]
    fn root_from_environment() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        ckpt(&home)
            .env("CKPT_ROOT", root.path())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("_checkpoint"));
    }

    #[test]
    fn show_lists_entry_paths() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        ckpt(&home)
            .args(["show", "add", "--format", "plain", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("a=1,b=2_["))
            .stdout(predicate::str::contains("_checkpoint.json"));
    }

    #[test]
    fn show_unknown_computation_fails() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        ckpt(&home)
            .args(["show", "mul", "--root"])
            .arg(root.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache directory for `mul`"));
    }

    #[test]
    fn verify_passes_on_clean_root() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        ckpt(&home)
            .args(["verify", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("All checkpoints verified"));
    }

    #[test]
    fn verify_fails_on_corrupt_entry() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        let dir = only_directory(root.path());
        fs::write(
            dir.join(format!("a=9_[bad-date]_{}_checkpoint.json", "0".repeat(64))),
            "9",
        )
        .unwrap();

        ckpt(&home)
            .args(["verify", "--root"])
            .arg(root.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("malformed date"))
            .stderr(predicate::str::contains("Verification failed: 1 corrupt file(s)"));
    }

    #[test]
    fn clean_removes_interrupted_publish() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        let dir = only_directory(root.path());
        let orphan = naming::temp_entry_name("a=5,b=5", "01-01-2020-00-00-00", &"7".repeat(64), "json");
        fs::write(dir.join(&orphan), "").unwrap();

        ckpt(&home)
            .args(["clean", "--dry-run", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("interrupted publish"));
        assert!(dir.join(&orphan).exists());

        ckpt(&home)
            .args(["clean", "--yes", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 file(s)"));
        assert!(!dir.join(&orphan).exists());
        assert_eq!(files_in(&dir).len(), 2);
    }

    #[test]
    fn clean_without_yes_is_a_no_op_in_ci() {
        let home = TempDir::new().unwrap();
        let root = populated_root();
        let dir = only_directory(root.path());
        let orphan = naming::temp_entry_name("a=5,b=5", "01-01-2020-00-00-00", &"7".repeat(64), "json");
        fs::write(dir.join(&orphan), "").unwrap();

        ckpt(&home)
            .args(["clean", "--root"])
            .arg(root.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
        assert!(dir.join(&orphan).exists());
    }

    #[test]
    fn config_path_honours_flag() {
        let home = TempDir::new().unwrap();
        ckpt(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let home = TempDir::new().unwrap();
        ckpt(&home).args(["config", "init"]).assert().success();
        assert!(home.path().join("config.toml").exists());

        ckpt(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("serialization = \"binary\""));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("config.toml"), "[cache]\nserialization = \"pickle\"\n").unwrap();
        ckpt(&home)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("ckpt config init --force"));
    }
}
