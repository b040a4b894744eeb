//! Integration tests for tempcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn tempcache() -> Command {
        cargo_bin_cmd!("tempcache")
    }

    /// Write a config pointing the file backend into `dir`
    fn write_config(dir: &Path, access: &str) -> PathBuf {
        let path = dir.join("config.toml");
        let cache_dir = dir.join("cache");
        let content = format!(
            "[general]\naudit_log = false\n\n[cache]\nbackend = \"file\"\ndir = {:?}\n\n{}",
            cache_dir.display().to_string(),
            access
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn run_ok(config: &Path, args: &[&str]) -> String {
        let output = tempcache()
            .arg("--config")
            .arg(config)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    #[test]
    fn help_displays() {
        tempcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("owner-scoped temporary cache"));
    }

    #[test]
    fn version_displays() {
        tempcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tempcache"));
    }

    #[test]
    fn keygen_prints_hex_keys() {
        let output = tempcache().args(["keygen", "-n", "3"]).output().unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let keys: Vec<&str> = stdout.lines().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys
            .iter()
            .all(|k| k.len() == 32 && k.chars().all(|c| c.is_ascii_hexdigit())));
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[filter_state]"));
    }

    #[test]
    fn create_then_get() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        let key = run_ok(
            &config,
            &["create", "-r", "42", "-u", "alice", "-s", "s1", "-t", "5", "--value", "state"],
        );
        let value = run_ok(&config, &["get", "-r", "42", "-u", "bob", "-k", &key]);

        assert_eq!(value, "state");
    }

    #[test]
    fn update_reuses_tab_key_across_processes() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let key = run_ok(
            &config,
            &["create", "-r", "42", "-u", "alice", "-s", "s1", "-t", "5", "--value", "x"],
        );

        let first = run_ok(
            &config,
            &[
                "update", "-r", "42", "-u", "alice", "-s", "s1", "-t", "5", "-k", &key, "--value",
                "y",
            ],
        );
        let second = run_ok(
            &config,
            &[
                "update", "-r", "42", "-u", "alice", "-s", "s1", "-t", "5", "-k", &key, "--value",
                "z",
            ],
        );

        assert_eq!(first, key);
        assert_eq!(second, key);
        assert_eq!(run_ok(&config, &["get", "-r", "42", "-u", "alice", "-k", &key]), "z");
    }

    #[test]
    fn update_missing_entry_is_noop() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        tempcache()
            .arg("--config")
            .arg(&config)
            .args([
                "update", "-r", "42", "-u", "alice", "-k", "missing", "--value", "v", "-f", "json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"noop\""));
    }

    #[test]
    fn update_by_other_user_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let key = run_ok(
            &config,
            &["create", "-r", "42", "-u", "alice", "-t", "1", "--value", "x"],
        );

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["update", "-r", "42", "-u", "bob", "-k", &key, "--value", "evil"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("owned by another user"));

        assert_eq!(run_ok(&config, &["get", "-r", "42", "-u", "alice", "-k", &key]), "x");
    }

    #[test]
    fn access_denied_without_grant() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            "[access]\nallow_all = false\ngrants = { alice = [\"42\"] }\n",
        );

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["create", "-r", "42", "-u", "bob", "--value", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Access denied to resource 42"));
    }

    #[test]
    fn delete_by_owner() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let key = run_ok(
            &config,
            &["create", "-r", "9", "-u", "alice", "-t", "2", "--value", "x"],
        );

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["delete", "-r", "9", "-u", "alice", "-t", "2", "-k", &key])
            .assert()
            .success()
            .stdout(predicate::str::contains("Entry deleted"));

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["get", "-r", "9", "-u", "alice", "-k", &key, "-f", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"value\":null"));
    }

    #[test]
    fn unknown_backend_fails_at_load_with_hint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nbackend = \"redis\"\n").unwrap();

        tempcache()
            .arg("--config")
            .arg(&path)
            .args(["get", "-r", "1", "-u", "alice"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown cache backend"))
            .stderr(predicate::str::contains("config init --force"));
    }

    #[test]
    fn overlapping_region_prefixes_are_rejected() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            "[filter_state]\nkey_prefix = \"ui_\"\n\n[explore_form_data]\nkey_prefix = \"ui_\"\n",
        );

        tempcache()
            .arg("--config")
            .arg(&config)
            .args(["create", "-r", "1", "-u", "alice", "--value", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("overlap"));
    }

    #[test]
    fn config_init_force_repairs_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nbackend = \"redis\"\n").unwrap();

        tempcache()
            .arg("--config")
            .arg(&path)
            .args(["config", "init", "--force"])
            .assert()
            .success();

        tempcache()
            .arg("--config")
            .arg(&path)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("backend = \"file\""));
    }

    #[test]
    fn audit_log_goes_to_configured_path() {
        let temp = TempDir::new().unwrap();
        let audit_path = temp.path().join("audit").join("tempcache.log");
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "[general]\naudit_path = {:?}\n\n[cache]\nbackend = \"file\"\ndir = {:?}\n",
                audit_path.display().to_string(),
                temp.path().join("cache").display().to_string()
            ),
        )
        .unwrap();

        let key = run_ok(&path, &["create", "-r", "5", "-u", "alice", "-t", "1", "--value", "v"]);

        let log = std::fs::read_to_string(&audit_path).unwrap();
        let record: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
        assert_eq!(record["event"], "entry.created");
        assert_eq!(record["key"], key.as_str());
        assert_eq!(record["user"], "alice");
    }
}
