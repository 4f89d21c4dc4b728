//! # Script Provisioner Integration Tests (pg-03)
//!
//! Drive `ScriptProvisioner` against stand-in scripts in a temporary tree.
//!
//! ## Test Categories
//!
//! 1. **Accounts** - admin script invocation, contact email lookup
//! 2. **Resources** - API-mode scripts, JSON output, metadata reads
//! 3. **Failures** - captured output, missing artifacts

#![cfg(unix)]

use pg_03_provisioner::{
    CreateClusterInput, CreateVmInput, Provisioner, ProvisionerError, ScriptConfig,
    ScriptProvisioner, VmStatus,
};
use shared_types::RegistrationRequest;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

struct Fixture {
    root: TempDir,
    provisioner: ScriptProvisioner,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let bin = root.path().join("bin");
        fs::create_dir(&bin).unwrap();
        let log = root.path().join("calls.log");

        // $1=user $2=add $3=<name> $4=--pubkey $5=<file>
        write_script(
            &bin.join("admin"),
            &format!(
                "echo \"$@\" >> {log}\ncat \"$5\" >> {log}",
                log = log.display()
            ),
        );
        write_script(
            &bin.join("create-vm"),
            r#"[ "$BASPHERE_API_MODE" = "1" ] || exit 3
name=""; user=""
while [ $# -gt 0 ]; do
  case "$1" in
    --name) name="$2"; shift ;;
    --user) user="$2"; shift ;;
  esac
  shift
done
printf '{"name":"%s","owner":"%s","ip_address":"10.0.0.5","status":"creating"}' "$name" "$user""#,
        );
        write_script(
            &bin.join("delete-vm"),
            "echo 'partial teardown'\necho 'vm is locked' >&2\nexit 1",
        );
        write_script(&bin.join("create-cluster"), "echo 'not json'");

        let config = ScriptConfig {
            admin_script: bin.join("admin"),
            create_vm_script: bin.join("create-vm"),
            delete_vm_script: bin.join("delete-vm"),
            create_cluster_script: bin.join("create-cluster"),
            delete_cluster_script: bin.join("delete-cluster"),
            temp_dir: root.path().join("tmp"),
            data_dir: root.path().join("data"),
            use_sudo: false,
            ..ScriptConfig::default()
        };
        let provisioner = ScriptProvisioner::new(config).unwrap();

        Self { root, provisioner }
    }

    fn data(&self) -> PathBuf {
        self.root.path().join("data")
    }

    fn calls(&self) -> String {
        fs::read_to_string(self.root.path().join("calls.log")).unwrap_or_default()
    }
}

fn registration(username: &str, key: &str) -> RegistrationRequest {
    RegistrationRequest::new_pending(
        "req-1".into(),
        username.into(),
        format!("{}@example.com", username),
        None,
        key.into(),
        chrono::Utc::now(),
    )
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[test]
fn test_create_subject_passes_clean_key_file() {
    let fx = Fixture::new();

    fx.provisioner
        .create_subject(&registration("alice", "  ssh-ed25519 AAAA alice@host\r\n"))
        .unwrap();

    let calls = fx.calls();
    assert!(calls.starts_with("user add alice --pubkey "));
    assert!(calls.ends_with("ssh-ed25519 AAAA alice@host"));

    // Key file removed once the script returns
    let leftovers = fs::read_dir(fx.root.path().join("tmp")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_contact_email_from_user_metadata() {
    let fx = Fixture::new();
    let users = fx.data().join("users");
    fs::create_dir_all(&users).unwrap();
    fs::write(users.join("alice.json"), r#"{"email":"alice@corp.example","uid":1001}"#).unwrap();
    fs::write(users.join("bob.json"), r#"{"uid":1002}"#).unwrap();
    fs::write(users.join("carol.json"), "garbage").unwrap();

    assert_eq!(
        fx.provisioner.contact_email("alice").unwrap().as_deref(),
        Some("alice@corp.example")
    );
    assert_eq!(fx.provisioner.contact_email("bob").unwrap(), None);
    assert_eq!(fx.provisioner.contact_email("dave").unwrap(), None);
    assert!(matches!(
        fx.provisioner.contact_email("carol"),
        Err(ProvisionerError::Parse { .. })
    ));
}

// =============================================================================
// RESOURCES
// =============================================================================

#[test]
fn test_create_vm_runs_in_api_mode() {
    let fx = Fixture::new();

    let vm = fx
        .provisioner
        .create_vm("alice", &CreateVmInput::new("web", "ubuntu-24.04", "small"))
        .unwrap();

    assert_eq!(vm.name, "web");
    assert_eq!(vm.owner, "alice");
    assert_eq!(vm.status, VmStatus::Creating);
}

#[test]
fn test_vm_reads_come_from_metadata() {
    let fx = Fixture::new();
    let owner_dir = fx.data().join("terraform").join("alice");
    for name in ["web", "db", "_folder"] {
        fs::create_dir_all(owner_dir.join(name)).unwrap();
        fs::write(
            owner_dir.join(name).join("metadata.json"),
            format!(r#"{{"name":"{}","owner":"alice"}}"#, name),
        )
        .unwrap();
    }

    let names: Vec<_> = fx
        .provisioner
        .list_vms("alice")
        .unwrap()
        .into_iter()
        .map(|vm| vm.name)
        .collect();
    assert_eq!(names, vec!["db", "web"]);

    assert!(fx.provisioner.vm_exists("alice", "web").unwrap());
    assert!(!fx.provisioner.vm_exists("alice", "cache").unwrap());
    assert!(!fx.provisioner.vm_exists("alice", "../alice").unwrap());
    assert_eq!(fx.provisioner.get_vm("alice", "db").unwrap().name, "db");
    assert_eq!(fx.provisioner.quota("alice").unwrap().used_vms, 2);
    assert!(fx.provisioner.list_vms("bob").unwrap().is_empty());
}

#[test]
fn test_kubeconfig_read_and_missing() {
    let fx = Fixture::new();
    let cluster_dir = fx.data().join("clusters").join("alice").join("lab");
    fs::create_dir_all(&cluster_dir).unwrap();
    fs::write(
        cluster_dir.join("metadata.json"),
        r#"{"name":"lab","type":"dev","status":"ready"}"#,
    )
    .unwrap();

    assert!(matches!(
        fx.provisioner.kubeconfig("alice", "lab"),
        Err(ProvisionerError::NotFound { .. })
    ));

    fs::write(cluster_dir.join("kubeconfig"), "apiVersion: v1\n").unwrap();
    assert_eq!(
        fx.provisioner.kubeconfig("alice", "lab").unwrap(),
        b"apiVersion: v1\n"
    );
    assert_eq!(fx.provisioner.cluster_quota("alice").unwrap().used_clusters, 1);
    assert_eq!(fx.provisioner.get_cluster("alice", "lab").unwrap().cluster_type, "dev");
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_failed_script_keeps_output() {
    let fx = Fixture::new();

    let err = fx.provisioner.delete_vm("alice", "web").unwrap_err();
    let (stdout, stderr) = err.captured_output().unwrap();
    assert_eq!(stdout.trim(), "partial teardown");
    assert_eq!(stderr.trim(), "vm is locked");
}

#[test]
fn test_unparsable_script_output() {
    let fx = Fixture::new();

    let err = fx
        .provisioner
        .create_cluster("alice", &CreateClusterInput::new("lab", "dev", "small"))
        .unwrap_err();
    assert!(matches!(err, ProvisionerError::Parse { .. }));
    assert!(err.to_string().contains("not json"));
}

#[test]
fn test_missing_script_is_command_failure() {
    let fx = Fixture::new();

    let err = fx.provisioner.delete_cluster("alice", "lab").unwrap_err();
    assert!(matches!(
        err,
        ProvisionerError::CommandFailed { action: "delete cluster", .. }
    ));
}
