//! # Script Provisioner
//!
//! Production backend. Accounts are managed through the admin script and
//! standard account tools; VMs and clusters through their own scripts run
//! in API mode. Reads go straight to the metadata the scripts write:
//!
//! ```text
//! <data_dir>/users/<user>.json                       contact email
//! <data_dir>/terraform/<user>/<vm>/metadata.json     one per VM
//! <data_dir>/clusters/<user>/<cluster>/metadata.json one per cluster
//! <data_dir>/clusters/<user>/<cluster>/kubeconfig
//! ```

mod command;
mod metadata;

pub use command::API_MODE_ENV;

use self::command::{api_command, run};
use self::metadata::{exists, read_all, read_json, METADATA_FILE};
use crate::domain::cluster::{Cluster, ClusterQuota, CreateClusterInput};
use crate::domain::errors::ProvisionerError;
use crate::domain::limits::ResourceLimits;
use crate::domain::names::is_valid_resource_name;
use crate::domain::vm::{CreateVmInput, Quota, Vm};
use crate::ports::Provisioner;
use serde::{Deserialize, Serialize};
use shared_types::RegistrationRequest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Directory under a VM owner's terraform tree that is not a VM.
const VM_FOLDER_ENTRY: &str = "_folder";

/// Where the scripts live and where they keep their state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub admin_script: PathBuf,
    pub create_vm_script: PathBuf,
    pub delete_vm_script: PathBuf,
    pub create_cluster_script: PathBuf,
    pub delete_cluster_script: PathBuf,
    /// Scratch space for public keys handed to the admin script.
    pub temp_dir: PathBuf,
    pub data_dir: PathBuf,
    /// Run the admin script through `sudo`.
    pub use_sudo: bool,
    pub limits: ResourceLimits,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            admin_script: PathBuf::from("/usr/local/bin/basphere-admin"),
            create_vm_script: PathBuf::from("/usr/local/bin/create-vm"),
            delete_vm_script: PathBuf::from("/usr/local/bin/delete-vm"),
            create_cluster_script: PathBuf::from("/usr/local/bin/create-cluster"),
            delete_cluster_script: PathBuf::from("/usr/local/bin/delete-cluster"),
            temp_dir: PathBuf::from("/tmp/basphere-api"),
            data_dir: PathBuf::from("/var/lib/basphere"),
            use_sudo: true,
            limits: ResourceLimits::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    email: Option<String>,
}

/// Provisioner backed by shell scripts.
#[derive(Debug)]
pub struct ScriptProvisioner {
    config: ScriptConfig,
}

impl ScriptProvisioner {
    /// Check the admin script is present and prepare the scratch directory.
    pub fn new(config: ScriptConfig) -> Result<Self, ProvisionerError> {
        if !config.admin_script.is_file() {
            return Err(ProvisionerError::NotFound {
                resource: "admin script",
                name: config.admin_script.display().to_string(),
            });
        }

        fs::create_dir_all(&config.temp_dir)
            .map_err(|e| ProvisionerError::io(&config.temp_dir, e))?;
        restrict(&config.temp_dir, 0o700)?;

        tracing::info!(
            "[pg-03] script provisioner ready (admin: {}, data: {})",
            config.admin_script.display(),
            config.data_dir.display()
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    fn admin_command(&self) -> Command {
        if self.config.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.config.admin_script);
            cmd
        } else {
            Command::new(&self.config.admin_script)
        }
    }

    fn vm_root(&self, owner: &str) -> PathBuf {
        self.config.data_dir.join("terraform").join(owner)
    }

    fn cluster_root(&self, owner: &str) -> PathBuf {
        self.config.data_dir.join("clusters").join(owner)
    }

    fn user_metadata_path(&self, username: &str) -> PathBuf {
        self.config
            .data_dir
            .join("users")
            .join(format!("{}.json", username))
    }

    /// Home directory from the account database.
    fn home_dir(&self, username: &str) -> Result<PathBuf, ProvisionerError> {
        let mut cmd = Command::new("getent");
        cmd.arg("passwd").arg(username);
        let output = run("look up user", cmd).map_err(|_| ProvisionerError::NotFound {
            resource: "user",
            name: username.to_string(),
        })?;

        // name:password:uid:gid:gecos:home:shell
        let entry = output.stdout.trim();
        let home = entry
            .split(':')
            .nth(5)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProvisionerError::Parse {
                what: format!("passwd entry for {}", username),
                message: format!("expected 7 fields, got '{}'", entry),
            })?;
        Ok(PathBuf::from(home))
    }
}

/// Reject names that could escape the metadata tree.
fn ensure_name(kind: &str, name: &str) -> Result<(), ProvisionerError> {
    if is_valid_resource_name(name) {
        Ok(())
    } else {
        Err(ProvisionerError::invalid(format!("invalid {} name: '{}'", kind, name)))
    }
}

/// Strip surrounding whitespace and carriage returns from a key.
fn clean_key(key: &str) -> String {
    key.trim().replace('\r', "")
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> Result<(), ProvisionerError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| ProvisionerError::io(path, e))
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> Result<(), ProvisionerError> {
    Ok(())
}

fn parse_output<T: serde::de::DeserializeOwned>(
    what: &str,
    stdout: &str,
) -> Result<T, ProvisionerError> {
    serde_json::from_str(stdout).map_err(|e| ProvisionerError::Parse {
        what: what.to_string(),
        message: format!("{} (stdout: {})", e, stdout.trim()),
    })
}

impl Provisioner for ScriptProvisioner {
    fn subject_exists(&self, username: &str) -> Result<bool, ProvisionerError> {
        if !is_valid_resource_name(username) {
            return Ok(false);
        }
        let mut cmd = Command::new("id");
        cmd.arg(username);
        match run("check user", cmd) {
            Ok(_) => Ok(true),
            Err(ProvisionerError::CommandFailed { detail, .. })
                if !detail.starts_with("could not start") =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn create_subject(&self, request: &RegistrationRequest) -> Result<(), ProvisionerError> {
        ensure_name("user", &request.username)?;

        // Removed when dropped, whatever the script does
        let mut key_file = tempfile::Builder::new()
            .prefix(&format!("{}-", request.username))
            .suffix(".pub")
            .tempfile_in(&self.config.temp_dir)
            .map_err(|e| ProvisionerError::io(&self.config.temp_dir, e))?;
        key_file
            .write_all(clean_key(&request.public_key).as_bytes())
            .and_then(|_| key_file.flush())
            .map_err(|e| ProvisionerError::io(key_file.path(), e))?;

        let mut cmd = self.admin_command();
        cmd.args(["user", "add"])
            .arg(&request.username)
            .arg("--pubkey")
            .arg(key_file.path());
        let output = run("create user", cmd)?;

        tracing::info!("[pg-03] created account {}", request.username);
        tracing::debug!("[pg-03] admin script stderr: {}", output.stderr.trim());
        Ok(())
    }

    fn update_credential(
        &self,
        username: &str,
        new_public_key: &str,
    ) -> Result<(), ProvisionerError> {
        ensure_name("user", username)?;
        let ssh_dir = self.home_dir(username)?.join(".ssh");

        fs::create_dir_all(&ssh_dir).map_err(|e| ProvisionerError::io(&ssh_dir, e))?;
        restrict(&ssh_dir, 0o700)?;

        let authorized_keys = ssh_dir.join("authorized_keys");
        let mut staged = tempfile::NamedTempFile::new_in(&ssh_dir)
            .map_err(|e| ProvisionerError::io(&ssh_dir, e))?;
        writeln!(staged, "{}", clean_key(new_public_key))
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| ProvisionerError::io(staged.path(), e))?;
        staged
            .persist(&authorized_keys)
            .map_err(|e| ProvisionerError::io(&authorized_keys, e.error))?;
        restrict(&authorized_keys, 0o600)?;

        let mut chown = Command::new("chown");
        chown
            .arg("-R")
            .arg(format!("{0}:{0}", username))
            .arg(&ssh_dir);
        run("set key ownership", chown)?;

        tracing::info!("[pg-03] rotated authorized key for {}", username);
        Ok(())
    }

    fn contact_email(&self, username: &str) -> Result<Option<String>, ProvisionerError> {
        ensure_name("user", username)?;
        let metadata: Option<UserMetadata> = read_json(&self.user_metadata_path(username))?;
        Ok(metadata
            .and_then(|m| m.email)
            .filter(|email| !email.trim().is_empty()))
    }

    fn create_vm(&self, owner: &str, input: &CreateVmInput) -> Result<Vm, ProvisionerError> {
        ensure_name("user", owner)?;
        input.validate()?;

        let mut cmd = api_command(&self.config.create_vm_script, owner);
        cmd.arg("--name")
            .arg(&input.name)
            .arg("--os")
            .arg(&input.os)
            .arg("--spec")
            .arg(&input.spec);
        let output = run("create VM", cmd)?;

        let vm: Vm = parse_output("VM output", &output.stdout)?;
        tracing::info!("[pg-03] created VM {} for {} ({})", vm.name, owner, vm.ip_address);
        Ok(vm)
    }

    fn delete_vm(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        ensure_name("user", owner)?;
        ensure_name("VM", name)?;

        let mut cmd = api_command(&self.config.delete_vm_script, owner);
        cmd.arg("--force").arg(name);
        run("delete VM", cmd)?;

        tracing::info!("[pg-03] deleted VM {} for {}", name, owner);
        Ok(())
    }

    fn list_vms(&self, owner: &str) -> Result<Vec<Vm>, ProvisionerError> {
        ensure_name("user", owner)?;
        read_all(&self.vm_root(owner), &[VM_FOLDER_ENTRY])
    }

    fn get_vm(&self, owner: &str, name: &str) -> Result<Vm, ProvisionerError> {
        ensure_name("user", owner)?;
        ensure_name("VM", name)?;
        read_json(&self.vm_root(owner).join(name).join(METADATA_FILE))?.ok_or_else(|| {
            ProvisionerError::NotFound {
                resource: "VM",
                name: name.to_string(),
            }
        })
    }

    fn vm_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError> {
        if !is_valid_resource_name(owner) || !is_valid_resource_name(name) {
            return Ok(false);
        }
        exists(&self.vm_root(owner).join(name).join(METADATA_FILE))
    }

    fn quota(&self, owner: &str) -> Result<Quota, ProvisionerError> {
        let vms = self.list_vms(owner)?;
        Ok(Quota::for_usage(&self.config.limits, vms.len()))
    }

    fn create_cluster(
        &self,
        owner: &str,
        input: &CreateClusterInput,
    ) -> Result<Cluster, ProvisionerError> {
        ensure_name("user", owner)?;
        input.validate()?;

        let mut cmd = api_command(&self.config.create_cluster_script, owner);
        cmd.arg("--name")
            .arg(&input.name)
            .arg("--type")
            .arg(&input.cluster_type)
            .arg("--worker-spec")
            .arg(&input.worker_spec);
        let output = run("create cluster", cmd)?;

        let cluster: Cluster = parse_output("cluster output", &output.stdout)?;
        tracing::info!("[pg-03] cluster {} for {} is {:?}", cluster.name, owner, cluster.status);
        Ok(cluster)
    }

    fn delete_cluster(&self, owner: &str, name: &str) -> Result<(), ProvisionerError> {
        ensure_name("user", owner)?;
        ensure_name("cluster", name)?;

        let mut cmd = api_command(&self.config.delete_cluster_script, owner);
        cmd.arg("--force").arg(name);
        run("delete cluster", cmd)?;

        tracing::info!("[pg-03] deleted cluster {} for {}", name, owner);
        Ok(())
    }

    fn list_clusters(&self, owner: &str) -> Result<Vec<Cluster>, ProvisionerError> {
        ensure_name("user", owner)?;
        read_all(&self.cluster_root(owner), &[])
    }

    fn get_cluster(&self, owner: &str, name: &str) -> Result<Cluster, ProvisionerError> {
        ensure_name("user", owner)?;
        ensure_name("cluster", name)?;
        read_json(&self.cluster_root(owner).join(name).join(METADATA_FILE))?.ok_or_else(|| {
            ProvisionerError::NotFound {
                resource: "cluster",
                name: name.to_string(),
            }
        })
    }

    fn cluster_exists(&self, owner: &str, name: &str) -> Result<bool, ProvisionerError> {
        if !is_valid_resource_name(owner) || !is_valid_resource_name(name) {
            return Ok(false);
        }
        exists(&self.cluster_root(owner).join(name).join(METADATA_FILE))
    }

    fn kubeconfig(&self, owner: &str, name: &str) -> Result<Vec<u8>, ProvisionerError> {
        ensure_name("user", owner)?;
        ensure_name("cluster", name)?;

        let path = self.cluster_root(owner).join(name).join("kubeconfig");
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ProvisionerError::NotFound {
                resource: "kubeconfig (cluster may still be provisioning)",
                name: name.to_string(),
            }),
            Err(e) => Err(ProvisionerError::io(&path, e)),
        }
    }

    fn cluster_quota(&self, owner: &str) -> Result<ClusterQuota, ProvisionerError> {
        let clusters = self.list_clusters(owner)?;
        Ok(ClusterQuota::for_usage(&self.config.limits, clusters.len()))
    }
}
