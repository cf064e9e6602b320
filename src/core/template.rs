//! CR-003: Compute templates.
//!
//! A template groups the settings used to provision one kind of machine:
//! image, hardware profile, location, credentials, and how files and
//! commands reach the machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Placeholder value shipped in generated templates.
pub const KEY_FILE_PLACEHOLDER: &str = "ENTER_KEY_FILE_NAME";

/// Settings for one kind of provisioned machine.
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComputeTemplate {
    /// Image to boot
    #[serde(default)]
    pub image_id: Option<String>,

    /// Machine memory in MB
    #[serde(default)]
    pub machine_memory_mb: u32,

    /// Hardware profile ID
    #[serde(default)]
    pub hardware_id: Option<String>,

    /// Location (region/zone) ID
    #[serde(default)]
    pub location_id: Option<String>,

    /// Local directory uploaded to new machines
    #[serde(default)]
    pub local_directory: Option<String>,

    /// Private key file used to reach the machine
    #[serde(default)]
    pub key_file: Option<String>,

    /// Number of CPU cores
    #[serde(default = "default_cores")]
    pub number_of_cores: u32,

    /// Provider-specific options
    #[serde(default)]
    #[schemars(with = "HashMap<String, serde_json::Value>")]
    pub options: HashMap<String, serde_yaml_ng::Value>,

    /// Provider-specific overrides
    #[serde(default)]
    #[schemars(with = "HashMap<String, serde_json::Value>")]
    pub overrides: HashMap<String, serde_yaml_ng::Value>,

    /// Free-form custom settings
    #[serde(default)]
    #[schemars(with = "HashMap<String, serde_json::Value>")]
    pub custom: HashMap<String, serde_yaml_ng::Value>,

    /// How files are copied to the machine
    #[serde(default)]
    pub file_transfer: FileTransferMode,

    /// How commands are run on the machine
    #[serde(default)]
    pub remote_execution: RemoteExecutionMode,

    /// Login user
    #[serde(default)]
    pub username: Option<String>,

    /// Login password
    #[serde(default)]
    pub password: Option<String>,

    /// Directory on the machine that receives `local_directory`
    #[serde(default)]
    pub remote_directory: Option<String>,

    /// Run services with root/Administrator rights
    #[serde(default)]
    pub privileged: bool,

    /// Command run before the agent starts on a new machine
    #[serde(default)]
    pub initialization_command: Option<String>,

    /// Environment variables for this template
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_cores() -> u32 {
    1
}

impl Default for ComputeTemplate {
    fn default() -> Self {
        Self {
            image_id: None,
            machine_memory_mb: 0,
            hardware_id: None,
            location_id: None,
            local_directory: None,
            key_file: None,
            number_of_cores: default_cores(),
            options: HashMap::new(),
            overrides: HashMap::new(),
            custom: HashMap::new(),
            file_transfer: FileTransferMode::default(),
            remote_execution: RemoteExecutionMode::default(),
            username: None,
            password: None,
            remote_directory: None,
            privileged: false,
            initialization_command: None,
            env: HashMap::new(),
        }
    }
}

/// Template validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("remote directory for template is missing")]
    MissingRemoteDirectory,

    #[error("local directory for template is missing")]
    MissingLocalDirectory,

    #[error("key file name field still has default configuration value of ENTER_KEY_FILE_NAME")]
    PlaceholderKeyFile,
}

impl ComputeTemplate {
    /// Check required fields. Reports the first problem found.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if is_blank(self.remote_directory.as_deref()) {
            return Err(TemplateError::MissingRemoteDirectory);
        }
        if is_blank(self.local_directory.as_deref()) {
            return Err(TemplateError::MissingLocalDirectory);
        }
        if self.key_file.as_deref() == Some(KEY_FILE_PLACEHOLDER) {
            return Err(TemplateError::PlaceholderKeyFile);
        }
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

// Password is never printed.
impl fmt::Debug for ComputeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeTemplate")
            .field("image_id", &self.image_id)
            .field("machine_memory_mb", &self.machine_memory_mb)
            .field("hardware_id", &self.hardware_id)
            .field("location_id", &self.location_id)
            .field("local_directory", &self.local_directory)
            .field("key_file", &self.key_file)
            .field("number_of_cores", &self.number_of_cores)
            .field("options", &self.options)
            .field("overrides", &self.overrides)
            .field("custom", &self.custom)
            .field("file_transfer", &self.file_transfer)
            .field("remote_execution", &self.remote_execution)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("remote_directory", &self.remote_directory)
            .field("privileged", &self.privileged)
            .field("initialization_command", &self.initialization_command)
            .field("env", &self.env)
            .finish()
    }
}

impl fmt::Display for ComputeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image={} memory={}MB hardware={} location={} cores={} transfer={} exec={}",
            self.image_id.as_deref().unwrap_or("-"),
            self.machine_memory_mb,
            self.hardware_id.as_deref().unwrap_or("-"),
            self.location_id.as_deref().unwrap_or("-"),
            self.number_of_cores,
            self.file_transfer,
            self.remote_execution,
        )
    }
}

/// File transfer protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileTransferMode {
    #[default]
    Scp,
    Sftp,
    Cifs,
}

impl fmt::Display for FileTransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scp => write!(f, "scp"),
            Self::Sftp => write!(f, "sftp"),
            Self::Cifs => write!(f, "cifs"),
        }
    }
}

/// Remote command execution protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemoteExecutionMode {
    #[default]
    Ssh,
    Winrm,
}

impl fmt::Display for RemoteExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => write!(f, "ssh"),
            Self::Winrm => write!(f, "winrm"),
        }
    }
}
