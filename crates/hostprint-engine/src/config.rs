//! Scan configuration (hostprint.toml)
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! max_depth = 1
//! workers = 4
//! denied_types = ["android.media.MediaDrm"]
//! affinity_types = ["android.webkit.WebView"]
//!
//! [[denied_methods]]
//! type = "android.content.ClipboardManager"
//! methods = ["getPrimaryClip", "hasPrimaryClip"]
//!
//! [[commands]]
//! name = "kernel_information"
//! command = "uname -a"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Methods that must never be invoked on one type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeniedMethods {
    /// Exact type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Method names
    pub methods: Vec<String>,
}

/// One external command and the attribute its output is recorded under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSpec {
    /// Attribute name in the report
    pub name: String,
    /// Shell command line
    pub command: String,
}

impl CommandSpec {
    fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
        }
    }
}

/// Fingerprinting pass configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Depth budget for exploring member values
    pub max_depth: usize,

    /// Worker pool size
    pub workers: usize,

    /// Run the command source
    pub run_commands: bool,

    /// Run the content source
    pub query_content: bool,

    /// Type-name substrings that are never instantiated
    pub denied_types: Vec<String>,

    /// Type-name substrings scanned on the affinity thread
    pub affinity_types: Vec<String>,

    /// (type, methods) pairs never invoked
    pub denied_methods: Vec<DeniedMethods>,

    /// Commands in report order
    pub commands: Vec<CommandSpec>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            workers: num_cpus::get().max(1),
            run_commands: true,
            query_content: true,
            denied_types: vec![
                "android.graphics.HardwareBufferRenderer".to_string(),
                "android.media.MediaDrm".to_string(),
                "android.media.MediaExtractor".to_string(),
            ],
            affinity_types: vec!["android.webkit.WebView".to_string(), "host.ui.".to_string()],
            denied_methods: vec![
                DeniedMethods {
                    type_name: "android.content.ClipboardManager".to_string(),
                    methods: clipboard_methods(),
                },
                DeniedMethods {
                    type_name: "android.text.ClipboardManager".to_string(),
                    methods: clipboard_methods(),
                },
            ],
            commands: default_commands(),
        }
    }
}

fn clipboard_methods() -> Vec<String> {
    [
        "getPrimaryClip",
        "hasPrimaryClip",
        "getPrimaryClipDescription",
        "getText",
        "getTextDescription",
        "hasText",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The default command table
pub fn default_commands() -> Vec<CommandSpec> {
    vec![
        // CPU and hardware
        CommandSpec::new("cpu_information", "lscpu"),
        CommandSpec::new("memory_information", "free -m"),
        CommandSpec::new("device_tree", "lshw"),
        CommandSpec::new("storage_information", "lsblk"),
        CommandSpec::new("acpi_battery", "acpi -V"),
        CommandSpec::new("nproc", "nproc"),
        CommandSpec::new("lsmod", "lsmod"),
        CommandSpec::new("lspci", "lspci"),
        CommandSpec::new("lsusb", "lsusb"),
        // File system and storage
        CommandSpec::new("system_root_structure", "ls -l"),
        CommandSpec::new("system_typefaces", "ls -l /system/fonts"),
        CommandSpec::new("ringtones_list", "ls -l /system/media/audio/ringtones"),
        CommandSpec::new("ringtones_list_ext", "ls -l /system_ext/media/audio/ringtones"),
        CommandSpec::new("df", "df -h"),
        // Kernel and OS
        CommandSpec::new("kernel_information", "uname -a"),
        CommandSpec::new("distribution_information", "lsb_release -a"),
        CommandSpec::new("system_uptime", "uptime"),
        CommandSpec::new("sysctl", "sysctl -a"),
        CommandSpec::new("system_conf_vars", "getconf -a"),
        // System and users
        CommandSpec::new("installed_packages", "dpkg -l"),
        CommandSpec::new("running_processes", "ps aux"),
        CommandSpec::new("user_accounts", "cat /etc/passwd"),
        CommandSpec::new("groups", "cat /etc/group"),
        CommandSpec::new("hostname", "hostname"),
        CommandSpec::new("hwclock", "hwclock"),
        CommandSpec::new("tty", "tty"),
        CommandSpec::new("ssty_active", "stty -a"),
        // Logs
        CommandSpec::new("dmesg_first_1000_lines", "dmesg -T | head -n 1000"),
        CommandSpec::new("dmesg_last_1000_lines", "dmesg -T | tail -n 1000"),
        CommandSpec::new("authentication_logs", "cat /var/log/auth.log"),
        // Network
        CommandSpec::new("network_interfaces", "ifconfig"),
        CommandSpec::new("routing_table", "route"),
        CommandSpec::new("routing_table_n", "route -n"),
        CommandSpec::new("netstat", "netstat"),
        CommandSpec::new("arp_cache", "arp -a"),
        CommandSpec::new("getprop_net_dns1", "getprop net.dns1"),
        CommandSpec::new("getprop_net_dns2", "getprop net.dns2"),
        CommandSpec::new("getprop_net_dns3", "getprop net.dns3"),
        CommandSpec::new("getprop_net_dns4", "getprop net.dns4"),
        // Services and properties
        CommandSpec::new("dumpsys", "dumpsys"),
        CommandSpec::new("getprop", "getprop"),
        CommandSpec::new("meminfo", "cat /proc/meminfo"),
        CommandSpec::new("cpuinfo", "cat /proc/cpuinfo"),
    ]
}

impl ScanConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be at least 1".to_string(),
            ));
        }
        if let Some(cmd) = self.commands.iter().find(|c| c.name.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "command '{}' has an empty attribute name",
                cmd.command
            )));
        }
        Ok(())
    }

    /// Whether a type must never be instantiated
    pub fn is_denied_type(&self, type_name: &str) -> bool {
        self.denied_types.iter().any(|d| type_name.contains(d.as_str()))
    }

    /// Whether a type must be scanned on the affinity thread
    pub fn requires_affinity(&self, type_name: &str) -> bool {
        self.affinity_types.iter().any(|a| type_name.contains(a.as_str()))
    }

    /// Whether a (type, method) pair is denylisted
    pub fn is_denied_method(&self, type_name: &str, method: &str) -> bool {
        self.denied_methods
            .iter()
            .any(|d| d.type_name == type_name && d.methods.iter().any(|m| m == method))
    }
}
