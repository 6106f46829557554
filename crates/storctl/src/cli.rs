//! Clap derive structures for the `storctl` CLI.
//!
//! Defines the command tree, global flags, and the per-module argument
//! groups. Module flags map one-to-one onto module parameters.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// storctl -- declarative storage and host configuration
#[derive(Debug, Parser)]
#[command(
    name = "storctl",
    version,
    about = "Converge storage systems and hosts to a declared state",
    long_about = "Runs idempotent configuration modules against NetApp ONTAP (ZAPI),\n\
        NetApp E-Series (SANtricity REST) and the local Windows host.\n\n\
        Each module reads the current state, computes a diff and applies\n\
        at most one change. Use --check to see what would change.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Connection profile to use
    #[arg(long, short = 'p', env = "STORCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STORCTL_OUTPUT",
        default_value = "json",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Report what would change without changing it
    #[arg(long, global = true)]
    pub check: bool,

    /// Skip TLS certificate validation
    #[arg(long, short = 'k', env = "STORCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STORCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Also write debug logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Key/value table
    Table,
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text: `changed` or `ok`
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a module from a JSON argument document
    Run(RunArgs),

    /// Manage an ONTAP CIFS server (na_ontap_cifs_server)
    #[command(alias = "cifs")]
    CifsServer(CifsServerArgs),

    /// Configure an E-Series management port (netapp_e_mgmt_interface)
    #[command(alias = "mgmt")]
    MgmtInterface(MgmtInterfaceArgs),

    /// Manage local group members (win_group_membership)
    #[command(alias = "group")]
    GroupMembership(GroupMembershipArgs),

    /// List modules and the parameters they accept
    Modules,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Module name (e.g. na_ontap_cifs_server)
    pub module: String,

    /// Argument document; `-` or omitted reads stdin
    #[arg(value_name = "ARGS_FILE")]
    pub args: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MODULE SUBCOMMANDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresenceArg {
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceStateArg {
    Started,
    Stopped,
}

/// ONTAP connection flags (override the profile).
#[derive(Debug, Args)]
pub struct OntapConnectionArgs {
    /// Cluster or vserver management address
    #[arg(long, short = 'H')]
    pub hostname: Option<String>,

    /// API user
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// API password
    #[arg(long, env = "STORCTL_PASSWORD", hide_env = true)]
    pub password: Option<String>,

    /// Use HTTPS
    #[arg(long)]
    pub https: bool,

    /// ZAPI port (default 443 with --https, 80 without)
    #[arg(long)]
    pub http_port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct CifsServerArgs {
    #[command(flatten)]
    pub connection: OntapConnectionArgs,

    /// CIFS server name
    #[arg(long = "name", short = 'n')]
    pub cifs_server_name: String,

    /// Vserver that owns the CIFS server
    #[arg(long)]
    pub vserver: Option<String>,

    /// Whether the CIFS server should exist
    #[arg(long, default_value = "present")]
    pub state: PresenceArg,

    /// Administrative status
    #[arg(long)]
    pub service_state: Option<ServiceStateArg>,

    /// Workgroup to join
    #[arg(long, conflicts_with = "domain")]
    pub workgroup: Option<String>,

    /// Active Directory domain to join
    #[arg(long)]
    pub domain: Option<String>,

    /// Account used to join the domain
    #[arg(long)]
    pub admin_user_name: Option<String>,

    /// Password for --admin-user-name
    #[arg(long, env = "STORCTL_CIFS_ADMIN_PASSWORD", hide_env = true)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InterfaceStateArg {
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ControllerArg {
    A,
    B,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AddressMethodArg {
    Dhcp,
    Static,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NtpMethodArg {
    Disable,
    Dhcp,
    Static,
}

#[derive(Debug, Args)]
pub struct MgmtInterfaceArgs {
    /// SANtricity REST root, e.g. https://10.1.1.1:8443/devmgr/v2
    #[arg(long)]
    pub api_url: Option<String>,

    /// API user
    #[arg(long, short = 'u')]
    pub api_username: Option<String>,

    /// API password
    #[arg(long, env = "STORCTL_PASSWORD", hide_env = true)]
    pub api_password: Option<String>,

    /// Storage-system id
    #[arg(long)]
    pub ssid: Option<String>,

    /// Controller the port belongs to
    #[arg(long, short = 'c', ignore_case = true)]
    pub controller: ControllerArg,

    /// Port name or alias (preferred over --channel)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Port channel number
    #[arg(long, required_unless_present = "name")]
    pub channel: Option<u32>,

    /// Enable or disable IPv4 on the port
    #[arg(long)]
    pub state: Option<InterfaceStateArg>,

    /// IPv4 address assignment
    #[arg(long)]
    pub config_method: Option<AddressMethodArg>,

    /// Static IPv4 address
    #[arg(long)]
    pub address: Option<String>,

    /// Static subnet mask
    #[arg(long)]
    pub subnet_mask: Option<String>,

    /// Static gateway
    #[arg(long)]
    pub gateway: Option<String>,

    /// DNS server assignment
    #[arg(long)]
    pub dns_config_method: Option<AddressMethodArg>,

    /// Primary DNS server
    #[arg(long)]
    pub dns_address: Option<String>,

    /// Backup DNS server
    #[arg(long)]
    pub dns_address_backup: Option<String>,

    /// NTP server assignment
    #[arg(long)]
    pub ntp_config_method: Option<NtpMethodArg>,

    /// Primary NTP server
    #[arg(long)]
    pub ntp_address: Option<String>,

    /// Backup NTP server
    #[arg(long)]
    pub ntp_address_backup: Option<String>,

    /// Enable or disable remote (ssh) access to the controller
    #[arg(long)]
    pub ssh: Option<bool>,
}

#[derive(Debug, Args)]
pub struct GroupMembershipArgs {
    /// Local group name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Members to add or remove (repeat or comma-separate)
    #[arg(long = "member", short = 'm', required = true, value_delimiter = ',')]
    pub members: Vec<String>,

    /// Whether the members should be in the group
    #[arg(long, default_value = "present")]
    pub state: PresenceArg,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g., "hostname", "api_url", "validate_certs")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
