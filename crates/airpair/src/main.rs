//! airpair entry point.
//!
//! Shows the pairing QR code, browses mDNS for the phone's advertisements and
//! drives `adb` until the device is connected or the user presses Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! airpair [OPTIONS]
//!
//! Options:
//!   --adb-path <PATH>    Path to the adb platform tool [default: adb]
//!   --use-port <PORT>    Pair and connect on this port instead of the announced ones
//!   --tcpip-port <PORT>  Port for `adb tcpip` [default: 5555]
//!   --only-connect       Skip pairing; connect on the next connect advertisement
//!   --do-tcpip           Run `adb tcpip` after connecting
//!   --connect-tcpip      Connect and run `adb tcpip` on the connect advertisement alone
//!   --config <PATH>      TOML config file
//!   --no-qr              Print the pairing payload instead of a QR code
//!   --qr-border <N>      Quiet-zone width around the QR code [default: 1]
//!   --debug              Debug-level logs
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ PairingCredential::generate()    -- once per run
//!  └─ show_pairing_code()              -- QR on the alternate screen
//!  └─ Orchestrator + DiscoveryRouter   -- state machine behind a mutex
//!  └─ LifecycleController::start()
//!       └─ MdnsDiscovery               -- one OS thread per service type
//!  └─ run() until completed or Ctrl-C
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use airpair::application::lifecycle::{completion_channel, LifecycleController};
use airpair::application::orchestrate::Orchestrator;
use airpair::application::route_discovery::DiscoveryRouter;
use airpair::infrastructure::discovery::{MdnsDiscovery, ServiceCache};
use airpair::infrastructure::executor::AdbExecutor;
use airpair::infrastructure::storage::config::{
    default_config_path, load_config, AppConfig, FileConfig, DEFAULT_ADB_PATH,
    DEFAULT_LOG_LEVEL,
};
use airpair::infrastructure::terminal::{show_pairing_code, AlternateScreen, DEFAULT_QR_BORDER};
use airpair_core::{PairingCredential, SessionConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Hands-free wireless adb pairing.
///
/// Scan the QR code from "Wireless debugging > Pair device with QR code" on the
/// phone; airpair does the rest.
#[derive(Debug, Parser)]
#[command(
    name = "airpair",
    about = "Pair and connect an Android device over Wi-Fi by scanning a QR code",
    version
)]
struct Cli {
    /// Path to the `adb` platform tool.  Defaults to `adb` on `PATH`.
    #[arg(long, env = "AIRPAIR_ADB_PATH")]
    adb_path: Option<PathBuf>,

    /// Use this port for pairing and connecting instead of the announced
    /// ones.  `0` means no override.
    #[arg(long, env = "AIRPAIR_USE_PORT")]
    use_port: Option<u16>,

    /// Port passed to `adb tcpip`.  Defaults to 5555.
    #[arg(long, env = "AIRPAIR_TCPIP_PORT")]
    tcpip_port: Option<u16>,

    /// Skip pairing and only connect (device already paired).
    #[arg(long, env = "AIRPAIR_ONLY_CONNECT")]
    only_connect: bool,

    /// Run `adb tcpip` after a successful connect.
    #[arg(long, env = "AIRPAIR_DO_TCPIP")]
    do_tcpip: bool,

    /// On the connect advertisement alone, connect and run `adb tcpip`.
    ///
    /// Pairing advertisements are ignored in this mode.
    #[arg(long, env = "AIRPAIR_CONNECT_TCPIP")]
    connect_tcpip: bool,

    /// TOML config file.  Without this flag the platform config directory is
    /// consulted and a missing file there is not an error.
    #[arg(long, env = "AIRPAIR_CONFIG")]
    config: Option<PathBuf>,

    /// Print the pairing payload as text instead of drawing a QR code.
    #[arg(long, env = "AIRPAIR_NO_QR")]
    no_qr: bool,

    /// Quiet-zone width around the QR code, in modules.  Defaults to 1.
    #[arg(long, env = "AIRPAIR_QR_BORDER")]
    qr_border: Option<u32>,

    /// Enable debug-level logs (including `adb` stdout/stderr on failure).
    #[arg(long, env = "AIRPAIR_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Merges the CLI over the config file over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given config file cannot be read or
    /// either config file fails to parse.
    fn into_app_config(self) -> anyhow::Result<AppConfig> {
        let file = match &self.config {
            Some(path) => load_config(path, true)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => match default_config_path() {
                Some(path) => load_config(&path, false)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => FileConfig::default(),
            },
        };
        Ok(self.merge(file))
    }

    fn merge(self, file: FileConfig) -> AppConfig {
        let explicit_port = match self.use_port {
            Some(0) => None,
            Some(port) => Some(port),
            None => file.session.explicit_port.filter(|&port| port != 0),
        };

        let session = SessionConfig {
            only_connect: self.only_connect || file.session.only_connect,
            do_mode_switch: self.do_tcpip || file.session.do_mode_switch,
            auto_mode_switch: self.connect_tcpip || file.session.auto_mode_switch,
            mode_switch_port: self.tcpip_port.unwrap_or(file.session.mode_switch_port),
            explicit_port,
        };

        let log_level = if self.debug {
            "debug".to_string()
        } else {
            file.log
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
        };

        AppConfig {
            adb_path: self
                .adb_path
                .or(file.adb.path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ADB_PATH)),
            session,
            log_level,
            show_qr: !self.no_qr,
            qr_border: self
                .qr_border
                .or(file.display.qr_border)
                .unwrap_or(DEFAULT_QR_BORDER),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments and the optional config file are merged into an
///    [`AppConfig`].
/// 2. `tracing_subscriber` is initialised.  `RUST_LOG` wins over the
///    configured level.
/// 3. The one-time credential is generated and shown.
/// 4. The state machine, router and mDNS browse are wired together.
/// 5. The lifecycle controller waits for completion or Ctrl-C, then stops
///    discovery.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_app_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    debug!(?config, "resolved configuration");

    // ── Credential ────────────────────────────────────────────────────────────
    let credential = PairingCredential::generate();
    debug!(
        network = credential.network_name(),
        password = credential.password(),
        "generated pairing credential"
    );

    let screen = if config.show_qr {
        Some(AlternateScreen::enter().context("entering alternate screen")?)
    } else {
        None
    };
    show_pairing_code(&credential, config.show_qr, config.qr_border)
        .context("showing pairing code")?;

    // ── Orchestration wiring ──────────────────────────────────────────────────
    let (completion, waiter) = completion_channel();
    let executor = Arc::new(AdbExecutor::new(config.adb_path.clone()));
    let orchestrator =
        Orchestrator::new(config.session.clone(), credential, executor, completion).into_shared();
    let cache = Arc::new(ServiceCache::new());
    let router = Arc::new(DiscoveryRouter::new(orchestrator, cache.clone()));

    let controller = LifecycleController::start(|| MdnsDiscovery::start(router, cache), waiter)
        .context("starting mDNS discovery")?;

    info!("waiting for the device; press Ctrl-C to exit");

    // ── Wait for completion or Ctrl-C ─────────────────────────────────────────
    let reason = controller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl-C signal: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    drop(screen);
    info!(?reason, "airpair stopped");
    std::process::exit(reason.exit_code());
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use airpair::infrastructure::storage::config::parse_config;

    fn file(content: &str) -> FileConfig {
        parse_config(content).expect("valid TOML")
    }

    #[test]
    fn test_cli_defaults() {
        // Arrange
        let cli = Cli::parse_from(["airpair"]);

        // Act
        let config = cli.merge(FileConfig::default());

        // Assert
        assert_eq!(config.adb_path, PathBuf::from("adb"));
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(config.show_qr);
        assert_eq!(config.qr_border, 1);
    }

    #[test]
    fn test_cli_adb_path_override() {
        let cli = Cli::parse_from(["airpair", "--adb-path", "/opt/sdk/adb"]);
        let config = cli.merge(FileConfig::default());
        assert_eq!(config.adb_path, PathBuf::from("/opt/sdk/adb"));
    }

    #[test]
    fn test_cli_use_port_sets_explicit_port() {
        let cli = Cli::parse_from(["airpair", "--use-port", "41000"]);
        let config = cli.merge(FileConfig::default());
        assert_eq!(config.session.explicit_port, Some(41000));
    }

    #[test]
    fn test_cli_use_port_zero_means_none() {
        let cli = Cli::parse_from(["airpair", "--use-port", "0"]);
        let config = cli.merge(file("[session]\nexplicit_port = 41000\n"));
        assert_eq!(config.session.explicit_port, None);
    }

    #[test]
    fn test_cli_mode_flags() {
        // Arrange
        let cli = Cli::parse_from([
            "airpair",
            "--only-connect",
            "--do-tcpip",
            "--connect-tcpip",
            "--tcpip-port",
            "5556",
        ]);

        // Act
        let config = cli.merge(FileConfig::default());

        // Assert
        assert!(config.session.only_connect);
        assert!(config.session.do_mode_switch);
        assert!(config.session.auto_mode_switch);
        assert_eq!(config.session.mode_switch_port, 5556);
    }

    #[test]
    fn test_file_values_apply_when_cli_is_silent() {
        // Arrange
        let cli = Cli::parse_from(["airpair"]);
        let file = file(
            "[adb]\npath = \"/usr/local/bin/adb\"\n\
             [session]\ndo_mode_switch = true\nmode_switch_port = 5600\nexplicit_port = 42000\n\
             [log]\nlevel = \"warn\"\n",
        );

        // Act
        let config = cli.merge(file);

        // Assert
        assert_eq!(config.adb_path, PathBuf::from("/usr/local/bin/adb"));
        assert!(config.session.do_mode_switch);
        assert_eq!(config.session.mode_switch_port, 5600);
        assert_eq!(config.session.explicit_port, Some(42000));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "airpair",
            "--adb-path",
            "/cli/adb",
            "--tcpip-port",
            "5700",
            "--use-port",
            "43000",
            "--debug",
        ]);
        let file = file(
            "[adb]\npath = \"/file/adb\"\n\
             [session]\nmode_switch_port = 5600\nexplicit_port = 42000\n\
             [log]\nlevel = \"warn\"\n",
        );

        let config = cli.merge(file);

        assert_eq!(config.adb_path, PathBuf::from("/cli/adb"));
        assert_eq!(config.session.mode_switch_port, 5700);
        assert_eq!(config.session.explicit_port, Some(43000));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_qr_border_from_cli_wins_over_file() {
        // Arrange
        let file = file("[display]\nqr_border = 4\n");

        // Act
        let from_file = Cli::parse_from(["airpair"]).merge(file.clone());
        let from_cli = Cli::parse_from(["airpair", "--qr-border", "0"]).merge(file);

        // Assert
        assert_eq!(from_file.qr_border, 4);
        assert_eq!(from_cli.qr_border, 0);
    }

    #[test]
    fn test_no_qr_disables_qr_display() {
        let cli = Cli::parse_from(["airpair", "--no-qr"]);
        let config = cli.merge(FileConfig::default());
        assert!(!config.show_qr);
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let path = std::env::temp_dir().join("airpair-missing-dir/none.toml");
        let cli = Cli::parse_from(["airpair", "--config", path.to_str().unwrap()]);
        assert!(cli.into_app_config().is_err());
    }

    #[test]
    fn test_explicit_config_file_is_loaded() {
        // Arrange
        let path =
            std::env::temp_dir().join(format!("airpair-main-{}.toml", std::process::id()));
        std::fs::write(&path, "[session]\nonly_connect = true\n").unwrap();
        let cli = Cli::parse_from(["airpair", "--config", path.to_str().unwrap()]);

        // Act
        let config = cli.into_app_config();
        let _ = std::fs::remove_file(&path);

        // Assert
        assert!(config.unwrap().session.only_connect);
    }

    #[test]
    fn test_invalid_port_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["airpair", "--use-port", "70000"]);
        assert!(result.is_err());
    }
}
