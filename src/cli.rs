//! CLI surface shared by every trading binary: auth, endpoint, and
//! log/profiler flags. Each binary flattens `CommonArgs` into its own
//! `Args` struct and adds whatever strategy-specific fields it needs.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::logger::{LogLevel, Logger, LoggerConfig};
use crate::risk::AbortLatch;

#[derive(Args, Debug)]
pub struct CommonArgs {
    #[arg(long, env = "PHOENIX_AUTH_USERNAME")]
    pub auth_username: String,

    #[arg(long, env = "PHOENIX_AUTH_SECRET")]
    pub auth_secret: String,

    #[arg(long, default_value = "www.deribit.com")]
    pub host: String,

    #[arg(long, default_value = "9881")]
    pub port: String,

    #[arg(long)]
    pub client: String,

    #[arg(long, default_value_t = false)]
    pub colo: bool,

    #[arg(long, default_value_t = 30)]
    pub heartbeat_secs: u32,

    #[arg(long, default_value = "INFO")]
    pub log_level: LogLevel,

    #[arg(long, default_value = "./logs")]
    pub log_folder: PathBuf,

    #[arg(long, default_value = "trading")]
    pub log_prefix: String,

    #[arg(long, default_value_t = false)]
    pub log_print: bool,

    #[arg(long, default_value_t = false)]
    pub log_csv: bool,

    #[arg(long, default_value_t = false)]
    pub single_threaded_log: bool,

    /// Enables the per-pipeline timing logs emitted by the profiler guard.
    #[arg(long, default_value_t = false)]
    pub profiled: bool,

    /// Pins the trading thread to this CPU core index, if set.
    #[arg(long)]
    pub pin_core: Option<usize>,
}

impl CommonArgs {
    pub fn start_logger(&self, abort: AbortLatch) -> std::io::Result<Logger> {
        Logger::start(
            LoggerConfig {
                log_folder: self.log_folder.clone(),
                log_prefix: self.log_prefix.clone(),
                min_level: self.log_level,
                print_logs: self.log_print,
                csv: self.log_csv,
                single_threaded: self.single_threaded_log,
            },
            abort,
        )
    }

    /// Pins the calling thread to `pin_core`, if set. Best-effort: an
    /// out-of-range core index or a platform with no affinity support is
    /// logged and otherwise ignored rather than failing startup.
    pub fn pin_to_core(&self) {
        let Some(core) = self.pin_core else {
            return;
        };

        match core_affinity::get_core_ids() {
            Some(core_ids) if core < core_ids.len() => {
                core_affinity::set_for_current(core_ids[core]);
                tracing::info!(core, "trading thread pinned");
            }
            _ => tracing::warn!(core, "requested core is out of range, continuing unpinned"),
        }
    }
}

/// Initializes the process-level `tracing` subscriber. Called once at the
/// top of every binary's `main`, before the domain `Logger` is started.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Loads credentials from a `.env` file before CLI parsing, so `clap`'s
/// `env = "..."` fallbacks see them. Tries the standard cwd-and-parents
/// search first, then falls back to the crate's own manifest directory —
/// useful when the binary is run with `--manifest-path` from elsewhere.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for candidate in [manifest_dir.join(".env"), manifest_dir.join("../.env")] {
        if candidate.exists() {
            let _ = dotenv::from_path(&candidate);
        }
    }
}
