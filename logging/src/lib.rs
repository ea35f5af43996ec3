//! Shared logging targets for the combo clipper crates.
//!
//! Every crate in this workspace logs with an explicit `target:` so that output can be
//! filtered per-subsystem, e.g:
//!
//! ```no_run
//! use slippi_clipper_logging::Log;
//!
//! tracing::info!(target: Log::Combo, "Filter settings reset");
//! ```

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Namespaced log targets.
#[derive(Debug)]
pub struct Log;

#[allow(non_upper_case_globals)]
impl Log {
    pub const Clipper: &'static str = "slippi::clipper";
    pub const Combo: &'static str = "slippi::combo";
    pub const DolphinQueue: &'static str = "slippi::dolphin_queue";
    pub const FolderStream: &'static str = "slippi::folder_stream";

    /// All targets, mostly useful for building filters.
    pub const ALL: [&'static str; 4] = [Self::Clipper, Self::Combo, Self::DolphinQueue, Self::FolderStream];
}

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Parses a level string ("trace", "debug", "info", "warn", "error"), falling back to `INFO`.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

/// Installs a global `fmt` subscriber that only emits our targets at or above `level`.
///
/// Calling this more than once is harmless; only the first call has any effect. Returns
/// whether this call was the one that installed the subscriber.
pub fn init(level: Level) -> bool {
    let mut installed_now = false;

    INSTALLED.get_or_init(|| {
        let targets = Log::ALL
            .iter()
            .fold(Targets::new(), |targets, target| targets.with_target(*target, level));

        // Something else (a test harness, the host app) may already own the global default.
        installed_now = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(targets)
            .try_init()
            .is_ok();

        installed_now
    });

    installed_now
}
