use std::{path::PathBuf, sync::Once};

use hearth_config::{Config, ConfigManager};

use crate::errors::Result;

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber. Logs go to stderr so stdout stays
/// machine-readable; `RUST_LOG` adds directives on top of `hearth=info`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "hearth=info".parse() {
            filter = filter.add_directive(directive);
        }

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("hearth tracing initialized");
    });
}

/// Filesystem locations derived from the application home directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub home: PathBuf,
    pub snapshot_backups: PathBuf,
}

impl AppPaths {
    pub fn new(home: PathBuf) -> Self {
        let snapshot_backups = home.join("backups");
        Self {
            home,
            snapshot_backups,
        }
    }

    /// `$HEARTH_HOME`, or `~/.hearth`.
    pub fn from_env() -> Self {
        Self::new(Config::default_home())
    }

    pub fn config_manager(&self) -> Result<ConfigManager> {
        Ok(ConfigManager::with_base_dir(&self.home)?)
    }

    /// An explicit override wins over the configured location.
    pub fn snapshot_path(&self, config: &Config, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| config.resolve_snapshot_path(&self.home))
    }
}
