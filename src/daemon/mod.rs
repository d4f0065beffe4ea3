//! Daemon mode for ttsfront: holds the immutable registries and stage set,
//! serves the IPC protocol until shutdown.

pub mod handler;

use crate::config::Config;
use crate::defaults::DefaultRegistry;
use crate::error::Result;
use crate::ipc::server::IpcServer;
use crate::pipeline::orchestrator::StageSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Daemon state: registries built once at startup, stage collaborators,
/// per-request timeout.
pub struct DaemonState {
    /// Canonical default parameters, immutable after startup
    pub registry: Arc<DefaultRegistry>,
    /// Injected stage collaborators
    pub stages: StageSet,
    /// Per-stage deadline for collaborator calls
    pub stage_timeout: Duration,
}

impl DaemonState {
    pub fn new(stages: StageSet, stage_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(DefaultRegistry::new()),
            stages,
            stage_timeout,
        }
    }
}

/// Build the stage set from configuration.
///
/// The reference stages are always available; the symspell feature swaps
/// in a dictionary-backed spellchecker when a dictionary path is
/// configured.
pub fn build_stages(config: &Config) -> Result<StageSet> {
    let stages = StageSet::reference();

    #[cfg(feature = "symspell")]
    if let Some(path) = &config.spellcheck.dictionary_path {
        use crate::stages::spellchecker::SymspellSpellchecker;
        let spellchecker = SymspellSpellchecker::from_file(path).map_err(|e| {
            crate::error::FrontendError::ConfigInvalidValue {
                key: "spellcheck.dictionary_path".to_string(),
                message: e.to_string(),
            }
        })?;
        return Ok(stages.with_spellchecker(Arc::new(spellchecker)));
    }

    #[cfg(not(feature = "symspell"))]
    let _ = config;

    Ok(stages)
}

/// Run the daemon: build registries and stages, start the IPC server,
/// wait for shutdown.
pub async fn run_daemon(config: Config, socket_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    let stages = build_stages(&config)?;
    let state = DaemonState::new(stages, config.service.stage_timeout());

    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);
    let server = Arc::new(IpcServer::new(socket_path.clone())?);

    if !quiet {
        eprintln!("ttsfront: listening on {}", socket_path.display());
    }

    let request_handler = handler::DaemonRequestHandler::new(state, Arc::clone(&server));
    server.start(request_handler).await?;

    if !quiet {
        eprintln!("ttsfront: shut down");
    }
    Ok(())
}
