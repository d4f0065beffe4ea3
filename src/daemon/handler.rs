//! Request handler implementation for the daemon.

use crate::daemon::DaemonState;
use crate::defaults::DefaultRegistry;
use crate::error::Result;
use crate::ipc::protocol::{
    AbiVersionResponse, DefaultProcessingResponse, Request, Response,
};
use crate::ipc::server::{IpcServer, RequestHandler};
use crate::pipeline::orchestrator::Orchestrator;
use std::sync::Arc;
use std::time::Duration;

/// Handles IPC requests by running the orchestrator per request.
pub struct DaemonRequestHandler {
    state: Arc<DaemonState>,
    server: Arc<IpcServer>,
}

impl DaemonRequestHandler {
    pub fn new(state: DaemonState, server: Arc<IpcServer>) -> Self {
        Self {
            state: Arc::new(state),
            server,
        }
    }

    /// Upper bound for a whole request: every stage of the longest
    /// pipeline may spend its full per-stage budget.
    fn request_deadline(&self) -> Duration {
        self.state.stage_timeout * 8
    }

    /// Runs one pipeline entry point on the blocking pool under the
    /// request deadline. On timeout or caller cancellation the join handle
    /// is dropped: the request-scoped ledger dies with the task and no
    /// partial result is ever returned.
    async fn run_pipeline<F>(&self, f: F) -> Response
    where
        F: FnOnce(&Orchestrator) -> Result<Response> + Send + 'static,
    {
        let stages = self.state.stages.clone();
        let registry = Arc::clone(&self.state.registry);
        let stage_timeout = self.state.stage_timeout;

        let task = tokio::task::spawn_blocking(move || {
            let orchestrator =
                Orchestrator::new(stages, registry).with_stage_timeout(stage_timeout);
            f(&orchestrator)
        });

        match tokio::time::timeout(self.request_deadline(), task).await {
            Ok(Ok(Ok(response))) => response,
            Ok(Ok(Err(error))) => Response::from(&error),
            Ok(Err(join_error)) => Response::Error {
                kind: "internal".to_string(),
                message: format!("pipeline task failed: {}", join_error),
                stage: None,
            },
            Err(_) => Response::Error {
                kind: "upstream_stage_failure".to_string(),
                message: format!(
                    "request exceeded its {}ms deadline",
                    self.request_deadline().as_millis()
                ),
                stage: None,
            },
        }
    }

    fn defaults_response(registry: &DefaultRegistry) -> DefaultProcessingResponse {
        let normalize = registry.normalize();
        DefaultProcessingResponse {
            language_code: registry.language_code().to_string(),
            domain: normalize.domain,
            do_spellcorrect: normalize.do_spellcorrect,
            phrasing: normalize.phrasing,
            sentence_split: normalize.sentence_split,
            max_characters_in_chunk: normalize.max_chunk_tokens,
            description: registry.description().clone(),
            cleaner_params: registry.cleaner().clone(),
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for DaemonRequestHandler {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Preprocess(preprocess) => {
                self.run_pipeline(move |orchestrator| {
                    orchestrator
                        .preprocess(&preprocess)
                        .map(Response::Preprocessed)
                })
                .await
            }
            Request::Normalize(normalize) => {
                self.run_pipeline(move |orchestrator| {
                    orchestrator.normalize(&normalize).map(Response::Normalized)
                })
                .await
            }
            Request::Clean(clean) => {
                self.run_pipeline(move |orchestrator| {
                    orchestrator.clean(&clean).map(Response::Cleaned)
                })
                .await
            }
            Request::Transcribe(transcribe) => {
                self.run_pipeline(move |orchestrator| {
                    orchestrator
                        .transcribe(&transcribe)
                        .map(Response::Preprocessed)
                })
                .await
            }
            Request::GetDefaultParameters => {
                Response::DefaultParameters(Self::defaults_response(&self.state.registry))
            }
            Request::GetVersion => Response::AbiVersion(AbiVersionResponse {
                version: crate::abi::CURRENT,
            }),
            Request::Status => Response::Status {
                ready: true,
                daemon_version: crate::version_string(),
                abi_version: crate::abi::CURRENT,
            },
            Request::Shutdown => {
                if let Err(e) = self.server.stop().await {
                    eprintln!("ttsfront: error during shutdown: {}", e);
                }
                Response::Ok
            }
        }
    }
}
