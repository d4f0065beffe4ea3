//! IPC client for sending requests to the daemon.

use crate::error::{FrontendError, Result};
use crate::ipc::protocol::{Request, Response};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Send a request to the daemon via Unix socket and await the response.
///
/// # Errors
/// Returns `FrontendError::IpcConnection` if connection fails and
/// `FrontendError::IpcProtocol` if serialization/deserialization fails.
pub async fn send_request(socket_path: &Path, request: Request) -> Result<Response> {
    let stream =
        UnixStream::connect(socket_path)
            .await
            .map_err(|e| FrontendError::IpcConnection {
                message: format!("Failed to connect to daemon: {}", e),
            })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let request_json = request.to_json().map_err(|e| FrontendError::IpcProtocol {
        message: format!("Failed to serialize request: {}", e),
    })?;

    writer
        .write_all(request_json.as_bytes())
        .await
        .map_err(|e| FrontendError::IpcConnection {
            message: format!("Failed to write request: {}", e),
        })?;

    writer
        .write_all(b"\n")
        .await
        .map_err(|e| FrontendError::IpcConnection {
            message: format!("Failed to write newline: {}", e),
        })?;

    writer
        .flush()
        .await
        .map_err(|e| FrontendError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| FrontendError::IpcConnection {
            message: format!("Failed to read response: {}", e),
        })?;

    let response =
        Response::from_json(response_line.trim()).map_err(|e| FrontendError::IpcProtocol {
            message: format!("Failed to deserialize response: {}", e),
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::protocol::TextCleanRequest;
    use crate::ipc::server::{IpcServer, RequestHandler};
    use tempfile::TempDir;

    struct MockHandler;

    #[async_trait::async_trait]
    impl RequestHandler for MockHandler {
        async fn handle(&self, request: Request) -> Response {
            match request {
                Request::Clean(clean) => {
                    Response::Cleaned(crate::ipc::protocol::TextCleanResponse {
                        processed_content: clean.content,
                        tokens: Vec::new(),
                    })
                }
                Request::Status => Response::Status {
                    ready: true,
                    daemon_version: "test".to_string(),
                    abi_version: crate::abi::CURRENT,
                },
                Request::Shutdown => Response::Ok,
                _ => Response::Error {
                    kind: "internal".to_string(),
                    message: "unhandled".to_string(),
                    stage: None,
                },
            }
        }
    }

    async fn start_server(socket_path: std::path::PathBuf) {
        tokio::spawn(async move {
            let server = IpcServer::new(socket_path).unwrap();
            server.start(MockHandler).await
        });
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_send_request_clean() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_server(socket_path.clone()).await;

        let response = send_request(
            &socket_path,
            Request::Clean(TextCleanRequest {
                content: "halló".to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        match response {
            Response::Cleaned(cleaned) => assert_eq!(cleaned.processed_content, "halló"),
            _ => panic!("expected Cleaned response, got: {:?}", response),
        }
    }

    #[tokio::test]
    async fn test_send_request_status() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_server(socket_path.clone()).await;

        let response = send_request(&socket_path, Request::Status).await.unwrap();
        match response {
            Response::Status { ready, .. } => assert!(ready),
            _ => panic!("expected Status response"),
        }
    }

    #[tokio::test]
    async fn test_send_request_connection_failed() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("nonexistent.sock");

        let result = send_request(&socket_path, Request::Status).await;
        assert!(result.is_err());
        match result.unwrap_err() {
            FrontendError::IpcConnection { message } => {
                assert!(message.contains("Failed to connect to daemon"));
            }
            other => panic!("expected IpcConnection error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_sequential_requests() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_server(socket_path.clone()).await;

        for _ in 0..3 {
            let response = send_request(&socket_path, Request::Status).await.unwrap();
            assert!(matches!(response, Response::Status { .. }));
        }
    }
}
