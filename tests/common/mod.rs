//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use subscription_rewriter::config::EditConfig;
use subscription_rewriter::fetch::SubscriptionFetcher;
use subscription_rewriter::Pipeline;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// The handler receives the request path and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        // Drain headers up to the blank line.
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" || line == "\n" => break,
                                Ok(_) => continue,
                                Err(_) => return,
                            }
                        }

                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend that serves fixed bodies per path; other paths get 404.
pub async fn start_mock_backend(routes: Vec<(&'static str, u16, String)>) -> SocketAddr {
    let routes = Arc::new(routes);
    start_programmable_backend(move |path| {
        let routes = routes.clone();
        async move {
            routes
                .iter()
                .find(|(p, _, _)| *p == path)
                .map(|(_, status, body)| (*status, body.clone()))
                .unwrap_or((404, "not found".to_string()))
        }
    })
    .await
}

/// A client that never goes through an environment proxy.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Edit parameters pointing the rule-set at the mock backend.
pub fn test_edits(backend: SocketAddr) -> EditConfig {
    EditConfig {
        dns_to_remove: "223.5.5.5".into(),
        group_url: "https://api.v2fly.org/checkConnection.svgz".into(),
        rules_url: format!("http://{}/rules.ini", backend),
        remote_rules_optional: true,
    }
}

pub fn test_pipeline(edits: EditConfig) -> Pipeline {
    Pipeline::new(SubscriptionFetcher::with_client(test_client()), edits)
}
