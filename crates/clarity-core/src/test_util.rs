//! In-memory image fixtures shared by unit tests.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};
use crate::llm::{Description, DescriptionProvider, DescriptionRequest};
use crate::pipeline::ImageSource;

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn encode_png(image: &GrayImage) -> Vec<u8> {
    encode(DynamicImage::ImageLuma8(image.clone()), ImageFormat::Png)
}

/// One-pixel checkerboard alternating black and white.
pub fn checkerboard(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Serve a single canned HTTP response on an ephemeral port and return its URL.
pub async fn serve_once(status_line: &str, content_type: &str, body: Vec<u8>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let head = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        // Drain the whole request so closing the socket doesn't reset the connection.
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + body_len {
                    break;
                }
            }
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&body).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/image")
}

/// Accept one connection and never answer it.
pub async fn serve_silent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(socket);
        }
    });
    format!("http://{addr}/slow.jpg")
}

/// A URL on a local port nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/missing.jpg")
}

/// A configurable mock description provider.
pub struct MockProvider {
    response: Box<dyn Fn() -> Result<Description, PipelineError> + Send + Sync>,
    call_count: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn success(text: &str) -> Self {
        let text = text.to_string();
        Self {
            response: Box::new(move || {
                Ok(Description {
                    text: text.clone(),
                    model: "mock-v1".to_string(),
                    tokens_used: Some(42),
                    latency_ms: 10,
                })
            }),
            call_count: Arc::new(AtomicU32::new(0)),
            delay: None,
        }
    }

    pub fn failing(status_code: Option<u16>, message: &str) -> Self {
        let message = message.to_string();
        Self {
            response: Box::new(move || {
                Err(PipelineError::Llm {
                    message: message.clone(),
                    status_code,
                })
            }),
            call_count: Arc::new(AtomicU32::new(0)),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle to the call counter (clone before moving the provider).
    pub fn call_count_handle(&self) -> Arc<AtomicU32> {
        self.call_count.clone()
    }
}

#[async_trait]
impl DescriptionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, _request: &DescriptionRequest) -> Result<Description, PipelineError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.response)()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}

/// Image source that serves fixed bytes or a fixed error, and counts calls.
pub struct StaticSource {
    bytes: Option<Vec<u8>>,
    calls: Arc<AtomicU32>,
}

impl StaticSource {
    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            bytes: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn call_count_handle(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ImageSource for StaticSource {
    async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bytes.clone().ok_or_else(|| PipelineError::Fetch {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}
