//! Canned HTTP responses served from a local socket

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// One fixed HTTP response, optionally held back before the headers are sent
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: &'static str,
    pub delay: Duration,
}

impl CannedResponse {
    pub fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Answer every connection on an ephemeral local port with `response`.
/// Returns the base URL, ending in '/'.
pub async fn serve(response: CannedResponse) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(respond(stream, response.clone()));
        }
    });

    format!("http://{addr}/")
}

/// Base URL of a local port with nothing listening on it
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{addr}/")
}

async fn respond(mut stream: TcpStream, response: CannedResponse) {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buffer).await {
            Ok(0) | Err(_) => return,
            Ok(read) => request.extend_from_slice(&buffer[..read]),
        }
    }

    tokio::time::sleep(response.delay).await;

    let reason = if response.status < 400 { "OK" } else { "Error" };
    let head = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.body.len()
    );

    // The client may already have given up; write errors are expected then
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(response.body.as_bytes()).await;
    let _ = stream.shutdown().await;
}
