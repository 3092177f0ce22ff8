use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proxy_harvester::{Candidate, CheckerConfig, ProxyChecker, Status, Validate};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SENTINEL: &str = "TEST KONEKSI BERHASIL";

/// How the fake forward proxy treats requests
#[derive(Clone, Copy)]
enum Behaviour {
    /// Reject CONNECT tunnels, answer plain GETs with `body`
    PlainOnly { body: &'static str },
    /// Answer `/first.txt` with `first` and any other GET with `second`
    ByPath {
        first: &'static str,
        second: &'static str,
    },
    /// Accept the connection and never answer
    Silent,
}

async fn read_head(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

/// Start the proxy; the counter tracks requests it has received
async fn spawn_fake_proxy(behaviour: Behaviour) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let head = read_head(&mut stream).await;
                counter.fetch_add(1, Ordering::SeqCst);
                match behaviour {
                    Behaviour::Silent => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Behaviour::PlainOnly { .. } if head.starts_with("CONNECT") => {
                        let _ = stream
                            .write_all(b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\n\r\n")
                            .await;
                    }
                    Behaviour::PlainOnly { body } => {
                        let _ = stream.write_all(ok_response(body).as_bytes()).await;
                    }
                    Behaviour::ByPath { first, second } => {
                        let body = if head.contains("/first.txt") { first } else { second };
                        let _ = stream.write_all(ok_response(body).as_bytes()).await;
                    }
                }
            });
        }
    });

    (addr, requests)
}

fn checker(timeout: Duration) -> ProxyChecker {
    ProxyChecker::with_config(
        CheckerConfig::new()
            .with_timeout(timeout)
            .with_secure_url("https://liveness.test/check.txt".to_string())
            .with_plain_url("http://liveness.test/check.txt".to_string())
            .with_sentinel(SENTINEL.to_string()),
    )
}

fn candidate(addr: SocketAddr) -> Candidate {
    Candidate::new(addr.ip().to_string(), addr.port().to_string())
}

#[tokio::test]
async fn plaintext_fallback_with_sentinel_confirms() {
    proxy_harvester::logging::init_for_tests();
    let (addr, _) = spawn_fake_proxy(Behaviour::PlainOnly {
        body: "  TEST KONEKSI BERHASIL\n",
    })
    .await;

    let status = checker(Duration::from_secs(2)).validate(&candidate(addr)).await;
    assert_eq!(status, Status::Confirmed);
}

#[tokio::test]
async fn mismatched_body_is_invalid() {
    let (addr, _) = spawn_fake_proxy(Behaviour::PlainOnly {
        body: "<html>captive portal</html>",
    })
    .await;

    let status = checker(Duration::from_secs(2)).validate(&candidate(addr)).await;
    assert_eq!(status, Status::Invalid);
}

#[tokio::test]
async fn silent_proxy_times_out_as_invalid() {
    let (addr, _) = spawn_fake_proxy(Behaviour::Silent).await;

    let started = std::time::Instant::now();
    let status = checker(Duration::from_millis(200))
        .validate(&candidate(addr))
        .await;

    assert_eq!(status, Status::Invalid);
    // One secure attempt plus one plaintext attempt, each bounded.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn unparseable_port_is_invalid() {
    let status = checker(Duration::from_millis(200))
        .validate(&Candidate::new("127.0.0.1", "not-a-port"))
        .await;
    assert_eq!(status, Status::Invalid);
}

/// Checker whose first attempt is plain HTTP, so the proxy can answer it
fn answered_first_checker() -> ProxyChecker {
    ProxyChecker::with_config(
        CheckerConfig::new()
            .with_timeout(Duration::from_secs(2))
            .with_secure_url("http://liveness.test/first.txt".to_string())
            .with_plain_url("http://liveness.test/second.txt".to_string())
            .with_sentinel(SENTINEL.to_string()),
    )
}

#[tokio::test]
async fn sentinel_on_first_attempt_confirms() {
    let (addr, requests) = spawn_fake_proxy(Behaviour::ByPath {
        first: SENTINEL,
        second: "unused",
    })
    .await;

    let status = answered_first_checker().validate(&candidate(addr)).await;
    assert_eq!(status, Status::Confirmed);
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn answered_first_attempt_is_final() {
    let (addr, requests) = spawn_fake_proxy(Behaviour::ByPath {
        first: "wrong body",
        second: SENTINEL,
    })
    .await;

    let status = answered_first_checker().validate(&candidate(addr)).await;
    assert_eq!(status, Status::Invalid);
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}
