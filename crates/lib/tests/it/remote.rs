use std::sync::Arc;

use sarsync::{
    Clock, Error, FixedClock, InMemory, OfflineStore, PendingMutation, SyncConfig, SyncManager,
    sync::{HttpRemote, Remote, SyncError},
};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};

/// A request as seen by the test server.
struct Captured {
    head: String,
    body: Value,
}

impl Captured {
    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Serve one connection per entry of `statuses`, answering with that status.
async fn start_server(
    statuses: Vec<u16>,
) -> (String, mpsc::UnboundedReceiver<Captured>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        for status in statuses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);
            let (reason, body) = if status < 300 {
                ("OK", "")
            } else {
                ("Service Unavailable", "maintenance")
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}/api/sync"), rx, task)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let (head_end, length) = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let length = head
                .lines()
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            break (end, length);
        }
    };
    let body_start = head_end + 4;
    while buf.len() < body_start + length {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body was complete");
        buf.extend_from_slice(&chunk[..n]);
    }
    Captured {
        head: String::from_utf8_lossy(&buf[..head_end]).to_string(),
        body: serde_json::from_slice(&buf[body_start..body_start + length]).unwrap(),
    }
}

fn draft(key: &str, value: Value) -> PendingMutation {
    PendingMutation::upsert(key, value, FixedClock::default().now())
}

#[tokio::test]
async fn http_push_sends_batch_with_bearer_token() {
    let (url, mut requests, server) = start_server(vec![200, 503]).await;
    let remote = HttpRemote::new(&url).unwrap().with_bearer_token("t0ken");

    let batch = vec![draft("draft-1", json!({"a": 1})), draft("draft-2", json!([2]))];
    remote.push(&batch).await.unwrap();

    let request = requests.recv().await.unwrap();
    assert!(request.head.starts_with("POST /api/sync HTTP/1.1"));
    assert_eq!(request.header("authorization").as_deref(), Some("Bearer t0ken"));
    let mutations = request.body["mutations"].as_array().unwrap();
    assert_eq!(mutations.len(), 2);
    assert_eq!(mutations[0]["key"], "draft-1");
    assert_eq!(mutations[0]["op"], "upsert");
    assert_eq!(mutations[0]["value"], json!({"a": 1}));
    assert_eq!(mutations[1]["id"], json!(batch[1].id));

    let err = remote.push(&batch[..1]).await.unwrap_err();
    assert!(err.is_network_error());
    match err {
        Error::Sync(SyncError::RemoteRejected { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected a rejected batch, got {other:?}"),
    }
    assert_eq!(requests.recv().await.unwrap().body["mutations"][0]["key"], "draft-1");
    server.await.unwrap();
}

#[tokio::test]
async fn http_push_without_token_sends_no_authorization() {
    let (url, mut requests, server) = start_server(vec![204]).await;
    let remote = HttpRemote::new(&url).unwrap();

    remote.push(&[draft("draft-1", json!(1))]).await.unwrap();
    assert_eq!(requests.recv().await.unwrap().header("authorization"), None);
    server.await.unwrap();
}

#[tokio::test]
async fn sync_manager_retries_rejected_batch_over_http() {
    let (url, mut requests, server) = start_server(vec![503, 200]).await;
    let store = Arc::new(InMemory::new());
    store.save("draft-1", json!({"a": 1})).await.unwrap();
    let manager = SyncManager::new(
        store.clone(),
        Arc::new(HttpRemote::new(&url).unwrap()),
        SyncConfig::default(),
    );

    let err = manager.sync().await.unwrap_err();
    assert_eq!(
        match &err {
            Error::Sync(sync_err) => sync_err.status(),
            _ => None,
        },
        Some(503)
    );
    assert_eq!(store.get_sync_queue().await.unwrap().len(), 1);

    let report = manager.sync().await.unwrap();
    assert_eq!(report.pushed, 1);
    assert!(store.get_sync_queue().await.unwrap().is_empty());

    let first = requests.recv().await.unwrap();
    let second = requests.recv().await.unwrap();
    assert_eq!(first.body, second.body);
    server.await.unwrap();
}
