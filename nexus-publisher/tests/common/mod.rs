//! Common test utilities and helpers
//!
//! Provides JAR fixtures, a stub Nexus server that records the uploads it
//! receives, and a ready-to-use API test server.

#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::put,
    Router,
};
use axum_test::TestServer;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use zip::write::SimpleFileOptions;

use nexus_publisher::{build_router, create_state, Config};

pub const WIDGET_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.acme</groupId>
  <artifactId>widget</artifactId>
  <version>1.0.0</version>
</project>
"#;

/// Build a JAR-shaped zip archive with the given entries, in order.
pub fn build_jar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A JAR with a manifest, one class and the given pom.xml.
pub fn jar_with_pom(pom: &str) -> Vec<u8> {
    build_jar(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
        ("com/acme/Widget.class", b"\xCA\xFE\xBA\xBE"),
        ("META-INF/maven/com.acme/widget/pom.xml", pom.as_bytes()),
    ])
}

/// How the stub answers upload requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    AcceptAll,
    RejectArtifact,
    RejectDescriptor,
}

/// One PUT request seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: String,
    pub content_type: Option<String>,
    pub authorized: bool,
    pub body: Vec<u8>,
    pub status: u16,
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

/// Minimal stand-in for a Nexus hosted repository.
pub struct StubNexus {
    pub base_url: String,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubNexus {
    pub async fn start(behavior: StubBehavior) -> Result<Self> {
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behavior,
            uploads: uploads.clone(),
        };
        let app = Router::new()
            .route("/repository/{*path}", put(stub_put))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    rx.await.ok();
                })
                .await
                .ok();
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            uploads,
            shutdown: Some(tx),
        })
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Drop for StubNexus {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn stub_put(
    State(stub): State<StubState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let (status, reply) = match stub.behavior {
        StubBehavior::RejectArtifact if path.ends_with(".jar") => {
            (StatusCode::UNAUTHORIZED, String::new())
        }
        StubBehavior::RejectDescriptor if path.ends_with(".pom") => (
            StatusCode::BAD_REQUEST,
            r#"{"errors":[{"id":"*","message":"Repository does not allow updating assets"}]}"#
                .to_string(),
        ),
        _ => (StatusCode::OK, String::new()),
    };

    stub.uploads.lock().unwrap().push(RecordedUpload {
        path: format!("/repository/{path}"),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        authorized: headers.contains_key(header::AUTHORIZATION),
        body: body.to_vec(),
        status: status.as_u16(),
    });

    (status, reply)
}

/// API test server plus the directory its static files point at.
pub struct TestSetup {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

/// Creates an API test server backed by the real outbound client.
pub fn create_test_setup() -> Result<TestSetup> {
    let temp_dir = TempDir::new()?;
    let mut config = Config::default();
    config.static_files.dir = temp_dir.path().join("public");

    let state = create_state(config)?;
    let server = TestServer::new(build_router(state))?;
    Ok(TestSetup { server, temp_dir })
}

/// Port on localhost with nothing listening on it.
pub async fn unused_local_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
