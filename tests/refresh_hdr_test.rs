//! HDR title suffix across a refresh of NFO-matched records.
//!
//! Uses a stand-in `ffprobe` script, so it lives in its own test binary and
//! never races other tests that spawn processes.

#![cfg(unix)]

mod common;

use common::{complete_movie, TestHarness};
use nfoforge::library::{JobKind, JobStatus};
use nfoforge::nfo::read_nfo;
use nfoforge_common::{StatusFilter, VideoCategory};
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An executable that prints an ffprobe report for one HDR10 stream.
fn hdr10_ffprobe(dir: &Path) -> PathBuf {
    let script = dir.join("ffprobe");
    std::fs::write(
        &script,
        "#!/bin/sh\necho '{\"streams\":[{\"codec_type\":\"video\",\"color_transfer\":\"smpte2084\"}]}'\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_refresh_keeps_hdr_title_suffix() {
    let server = MockServer::start().await;
    mount_json(&server, "/movie/1", json!({"id": 1, "title": "Heat"})).await;
    mount_json(&server, "/movie/1/credits", json!({"cast": [], "crew": []})).await;
    mount_json(
        &server,
        "/movie/1/images",
        json!({"posters": [], "backdrops": [], "logos": []}),
    )
    .await;

    let mut harness = TestHarness::with_provider(&server.uri());
    harness.config.tools.ffprobe_path = Some(hdr10_ffprobe(harness.dir.path()));
    let library = common::build_library(&harness.config);

    let video = complete_movie(&harness.movies(), "Heat");

    library.start_refresh(VideoCategory::Movie).unwrap();
    let snapshot = library.wait_idle(VideoCategory::Movie, JobKind::Refresh).await;

    assert_eq!(snapshot.status, JobStatus::Finished);
    assert_eq!(snapshot.summary.unwrap().succeeded, 1);

    let root = read_nfo(&video.with_extension("nfo")).unwrap();
    assert_eq!(root.child_text("title"), Some("Heat HDR10"));

    let list = library.list(VideoCategory::Movie, StatusFilter::All).unwrap();
    assert_eq!(list[0].hdr_type.label(), "HDR10");
}
