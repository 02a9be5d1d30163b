//! Integration tests for page watching and downloading
//!
//! These tests use wiremock to serve a page and its images, then drive a
//! session end-to-end: scan, gate, bulk download into a temp directory.

use image_gleaner::config::Config;
use image_gleaner::download::HttpDownloadProvider;
use image_gleaner::notify::BannerBoard;
use image_gleaner::overlay::BulkState;
use image_gleaner::page::{build_http_client, open_source};
use image_gleaner::session::{HostCapabilities, ScanOutcome, Session};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_PATH: &str = "/board/thread/1";

/// Creates a test configuration saving into `output_dir`
fn create_test_config(output_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.output_dir = output_dir.path().display().to_string();
    config.download.stagger = 10;
    config.notifications.command = Some(String::new());
    config
}

/// Builds a session that downloads over HTTP and notifies through `banners`
fn create_session(server: &MockServer, config: &Config, banners: &BannerBoard) -> Session {
    let client = build_http_client(&config.user_agent).expect("Failed to build client");
    let source = open_source(&format!("{}{}", server.uri(), PAGE_PATH), &client)
        .expect("Failed to open page source");

    let capabilities = HostCapabilities {
        native_notifications: None,
        privileged_downloads: Some(Arc::new(HttpDownloadProvider::new(
            client.clone(),
            &config.download.output_dir,
        ))),
        command_menu: false,
    };

    Session::from_config(source, config, &capabilities, &client, banners.clone())
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Thread</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, image_path: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

fn banner_messages(banners: &BannerBoard) -> Vec<String> {
    banners.banners().into_iter().map(|b| b.message).collect()
}

#[tokio::test]
async fn test_bulk_download_saves_every_image() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        r#"<a class="fileThumb" href="/img/a.png"><img src="/thumb/a.jpg"></a>
           <a href="/img/a.png">a.png</a>
           <a href="/img/b%20c.jpg">b c.jpg</a>
           <a href="/board/thread/2">next thread</a>"#,
    )
    .await;
    mount_image(&server, "/img/a.png", b"png-bytes").await;
    mount_image(&server, "/img/b%20c.jpg", b"jpg-bytes").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = create_session(&server, &config, &banners);

    match session.scan_cycle().await {
        ScanOutcome::Scanned { candidates, added, .. } => {
            assert_eq!(candidates.len(), 2);
            assert_eq!(added, 2);
        }
        other => panic!("Expected a scan, got {:?}", other),
    }
    assert_eq!(session.overlay().bulk().label(), "Bulk Download (2)");

    let report = session
        .activate_bulk()
        .await
        .expect("Bulk download should start")
        .wait()
        .await
        .expect("Batch should report");

    assert_eq!(report.total, 2);
    assert!(!report.had_failure());
    assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"png-bytes");
    assert_eq!(std::fs::read(dir.path().join("b c.jpg")).unwrap(), b"jpg-bytes");

    assert_eq!(
        banner_messages(&banners),
        vec![
            "Starting download of 2 images...".to_string(),
            "All 2 images downloaded successfully!".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_image_degrades_report() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        r#"<a href="/img/1.png">1</a><a href="/img/missing.png">2</a><a href="/img/3.png">3</a>"#,
    )
    .await;
    mount_image(&server, "/img/1.png", b"one").await;
    mount_image(&server, "/img/3.png", b"three").await;
    Mock::given(method("GET"))
        .and(path("/img/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = create_session(&server, &config, &banners);

    let report = session.activate_bulk().await.unwrap().wait().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded(), 2);
    assert!(!dir.path().join("missing.png").exists());
    assert_eq!(
        banner_messages(&banners).last().map(String::as_str),
        Some("Download completed with some errors")
    );
}

#[tokio::test]
async fn test_bulk_recomputes_at_click_time() {
    let server = MockServer::start().await;

    // First load shows one image, later loads show two
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(html_page(r#"<a href="/img/1.png">1</a>"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, r#"<a href="/img/1.png">1</a><a href="/img/2.png">2</a>"#).await;
    mount_image(&server, "/img/1.png", b"one").await;
    mount_image(&server, "/img/2.png", b"two").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = create_session(&server, &config, &banners);

    session.scan_cycle().await;
    assert_eq!(session.overlay().bulk().count, 1);

    let handle = session.activate_bulk().await.unwrap();
    assert_eq!(handle.total(), 2);
    assert_eq!(session.overlay().bulk().count, 2);

    let report = handle.wait().await.unwrap();
    assert!(!report.had_failure());
    assert!(dir.path().join("2.png").exists());
}

#[tokio::test]
async fn test_domain_gate_hides_bulk_control() {
    let server = MockServer::start().await;
    mount_page(&server, r#"<a href="/img/1.png">1</a>"#).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.scanner.allowed_domains = vec!["example.com".to_string()];
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = create_session(&server, &config, &banners);

    assert!(matches!(session.scan_cycle().await, ScanOutcome::Disallowed));
    assert_eq!(session.overlay().bulk().state, BulkState::Hidden);
    assert!(session.overlay().link_controls().is_empty());

    assert!(session.activate_bulk().await.is_none());
    assert!(banners.is_empty());
}

#[tokio::test]
async fn test_existing_files_are_kept() {
    let server = MockServer::start().await;
    mount_page(&server, r#"<a href="/img/cat.png">cat</a>"#).await;
    mount_image(&server, "/img/cat.png", b"new cat").await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cat.png"), b"old cat").unwrap();
    let config = create_test_config(&dir);
    let banners = BannerBoard::new(Duration::from_secs(5));
    let session = {
        let mut session = create_session(&server, &config, &banners);
        session.scan_cycle().await;
        session
    };

    let outcome = session.activate_link(0).unwrap().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"old cat");
    assert_eq!(
        std::fs::read(dir.path().join("cat (1).png")).unwrap(),
        b"new cat"
    );
    assert_eq!(
        banner_messages(&banners),
        vec!["All 1 images downloaded successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_non_html_page_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"\x89PNG".to_vec(), "image/png"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = create_session(&server, &config, &banners);

    assert!(matches!(session.scan_cycle().await, ScanOutcome::Unavailable));
    assert_eq!(session.overlay().bulk().state, BulkState::Hidden);
}

#[tokio::test]
async fn test_local_page_images_are_copied() {
    let page_dir = TempDir::new().unwrap();
    std::fs::write(
        page_dir.path().join("page.html"),
        r#"<html><body><a href="cat.png">cat</a><a href="img/dog%20run.gif">dog</a></body></html>"#,
    )
    .unwrap();
    std::fs::write(page_dir.path().join("cat.png"), b"cat bytes").unwrap();
    std::fs::create_dir(page_dir.path().join("img")).unwrap();
    std::fs::write(page_dir.path().join("img").join("dog run.gif"), b"dog bytes").unwrap();

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let client = build_http_client(&config.user_agent).unwrap();
    let source = open_source(&page_dir.path().join("page.html").display().to_string(), &client)
        .expect("Failed to open local page");
    let capabilities = HostCapabilities {
        native_notifications: None,
        privileged_downloads: Some(Arc::new(HttpDownloadProvider::new(
            client.clone(),
            &config.download.output_dir,
        ))),
        command_menu: false,
    };
    let banners = BannerBoard::new(Duration::from_secs(5));
    let mut session = Session::from_config(source, &config, &capabilities, &client, banners);

    let report = session.activate_bulk().await.unwrap().wait().await.unwrap();

    assert!(!report.had_failure());
    assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"cat bytes");
    assert_eq!(std::fs::read(dir.path().join("dog run.gif")).unwrap(), b"dog bytes");
}
