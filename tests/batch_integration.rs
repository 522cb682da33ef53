//! End-to-end pipeline tests: landing page, title, plan and local transfer
//! against a mock publisher site.

use std::sync::Arc;

use paperfetch_core::{
    BatchDriver, BatchError, Endpoints, FailureKind, FailurePolicy, HttpClient, HttpLandingPages,
    TransferEngine, TransferMode,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.5\n%%EOF\n";

async fn mock_publisher() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/document/4764139"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Cambricon-P: A Bitflow Architecture | IEEE Conference Publication | IEEE Xplore</title></head></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stampPDF/getPDF.jsp"))
        .and(query_param("arnumber", "4764139"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(PDF_BYTES.to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doi/10.1145/3549555.3549587"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><h1 class="citation__title">Deep Features for CBIR</h1></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doi/pdf/10.1145/3549555.3549587"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(PDF_BYTES.to_vec()),
        )
        .mount(&server)
        .await;

    // Landing page without the ACM title heading.
    Mock::given(method("GET"))
        .and(path("/doi/10.1145/1111111.2222222"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>Access denied</p></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    server
}

fn driver(server: &MockServer, output_dir: &std::path::Path) -> BatchDriver {
    let engine = TransferEngine::new(TransferMode::Local, HttpClient::new().unwrap(), output_dir);
    BatchDriver::new(Arc::new(HttpLandingPages::new().unwrap()), engine)
        .with_endpoints(Endpoints::with_base_url(server.uri()))
}

#[tokio::test]
async fn test_batch_downloads_ieee_and_acm_papers() {
    let server = mock_publisher().await;
    let dir = TempDir::new().unwrap();

    let summary = driver(&server, dir.path())
        .run(
            "https://ieeexplore.ieee.org/document/4764139?casa_token=abc\n\n  https://dl.acm.org/doi/10.1145/3549555.3549587/  \n",
        )
        .await
        .unwrap();

    assert_eq!(summary.downloaded, 2);
    assert!(!summary.has_failures());
    assert_eq!(
        std::fs::read(dir.path().join("Cambricon-P:_A_Bitflow_Architecture.pdf")).unwrap(),
        PDF_BYTES
    );
    assert!(dir.path().join("Deep_Features_for_CBIR.pdf").exists());
}

#[tokio::test]
async fn test_second_run_skips_existing_papers() {
    let server = mock_publisher().await;
    let dir = TempDir::new().unwrap();
    let input = "4764139\n10.1145/3549555.3549587";

    driver(&server, dir.path()).run(input).await.unwrap();
    let summary = driver(&server, dir.path()).run(input).await.unwrap();

    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_stop_on_error_aborts_at_title_failure() {
    let server = mock_publisher().await;
    let dir = TempDir::new().unwrap();

    let err = driver(&server, dir.path())
        .run("10.1145/1111111.2222222\n4764139")
        .await
        .unwrap_err();

    let BatchError::Item { input, source } = err;
    assert_eq!(input, "10.1145/1111111.2222222");
    assert_eq!(source.kind(), FailureKind::TitleExtraction);
    assert!(!dir.path().join("Cambricon-P:_A_Bitflow_Architecture.pdf").exists());
}

#[tokio::test]
async fn test_keep_going_records_failures_and_continues() {
    let server = mock_publisher().await;
    let dir = TempDir::new().unwrap();

    let summary = driver(&server, dir.path())
        .with_policy(FailurePolicy::KeepGoing)
        .run("https://example.org/paper\n10.1145/1111111.2222222\n4764139\n999")
        .await
        .unwrap();

    assert_eq!(summary.downloaded, 1);
    let kinds: Vec<FailureKind> = summary.failures.iter().map(|f| f.error.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            FailureKind::Classification,
            FailureKind::TitleExtraction,
            FailureKind::LandingPage,
        ]
    );
}

#[tokio::test]
async fn test_dry_run_plans_without_transferring() {
    let server = mock_publisher().await;
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("not-yet-created");

    let summary = driver(&server, &output_dir)
        .with_remote_dir("/tmp/papers/")
        .with_dry_run(true)
        .run("10.1145/3549555.3549587")
        .await
        .unwrap();

    assert_eq!(summary.downloaded, 0);
    assert_eq!(summary.planned.len(), 1);
    let plan = &summary.planned[0];
    assert_eq!(
        plan.download_url(),
        format!("{}/doi/pdf/10.1145/3549555.3549587", server.uri())
    );
    assert_eq!(plan.remote_file_name(), "/tmp/papers/paper_10-1145-3549555-3549587.pdf");
    assert_eq!(plan.local_file_name(), output_dir.join("Deep_Features_for_CBIR.pdf"));
    assert!(!output_dir.exists());
}
