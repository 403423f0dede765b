use chrono::Utc;
use eurofx::core::SnapshotStore;
use eurofx::core::timezone::reference_dates;
use eurofx::ingest::Ingestor;
use eurofx::providers::EcbFeedClient;
use eurofx::report::{ApiRequest, Reporter};
use eurofx::store::disk::DiskSnapshotStore;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const NS: &str = "http://www.ecb.int/vocabulary/2002-08-01/eurofxref";

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn feed_document(date: &str, cubes: &[(&str, &str)]) -> String {
        let rates: String = cubes
            .iter()
            .map(|(currency, rate)| format!("<Cube currency='{currency}' rate='{rate}'/>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="{}">
  <gesmes:subject>Reference rates</gesmes:subject>
  <Cube><Cube time='{date}'>{rates}</Cube></Cube>
</gesmes:Envelope>"#,
            super::NS
        )
    }

    pub async fn create_feed_mock_server(body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/eurofxref-daily.xml"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn feed_client(server: &wiremock::MockServer) -> EcbFeedClient {
    EcbFeedClient::new(&format!("{}/eurofxref-daily.xml", server.uri()))
        .with_backoff(Duration::from_millis(10))
}

#[test_log::test(tokio::test)]
async fn test_ingest_then_report_against_disk_store() {
    let (today, yesterday) = reference_dates(Utc::now());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DiskSnapshotStore::open(dir.path(), "exchange_rates").unwrap());

    // Yesterday's run
    let server = test_utils::create_feed_mock_server(
        &test_utils::feed_document(
            &yesterday.to_string(),
            &[("USD", "1.0866"), ("JPY", "169.12"), ("GBP", "0.8554")],
        ),
        200,
    )
    .await;
    Ingestor::new(&feed_client(&server), store.as_ref(), NS)
        .run()
        .await
        .unwrap();

    // Today's run, GBP missing from the feed
    let server = test_utils::create_feed_mock_server(
        &test_utils::feed_document(&today.to_string(), &[("USD", "1.0897"), ("JPY", "169.12")]),
        200,
    )
    .await;
    let snapshot = Ingestor::new(&feed_client(&server), store.as_ref(), NS)
        .run()
        .await
        .unwrap();
    info!(?snapshot, "Ingested today's snapshot");

    let reporter = Reporter::new(store.clone());
    let response = reporter.handle(&ApiRequest::new("GET")).await;
    assert_eq!(response.status_code, 200);

    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["current_date"], today.to_string());
    assert_eq!(body["previous_date"], yesterday.to_string());

    let rates = body["exchange_rates"].as_object().unwrap();
    assert_eq!(rates.len(), 2);
    assert!(!rates.contains_key("GBP"));
    assert_eq!(rates["USD"]["current_rate"], 1.0897);
    assert_eq!(rates["USD"]["previous_rate"], 1.0866);
    assert_eq!(rates["USD"]["status"], "high");
    assert_eq!(rates["JPY"]["status"], "equal");
}

#[test_log::test(tokio::test)]
async fn test_retry_exhaustion_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = DiskSnapshotStore::open(dir.path(), "exchange_rates").unwrap();

    // Nothing listens on a released port
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let feed = EcbFeedClient::new(&format!("http://127.0.0.1:{port}/eurofxref-daily.xml"))
        .with_backoff(Duration::from_millis(10));

    let err = Ingestor::new(&feed, &store, NS)
        .handle_event(&serde_json::json!({"detail-type": "Scheduled Event"}))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "fetch");
    assert!(err.to_string().contains("after 3 attempts"));
    assert!(store.dates().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_reingesting_same_document_keeps_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = DiskSnapshotStore::open(dir.path(), "exchange_rates").unwrap();
    let server = test_utils::create_feed_mock_server(
        &test_utils::feed_document("2024-05-17", &[("USD", "1.0897")]),
        200,
    )
    .await;
    let feed = feed_client(&server);
    let ingestor = Ingestor::new(&feed, &store, NS);
    let now = Utc::now();

    let first = ingestor.run_at(now).await.unwrap();
    let second = ingestor.run_at(now).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.dates().await.unwrap(), vec![first.date]);
    let stored = store.get(first.date).await.unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.rate("USD").unwrap().to_string(), "1.0897");
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let (today, _) = reference_dates(Utc::now());
    let server = test_utils::create_feed_mock_server(
        &test_utils::feed_document(&today.to_string(), &[("USD", "1.0897"), ("CHF", "0.9875")]),
        200,
    )
    .await;

    let data_dir = tempfile::tempdir().unwrap();
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
feed:
  url: "{}/eurofxref-daily.xml"
  namespace: "{NS}"
store:
  table: "exchange_rates"
  data_path: "{}"
"#,
        server.uri(),
        data_dir.path().display()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");
    let config_path = config_path.to_str().unwrap();

    for command in [
        eurofx::AppCommand::Ingest { event: None },
        eurofx::AppCommand::Report { json: false },
        eurofx::AppCommand::Report { json: true },
        eurofx::AppCommand::Show {
            date: today.to_string(),
        },
        eurofx::AppCommand::History,
    ] {
        let result = eurofx::run_command(command, Some(config_path)).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }

    let err = eurofx::run_command(
        eurofx::AppCommand::Show {
            date: "yesterday".to_string(),
        },
        Some(config_path),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("expected YYYY-MM-DD"));
}
