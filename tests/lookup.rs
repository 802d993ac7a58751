use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use ipgeo::directory::{connector_for, DirectoryError, FixtureConnector, HttpConnector, ReturnCode};
use ipgeo::geo::{ApplyOutcome, ConnectionManager, ErrorCode, LookupAdapter};
use ipgeo::settings::ConfigManager;

fn properties() -> HashMap<String, String> {
    [
        ("connection_pool_size", "10"),
        ("client_timeout_ms", "500"),
        ("primary_server_ip", "127.0.0.1"),
        ("primary_server_port", "7000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn fixture() -> FixtureConnector {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/directory.json");
    FixtureConnector::from_json_file(&path).unwrap()
}

async fn connected(fixture: &FixtureConnector) -> LookupAdapter {
    let adapter = LookupAdapter::new(ConnectionManager::new(Arc::new(fixture.clone())));
    assert!(adapter.configuration_changed(&properties()).await.is_connected());
    adapter
}

#[tokio::test]
async fn resolves_a_confident_city_record() {
    let adapter = connected(&fixture()).await;

    let result = adapter.lookup("68.184.77.220").await.unwrap();

    assert_eq!(result.city_name(), Some("montgomery"));
    assert_eq!(result.state_name(), Some("al"));
    assert_eq!(result.country_code(), Some("US"));
    assert_eq!(result.zip_code(), Some("36107"));
    assert_eq!(result.info_source(), 'Q');
    assert_eq!(result.gmt_offset(), Some(-6.0));
    assert_eq!(result.source_address(), "68.184.77.220");
    assert_eq!(result.latitude(), Some(32.38316));
    assert_eq!(result.longitude(), Some(-86.28197));
    assert_eq!(result.market_code(), 698);
}

#[tokio::test]
async fn resolves_a_second_city_record() {
    let adapter = connected(&fixture()).await;

    let result = adapter.lookup("192.172.150.56").await.unwrap();

    assert_eq!(result.city_name(), Some("columbus"));
    assert_eq!(result.state_name(), Some("oh"));
    assert_eq!(result.zip_code(), Some("43218"));
    assert_eq!(result.gmt_offset(), Some(-5.0));
    assert_eq!(result.market_code(), 535);
}

#[tokio::test]
async fn address_without_geo_data_resolves_empty() {
    let adapter = connected(&fixture()).await;

    let result = adapter.lookup("172.17.29.112").await.unwrap();

    assert_eq!(result.city_name(), None);
    assert_eq!(result.state_name(), None);
    assert_eq!(result.country_code(), None);
    assert_eq!(result.zip_code(), None);
    assert_eq!(result.market_code(), 0);
}

#[tokio::test]
async fn repeated_lookups_are_identical() {
    let adapter = connected(&fixture()).await;

    let first = adapter.lookup("68.184.77.220").await.unwrap();
    let second = adapter.lookup("68.184.77.220").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn raised_threshold_hides_locality_of_every_record() {
    let adapter = LookupAdapter::new(ConnectionManager::new(Arc::new(fixture())));
    let mut props = properties();
    props.insert("city_confidence_threshold".into(), "75".into());
    adapter.configuration_changed(&props).await;

    let montgomery = adapter.lookup("68.184.77.220").await.unwrap();
    let columbus = adapter.lookup("192.172.150.56").await.unwrap();

    assert!(montgomery.locality().is_some());
    assert_eq!(columbus.city_name(), None);
    assert_eq!(columbus.state_name(), None);
    assert_eq!(columbus.zip_code(), None);
    assert_eq!(columbus.country_code(), Some("US"));
}

#[tokio::test]
async fn empty_address_never_reaches_the_directory() {
    let fixture = fixture();
    let adapter = connected(&fixture).await;

    let err = adapter.lookup("").await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(fixture.query_count(), 0);
}

#[tokio::test]
async fn malformed_address_is_rejected_without_dropping_the_connection() {
    let adapter = connected(&fixture()).await;

    let err = adapter.lookup("1.2.a.3").await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::ServerNotAvailable);
    assert!(adapter.connections().current_connection().is_some());
    assert!(adapter.lookup("68.184.77.220").await.is_ok());
}

#[tokio::test]
async fn unusable_server_host_keeps_the_previous_connection() {
    let adapter = LookupAdapter::new(ConnectionManager::new(Arc::new(HttpConnector)));
    assert!(adapter.configuration_changed(&properties()).await.is_connected());
    let before = adapter.connections().current_connection().unwrap();

    let mut props = properties();
    props.insert("primary_server_ip".into(), "bad host".into());
    let outcome = adapter.configuration_changed(&props).await;

    assert!(matches!(outcome, ApplyOutcome::ConnectFailed(_)));
    let current = adapter.connections().current_connection().unwrap();
    assert_eq!(current.id(), before.id());
    assert!(!current.is_closed());

    props.insert("primary_server_ip".into(), "::1".into());
    assert!(adapter.configuration_changed(&props).await.is_connected());
    assert!(before.is_closed());
}

#[tokio::test]
async fn broken_link_fails_fast_until_reconfigured() {
    let fixture = fixture();
    let adapter = connected(&fixture).await;

    fixture.fail_queries_with(Some(DirectoryError::provider(
        ReturnCode::ServerUnavailable,
        "connection reset",
    )));
    assert_eq!(
        adapter.lookup("68.184.77.220").await.unwrap_err().code(),
        ErrorCode::ServerNotAvailable
    );
    fixture.fail_queries_with(None);

    let queries = fixture.query_count();
    assert_eq!(
        adapter.lookup("68.184.77.220").await.unwrap_err().code(),
        ErrorCode::ServerNotAvailable
    );
    assert_eq!(fixture.query_count(), queries);

    adapter.configuration_changed(&properties()).await;
    assert!(adapter.lookup("68.184.77.220").await.is_ok());
}

#[tokio::test]
async fn incomplete_reload_keeps_the_old_connection_usable() {
    let adapter = connected(&fixture()).await;

    let mut props = properties();
    props.remove("primary_server_ip");
    let outcome = adapter.configuration_changed(&props).await;

    assert!(matches!(outcome, ApplyOutcome::Rejected(_)));
    assert!(adapter.lookup("68.184.77.220").await.is_ok());
}

#[tokio::test]
async fn concurrent_lookups_share_one_connection() {
    let fixture = fixture();
    let adapter = Arc::new(connected(&fixture).await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let adapter = Arc::clone(&adapter);
            let address = if i % 2 == 0 { "68.184.77.220" } else { "172.17.29.112" };
            tokio::spawn(async move { adapter.lookup(address).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.city_name().is_some(), result.zip_code().is_some());
        assert_eq!(result.city_name().is_some(), result.state_name().is_some());
    }
    assert_eq!(fixture.connect_count(), 1);
    assert_eq!(fixture.query_count(), 16);
}

#[tokio::test]
async fn unknown_adapter_type_is_reported() {
    let err = connector_for("carrier-pigeon", None).err().unwrap();
    assert_eq!(err.code(), ErrorCode::InvalidServerAdapterType);
}

fn settings_file(port: u16) -> String {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/directory.json");
    format!(
        "[log]\nlevel = \"info\"\n\
         [directory]\nadapter = \"fixture\"\nfixture_path = {:?}\n\
         [directory.properties]\n\
         connection_pool_size = \"4\"\nclient_timeout_ms = \"500\"\n\
         primary_server_ip = \"127.0.0.1\"\nprimary_server_port = \"{}\"\n",
        fixture_path.to_string_lossy(),
        port
    )
}

#[tokio::test]
async fn settings_reload_reconfigures_the_adapter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, settings_file(7000)).unwrap();

    let config = ConfigManager::from_path(path.clone()).await.unwrap();
    let directory = config.get_directory().await;
    let connector = connector_for(&directory.adapter, directory.fixture_path.as_deref()).unwrap();
    let adapter = LookupAdapter::new(ConnectionManager::new(connector));
    assert!(adapter.configuration_changed(&directory.properties).await.is_connected());
    let before = adapter.connections().current_connection().unwrap();

    std::fs::write(&path, settings_file(7001)).unwrap();
    let properties = config.reload().await.unwrap();
    assert!(adapter.configuration_changed(&properties).await.is_connected());

    let current = adapter.connections().current_connection().unwrap();
    assert_eq!(current.params().primary.port, 7001);
    assert!(before.is_closed());
    assert_eq!(
        adapter.lookup("68.184.77.220").await.unwrap().city_name(),
        Some("montgomery")
    );
}
