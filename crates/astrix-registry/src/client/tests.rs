//! Unit tests for registry client

use super::*;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client pointed at a mock server, retrying quickly
fn mock_client(server: &MockServer) -> RegistryClient {
    let mut client = RegistryClient::new().unwrap();
    client.base_url = server.uri();
    client.retry_config = RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    };
    client
}

#[tokio::test]
async fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.base_url(), DEFAULT_INDEX_URL);
    assert_eq!(client.retry_config.max_retries, 3);
}

#[tokio::test]
async fn test_registry_client_with_auth() {
    let auth = AuthConfig {
        token: Some("test-token".to_string()),
        ..AuthConfig::default()
    };

    let client = RegistryClient::with_auth(auth).unwrap();
    assert_eq!(client.base_url(), DEFAULT_INDEX_URL);
}

#[tokio::test]
async fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
}

#[test]
fn test_metadata_url() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(
        client.metadata_url("flask", None).unwrap().as_str(),
        "https://pypi.org/pypi/flask/json"
    );
    assert_eq!(
        client.metadata_url("flask", Some("2.0.1")).unwrap().as_str(),
        "https://pypi.org/pypi/flask/2.0.1/json"
    );
}

#[test]
fn test_metadata_url_with_trailing_slash() {
    let mut client = RegistryClient::new().unwrap();
    client.base_url = "https://mirror.example.com/pypi/".to_string();
    assert_eq!(
        client.metadata_url("zope.interface", None).unwrap().as_str(),
        "https://mirror.example.com/pypi/zope.interface/json"
    );
}

#[test]
fn test_basic_auth_header() {
    let header = authorization_header(AuthConfig {
        token: None,
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
    })
    .unwrap()
    .unwrap();
    assert_eq!(header.to_str().unwrap(), "Basic dXNlcjpwYXNz");
    assert!(header.is_sensitive());

    assert!(authorization_header(AuthConfig::default()).unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_requirements_success() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "info": {
            "name": "requests",
            "version": "2.31.0",
            "summary": "Python HTTP for Humans.",
            "requires_dist": [
                "charset-normalizer<4,>=2",
                "idna<4,>=2.5",
                "urllib3 (<3,>=1.21.1)",
                "certifi>=2017.4.17",
                "PySocks!=1.5.7,>=1.5.6; extra == \"socks\""
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/requests/json"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let requirements = client.fetch_requirements("requests", None).await.unwrap();

    assert_eq!(requirements.len(), 5);
    assert_eq!(requirements[0].name, "charset-normalizer");
    assert_eq!(requirements[0].specifier.as_deref(), Some("<4,>=2"));
    assert_eq!(requirements[2].name, "urllib3");
    assert_eq!(requirements[2].specifier.as_deref(), Some("<3,>=1.21.1"));
    assert_eq!(requirements[4].name, "PySocks");
    assert_eq!(requirements[4].specifier.as_deref(), Some("!=1.5.7,>=1.5.6"));
}

#[tokio::test]
async fn test_fetch_requirements_pinned_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flask/2.0.1/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": { "requires_dist": ["Werkzeug>=2.0", "click>=7.1.2"] }
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let requirements = client
        .fetch_requirements("flask", Some("2.0.1"))
        .await
        .unwrap();
    assert_eq!(requirements.len(), 2);
    assert_eq!(requirements[0].name, "Werkzeug");
}

#[tokio::test]
async fn test_fetch_requirements_null_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/six/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": { "name": "six", "requires_dist": null }
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let requirements = client.fetch_requirements("six", None).await.unwrap();
    assert!(requirements.is_empty());
}

#[tokio::test]
async fn test_fetch_requirements_skips_unparseable_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/odd/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": { "requires_dist": [">=1.0", "attrs"] }
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let requirements = client.fetch_requirements("odd", None).await.unwrap();
    assert_eq!(requirements, vec![Requirement::new("attrs", None)]);
}

#[tokio::test]
async fn test_fetch_metadata_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nonexistent-package/json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let result = client.fetch_metadata("nonexistent-package", None).await;

    match result.unwrap_err() {
        AstrixError::PackageNotFound { name } => {
            assert_eq!(name, "nonexistent-package");
        },
        other => panic!("Expected PackageNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky/json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let result = client.fetch_requirements("flaky", None).await;

    assert!(matches!(
        result,
        Err(AstrixError::RegistryUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let result = client.fetch_requirements("broken", None).await;
    assert!(matches!(
        result,
        Err(AstrixError::RegistryUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_registry() {
    let mock_server = MockServer::start().await;
    let mut client = mock_client(&mock_server);
    client.retry_config.max_retries = 0;
    // Nothing listens on the port once the server is gone
    drop(mock_server);

    let result = client.fetch_requirements("flask", None).await;
    assert!(matches!(
        result,
        Err(AstrixError::RegistryUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_fetch_project_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/requests/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": {
                "name": "requests",
                "summary": "Python HTTP for Humans.",
                "project_urls": {
                    "Documentation": "https://requests.readthedocs.io",
                    "Source": "https://github.com/psf/requests"
                },
                "requires_dist": null
            }
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let details = client.fetch_project("requests").await.unwrap();
    assert_eq!(details.summary.as_deref(), Some("Python HTTP for Humans."));
    assert_eq!(
        details.repository.as_deref(),
        Some("https://github.com/psf/requests")
    );
}
