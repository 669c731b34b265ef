use fwgetter_config::FirmwareConfig;
use fwgetter_provider::{GitHubReleaseProvider, ProviderError, ReleaseProvider, ReleaseRecord};
use mockito::{Matcher, Server};
use std::fs;

const CACHE_KEY: &str = "github_releases_omi";

#[tokio::test]
async fn test_get_releases() {
    let body = fs::read_to_string("tests/web/github_api_release.json").unwrap();
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/BasedHardware/omi/releases")
        .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let provider = GitHubReleaseProvider::new(FirmwareConfig::new().with_api_url(server.url()));
    let releases = provider.fetch(CACHE_KEY).await.unwrap();

    assert_eq!(releases.len(), 7);

    let draft = &releases[0];
    assert!(draft.draft);
    assert!(draft.published_at.is_none());

    let cv1 = &releases[1];
    assert_eq!(cv1.id, Some(160000009));
    assert_eq!(cv1.tag_name.as_deref(), Some("Omi_CV1_v2.0.9"));
    assert_eq!(cv1.published_at.as_deref(), Some("2024-06-10T08:30:00Z"));
    assert_eq!(cv1.assets.len(), 2);
    assert_eq!(cv1.assets[1].file_name.as_deref(), Some("omi_cv1_OTA.zip"));
    assert!(cv1.body.as_deref().unwrap().contains("KEY_VALUE_START"));
}

#[tokio::test]
async fn test_get_releases_with_token() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/acme/firmware/releases")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer test_token")
        .match_header("user-agent", "fwgetter")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let config = FirmwareConfig::new()
        .with_api_url(server.url())
        .with_repository("acme", "firmware")
        .with_token("test_token");
    let provider = GitHubReleaseProvider::new(config);

    let releases = provider.fetch(CACHE_KEY).await.unwrap();
    assert!(releases.is_empty());
}

#[tokio::test]
async fn test_cache_keys_are_independent() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/repos/BasedHardware/omi/releases")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .expect(2)
        .create_async()
        .await;

    let provider = GitHubReleaseProvider::new(FirmwareConfig::new().with_api_url(server.url()));
    provider.fetch("first").await.unwrap();
    provider.fetch("second").await.unwrap();
    provider.fetch("first").await.unwrap();
    m.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/BasedHardware/omi/releases")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let provider = GitHubReleaseProvider::new(FirmwareConfig::new().with_api_url(server.url()));
    let err = provider.fetch(CACHE_KEY).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 502 }));
    assert_eq!(err.to_string(), "upstream returned status 502");
}

#[tokio::test]
async fn test_cached_listing_roundtrips() {
    let body = fs::read_to_string("tests/web/github_api_release.json").unwrap();
    let expected: Vec<ReleaseRecord> = serde_json::from_str(&body).unwrap();

    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/BasedHardware/omi/releases")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let provider = GitHubReleaseProvider::new(FirmwareConfig::new().with_api_url(server.url()));
    let fetched = provider.fetch(CACHE_KEY).await.unwrap();
    let cached = provider.fetch(CACHE_KEY).await.unwrap();
    assert_eq!(fetched, expected);
    assert_eq!(cached, expected);
}
