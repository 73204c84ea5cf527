//! Integration tests for Booklisting
//!
//! These tests run the whole fetch-parse-bind pipeline against a local mock
//! of the Google Books volumes endpoint.

use booklisting::config::{ApiConfig, Config};
use booklisting::models::{BookRecord, ResultState, SearchQuery};
use booklisting::sources::{BookSource, MalformedItemPolicy, SearchError};
use booklisting::utils::StaticConnectivity;
use booklisting::{GoogleBooksSource, SearchController};
use mockito::Matcher;
use std::sync::Arc;
use std::time::Duration;

const VOLUMES_PATH: &str = "/books/v1/volumes";

/// One good volume followed by one without a title
const MISSING_TITLE_BODY: &str =
    r#"{"items":[{"volumeInfo":{"title":"Good"}},{"volumeInfo":{"authors":["X"]}}]}"#;

fn config_for(server: &mockito::ServerGuard) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.url(), VOLUMES_PATH),
            ..ApiConfig::default()
        },
        ..Config::default()
    }
}

fn controller_for(config: &Config, online: bool) -> SearchController {
    SearchController::with_debounce(
        Arc::new(GoogleBooksSource::from_config(config).unwrap()),
        Arc::new(StaticConnectivity::new(online)),
        Duration::ZERO,
    )
}

/// The canonical example: "android" with a single untitled-author volume
#[tokio::test]
async fn test_android_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("maxResults".into(), "30".into()),
            Matcher::UrlEncoded("orderBy".into(), "newest".into()),
            Matcher::UrlEncoded("q".into(), "android".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"items":[{"volumeInfo":{"title":"Android Basics"}}]}"#)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("android");

    assert_eq!(
        controller.settled().await,
        ResultState::Loaded(vec![BookRecord::from_display(
            "Unknown Author",
            "Android Basics"
        )])
    );
    mock.assert_async().await;
}

/// A blank query searches for the default term instead
#[tokio::test]
async fn test_blank_query_uses_default_term() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::UrlEncoded("q".into(), "android".into()))
        .with_status(200)
        .with_body(r#"{"items":[{"volumeInfo":{"title":"Default","authors":["A"]}}]}"#)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("   ");

    assert!(matches!(controller.settled().await, ResultState::Loaded(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_multi_author_volumes_in_order() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"kind":"books#volumes","totalItems":3,"items":[
                {"volumeInfo":{"title":"One","authors":["A","B"]}},
                {"volumeInfo":{"title":"Two","authors":[]}},
                {"volumeInfo":{"title":"Three","authors":["C"]}}
            ]}"#,
        )
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("anything");

    let state = controller.settled().await;
    let rows: Vec<(&str, &str)> = state
        .books()
        .iter()
        .map(|b| (b.title(), b.author()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("One", "A, B"),
            ("Two", "Unknown Author"),
            ("Three", "C")
        ]
    );
}

#[tokio::test]
async fn test_missing_title_discards_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(MISSING_TITLE_BODY)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("x");
    assert_eq!(controller.settled().await, ResultState::Empty);
}

#[tokio::test]
async fn test_skip_item_policy_from_config() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(MISSING_TITLE_BODY)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.search.malformed_items = MalformedItemPolicy::SkipItem;

    let controller = controller_for(&config, true);
    controller.submit("x");
    assert_eq!(
        controller.settled().await,
        ResultState::Loaded(vec![BookRecord::new(Vec::<String>::new(), "Good")])
    );
}

#[tokio::test]
async fn test_no_matches_is_empty_state() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"kind":"books#volumes","totalItems":0}"#)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("qwertyuiop");

    let state = controller.settled().await;
    assert_eq!(state, ResultState::Empty);
    assert_eq!(state.message(), Some("No books found"));
}

#[tokio::test]
async fn test_server_error_is_request_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), true);
    controller.submit("android");
    assert!(matches!(
        controller.settled().await,
        ResultState::RequestError(_)
    ));
}

#[tokio::test]
async fn test_offline_never_hits_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items":[]}"#)
        .expect(0)
        .create_async()
        .await;

    let controller = controller_for(&config_for(&server), false);
    controller.submit("android");

    assert_eq!(controller.state(), ResultState::OfflineError);
    tokio::time::sleep(Duration::from_millis(50)).await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repeated_search_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", VOLUMES_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items":[{"volumeInfo":{"title":"Same","authors":["A"]}}]}"#)
        .expect(2)
        .create_async()
        .await;

    let source = GoogleBooksSource::from_config(&config_for(&server)).unwrap();
    let first = source.search(&SearchQuery::new("same")).await.unwrap();
    let second = source.search(&SearchQuery::new("same")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = Config {
        api: ApiConfig {
            base_url: format!("http://127.0.0.1:{}{}", port, VOLUMES_PATH),
            ..ApiConfig::default()
        },
        ..Config::default()
    };

    let source = GoogleBooksSource::from_config(&config).unwrap();
    let err = source.search(&SearchQuery::new("android")).await.unwrap_err();
    assert!(matches!(err, SearchError::Network(_)));
}
