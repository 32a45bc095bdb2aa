use super::*;
use crate::config::{Config, SortKey, SortOrder};
use crate::error::Error;
use chrono::TimeZone;
use serde_json::json;
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GithubClient {
    let mut config = Config::new("test-token", "rust");
    config.api_base = Url::parse(&server.uri()).unwrap();
    GithubClient::new(&config).unwrap()
}

fn repo_json(name: &str, stars: u64) -> serde_json::Value {
    json!({
        "full_name": format!("owner/{name}"),
        "html_url": format!("https://github.com/owner/{name}"),
        "stargazers_count": stars,
        "forks_count": 7,
        "open_issues_count": 4,
        "description": format!("description of {name}"),
        "archived": false,
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-05-01T12:30:00Z",
        "pushed_at": "2024-06-15T08:00:00Z"
    })
}

fn search_body(items: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items
    })
}

/// Mounts a one-page search result plus a contributors endpoint per
/// repository answering the given count via the page body length
/// (0 or 1 contributor) or a Link header.
async fn mount_search(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(items)))
        .mount(server)
        .await;
}

async fn mount_contributors(server: &MockServer, name: &str, count: u64) {
    let repo_path = format!("/repos/owner/{name}/contributors");
    let response = if count == 0 {
        ResponseTemplate::new(204)
    } else {
        let link = format!(
            "<{0}{1}?per_page=1&anon=false&page={2}>; rel=\"last\"",
            server.uri(),
            repo_path,
            count
        );
        ResponseTemplate::new(200)
            .insert_header("Link", link.as_str())
            .set_body_json(json!([{"login": "alice", "contributions": 1}]))
    };
    Mock::given(method("GET"))
        .and(path(repo_path))
        .respond_with(response)
        .mount(server)
        .await;
}

fn sample_metadata() -> RepoMetadata {
    RepoMetadata {
        full_name: "owner/sample".to_string(),
        html_url: "https://github.com/owner/sample".to_string(),
        stargazers_count: 42,
        forks_count: 7,
        collaborators: 3,
        open_issues_count: 1,
        description: Some("a sample repository".to_string()),
        archived: false,
        created_at: chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        updated_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        pushed_at: Some(chrono::Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()),
    }
}

// Schema Tests

#[test]
fn test_header_matches_row_shape() {
    // serialize() with headers enabled derives the header from the
    // struct's field names in declaration order; it must equal the
    // declared CSV_HEADER exactly.
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.serialize(sample_metadata()).unwrap();
    let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let header = data.lines().next().unwrap();
    assert_eq!(header, CSV_HEADER.join(","));
}

#[test]
fn test_row_round_trips_through_csv() {
    let original = sample_metadata();

    let mut writer = csv::Writer::from_writer(vec![]);
    writer.serialize(&original).unwrap();
    let data = writer.into_inner().unwrap();

    let mut reader = csv::Reader::from_reader(data.as_slice());
    let parsed: RepoMetadata = reader.deserialize().next().unwrap().unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_description_with_delimiters_is_quoted() {
    let mut row = sample_metadata();
    row.description = Some("has, commas and \"quotes\"\nand a newline".to_string());

    let mut writer = csv::Writer::from_writer(vec![]);
    writer.serialize(&row).unwrap();
    let data = writer.into_inner().unwrap();

    let mut reader = csv::Reader::from_reader(data.as_slice());
    let parsed: RepoMetadata = reader.deserialize().next().unwrap().unwrap();
    assert_eq!(parsed.description, row.description);
}

#[test]
fn test_missing_description_serializes_as_empty_field() {
    let mut row = sample_metadata();
    row.description = None;
    row.pushed_at = None;

    let mut writer = csv::Writer::from_writer(vec![]);
    writer.serialize(&row).unwrap();
    let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(record.get(6), Some(""));
    assert_eq!(record.get(10), Some(""));
    assert!(!data.contains("null"));
}

// Export Pipeline Tests

#[tokio::test]
async fn test_export_writes_header_and_all_rows() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        vec![
            repo_json("repo-1", 300),
            repo_json("repo-2", 200),
            repo_json("repo-3", 100),
        ],
    )
    .await;
    mount_contributors(&server, "repo-1", 11).await;
    mount_contributors(&server, "repo-2", 5).await;
    mount_contributors(&server, "repo-3", 0).await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    // A limit above the available total exports everything.
    let written = export_csv(&client, &mut results, 10, &path).await.unwrap();
    assert_eq!(written, 3);

    let data = std::fs::read_to_string(&path).unwrap();
    assert_eq!(data.lines().count(), 4);

    let mut reader = csv::Reader::from_reader(data.as_bytes());
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        CSV_HEADER.to_vec()
    );

    let rows: Vec<RepoMetadata> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    // Row order matches sequence order, values match the records.
    assert_eq!(rows[0].full_name, "owner/repo-1");
    assert_eq!(rows[0].stargazers_count, 300);
    assert_eq!(rows[0].collaborators, 11);
    assert_eq!(rows[0].description.as_deref(), Some("description of repo-1"));
    assert_eq!(rows[1].full_name, "owner/repo-2");
    assert_eq!(rows[1].collaborators, 5);
    assert_eq!(rows[2].full_name, "owner/repo-3");
    assert_eq!(rows[2].collaborators, 0);
}

#[tokio::test]
async fn test_export_limit_zero_writes_header_only() {
    let server = MockServer::start().await;

    // A limit of zero must not trigger any fetch at all.
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    let written = export_csv(&client, &mut results, 0, &path).await.unwrap();
    assert_eq!(written, 0);

    let data = std::fs::read_to_string(&path).unwrap();
    assert_eq!(data.lines().count(), 1);
    assert_eq!(data.lines().next().unwrap(), CSV_HEADER.join(","));

    server.verify().await;
}

#[tokio::test]
async fn test_export_consumes_only_up_to_limit() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        (1u64..=5).map(|n| repo_json(&format!("repo-{n}"), 100 - n)).collect(),
    )
    .await;
    mount_contributors(&server, "repo-1", 1).await;
    mount_contributors(&server, "repo-2", 2).await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    let written = export_csv(&client, &mut results, 2, &path).await.unwrap();
    assert_eq!(written, 2);

    let data = std::fs::read_to_string(&path).unwrap();
    assert_eq!(data.lines().count(), 3);

    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let rows: Vec<RepoMetadata> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows[0].full_name, "owner/repo-1");
    assert_eq!(rows[1].full_name, "owner/repo-2");
}

#[tokio::test]
async fn test_export_aborts_midstream_leaving_truncated_file() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        (1u64..=5).map(|n| repo_json(&format!("repo-{n}"), 100 - n)).collect(),
    )
    .await;
    mount_contributors(&server, "repo-1", 1).await;
    mount_contributors(&server, "repo-2", 2).await;
    // The third extraction fails.
    Mock::given(method("GET"))
        .and(path("/repos/owner/repo-3/contributors"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    let err = export_csv(&client, &mut results, 10, &path).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }), "got {err:?}");

    // Header plus the two rows completed before the failure.
    let data = std::fs::read_to_string(&path).unwrap();
    assert_eq!(data.lines().count(), 3);
    assert!(data.contains("owner/repo-1"));
    assert!(data.contains("owner/repo-2"));
    assert!(!data.contains("owner/repo-3"));
}

#[tokio::test]
async fn test_export_null_description_writes_empty_field() {
    let server = MockServer::start().await;

    let mut repo = repo_json("repo-1", 10);
    repo["description"] = serde_json::Value::Null;
    mount_search(&server, vec![repo]).await;
    mount_contributors(&server, "repo-1", 1).await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    export_csv(&client, &mut results, 10, &path).await.unwrap();

    let data = std::fs::read_to_string(&path).unwrap();
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(record.get(6), Some(""));
}

#[tokio::test]
async fn test_export_overwrites_existing_file() {
    let server = MockServer::start().await;
    mount_search(&server, vec![repo_json("repo-1", 10)]).await;
    mount_contributors(&server, "repo-1", 1).await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("repositories.csv");
    std::fs::write(&path, "stale content that must disappear\n").unwrap();

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);
    export_csv(&client, &mut results, 10, &path).await.unwrap();

    let data = std::fs::read_to_string(&path).unwrap();
    assert!(!data.contains("stale content"));
    assert_eq!(data.lines().count(), 2);
}

#[tokio::test]
async fn test_export_creates_missing_output_directory() {
    let server = MockServer::start().await;
    mount_search(&server, vec![repo_json("repo-1", 10)]).await;
    mount_contributors(&server, "repo-1", 1).await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("out").join("repositories.csv");

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);
    let written = export_csv(&client, &mut results, 10, &path).await.unwrap();
    assert_eq!(written, 1);
    assert!(path.exists());
}

#[tokio::test]
async fn test_export_unwritable_path_fails() {
    let server = MockServer::start().await;

    let client = test_client(&server);
    let mut results = client.search_repositories("rust", SortKey::Stars, SortOrder::Desc);

    // A directory in place of the destination file.
    let dir = tempdir().unwrap();
    let err = export_csv(&client, &mut results, 0, dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}

// Full Pipeline Test

#[tokio::test]
async fn test_run_returns_summary() {
    let server = MockServer::start().await;
    mount_search(&server, vec![repo_json("repo-1", 10), repo_json("repo-2", 5)]).await;
    mount_contributors(&server, "repo-1", 4).await;
    mount_contributors(&server, "repo-2", 2).await;

    let dir = tempdir().unwrap();
    let mut config = Config::new("test-token", "rust");
    config.api_base = Url::parse(&server.uri()).unwrap();
    config.output_dir = dir.path().to_path_buf();

    let summary = crate::run(&config).await.unwrap();
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.total_matches, Some(2));
    assert_eq!(summary.path, dir.path().join("repositories.csv"));
    assert!(summary.path.exists());
}

#[tokio::test]
async fn test_run_rejects_invalid_config_before_network() {
    let config = Config::new("test-token", "");
    let err = crate::run(&config).await.unwrap_err();
    assert!(err.is_config());
}
