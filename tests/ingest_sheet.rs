//! Sheet ingestion against a mock CSV host.

use std::sync::Arc;

use toolshelf::catalog::{self, Catalog, CatalogSource, CatalogStore, ToolStatus};
use toolshelf::config::CatalogConfig;
use toolshelf::ingest::{self, IngestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET: &str = "\
Инструмент,Категория,Описание,Ссылка,Кейсы,Цена,Рейтинг,Статус
Cursor,Разработка и код,AI-редактор,https://cursor.com,Рефакторинг • Ревью,\"Hobby: бесплатно
Pro: $20\",10,Active
Suno,Аудио и звук,Музыка из текста,,,,8/10,unknown
,,,,,,,

Midjourney,Изображения,Картинки по описанию,https://midjourney.com,,,,
";

async fn sheet_server(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sheet.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv; charset=utf-8")
                .set_body_string(body),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn fetches_and_parses_russian_headers() {
    let server = sheet_server(SHEET).await;
    let client = reqwest::Client::new();

    let tools = ingest::fetch_tools(&client, &format!("{}/sheet.csv", server.uri()))
        .await
        .unwrap();

    assert_eq!(tools.len(), 4, "only the empty line is skipped");
    let ids: Vec<&str> = tools.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["sheet-0", "sheet-1", "sheet-2", "sheet-3"]);
    assert_eq!(tools[2].name, "Untitled");
    assert_eq!(tools[2].category, catalog::DEFAULT_CATEGORY);
    assert_eq!(tools[3].name, "Midjourney");

    let cursor = &tools[0];
    assert_eq!(cursor.category, "Разработка и код");
    assert_eq!(cursor.score, Some(10));
    assert_eq!(cursor.status, Some(ToolStatus::Active));
    assert_eq!(cursor.pricing.as_deref(), Some("Hobby: бесплатно\nPro: $20"));

    let suno = &tools[1];
    assert_eq!(suno.link, "#");
    assert_eq!(suno.score, Some(8));
    assert_eq!(suno.status, None);
    assert_eq!(suno.pricing, None);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sheet.csv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = ingest::fetch_tools(
        &reqwest::Client::new(),
        &format!("{}/sheet.csv", server.uri()),
    )
    .await
    .unwrap_err();

    match err {
        IngestError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn header_only_sheet_is_empty() {
    let server = sheet_server("Name,Category,Description\n").await;
    let tools = ingest::fetch_tools(
        &reqwest::Client::new(),
        &format!("{}/sheet.csv", server.uri()),
    )
    .await
    .unwrap();
    assert!(tools.is_empty());
}

#[tokio::test]
async fn store_refresh_failure_keeps_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let seed = catalog::parse_seed("- id: a\n  name: A\n  category: X\n").unwrap();
    let store = Arc::new(CatalogStore::new(Catalog::new(
        seed,
        CatalogSource::Seed("seed.yaml".into()),
    )));

    let result = store
        .refresh_from_sheet(
            &reqwest::Client::new(),
            &format!("{}/sheet.csv", server.uri()),
        )
        .await;
    assert!(result.is_err());

    let current = store.snapshot();
    assert_eq!(current.len(), 1);
    assert_eq!(current.source(), &CatalogSource::Seed("seed.yaml".into()));
}

#[tokio::test]
async fn load_initial_prefers_reachable_sheet() {
    let server = sheet_server(SHEET).await;
    let url = format!("{}/sheet.csv", server.uri());
    let config = CatalogConfig {
        sheet_url: Some(url.clone()),
        ..CatalogConfig::default()
    };

    let catalog = catalog::store::load_initial(&config, &reqwest::Client::new(), None)
        .await
        .unwrap();

    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.source(), &CatalogSource::Sheet(url));
    assert_eq!(catalog.index().count("All"), 4);
}

#[tokio::test]
async fn load_initial_falls_back_to_seed_file() {
    let tmp = tempfile::tempdir().unwrap();
    let seed_path = tmp.path().join("catalog.yaml");
    tokio::fs::write(&seed_path, "- id: a\n  name: A\n  category: X\n")
        .await
        .unwrap();

    let config = CatalogConfig {
        sheet_url: Some("http://127.0.0.1:1/sheet.csv".into()),
        ..CatalogConfig::default()
    };
    let catalog =
        catalog::store::load_initial(&config, &reqwest::Client::new(), Some(&seed_path))
            .await
            .unwrap();

    assert_eq!(catalog.len(), 1);
    assert!(matches!(catalog.source(), CatalogSource::Seed(_)));
}
