//! Relevance ordering end to end, over every local engine.

use cms_search::config::SearchConfig;
use cms_search::core::{ModelDescriptor, SearchableRecord};
use cms_search::models::{MemoryModel, SearchableModel, TableModel};
use cms_search::search::SearchContext;
use cms_search::storage::SqliteStore;
use serde_json::json;

use super::fixture::ThemeFixture;

/// Title weighs 2, description 1. With one query term the multipliers are
/// 1 and 0.5, so the scores are E=7.5, A=5, B=2.5, C=1, D=0.5.
const ROWS: &[(i64, &str, &str, &str)] = &[
    (1, "D", "plain", "zebra once"),
    (2, "C", "plain", "zebra zebra"),
    (3, "B", "zebra", "zebra"),
    (4, "A", "zebra zebra", "zebra zebra"),
    (5, "E", "zebra zebra zebra", "zebra zebra zebra"),
];

fn descriptor() -> ModelDescriptor {
    ModelDescriptor::new("Article", "articles").searchable(["title", "description"])
}

fn context(driver: &str) -> SearchContext {
    SearchContext::new(SearchConfig {
        driver: driver.to_string(),
        ..SearchConfig::default()
    })
}

fn names(records: &[SearchableRecord]) -> Vec<String> {
    records.iter().map(|r| r.text("name")).collect()
}

fn memory_model() -> MemoryModel {
    MemoryModel::from_rows(
        descriptor(),
        ROWS.iter().map(|(id, name, title, description)| {
            json!({ "id": id, "name": name, "title": title, "description": description })
        }),
    )
}

fn table_model() -> TableModel {
    let store = SqliteStore::open_in_memory().unwrap();
    {
        let conn = store.connection();
        let conn = conn.lock();
        conn.execute_batch(
            "CREATE TABLE articles (id INTEGER PRIMARY KEY, name TEXT, title TEXT, description TEXT)",
        )
        .unwrap();
        for (id, name, title, description) in ROWS {
            conn.execute(
                "INSERT INTO articles VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, name, title, description],
            )
            .unwrap();
        }
    }
    TableModel::new(descriptor(), store.table("articles"))
}

fn assert_ranked(model: &dyn SearchableModel, driver: &str) {
    let ctx = context(driver);
    let ranked = ctx.search(model, "zebra").unwrap().get_ranked(None).unwrap();
    assert_eq!(names(&ranked), vec!["E", "A", "B", "C", "D"], "driver {driver}");

    let relevances: Vec<f64> = ranked.iter().filter_map(SearchableRecord::relevance).collect();
    assert_eq!(relevances, vec![7.5, 5.0, 2.5, 1.0, 0.5]);

    let first = ctx.search(model, "zebra").unwrap().first_ranked(None).unwrap();
    assert_eq!(first.map(|r| r.text("name")), Some("E".to_string()));
}

#[test]
fn collection_engine_ranks_by_weighted_matches() {
    assert_ranked(&memory_model(), "collection");
}

#[test]
fn database_engine_ranks_by_weighted_matches() {
    assert_ranked(&table_model(), "database");
}

#[test]
fn ties_keep_backend_order() {
    let model = MemoryModel::from_rows(
        descriptor(),
        [
            json!({ "id": 1, "name": "first", "title": "cat", "description": "" }),
            json!({ "id": 2, "name": "second", "title": "cat", "description": "" }),
            json!({ "id": 3, "name": "third", "title": "cat", "description": "" }),
        ],
    );
    let ranked = context("collection")
        .search(&model, "cat")
        .unwrap()
        .get_ranked(None)
        .unwrap();
    assert_eq!(names(&ranked), vec!["first", "second", "third"]);
}

#[test]
fn custom_scorer_replaces_default() {
    let model = memory_model();
    let by_id_desc = |record: &SearchableRecord, _query: &str| -> f64 {
        -record.value("id").and_then(serde_json::Value::as_f64).unwrap_or(0.0)
    };
    let ranked = context("collection")
        .search(&model, "zebra")
        .unwrap()
        .get_ranked(Some(&by_id_desc))
        .unwrap();
    assert_eq!(names(&ranked), vec!["D", "C", "B", "A", "E"]);
}

#[test]
fn null_engine_has_nothing_to_rank() {
    let model = memory_model();
    let ctx = context("null");
    assert!(ctx.search(&model, "zebra").unwrap().get_ranked(None).unwrap().is_empty());
    assert!(ctx.search(&model, "zebra").unwrap().first_ranked(None).unwrap().is_none());
}

#[test]
fn theme_pages_rank_through_database_engine() {
    let fixture = ThemeFixture::new();
    fixture
        .page("alpha.htm", "Gardening", "<p>Tomatoes and beans</p>")
        .page("beta.htm", "Tomatoes", "<p>Growing tomatoes</p>")
        .page("gamma.htm", "Cooking", "<p>Pasta</p>");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);

    let ranked = context("database")
        .search(&pages, "tomatoes")
        .unwrap()
        .get_ranked(None)
        .unwrap();
    let files: Vec<String> = ranked.iter().map(|r| r.text("fileName")).collect();
    assert_eq!(files, vec!["beta.htm", "alpha.htm"]);
}
