//! Import and flush through the search context.

use cms_search::config::{QueueConfig, SearchConfig};
use cms_search::models::SearchableModel;
use cms_search::search::{SearchContext, SyncOutcome};

use super::fixture::ThemeFixture;

#[test]
fn import_rebuilds_and_syncs_every_page() {
    let fixture = ThemeFixture::new();
    fixture.page("a.htm", "A", "x").page("b.htm", "B", "y");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    let ctx = SearchContext::new(SearchConfig::default());

    let outcome = ctx.import(&pages).unwrap();
    assert_eq!(outcome, SyncOutcome::Synced { records: 2 });
    assert!(!pages.index().needs_update());
}

#[test]
fn import_defers_to_queue() {
    let fixture = ThemeFixture::new();
    fixture.page("a.htm", "A", "x");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    let ctx = SearchContext::new(SearchConfig {
        queue: QueueConfig::Enabled(true),
        ..SearchConfig::default()
    });

    let outcome = ctx.import(&pages).unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Queued {
            records: 1,
            connection: None,
            queue: None
        }
    );
}

#[test]
fn flush_tears_down_store() {
    let fixture = ThemeFixture::new();
    fixture.page("a.htm", "A", "x");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    let ctx = SearchContext::new(SearchConfig::default());
    ctx.import(&pages).unwrap();
    assert!(fixture.store_file("demo-pages").exists());

    ctx.flush(&pages).unwrap();
    assert!(!fixture.store_file("demo-pages").exists());
}

#[test]
fn searchable_as_carries_prefix() {
    let fixture = ThemeFixture::new();
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    let config = SearchConfig {
        prefix: "dev_".into(),
        ..SearchConfig::default()
    };
    assert_eq!(pages.searchable_as(&config), "dev_demo-pages");
}
