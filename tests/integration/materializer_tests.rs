//! Materialized content stores: staleness, identifiers and races.

use std::thread;

use cms_search::core::RecordKey;
use cms_search::index::{IndexKey, Phase};
use cms_search::models::{ContentModelOptions, SearchableModel};

use super::fixture::{ThemeFixture, sqlite_files};

#[test]
fn staleness_check_is_idempotent() {
    let fixture = ThemeFixture::new();
    fixture.page("home.htm", "Home", "<p>Welcome</p>");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);

    assert!(pages.index().needs_update());
    pages.index().ensure_fresh().unwrap();

    assert!(!pages.index().needs_update());
    assert!(!pages.index().needs_update());
    assert_eq!(pages.index().phase(), Phase::StoreReady);
}

#[test]
fn new_content_makes_store_stale() {
    let fixture = ThemeFixture::new();
    fixture.page("home.htm", "Home", "<p>Welcome</p>");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    assert_eq!(pages.all_records(None).unwrap().len(), 1);

    fixture.page("contact.htm", "Contact", "<p>Write to us</p>");
    pages.index().invalidate();
    assert_eq!(pages.all_records(None).unwrap().len(), 2);
}

#[test]
fn slugged_identifier_round_trips() {
    let fixture = ThemeFixture::new();
    fixture
        .write("demo", "content", "about.us.md", "# About us\nThe team.")
        .write("demo", "content", "faq.md", "# FAQ\nQuestions.");
    let registry = fixture.registry();
    let content = fixture.content(&registry, "content", ContentModelOptions::default());

    let all = content.all_records(None).unwrap();
    let about = all
        .iter()
        .find(|r| r.text("fileName") == "about.us.md")
        .unwrap();
    assert_eq!(about.key(), &RecordKey::from("about-us-md"));

    let found = content.records_by_ids(&[RecordKey::from("about-us-md")]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text("fileName"), "about.us.md");
    assert_eq!(found[0].text("title"), "About us");

    let by_raw_name = content.records_by_ids(&[RecordKey::from("about.us.md")]).unwrap();
    assert_eq!(by_raw_name[0].key(), found[0].key());
}

#[test]
fn lookup_keeps_store_order_unless_asked() {
    let fixture = ThemeFixture::new();
    fixture
        .page("a.htm", "A", "a")
        .page("b.htm", "B", "b")
        .page("c.htm", "C", "c");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);

    let ids = [RecordKey::from("c-htm"), RecordKey::from("a-htm")];
    let stored: Vec<String> = pages
        .records_by_ids(&ids)
        .unwrap()
        .iter()
        .map(|r| r.key().to_string())
        .collect();
    assert_eq!(stored, vec!["a-htm", "c-htm"]);

    let ordered: Vec<String> = pages
        .index()
        .find_by_ids_ordered(&["c-htm", "a-htm"])
        .unwrap()
        .iter()
        .map(|row| row["fileName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ordered, vec!["c-htm", "a-htm"]);
}

#[test]
fn store_is_named_after_searchable_as() {
    let fixture = ThemeFixture::new();
    fixture.write("demo", "content/static", "intro.md", "# Intro");
    let registry = fixture.registry();
    let content = fixture.content(&registry, "content/static", ContentModelOptions::default());
    content.index().ensure_fresh().unwrap();

    assert_eq!(content.index().identifier(), "demo-content-static");
    assert!(fixture.store_file("demo-content-static").exists());
}

#[test]
fn concurrent_first_access_leaves_one_store() {
    let fixture = ThemeFixture::new();
    for i in 0..20 {
        fixture.page(&format!("page-{i}.htm"), &format!("Page {i}"), "<p>body</p>");
    }
    let registry = fixture.registry();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let pages = fixture.pages(&registry);
                    pages.all_records(None).map(|records| records.len())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 20);
        }
    });

    assert_eq!(registry.len(), 1);
    assert_eq!(sqlite_files(&fixture.storage()), vec![fixture.store_file("demo-pages")]);
}

#[test]
fn separate_registries_share_one_store_file() {
    let fixture = ThemeFixture::new();
    for i in 0..10 {
        fixture.page(&format!("p{i}.htm"), &format!("P{i}"), "x");
    }
    let first = fixture.registry();
    let second = fixture.registry();

    thread::scope(|scope| {
        let a = scope.spawn(|| fixture.pages(&first).all_records(None).map(|r| r.len()));
        let b = scope.spawn(|| fixture.pages(&second).all_records(None).map(|r| r.len()));
        assert_eq!(a.join().unwrap().unwrap(), 10);
        assert_eq!(b.join().unwrap().unwrap(), 10);
    });

    assert_eq!(sqlite_files(&fixture.storage()).len(), 1);
    let reread = fixture.registry();
    assert_eq!(fixture.pages(&reread).all_records(None).unwrap().len(), 10);
}

#[test]
fn teardown_then_access_rebuilds() {
    let fixture = ThemeFixture::new();
    fixture.page("home.htm", "Home", "x");
    let registry = fixture.registry();
    let pages = fixture.pages(&registry);
    pages.index().ensure_fresh().unwrap();

    pages.index().teardown().unwrap();
    assert_eq!(pages.index().phase(), Phase::Uninitialized);
    assert!(!fixture.store_file("demo-pages").exists());

    assert_eq!(pages.all_records(None).unwrap().len(), 1);
    assert!(registry.get(&IndexKey::new("pages", "demo")).is_some());
}
