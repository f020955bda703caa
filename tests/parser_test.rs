//! Parser integration tests using HTML fixture files

use eksi_scraper::parser::{EntryParser, SkippedEntry};
use eksi_scraper::utils::error::ParseError;
use eksi_scraper::Entry;
use std::fs;

/// Test fixture paths
const FIXTURES_DIR: &str = "tests/fixtures/html";

fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

#[test]
fn test_topic_page_entries() {
    let parsed = EntryParser::new().parse_page(&load_fixture("topic_page.html"));

    assert!(parsed.has_entry_list);
    assert_eq!(
        parsed.entries,
        vec![
            Entry {
                author: "ssg".into(),
                text: "mozilla tarafından geliştirilen, bellek güvenliğini derleme zamanında \
                       sağlayan sistem programlama dili.\n\n(bkz: borrow checker)"
                    .into(),
                date: "15.05.2015 10:12 ~ 10:14".into(),
                favorite_count: 42,
            },
            Entry {
                author: "kalpsiz yazar".into(),
                text: "\"hızlı, güvenli, eşzamanlı\" diye özetlenen dil; derleyicisi <çok> konuşkandır."
                    .into(),
                date: "16.05.2015".into(),
                favorite_count: 0,
            },
            Entry {
                author: "çaylak".into(),
                text: "yazarı gizlenmiş entry".into(),
                date: "17.05.2015 08:00".into(),
                favorite_count: 7,
            },
        ]
    );
}

#[test]
fn test_topic_page_skips_malformed_entries() {
    let parsed = EntryParser::new().parse_page(&load_fixture("topic_page.html"));

    assert_eq!(
        parsed.skipped,
        vec![
            SkippedEntry {
                position: 3,
                reason: ParseError::InvalidFavoriteCount("çok".into()),
            },
            SkippedEntry {
                position: 4,
                reason: ParseError::MissingField("text"),
            },
        ]
    );
}

#[test]
fn test_topic_page_count_from_attribute() {
    let parsed = EntryParser::new().parse_page(&load_fixture("topic_page.html"));
    assert_eq!(parsed.page_count, Some(12));
}

#[test]
fn test_last_page_count_from_links() {
    let parsed = EntryParser::new().parse_page(&load_fixture("last_page.html"));

    assert_eq!(parsed.page_count, Some(12));
    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.entries[0].author, "son yazar");
    assert_eq!(parsed.entries[0].text, "başlığın son entry'si");
}

#[test]
fn test_not_found_page_has_no_entry_list() {
    let parsed = EntryParser::new().parse_page(&load_fixture("not_found.html"));

    assert!(!parsed.has_entry_list);
    assert!(parsed.entries.is_empty());
    assert!(parsed.skipped.is_empty());
    assert_eq!(parsed.page_count, None);
}

#[test]
fn test_sidebar_lists_are_not_entries() {
    let html = load_fixture("topic_page.html");
    let parsed = EntryParser::new().parse_page(&html);

    assert!(parsed.entries.iter().all(|e| e.author != "gündem"));
    assert_eq!(parsed.entries.len() + parsed.skipped.len(), 5);
}
