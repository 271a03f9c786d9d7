use bigram_search::{
    BigramError, CodePoint, Dictionary, Driver, MemoryStore, PersistentStore, Position, Record,
};
use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const LOREM: &str = "Cras pulvinar sollicitudin purus sed viverra. \
                     Nunc facilisis odio in mi blandit vel vulputate elit semper.";

fn backends() -> Vec<(&'static str, Dictionary)> {
    vec![
        ("memory", Dictionary::new(MemoryStore::new())),
        (
            "sqlite",
            Dictionary::new(PersistentStore::open_in_memory().expect("open in-memory sqlite")),
        ),
    ]
}

fn cp(c: char) -> CodePoint {
    CodePoint::from(c)
}

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content)
        .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
    path
}

fn search(dict: &Dictionary, query: &str) -> Vec<Position> {
    dict.search(query)
        .unwrap_or_else(|e| panic!("search for {:?} failed: {}", query, e))
}

#[test]
fn add_record_forwards_to_driver() {
    let mut dict = Dictionary::default();
    let rec = Record::new('h', 'o', Position::new("xfile", 12345));
    dict.add(rec.clone()).expect("add record");

    let found = dict.lookup(cp('h'), cp('o')).expect("lookup");
    assert!(found.contains(&rec), "record missing from lookup");
}

#[test]
fn text_ingestion_stores_byte_positions() {
    for (name, mut dict) in backends() {
        let stored = dict.add_text("x", LOREM, 0).expect("add text");
        assert_eq!(stored, LOREM.chars().count() - 1, "pair count in {}", name);
        assert_eq!(dict.driver().len().expect("len") as usize, stored, "in {}", name);

        let expected = LOREM.find("bl").expect("bl in text") as u64;
        let found = dict.lookup(cp('b'), cp('l')).expect("lookup");
        assert_eq!(
            found,
            BTreeSet::from([Record::new('b', 'l', Position::new("x", expected))]),
            "bl position mismatch in {}",
            name
        );
    }
}

#[test]
fn text_ingestion_applies_base_offset() {
    for (name, mut dict) in backends() {
        dict.add_text("d", "abc", 100).expect("add text");
        assert_eq!(search(&dict, "bc"), vec![Position::new("d", 101)], "in {}", name);
        assert_eq!(search(&dict, "abc"), vec![Position::new("d", 100)], "in {}", name);
    }
}

#[test]
fn search_finds_single_occurrence() {
    for (name, mut dict) in backends() {
        dict.add_text("x", LOREM, 0).expect("add text");

        let expected = LOREM.find("land").expect("land in text") as u64;
        assert_eq!(
            search(&dict, "land"),
            vec![Position::new("x", expected)],
            "land mismatch in {}",
            name
        );
        assert!(search(&dict, "lands").is_empty(), "lands must not match in {}", name);
        assert!(search(&dict, "zebra").is_empty(), "zebra must not match in {}", name);
    }
}

#[test]
fn search_requires_every_pair_to_align() {
    let mut dict = Dictionary::default();
    // Every pair of "abcd" occurs, but never all at one alignment.
    dict.add_text("doc", "ab--bc--cd", 0).expect("add text");
    assert!(search(&dict, "abcd").is_empty());
    assert_eq!(search(&dict, "bc"), vec![Position::new("doc", 4)]);
}

#[test]
fn search_handles_repeated_pairs_and_overlaps() {
    let mut dict = Dictionary::default();
    dict.add_text("doc", "xababab", 0).expect("add text");
    assert_eq!(
        search(&dict, "abab"),
        vec![Position::new("doc", 1), Position::new("doc", 3)]
    );
    assert_eq!(
        search(&dict, "aba"),
        vec![Position::new("doc", 1), Position::new("doc", 3)]
    );
}

#[test]
fn search_spans_documents_in_order() {
    for (name, mut dict) in backends() {
        dict.add_text("b-doc", "one land two", 0).expect("add text");
        dict.add_text("a-doc", "landland", 0).expect("add text");

        assert_eq!(
            search(&dict, "land"),
            vec![
                Position::new("a-doc", 0),
                Position::new("a-doc", 4),
                Position::new("b-doc", 4),
            ],
            "in {}",
            name
        );
    }
}

#[test]
fn search_uses_byte_offsets_for_multibyte_text() {
    for (name, mut dict) in backends() {
        dict.add_text("kana", "漢字カタカナ漢字", 0).expect("add text");

        assert_eq!(search(&dict, "カタ"), vec![Position::new("kana", 6)], "in {}", name);
        assert_eq!(
            search(&dict, "漢字"),
            vec![Position::new("kana", 0), Position::new("kana", 18)],
            "in {}",
            name
        );
        assert_eq!(
            search(&dict, "カナ漢字"),
            vec![Position::new("kana", 12)],
            "in {}",
            name
        );
    }
}

#[test]
fn short_queries_match_nothing() {
    let mut dict = Dictionary::default();
    dict.add_text("doc", "aaaa", 0).expect("add text");
    assert!(search(&dict, "").is_empty());
    assert!(search(&dict, "a").is_empty());
    assert_eq!(search(&dict, "aa").len(), 3);
}

#[test]
fn malformed_input_is_rejected() {
    let mut dict = Dictionary::default();
    assert!(matches!(
        dict.add_text("doc", [b'a', 0xFF, b'b'], 0),
        Err(BigramError::Decoding { offset: 1 })
    ));
    assert!(dict.driver().is_empty().expect("is_empty"), "nothing may be stored");

    assert!(matches!(
        dict.search([b'a', 0xC3]),
        Err(BigramError::Decoding { offset: 1 })
    ));
}

#[test]
fn reingesting_text_is_rejected_uniformly() {
    for (name, mut dict) in backends() {
        dict.add_text("doc", "hello", 0).expect("first ingest");
        assert!(
            matches!(dict.add_text("doc", "hello", 0), Err(BigramError::DuplicateRecord(_))),
            "duplicate ingest must fail in {}",
            name
        );
        assert_eq!(dict.driver().len().expect("len"), 4, "in {}", name);
    }
}

#[test]
fn stream_ingestion_offsets_exclude_terminators() {
    for (name, mut dict) in backends() {
        let stored = dict
            .add_stream("doc", Cursor::new("first line\nsecond line\n"))
            .expect("add stream");
        assert_eq!(stored, 9 + 10, "pair count in {}", name);

        assert_eq!(search(&dict, "second"), vec![Position::new("doc", 10)], "in {}", name);
        assert_eq!(
            search(&dict, "line"),
            vec![Position::new("doc", 6), Position::new("doc", 17)],
            "in {}",
            name
        );
        // The pair across the line break is never indexed.
        assert!(search(&dict, "linesecond").is_empty(), "in {}", name);
        assert!(search(&dict, "line\nsecond").is_empty(), "in {}", name);
    }
}

#[test]
fn stream_ingestion_accepts_crlf() {
    let mut dict = Dictionary::default();
    dict.add_stream("doc", Cursor::new("ab\r\ncd")).expect("add stream");
    assert_eq!(search(&dict, "cd"), vec![Position::new("doc", 2)]);
    assert!(search(&dict, "b\r").is_empty());
}

#[test]
fn stream_ingestion_stops_at_malformed_line() {
    let mut dict = Dictionary::default();
    let input: &[u8] = b"good\nba\xFFd\nnever\n";
    // Offset counts from the start of the stream, terminators included.
    assert!(matches!(
        dict.add_stream("doc", input),
        Err(BigramError::Decoding { offset: 7 })
    ));
    assert_eq!(search(&dict, "good"), vec![Position::new("doc", 0)]);
    assert!(search(&dict, "never").is_empty());
}

#[test]
fn file_ingestion_is_content_addressed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let one = write_file(dir.path(), "one.txt", "the island\nof land\n".as_bytes());
    let two = write_file(dir.path(), "two.txt", "the island\r\nof land".as_bytes());

    for (name, mut dict) in backends() {
        let d1 = dict.add_file(&one).expect("add first file");
        let records = dict.driver().len().expect("len");

        let d2 = dict.add_file(&two).expect("add identical content");
        assert_eq!(d1, d2, "identical content must share a digest in {}", name);
        assert_eq!(dict.driver().len().expect("len"), records, "re-indexed in {}", name);

        let paths = dict.lookup_digest(&d1).expect("lookup digest");
        assert_eq!(paths, BTreeSet::from([one.clone(), two.clone()]), "in {}", name);

        let manual = dir.path().join("copy-elsewhere.txt");
        dict.register_path(&manual, d1).expect("register path");
        let paths = dict.lookup_digest(&d1).expect("lookup digest");
        assert_eq!(
            paths,
            BTreeSet::from([one.clone(), two.clone(), manual]),
            "manual registration missing in {}",
            name
        );

        let doc = d1.to_hex();
        assert_eq!(
            search(&dict, "land"),
            vec![Position::new(doc.as_str(), 6), Position::new(doc.as_str(), 13)],
            "in {}",
            name
        );
    }
}

#[test]
fn stream_decoding_error_reports_crlf_stream_offset() {
    let mut dict = Dictionary::default();
    let input: &[u8] = b"ab\r\ncd\r\ne\xC3";
    assert!(matches!(
        dict.add_stream("doc", input),
        Err(BigramError::Decoding { offset: 9 })
    ));
}

#[test]
fn content_differing_only_in_line_breaks_is_indexed_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let split = write_file(dir.path(), "split.txt", b"ab\ncd");
    let joined = write_file(dir.path(), "joined.txt", b"abcd");

    for (name, mut dict) in backends() {
        let d1 = dict.add_file(&split).expect("add split file");
        let records = dict.driver().len().expect("len");
        let d2 = dict.add_file(&joined).expect("add joined file");

        assert_eq!(d1, d2, "line breaks are not part of the digest in {}", name);
        assert_eq!(dict.driver().len().expect("len"), records, "re-indexed in {}", name);
        assert_eq!(
            dict.lookup_digest(&d1).expect("lookup digest"),
            BTreeSet::from([split.clone(), joined.clone()]),
            "in {}",
            name
        );
        // Only the first file's line-split records exist.
        assert!(search(&dict, "bc").is_empty(), "bc must not match in {}", name);
        assert_eq!(search(&dict, "cd"), vec![Position::new(d1.to_hex(), 2)], "in {}", name);
    }
}

#[test]
fn search_hits_resolve_to_source_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let one = write_file(dir.path(), "one.txt", "first line\r\nthe island\n\nof land\n".as_bytes());
    let two = write_file(dir.path(), "two.txt", "first line\nthe island\n\nof land".as_bytes());

    for (name, mut dict) in backends() {
        let digest = dict.add_file(&one).expect("add file");
        dict.add_file(&two).expect("add copy");

        let hits = search(&dict, "land");
        assert_eq!(hits.len(), 2, "land hits in {}", name);

        let second_line = dict.locate(&hits[0]).expect("locate first hit");
        assert_eq!(
            second_line,
            vec![
                (one.clone(), 2, "the island".to_string()),
                (two.clone(), 2, "the island".to_string()),
            ],
            "first hit in {}",
            name
        );

        let fourth_line = dict.locate(&hits[1]).expect("locate second hit");
        assert_eq!(
            fourth_line,
            vec![
                (one.clone(), 4, "of land".to_string()),
                (two.clone(), 4, "of land".to_string()),
            ],
            "second hit in {}",
            name
        );

        let first_line = dict
            .locate(&Position::new(digest.to_hex(), 0))
            .expect("locate line start");
        assert_eq!(first_line[0], (one.clone(), 1, "first line".to_string()));
    }
}

#[test]
fn locate_ignores_documents_without_files() {
    let mut dict = Dictionary::default();
    dict.add_text("notes", "the island", 0).expect("add text");

    let hits = search(&dict, "land");
    assert_eq!(hits, vec![Position::new("notes", 6)]);
    assert!(dict.locate(&hits[0]).expect("locate").is_empty());
}

#[test]
fn file_ingestion_of_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut dict = Dictionary::default();
    assert!(matches!(
        dict.add_file(dir.path().join("missing.txt")),
        Err(BigramError::Io(_))
    ));
}

#[test]
fn file_ingestion_of_malformed_file_fails_without_registration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = write_file(dir.path(), "bad.txt", b"ok\n\xC0\xAF\n");
    let mut dict = Dictionary::default();

    assert!(matches!(dict.add_file(&bad), Err(BigramError::Decoding { .. })));
    let digest = bigram_search::digest_file(&bad).expect("digest still computable");
    assert!(dict.lookup_digest(&digest).expect("lookup digest").is_empty());
}

#[test]
fn persistent_index_is_searchable_after_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("index.db");
    let file = write_file(dir.path(), "doc.txt", LOREM.as_bytes());

    let digest = {
        let mut dict = Dictionary::new(PersistentStore::open(&db).expect("create store"));
        dict.add_file(&file).expect("add file")
    };

    let dict = Dictionary::new(PersistentStore::open(&db).expect("reopen store"));
    let expected = LOREM.find("land").expect("land in text") as u64;
    assert_eq!(search(&dict, "land"), vec![Position::new(digest.to_hex(), expected)]);
    assert_eq!(
        dict.lookup_digest(&digest).expect("lookup digest"),
        BTreeSet::from([file])
    );
}

#[test]
fn backends_agree_on_results() {
    let documents = [
        ("alpha", "Nunc facilisis odio in mi blandit vel vulputate elit semper."),
        ("beta", "漢字カタカナ and some land of 漢字"),
        ("gamma", "aaaa aaaa"),
    ];
    let queries = ["land", "漢字", "aa", "aaaa a", "semper.", "カタカナ a", "missing"];

    let mut results: Vec<Vec<Vec<Position>>> = Vec::new();
    for (_, mut dict) in backends() {
        for (doc, text) in documents {
            dict.add_text(doc, text, 0).expect("add text");
        }
        results.push(queries.iter().map(|q| search(&dict, q)).collect());
    }

    assert_eq!(results[0], results[1], "memory and sqlite disagree");
}
