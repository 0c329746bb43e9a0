//! End-to-end projection tests
//!
//! Exercises the full pipeline (parse, index, match, materialize, remove)
//! over fixture documents, including the boundary and degradation cases.

use marginalia::dom::{inner_markup, parse_fragment, Document};
use marginalia::highlight::marker::markers_with_id;
use marginalia::highlight::types::MARKER_ATTR;
use marginalia::{Color, ExclusionRules, Highlight, HighlightSession, Span, TextIndex};

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn filtered_text(doc: &Document) -> String {
    TextIndex::build(doc, doc.root(), &ExclusionRules::default())
        .text()
        .to_string()
}

#[test]
fn apply_then_remove_roundtrips_filtered_text() {
    init_logs();
    let doc = parse_fragment("<div><p>first paragraph</p><p>second <i>styled</i> paragraph</p></div>")
        .unwrap();
    let original = filtered_text(&doc);

    let mut session = HighlightSession::new(doc);
    let h = Highlight::new(3, 1, "second styled", Span::new(0, 0), Color::Blue);
    assert!(session.project_highlight(&h));
    assert_ne!(filtered_text(session.document()), original);

    session.unproject_highlight(3);
    assert_eq!(filtered_text(session.document()), original);
}

#[test]
fn removal_of_unknown_id_is_a_noop() {
    init_logs();
    let doc = parse_fragment("<p>untouched</p>").unwrap();
    let mut session = HighlightSession::new(doc);
    let before = inner_markup(session.document(), session.document().root());

    assert_eq!(session.unproject_highlight(404), 0);
    assert_eq!(inner_markup(session.document(), session.document().root()), before);
}

#[test]
fn highlighted_text_cannot_be_matched_again() {
    init_logs();
    let doc = parse_fragment("<p>only occurrence here</p>").unwrap();
    let mut session = HighlightSession::new(doc);

    let a = Highlight::new(1, 1, "only occurrence", Span::new(0, 15), Color::Yellow);
    assert!(session.project_highlight(&a));

    // B's target lies fully inside A's marker; the post-A index excludes
    // it, so B cannot nest inside A
    let index = TextIndex::build(
        session.document(),
        session.document().root(),
        &ExclusionRules::default(),
    );
    assert_eq!(index.find_span("occurrence"), None);

    let b = Highlight::new(2, 1, "occurrence", Span::new(500, 510), Color::Red);
    assert!(!session.project_highlight(&b));
    assert!(markers_with_id(session.document(), MARKER_ATTR, 2).is_empty());
}

#[test]
fn case_insensitive_fallback_finds_lowercase_text() {
    init_logs();
    let doc = parse_fragment("<p>well hello there</p>").unwrap();
    let index = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());

    assert_eq!(index.find_span("Hello"), Some(Span::new(5, 10)));

    let mut session = HighlightSession::new(doc);
    let h = Highlight::new(1, 1, "Hello", Span::new(0, 0), Color::Green);
    assert!(session.project_highlight(&h));
    let markers = markers_with_id(session.document(), MARKER_ATTR, 1);
    assert_eq!(session.document().text_content(markers[0]), "hello");
}

#[test]
fn count_changing_case_fold_wraps_original_text() {
    init_logs();
    // 'İ' lowers to two scalars, so the folded string is longer than the
    // document text; the marker must still wrap the original characters
    let doc = parse_fragment("<p>go to İZMİR now</p>").unwrap();
    let index = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());
    assert_eq!(index.find_span("İzmİr"), Some(Span::new(6, 11)));

    let mut session = HighlightSession::new(doc);
    let h = Highlight::new(4, 1, "İzmİr", Span::new(0, 0), Color::Yellow);
    assert!(session.project_highlight(&h));
    let markers = markers_with_id(session.document(), MARKER_ATTR, 4);
    assert_eq!(markers.len(), 1);
    assert_eq!(session.document().text_content(markers[0]), "İZMİR");
}

#[test]
fn target_spanning_adjacent_nodes_yields_sibling_markers() {
    init_logs();
    let doc = parse_fragment("<p>The <b>quick</b> brown fox</p>").unwrap();
    let mut session = HighlightSession::new(doc);

    let h = Highlight::new(9, 1, "quick brown", Span::new(4, 15), Color::Yellow);
    assert!(session.project_highlight(&h));

    let markers = markers_with_id(session.document(), MARKER_ATTR, 9);
    assert_eq!(markers.len(), 2);
    for &m in &markers {
        assert_eq!(session.document().attribute(m, MARKER_ATTR), Some("9"));
    }
    let joined: String = markers
        .iter()
        .map(|&m| session.document().text_content(m))
        .collect();
    assert_eq!(joined, "quick brown");
}

#[test]
fn quick_brown_fox_full_lifecycle() {
    init_logs();
    let doc = parse_fragment("<p>The quick brown fox</p>").unwrap();
    let mut session = HighlightSession::new(doc);
    let h = Highlight::new(1, 1, "quick brown", Span::new(4, 15), Color::Yellow);

    assert!(session.project_highlight(&h));
    let markers = markers_with_id(session.document(), MARKER_ATTR, 1);
    assert_eq!(markers.len(), 1);
    assert_eq!(session.document().text_content(markers[0]), "quick brown");
    // whole-body text is unchanged by the projection
    let body = session.document().root();
    assert_eq!(session.document().text_content(body), "The quick brown fox");

    session.unproject_highlight(1);
    assert!(markers_with_id(session.document(), MARKER_ATTR, 1).is_empty());
    let p = session.document().children(body)[0];
    assert_eq!(session.document().children(p).len(), 1);
    assert_eq!(session.document().text_content(p), "The quick brown fox");
}

#[test]
fn nonexistent_phrase_is_a_safe_noop() {
    init_logs();
    let doc = parse_fragment("<p>actual page content</p>").unwrap();
    let index = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());
    assert_eq!(index.find_span("nonexistent phrase"), None);

    let mut session = HighlightSession::new(doc);
    let before = inner_markup(session.document(), session.document().root());
    let h = Highlight::new(1, 1, "nonexistent phrase", Span::new(900, 920), Color::Yellow);
    assert!(!session.project_highlight(&h));
    assert_eq!(inner_markup(session.document(), session.document().root()), before);
}

#[test]
fn projection_survives_page_edits_via_text_matching() {
    init_logs();
    // offsets were recorded against an older page revision and are stale
    let doc = parse_fragment("<p>NEW INTRO! The quick brown fox</p>").unwrap();
    let mut session = HighlightSession::new(doc);
    let h = Highlight::new(1, 1, "quick brown", Span::new(4, 15), Color::Yellow);

    assert!(session.project_highlight(&h));
    let markers = markers_with_id(session.document(), MARKER_ATTR, 1);
    assert_eq!(session.document().text_content(markers[0]), "quick brown");
}

#[test]
fn overlapping_projection_skips_already_marked_text() {
    init_logs();
    let doc = parse_fragment("<p>alpha beta gamma</p>").unwrap();
    let mut session = HighlightSession::new(doc);

    let a = Highlight::new(1, 1, "beta", Span::new(6, 10), Color::Yellow);
    assert!(session.project_highlight(&a));

    // "beta gamma" is no longer contiguous in the filtered text, so the
    // second projection falls back to its stored offsets over what is
    // left, without ever nesting inside A's marker
    let b = Highlight::new(2, 1, "beta gamma", Span::new(6, 16), Color::Red);
    session.project_highlight(&b);
    for m in markers_with_id(session.document(), MARKER_ATTR, 2) {
        assert!(session.highlight_id_at(m) == Some(2));
    }
}

#[test]
fn wire_format_roundtrip_through_json() {
    init_logs();
    let json = r#"{
        "id": 11,
        "linkId": 99,
        "color": "green",
        "comment": "interesting",
        "text": "quick brown",
        "startOffset": 4,
        "endOffset": 15
    }"#;
    let h: Highlight = serde_json::from_str(json).unwrap();
    assert_eq!(h.id, 11);
    assert_eq!(h.link_id, 99);
    assert_eq!(h.color, Color::Green);
    assert!(h.has_comment());

    let doc = parse_fragment("<p>The quick brown fox</p>").unwrap();
    let mut session = HighlightSession::new(doc);
    assert!(session.project_highlight(&h));
    let markers = markers_with_id(session.document(), MARKER_ATTR, 11);
    assert_eq!(
        session.document().attribute(markers[0], "class"),
        Some("marginalia-highlight marginalia-highlight-green marginalia-highlight-note")
    );
}
