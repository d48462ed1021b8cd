use prompt_architect_core::{
    all_tags, extract_variables, merge_tags_on_distill, query_items, toggle_tag, Item, ItemKind,
    ItemQuery, KindFilter, LabelParseError, SortOrder,
};
use std::collections::BTreeSet;

fn note(title: &str, body: Option<&str>, updated_at: i64) -> Item {
    Item::note(title, body.map(str::to_string), 1)
        .unwrap()
        .with_updated_at(updated_at)
        .unwrap()
}

fn prompt(title: &str, body: &str, updated_at: i64) -> Item {
    Item::prompt(title, body, 1)
        .unwrap()
        .with_updated_at(updated_at)
        .unwrap()
}

fn bookmark(title: &str, url: &str, updated_at: i64) -> Item {
    Item::bookmark(title, url, 1)
        .unwrap()
        .with_updated_at(updated_at)
        .unwrap()
}

fn titles(items: &[Item]) -> Vec<&str> {
    items.iter().map(Item::title).collect()
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn empty_search_passes_every_item() {
    let items = vec![
        note("plain", None, 1),
        prompt("p", "body", 2),
        bookmark("b", "https://example.com", 3),
    ];
    let result = query_items(&items, &ItemQuery::new().search(""));
    assert_eq!(result.count, 3);
    assert_eq!(result.items.len(), result.count);
}

#[test]
fn search_is_case_insensitive_and_field_asymmetric() {
    let items = vec![
        note("Note", Some("mentions Gemini"), 1),
        prompt("Prompt", "uses gemini tools", 2),
        bookmark("Bookmark", "https://ai.google.dev/gemini", 3),
        bookmark("Other", "https://example.com", 4)
            .with_tags(["gemini"]),
        note("url lookalike", Some("https://ai.google.dev"), 5),
    ];

    let by_body = query_items(&items, &ItemQuery::new().search("GEMINI"));
    assert_eq!(titles(&by_body.items), vec!["Bookmark", "Prompt", "Note"]);

    // Note bodies match, bookmark urls match, tags are never searched.
    let by_url = query_items(&items, &ItemQuery::new().search("ai.google.dev"));
    assert_eq!(titles(&by_url.items), vec!["url lookalike", "Bookmark"]);
}

#[test]
fn bookmark_summary_is_not_searched() {
    let mut saved = bookmark("Saved page", "https://example.com", 1);
    saved.set_body("a summary about rust", 2);
    let result = query_items(&[saved], &ItemQuery::new().search("rust"));
    assert_eq!(result.count, 0);
}

#[test]
fn untagged_items_are_excluded_by_active_tags() {
    let items = vec![
        note("untagged", None, 1),
        note("tagged", None, 2).with_tags(["x", "y"]),
        note("other", None, 3).with_tags(["z"]),
    ];
    let result = query_items(&items, &ItemQuery::new().tags(["y", "missing"]));
    assert_eq!(titles(&result.items), vec!["tagged"]);
}

#[test]
fn kind_filter_only_returns_matching_kind() {
    let items = vec![
        note("n", None, 1),
        prompt("p1", "a", 2),
        bookmark("b", "https://example.com", 3),
        prompt("p2", "b", 4),
    ];
    let result = query_items(&items, &ItemQuery::new().kind(KindFilter::Only(ItemKind::Prompt)));
    assert!(result
        .items
        .iter()
        .all(|item| item.kind() == ItemKind::Prompt));
    assert_eq!(result.count, 2);
}

#[test]
fn filters_compose_with_and() {
    let items = vec![
        prompt("Rust prompt", "x", 1).with_tags(["dev"]),
        note("Rust note", None, 2).with_tags(["dev"]),
        prompt("Rust untagged", "x", 3),
        prompt("Go prompt", "x", 4).with_tags(["dev"]),
    ];
    let query = ItemQuery::new()
        .search("rust")
        .tags(["dev"])
        .kind(KindFilter::Only(ItemKind::Prompt));
    let result = query_items(&items, &query);
    assert_eq!(titles(&result.items), vec!["Rust prompt"]);
}

#[test]
fn alphabetical_sort_ignores_case() {
    let items = vec![
        note("banana", None, 1),
        note("Apple", None, 2),
        note("cherry", None, 3),
    ];
    let result = query_items(&items, &ItemQuery::new().sort_by(SortOrder::Alphabetical));
    assert_eq!(titles(&result.items), vec!["Apple", "banana", "cherry"]);
}

#[test]
fn alphabetical_sort_places_accented_titles_with_base_letters() {
    let items = vec![
        note("zebra", None, 1),
        note("Éclair", None, 2),
        note("apple", None, 3),
        note("fig", None, 4),
    ];
    let result = query_items(&items, &ItemQuery::new().sort_by(SortOrder::Alphabetical));
    assert_eq!(titles(&result.items), vec!["apple", "Éclair", "fig", "zebra"]);
}

#[test]
fn recent_sort_is_descending_and_leaves_input_untouched() {
    let items = vec![note("t0", None, 10), note("t2", None, 30), note("t1", None, 20)];
    let result = query_items(&items, &ItemQuery::new().sort_by(SortOrder::Recent));
    assert_eq!(titles(&result.items), vec!["t2", "t1", "t0"]);
    assert_eq!(titles(&items), vec!["t0", "t2", "t1"]);
}

#[test]
fn recent_sort_keeps_collection_order_on_ties() {
    let items = vec![note("first", None, 5), note("second", None, 5), note("third", None, 5)];
    let result = query_items(&items, &ItemQuery::new());
    assert_eq!(titles(&result.items), vec!["first", "second", "third"]);
}

#[test]
fn end_to_end_two_items() {
    let items = vec![note("B", None, 100), prompt("A", "body", 200)];

    let alphabetical = query_items(&items, &ItemQuery::new().sort_by(SortOrder::Alphabetical));
    assert_eq!(titles(&alphabetical.items), vec!["A", "B"]);

    let recent = query_items(&items, &ItemQuery::new().sort_by(SortOrder::Recent));
    assert_eq!(titles(&recent.items), vec!["A", "B"]);

    let older_prompt = vec![note("B", None, 300), prompt("A", "body", 200)];
    let recent = query_items(&older_prompt, &ItemQuery::new());
    assert_eq!(titles(&recent.items), vec!["B", "A"]);
}

#[test]
fn all_tags_is_sorted_union_and_tracks_collection_changes() {
    let mut items = vec![
        note("a", None, 1).with_tags(["writing", "ai"]),
        note("b", None, 1).with_tags(["ai", "docs"]),
    ];
    assert_eq!(all_tags(&items), vec!["ai", "docs", "writing"]);

    items[1].set_tags(["film"], 2);
    assert_eq!(all_tags(&items), vec!["ai", "film", "writing"]);
    assert!(all_tags(&[]).is_empty());
}

#[test]
fn toggle_tag_adds_and_removes() {
    assert_eq!(toggle_tag(&set(&["x"]), "x"), BTreeSet::new());
    assert_eq!(toggle_tag(&BTreeSet::new(), "x"), set(&["x"]));

    let mut query = ItemQuery::new().search("keep");
    query.toggle_tag("a");
    query.toggle_tag("b");
    query.toggle_tag("a");
    assert_eq!(query.active_tags, set(&["b"]));
    query.clear_tags();
    assert!(query.active_tags.is_empty());
    assert_eq!(query.search_term, "keep");
}

#[test]
fn merge_tags_on_distill_is_a_set_union() {
    let merged = merge_tags_on_distill(&set(&["ai", "docs"]), ["docs", "gemini"]);
    assert_eq!(merged, set(&["ai", "docs", "gemini"]));
}

#[test]
fn extract_variables_collapses_duplicates() {
    let names = extract_variables("Hi {{a}} and {{b}} and {{a}}");
    assert_eq!(names.iter().cloned().collect::<BTreeSet<_>>(), set(&["a", "b"]));
    assert_eq!(names.len(), 2);
    assert!(extract_variables("no vars here").is_empty());
}

#[test]
fn prompt_variables_follow_body_edits() {
    let mut item = Item::prompt("p", "Write about {{topic}} for {{audience}}", 1).unwrap();
    item.set_body("Write about {{topic}}", 2);
    assert_eq!(item.variables(), ["topic".to_string()]);

    item.set_body("Write about {{topic}} for {{audience}}", 3);
    assert_eq!(
        item.variables(),
        ["topic".to_string(), "audience".to_string()]
    );
    assert_eq!(extract_variables(item.body().unwrap()), item.variables());
}

#[test]
fn kind_and_sort_labels_parse() {
    assert_eq!("all".parse::<KindFilter>().unwrap(), KindFilter::All);
    assert_eq!(
        "note".parse::<KindFilter>().unwrap(),
        KindFilter::Only(ItemKind::Note)
    );
    assert_eq!(
        "task".parse::<KindFilter>().unwrap_err(),
        LabelParseError::KindFilter("task".to_string())
    );
    assert_eq!(
        "Alphabetical".parse::<SortOrder>().unwrap(),
        SortOrder::Alphabetical
    );
    let err = "Oldest".parse::<SortOrder>().unwrap_err();
    assert_eq!(err, LabelParseError::SortOrder("oldest".to_string()));
    assert_eq!(
        err.to_string(),
        "unsupported sort order `oldest`; expected recent|alphabetical"
    );
}
