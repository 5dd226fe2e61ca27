use super::*;

use crate::embedding::{EmbedConfig, SentenceEmbedder};

fn builtin_kb() -> KnowledgeBase {
    let embedder = SentenceEmbedder::load(EmbedConfig::stub()).expect("stub embedder");
    KnowledgeBase::with_builtin_catalog(embedder).expect("knowledge base should build")
}

#[test]
fn test_builtin_catalog_has_six_items() {
    let kb = builtin_kb();
    assert_eq!(kb.len(), 6);
    assert!(!kb.is_empty());

    let ids: Vec<&str> = kb.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p2", "p3", "p4", "p5", "p6"]);
}

#[test]
fn test_category_labels_cover_the_catalog() {
    let kb = builtin_kb();

    for item in kb.items() {
        assert!(
            catalog::display_name(&item.category).is_some(),
            "no display name for {}",
            item.category
        );
    }
}

#[test]
fn test_display_name_round_trip() {
    for (id, name) in catalog::CATEGORY_LABELS {
        assert_eq!(catalog::display_name(id), Some(*name));
        assert_eq!(catalog::category_for_display_name(name), Some(*id));
    }
    assert_eq!(catalog::display_name("sdg99"), None);
    assert_eq!(catalog::category_for_display_name("Nonexistent Goal"), None);
}

#[test]
fn test_results_are_sorted_descending() {
    let kb = builtin_kb();

    let results = kb
        .search("solar water purifiers for the village", None, 6)
        .unwrap();

    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_exact_item_text_ranks_first_with_unit_score() {
    let kb = builtin_kb();
    let target = kb.items()[4].clone();
    assert_eq!(target.id, "p5");

    let results = kb.search(&target.embedding_text(), None, 3).unwrap();

    assert_eq!(results[0].item.id, "p5");
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn test_k_larger_than_catalog_returns_all_items() {
    let kb = builtin_kb();

    let results = kb.search("community projects", None, 50).unwrap();

    assert_eq!(results.len(), 6);
}

#[test]
fn test_k_zero_returns_nothing() {
    let kb = builtin_kb();
    assert!(kb.search("anything", None, 0).unwrap().is_empty());
}

#[test]
fn test_filter_with_matching_item_ranks_it_first() {
    let kb = builtin_kb();

    let results = kb.search("tablet classrooms", Some("sdg4"), 1).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item.category, "sdg4");
    assert_eq!(results[0].item.id, "p3");
}

#[test]
fn test_masking_zeroes_non_matching_categories() {
    let kb = builtin_kb();

    let results = kb
        .search("solar water purifiers with membrane", Some("sdg6"), 6)
        .unwrap();

    assert_eq!(results[0].item.id, "p4");
    assert!(results[0].score > 0.0);
    for scored in &results[1..] {
        assert_ne!(scored.item.category, "sdg6");
        assert_eq!(scored.score, 0.0);
    }
}

#[test]
fn test_masking_surfaces_off_category_items_when_too_few_match() {
    // Each category tags exactly one item, so asking for three with a filter
    // must pad the tail with zero-scored items from other categories.
    let kb = builtin_kb();

    let results = kb
        .search("prepaid smart meters", Some("sdg7"), 3)
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].item.category, "sdg7");
    assert!(results[1..].iter().all(|s| s.item.category != "sdg7"));
    assert!(results[1..].iter().all(|s| s.score == 0.0));
}

#[test]
fn test_unfiltered_search_excludes_no_category() {
    let kb = builtin_kb();

    let results = kb.search("community development", None, 6).unwrap();

    let mut categories: Vec<&str> = results.iter().map(|s| s.item.category.as_str()).collect();
    categories.sort_unstable();
    let mut expected: Vec<&str> = catalog::CATEGORY_LABELS.iter().map(|(id, _)| *id).collect();
    expected.sort_unstable();
    assert_eq!(categories, expected);
}

#[test]
fn test_empty_query_does_not_fail() {
    let kb = builtin_kb();

    let results = kb.search("", None, 3).unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|s| s.score == 0.0));
}

#[test]
fn test_unknown_filter_returns_only_zero_scores() {
    let kb = builtin_kb();

    let results = kb.search("solar water", Some("sdg99"), 6).unwrap();

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|s| s.score == 0.0));
}

#[test]
fn test_empty_catalog_searches_to_nothing() {
    let embedder = SentenceEmbedder::load(EmbedConfig::stub()).unwrap();
    let kb = KnowledgeBase::build(embedder, Vec::new()).unwrap();

    assert!(kb.is_empty());
    assert!(kb.search("anything", None, 3).unwrap().is_empty());
}

#[test]
fn test_scores_stay_within_cosine_bounds() {
    let kb = builtin_kb();

    let results = kb.search("village water and solar energy", None, 6).unwrap();

    for scored in results {
        assert!((-1.0..=1.0).contains(&scored.score));
    }
}
