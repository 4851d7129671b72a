//! End-to-end matching scenarios over the sample library.

use crate::common::{
    indexer_over, run_collect, sample_library, streamed_hits, HTA_DIAGNOSIS_BODY,
    HTA_TREATMENT_BODY,
};
use guide_search::{
    extract_blocks, ChapterContent, SearchError, SearchFlags, SearchOutcome, SearchQuery,
    SearchResult, SectionType,
};

fn search_all(raw: &str, flags: SearchFlags) -> SearchResult {
    let indexer = indexer_over(sample_library());
    let q = SearchQuery::new(raw, flags);
    let (outcome, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert_eq!(outcome.unwrap(), SearchOutcome::Completed);
    SearchResult::from_hits(streamed_hits(&events))
}

#[test]
fn accent_and_case_folded_body_match() {
    let result = search_all("hipertension", SearchFlags::default());
    let hit = &result.hits[0];
    assert_eq!(hit.chapter_slug, "diagnostico");
    assert_eq!(hit.section_id, "sec-1#body");
    assert_eq!(hit.section_type, SectionType::Text);
    assert_eq!(hit.match_ranges.len(), 1);
    assert_eq!(hit.match_ranges[0].extract(HTA_DIAGNOSIS_BODY), "HIPERTENSIÓN");
}

#[test]
fn total_counts_matches_not_hits() {
    let result = search_all("hipertension", SearchFlags::default());
    assert_eq!(result.hits.len(), 3);
    assert_eq!(result.total, 4);
}

#[test]
fn every_range_extracts_to_a_folded_match() {
    let result = search_all("hipertension", SearchFlags::default());
    let treatment = &result.hits[1];
    let found: Vec<String> = treatment
        .match_ranges
        .iter()
        .map(|r| r.extract(HTA_TREATMENT_BODY))
        .collect();
    assert_eq!(found, vec!["HIPERTENSIÓN", "hipertensión"]);
}

#[test]
fn case_sensitive_search_distinguishes_case() {
    let result = search_all("HIPERTENSIÓN", SearchFlags::new(true, true));
    assert_eq!(result.total, 2);
    assert!(result.hits.iter().all(|h| h.guide_slug == "hta"));
}

#[test]
fn accent_sensitive_search_distinguishes_accents() {
    assert_eq!(search_all("hipertension", SearchFlags::new(false, true)).total, 0);
    assert_eq!(search_all("hipertensión", SearchFlags::new(false, true)).total, 4);
}

#[test]
fn table_cells_and_titles_are_searchable() {
    let result = search_all("losartan", SearchFlags::default());
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.hits[0].section_id, "tab-1#r1c0");
    assert_eq!(result.hits[0].section_type, SectionType::Table);

    let groups = search_all("ara-ii", SearchFlags::default());
    assert_eq!(groups.hits[0].section_id, "tab-1#r1group");

    let titles = search_all("primera linea", SearchFlags::default());
    assert_eq!(titles.hits[0].section_id, "tab-1#title");
}

#[test]
fn column_headers_and_headings_are_not_searchable() {
    assert!(search_all("dosis", SearchFlags::default()).is_empty());
}

#[test]
fn image_caption_is_searchable() {
    let result = search_all("algoritmo", SearchFlags::default());
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.hits[0].section_id, "fig-1#caption");
    assert_eq!(result.hits[0].section_type, SectionType::Image);
}

#[test]
fn section_without_id_gets_positional_id() {
    let result = search_all("analitica", SearchFlags::default());
    assert_eq!(result.hits[0].section_id, "s0-text#body");
}

#[test]
fn preview_is_centered_on_first_match() {
    let result = search_all("tres farmacos", SearchFlags::default());
    let preview = &result.hits[0].preview;
    assert!(preview.starts_with('…'));
    assert!(preview.contains("tres fármacos"));
    assert!(!preview.contains('\n'));
}

#[test]
fn whole_library_search_skips_broken_chapter() {
    let library = sample_library();
    library.insert("guides/hta/chapters/02-tratamiento.json", "not json");
    let indexer = indexer_over(library);
    let q = SearchQuery::new("hipertension", SearchFlags::default());
    let (outcome, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert_eq!(outcome.unwrap(), SearchOutcome::Completed);
    let result = SearchResult::from_hits(streamed_hits(&events));
    assert_eq!(result.hits.len(), 2);
    assert_eq!(result.total, 2);
}

#[test]
fn targeted_search_reports_broken_chapter() {
    let library = sample_library();
    library.insert("guides/hta/chapters/02-tratamiento.json", "not json");
    let indexer = indexer_over(library);
    let q = SearchQuery::new("hipertension", SearchFlags::default());
    let (outcome, _) =
        run_collect(|tx, token| indexer.search_in_guide("guides/hta", "hta", None, &q, tx, token));
    match outcome {
        Err(SearchError::Parse { path, .. }) => {
            assert_eq!(path, "guides/hta/chapters/02-tratamiento.json")
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn missing_root_manifest_fails_everywhere_search() {
    let library = sample_library();
    library.remove("manifest.json");
    let indexer = indexer_over(library);
    let q = SearchQuery::new("hipertension", SearchFlags::default());
    let (outcome, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert!(matches!(outcome, Err(SearchError::NotFound { .. })));
    assert!(events.is_empty());
}

#[test]
fn block_ids_are_stable_across_extractions() {
    let json = r#"{"sections": [
        {"type": "text", "body": "a"},
        {"type": "table", "rows": [{"group": "g", "cells": ["x", "y"]}]},
        {"type": "image", "caption": "c"}
    ]}"#;
    let first: ChapterContent = serde_json::from_str(json).unwrap();
    let second: ChapterContent = serde_json::from_str(json).unwrap();
    let ids = |c: &ChapterContent| -> Vec<String> {
        extract_blocks(c, SearchFlags::default())
            .into_iter()
            .map(|b| b.section_id)
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        ids(&first),
        vec![
            "s0-text#body",
            "s1-table#r0group",
            "s1-table#r0c0",
            "s1-table#r0c1",
            "s2-image#caption",
        ]
    );
}
