//! Event protocol of the orchestrator.

use crate::common::{
    assert_complete_stream, indexer_over, progress_events, run_collect, sample_library,
    streamed_hits,
};
use guide_search::{
    CancellationToken, ChapterEntry, SearchFlags, SearchIndexEvent, SearchOutcome, SearchQuery,
};

fn query(raw: &str) -> SearchQuery {
    SearchQuery::new(raw, SearchFlags::default())
}

#[test]
fn guide_stream_has_n_plus_one_progress_events() {
    let indexer = indexer_over(sample_library());
    let q = query("hipertension");
    let (outcome, events) =
        run_collect(|tx, token| indexer.search_in_guide("guides/hta", "hta", None, &q, tx, token));
    assert_eq!(outcome.unwrap(), SearchOutcome::Completed);
    assert_complete_stream(&events, 3);
}

#[test]
fn guide_stream_without_matches_is_still_complete() {
    let indexer = indexer_over(sample_library());
    let q = query("inexistente");
    let (_, events) =
        run_collect(|tx, token| indexer.search_in_guide("guides/hta", "hta", None, &q, tx, token));
    assert_complete_stream(&events, 3);
    assert!(streamed_hits(&events).is_empty());
}

#[test]
fn partial_results_arrive_in_chapter_order() {
    let indexer = indexer_over(sample_library());
    let q = query("hipertension");
    let (_, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert_complete_stream(&events, 5);

    let chapters: Vec<String> = streamed_hits(&events)
        .into_iter()
        .map(|h| format!("{}/{}", h.guide_slug, h.chapter_slug))
        .collect();
    assert_eq!(chapters, vec!["hta/diagnostico", "hta/tratamiento", "dm2/cribado"]);
}

#[test]
fn each_partial_result_is_followed_by_its_progress() {
    let indexer = indexer_over(sample_library());
    let q = query("hipertension");
    let (_, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    for (i, event) in events.iter().enumerate() {
        if matches!(event, SearchIndexEvent::PartialResults { .. }) {
            assert!(matches!(events[i + 1], SearchIndexEvent::Progress { .. }));
        }
    }
}

#[test]
fn empty_guide_emits_zero_progress_and_done() {
    let indexer = indexer_over(sample_library());
    let q = query("hipertension");
    let chapters: Vec<ChapterEntry> = Vec::new();
    let (outcome, events) = run_collect(|tx, token| {
        indexer.search_in_guide("guides/hta", "hta", Some(chapters.as_slice()), &q, tx, token)
    });
    assert!(outcome.is_ok());
    assert_eq!(
        events,
        vec![SearchIndexEvent::Progress { done: 0, total: 0 }, SearchIndexEvent::Done]
    );
}

#[test]
fn guide_manifest_falls_back_to_directory() {
    let library = sample_library();
    library.insert(
        "extra/manifest.json",
        r#"{"guide": {"title": "Extra"}, "chapters": [{"slug": "a", "path": "a.json"}]}"#,
    );
    library.insert(
        "extra/a.json",
        r#"{"sections": [{"type": "text", "id": "x", "body": "Hipertensión"}]}"#,
    );
    let indexer = indexer_over(library);
    let q = query("hipertension");
    let (outcome, events) =
        run_collect(|tx, token| indexer.search_in_guide("extra", "extra", None, &q, tx, token));
    assert!(outcome.is_ok());
    assert_complete_stream(&events, 1);
    assert_eq!(streamed_hits(&events)[0].section_id, "x#body");
}

#[test]
fn single_chapter_stream() {
    let indexer = indexer_over(sample_library());
    let chapter = ChapterEntry::new("tratamiento", "Tratamiento", "chapters/02-tratamiento.json");
    let q = query("enalapril");
    let (_, events) = run_collect(|tx, token| {
        indexer.search_in_single_chapter("guides/hta", "hta", &chapter, &q, tx, token)
    });
    assert_complete_stream(&events, 1);
    assert_eq!(streamed_hits(&events)[0].section_id, "tab-1#r0c0");
}

#[test]
fn spawned_stream_yields_same_events() {
    let indexer = indexer_over(sample_library());
    let q = query("hipertension");
    let (_, direct) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));

    let mut stream = indexer.spawn_search_everywhere(q.clone(), CancellationToken::new());
    let spawned: Vec<SearchIndexEvent> = stream.by_ref().collect();
    assert_eq!(stream.finish().unwrap(), SearchOutcome::Completed);
    assert_eq!(spawned, direct);
}

#[test]
fn progress_total_matches_grand_chapter_count() {
    let indexer = indexer_over(sample_library());
    let q = query("x");
    let (_, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert!(progress_events(&events).iter().all(|(_, total)| *total == 5));
}
