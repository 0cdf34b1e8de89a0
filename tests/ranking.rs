//! Ranking Integration Tests
//!
//! Tests for evidence similarity, stance, truncation and labelling.

use claimcheck::core::ranker::{rank, score_evidence, score_items};
use claimcheck::domain::{EvidenceItem, Label};

fn item(title: &str, snippet: &str, url: &str) -> EvidenceItem {
    EvidenceItem::new(title, url).with_snippet(snippet)
}

fn debunking_item() -> EvidenceItem {
    item(
        "Earth is round",
        "Scientific consensus confirms Earth is round, debunking flat-earth myth",
        "https://x",
    )
}

fn mixed_evidence() -> Vec<EvidenceItem> {
    vec![
        item("Moon landing 1969", "Apollo 11 landed on the Moon in 1969", "https://a"),
        item("Apollo 11 mission", "Armstrong walked on the Moon during Apollo 11", "https://b"),
        item("Moon landing hoax", "Claims the landing was staged are a hoax", "https://c"),
        item("Lunar geology", "Moon rocks returned by Apollo missions", "https://d"),
        item("Apollo program", "NASA program that landed humans on the Moon", "https://e"),
        item("Misleading moon claims", "Debunked conspiracy theories", "https://f"),
    ]
}

#[test]
fn test_debunking_item_refutes() {
    let claim = "The Earth is flat.";
    let evidence = vec![debunking_item()];

    let scored = score_items(claim, &evidence);
    assert_eq!(scored[0].stance, -0.9);
    assert!(scored[0].similarity > 0.0);

    let ranking = rank(claim, &evidence, 3, 3);
    assert!(ranking.supporting.is_empty());
    assert_eq!(ranking.refuting.len(), 1);
    assert_eq!(ranking.refuting[0].url, "https://x");
    assert!(ranking.score < 0.0);
}

#[test]
fn test_strong_debunking_is_refuted() {
    let evidence = vec![
        debunking_item(),
        item("Flat Earth myth debunked", "The Earth is not flat", "https://y"),
    ];

    let ranking = rank("The Earth is flat.", &evidence, 3, 3);

    assert_eq!(ranking.refuting.len(), 2);
    assert_eq!(ranking.label, Label::Refuted);
}

#[test]
fn test_lists_respect_caps() {
    let claim = "Apollo 11 landed on the Moon in 1969.";
    let evidence = mixed_evidence();

    for (support_cap, refute_cap) in [(0, 0), (1, 1), (2, 1), (1, 3), (10, 10)] {
        let ranking = rank(claim, &evidence, support_cap, refute_cap);
        assert!(ranking.supporting.len() <= support_cap);
        assert!(ranking.refuting.len() <= refute_cap);
    }
}

#[test]
fn test_aggregate_matches_returned_items() {
    let claim = "Apollo 11 landed on the Moon in 1969.";
    let evidence = mixed_evidence();

    for cap in [1, 2, 3, 6] {
        let ranking = rank(claim, &evidence, cap, cap);
        let recomputed = score_evidence(&ranking.supporting, &ranking.refuting);
        assert!(
            (ranking.score - recomputed).abs() < 1e-9,
            "cap={} score={} recomputed={}",
            cap,
            ranking.score,
            recomputed
        );
    }
}

#[test]
fn test_lists_sorted_descending() {
    let ranking = rank("Apollo 11 landed on the Moon in 1969.", &mixed_evidence(), 10, 10);

    for list in [&ranking.supporting, &ranking.refuting] {
        for pair in list.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_rank_is_idempotent() {
    let claim = "Apollo 11 landed on the Moon in 1969.";
    let evidence = mixed_evidence();

    let first = rank(claim, &evidence, 3, 3);
    let second = rank(claim, &evidence, 3, 3);

    assert_eq!(first, second);
}

#[test]
fn test_empty_claim_or_evidence() {
    for ranking in [rank("", &mixed_evidence(), 3, 3), rank("x", &[], 3, 3)] {
        assert!(ranking.supporting.is_empty());
        assert!(ranking.refuting.is_empty());
        assert_eq!(ranking.score, 0.0);
        assert_eq!(ranking.label, Label::Nei);
    }
}

#[test]
fn test_zero_caps_are_nei() {
    let ranking = rank("Apollo 11 landed on the Moon in 1969.", &mixed_evidence(), 0, 0);

    assert_eq!(ranking.score, 0.0);
    assert_eq!(ranking.label, Label::Nei);
}

#[test]
fn test_returned_items_keep_fields() {
    let evidence = vec![item("Apollo 11", "Landed on the Moon in 1969", "https://a")
        .with_source("wikipedia")
        .with_score(1.0)];

    let ranking = rank("Apollo 11 landed on the Moon in 1969.", &evidence, 3, 3);
    let kept = &ranking.supporting[0];

    assert_eq!(kept.source.as_deref(), Some("wikipedia"));
    assert_eq!(kept.snippet.as_deref(), Some("Landed on the Moon in 1969"));
    // provider rank score is replaced by relevance
    assert!(kept.score > 0.0 && kept.score != 1.0);
}
