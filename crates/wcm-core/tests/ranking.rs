use proptest::prelude::*;

use wcm_core::{TableRanking, rank_tables};
use wcm_map::{Generation, GenerationId, IndexSource, QueryEngine};
use wcm_model::{EditDistancePolicy, SearchOptions, TableName, Word};

fn generation() -> Generation {
    let source = IndexSource::new()
        .with_word("date", &["c1", "c2", "c3", "c4"])
        .with_word("start_date", &["c2", "c4"])
        .with_word("end_date", &["c1", "c3"])
        .with_table("orders", &["c1", "c2"])
        .with_table("shipments", &["c3"])
        .with_table("payments", &["c4"]);
    Generation::build(GenerationId::new(1), source, &EditDistancePolicy::default())
        .expect("build generation")
}

fn ranking_for(words: &[&str]) -> TableRanking {
    let generation = generation();
    let options = SearchOptions::default();
    let selection = QueryEngine::new(&generation, &options)
        .union(words)
        .expect("union");
    rank_tables(&generation, &selection.column_pairs())
}

#[test]
fn ranking_snapshot() {
    let ranking = ranking_for(&["date", "start_date", "end_date"]);
    let json = serde_json::to_string_pretty(&ranking).expect("serialize ranking");
    insta::assert_snapshot!(json, @r#"
    {
      "entries": [
        {
          "table": "orders",
          "keyword_count": 3,
          "frequency": 4,
          "percentage": 50.0,
          "contributing_keywords": [
            "date",
            "end_date",
            "start_date"
          ]
        },
        {
          "table": "payments",
          "keyword_count": 2,
          "frequency": 2,
          "percentage": 25.0,
          "contributing_keywords": [
            "date",
            "start_date"
          ]
        },
        {
          "table": "shipments",
          "keyword_count": 2,
          "frequency": 2,
          "percentage": 25.0,
          "contributing_keywords": [
            "date",
            "end_date"
          ]
        }
      ],
      "total_occurrences": 8
    }
    "#);
}

#[test]
fn ranking_extras() {
    let ranking = ranking_for(&["date", "start_date", "end_date"]);

    let top: Vec<&str> = ranking.top(1).iter().map(|e| e.table.as_str()).collect();
    assert_eq!(top, vec!["orders"]);
    assert_eq!(ranking.top(10).len(), 3);
    assert_eq!(ranking.above_threshold(30.0).len(), 1);
    assert_eq!(ranking.above_threshold(25.0).len(), 3);

    let coverage = ranking
        .keyword_coverage(&TableName::from("payments"))
        .expect("payments ranked");
    assert_eq!(coverage.keyword_count, 2);
    assert_eq!(coverage.keywords, vec![Word::new("date"), Word::new("start_date")]);
    assert_eq!(coverage.total_occurrences, 2);
    assert!(ranking.keyword_coverage(&TableName::from("missing")).is_none());

    let summary = ranking.summary();
    assert_eq!(summary.total_unique_tables, 3);
    assert_eq!(summary.total_occurrences, 8);
    assert_eq!(summary.tables_across_multiple_keywords, 3);
    assert!((summary.average_keywords_per_table - 7.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.multi_keyword_percentage, 100.0);

    let frequencies = ranking.frequencies();
    assert_eq!(frequencies.get(&TableName::from("orders")), Some(&4));
}

#[test]
fn unknown_columns_rank_under_the_unknown_table() {
    let source = IndexSource::new()
        .with_word("date", &["c1", "c2"])
        .with_table("orders", &["c1"]);
    let generation = Generation::build(GenerationId::new(1), source, &EditDistancePolicy::default())
        .expect("build generation");
    let ranking = rank_tables(
        &generation,
        &[
            (Word::new("date"), "c1".into()),
            (Word::new("date"), "c2".into()),
        ],
    );
    let tables: Vec<&str> = ranking.entries().iter().map(|e| e.table.as_str()).collect();
    assert_eq!(tables, vec!["orders", "unknown"]);
}

proptest! {
    #[test]
    fn rankings_are_ordered_and_percentages_sum_to_100(
        hits in prop::collection::vec((0usize..5, 0usize..6), 1..60),
    ) {
        let ranking = TableRanking::from_hits(hits.iter().map(|(word, table)| {
            (Word::new(&format!("w{word}")), TableName::new(format!("t{table}")))
        }));

        for pair in ranking.entries().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!((a.keyword_count, a.frequency) >= (b.keyword_count, b.frequency));
        }
        let total: f64 = ranking.entries().iter().map(|e| e.percentage).sum();
        prop_assert!((total - 100.0).abs() < 1e-6);
        let frequency: usize = ranking.entries().iter().map(|e| e.frequency).sum();
        prop_assert_eq!(frequency, hits.len());
        for entry in ranking.entries() {
            prop_assert_eq!(entry.keyword_count, entry.contributing_keywords.len());
        }
    }
}
