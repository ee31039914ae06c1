//! Tests for wcm-model types.

use proptest::prelude::*;

use wcm_model::{
    ColumnId, MapperError, MatchType, SearchResponse, SearchResult, SetOperation,
    SetOperationResult, TableName, ValidationError, Word, normalize,
};

fn exact(word: &str, columns: &[&str]) -> SearchResult {
    SearchResult {
        word: Word::new(word),
        confidence: 1.0,
        match_type: MatchType::Exact,
        edit_distance: Some(0),
        columns: columns.iter().map(|c| ColumnId::from(*c)).collect(),
        changes: None,
    }
}

#[test]
fn word_deserialization_normalizes() {
    let word: Word = serde_json::from_str("\"Start-Date\"").expect("deserialize word");
    assert_eq!(word.as_str(), "start_date");
    let json = serde_json::to_string(&word).expect("serialize word");
    assert_eq!(json, "\"start_date\"");
}

#[test]
fn column_ids_are_kept_verbatim() {
    let column: ColumnId = serde_json::from_str("\" Col 1 \"").expect("deserialize column");
    assert_eq!(column.as_str(), " Col 1 ");
}

#[test]
fn unknown_table_sentinel() {
    assert!(TableName::unknown().is_unknown());
    assert!(!TableName::from("orders").is_unknown());
}

#[test]
fn response_column_views() {
    let response = SearchResponse {
        query: "dat".to_string(),
        normalized: Word::new("dat"),
        exact_match: false,
        results: vec![exact("date", &["c1", "c2", "c1"]), exact("data", &["c2", "c3"])],
        suggestions: Vec::new(),
    };
    assert_eq!(
        response.unique_columns(),
        vec![ColumnId::from("c1"), ColumnId::from("c2"), ColumnId::from("c3")]
    );
    assert_eq!(response.all_columns().len(), 5);
}

#[test]
fn set_result_keeps_duplicate_information() {
    let result = SetOperationResult {
        operation: SetOperation::Intersection,
        resolved: vec![
            exact("date", &["c1", "c2", "c2", "c4"]),
            exact("start_date", &["c2", "c4"]),
        ],
        unresolved: Vec::new(),
        columns: vec![ColumnId::from("c2"), ColumnId::from("c4")],
    };
    let all: Vec<String> = result
        .all_columns()
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    assert_eq!(all, vec!["c2", "c2", "c4", "c2", "c4"]);

    let pairs = result.column_pairs();
    assert_eq!(pairs.len(), 5);
    assert_eq!(pairs[0], (Word::new("date"), ColumnId::from("c2")));
    assert_eq!(pairs[4], (Word::new("start_date"), ColumnId::from("c4")));
}

#[test]
fn set_operation_accepts_boolean_aliases() {
    let op: SetOperation = serde_json::from_str("\"and\"").expect("deserialize and");
    assert_eq!(op, SetOperation::Intersection);
    let op: SetOperation = serde_json::from_str("\"or\"").expect("deserialize or");
    assert_eq!(op, SetOperation::Union);
}

#[test]
fn errors_name_the_offending_input() {
    let error = MapperError::from(ValidationError::EmptyWord {
        word: "date".to_string(),
    });
    assert_eq!(
        error.to_string(),
        "invalid rebuild input: word 'date' maps to zero columns"
    );
    let error = MapperError::ColumnNotFound {
        column: ColumnId::from("c9"),
    };
    assert_eq!(error.to_string(), "column 'c9' is not indexed");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "[A-Za-z0-9 _\\-]{0,24}") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        let word = Word::new(&raw);
        prop_assert_eq!(word.as_str(), once.as_str());
    }

    #[test]
    fn normalized_words_have_no_edge_delimiters(raw in "[a-z _\\-]{0,16}") {
        let word = normalize(&raw);
        prop_assert!(!word.starts_with('_'));
        prop_assert!(!word.ends_with('_'));
        prop_assert!(!word.contains("__"));
    }
}
