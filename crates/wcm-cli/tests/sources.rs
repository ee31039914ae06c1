use std::fs;
use std::path::PathBuf;

use wcm_cli::cli::SourceArgs;
use wcm_cli::sources::{
    load_index_source, load_relationships, read_csv_export, read_mappings_json,
    read_relationships_json,
};
use wcm_map::{Generation, GenerationId};
use wcm_model::{ColumnId, EditDistancePolicy, TableName, Word};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("wcm_cli_sources_{stamp}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn ids(values: &[&str]) -> Vec<ColumnId> {
    values.iter().map(|value| ColumnId::from(*value)).collect()
}

fn names(graph: &wcm_core::RelationshipGraph, table: &str) -> Vec<String> {
    graph
        .neighbors(&TableName::from(table))
        .map(|name| name.as_str().to_string())
        .collect()
}

#[test]
fn reads_mappings_json_in_word_order() {
    let path = temp_file(
        "mappings.json",
        r#"{"start_date": ["c2", "c4"], "date": ["c1", "c2"]}"#,
    );
    let mappings = read_mappings_json(&path).expect("read mappings");
    assert_eq!(
        mappings,
        vec![
            ("date".to_string(), ids(&["c1", "c2"])),
            ("start_date".to_string(), ids(&["c2", "c4"])),
        ]
    );
    let _ = fs::remove_file(&path);
}

#[test]
fn reads_csv_export_with_bom_and_blank_tables() {
    let path = temp_file(
        "export.csv",
        "\u{feff}field_name,column_name,table_name\n\
         date, c1 ,orders\n\
         start_date,c2,orders\n\
         date,c2,orders\n\
         date,c3,\n\
         ,c9,ghosts\n",
    );
    let source = read_csv_export(&path).expect("read csv");
    assert_eq!(
        source.mappings,
        vec![
            ("date".to_string(), ids(&["c1", "c2", "c3"])),
            ("start_date".to_string(), ids(&["c2"])),
        ]
    );
    assert_eq!(
        source.column_tables.get(&ColumnId::from("c1")),
        Some(&TableName::from("orders"))
    );
    assert!(!source.column_tables.contains_key(&ColumnId::from("c3")));
    assert!(!source.column_tables.contains_key(&ColumnId::from("c9")));
    let _ = fs::remove_file(&path);
}

#[test]
fn csv_export_requires_word_and_column_headers() {
    let path = temp_file("broken.csv", "word,column\ndate,c1\n");
    let error = read_csv_export(&path).unwrap_err();
    assert!(format!("{error:#}").contains("field_name"));
    let _ = fs::remove_file(&path);
}

#[test]
fn reads_flat_relationships() {
    let path = temp_file(
        "relationships.json",
        r#"{
            "orders": {"references": [{"table": "customers"}], "referenced_by": [{"table": "payments"}]},
            "customers": {"references": [], "referenced_by": [{"table": "orders"}]}
        }"#,
    );
    let graph = read_relationships_json(&path).expect("read relationships");
    assert_eq!(names(&graph, "orders"), vec!["customers", "payments"]);
    assert_eq!(names(&graph, "payments"), vec!["orders"]);
    let _ = fs::remove_file(&path);
}

#[test]
fn reads_nested_relationships() {
    let path = temp_file(
        "schema.json",
        r#"{
            "orders": {
                "columns": ["c1"],
                "relationships": {"references": [{"table": "customers", "column": "customer_id"}]}
            }
        }"#,
    );
    let graph = read_relationships_json(&path).expect("read relationships");
    assert_eq!(names(&graph, "customers"), vec!["orders"]);
    let _ = fs::remove_file(&path);
}

#[test]
fn table_index_overrides_csv_tables() {
    let csv = temp_file("export.csv", "field_name,column_name,table_name\ndate,c1,orders\n");
    let tables = temp_file("tables.json", r#"{"c1": "archive"}"#);
    let args = SourceArgs {
        csv: Some(csv.clone()),
        tables: Some(tables.clone()),
        ..SourceArgs::default()
    };
    let source = load_index_source(&args).expect("load source");
    assert_eq!(
        source.column_tables.get(&ColumnId::from("c1")),
        Some(&TableName::from("archive"))
    );
    assert!(load_relationships(&args).expect("no graph").is_none());
    let _ = fs::remove_file(&csv);
    let _ = fs::remove_file(&tables);
}

#[test]
fn missing_mapping_source_is_an_error() {
    let error = load_index_source(&SourceArgs::default()).unwrap_err();
    assert!(error.to_string().contains("--mappings"));
}

#[test]
fn csv_spellings_of_one_word_share_a_column_list() {
    let path = temp_file(
        "spellings.csv",
        "field_name,column_name,table_name\n\
         Date,c1,orders\n\
         date,c2,orders\n\
         Start-Date,c3,orders\n\
         start_date,c4,payments\n",
    );
    let source = read_csv_export(&path).expect("read csv");
    assert_eq!(
        source.mappings,
        vec![
            ("date".to_string(), ids(&["c1", "c2"])),
            ("start_date".to_string(), ids(&["c3", "c4"])),
        ]
    );

    let generation = Generation::build(GenerationId::new(1), source, &EditDistancePolicy::default())
        .expect("spellings merge instead of colliding");
    assert_eq!(
        generation.columns(&Word::new("DATE")),
        Some(ids(&["c1", "c2"]).as_slice())
    );
    let _ = fs::remove_file(&path);
}
