//! Loading mapping, table and relationship sources from disk.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use wcm_core::RelationshipGraph;
use wcm_map::IndexSource;
use wcm_model::{ColumnId, TableName, Word};

use crate::cli::SourceArgs;

const FIELD_NAME: &str = "field_name";
const COLUMN_NAME: &str = "column_name";
const TABLE_NAME: &str = "table_name";

/// Builds the rebuild input described by the CLI arguments.
pub fn load_index_source(args: &SourceArgs) -> Result<IndexSource> {
    let mut source = match (&args.csv, &args.mappings) {
        (Some(csv), _) => read_csv_export(csv)?,
        (None, Some(mappings)) => IndexSource {
            mappings: read_mappings_json(mappings)?,
            column_tables: HashMap::new(),
        },
        (None, None) => bail!("no mapping source given, pass --mappings or --csv"),
    };
    if let Some(tables) = &args.tables {
        source.column_tables.extend(read_column_tables_json(tables)?);
    }
    info!(
        words = source.mappings.len(),
        columns_with_tables = source.column_tables.len(),
        "sources loaded"
    );
    Ok(source)
}

pub fn load_relationships(args: &SourceArgs) -> Result<Option<RelationshipGraph>> {
    args.relationships
        .as_deref()
        .map(read_relationships_json)
        .transpose()
}

/// Reads `{"word": ["column", ...]}`.
pub fn read_mappings_json(path: &Path) -> Result<Vec<(String, Vec<ColumnId>)>> {
    let contents = read(path)?;
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&contents)
        .with_context(|| format!("parse mappings: {}", path.display()))?;
    Ok(raw
        .into_iter()
        .map(|(word, columns)| (word, columns.into_iter().map(ColumnId::from).collect()))
        .collect())
}

/// Reads `{"column": "table"}`.
pub fn read_column_tables_json(path: &Path) -> Result<HashMap<ColumnId, TableName>> {
    let contents = read(path)?;
    let raw: HashMap<ColumnId, TableName> = serde_json::from_str(&contents)
        .with_context(|| format!("parse column tables: {}", path.display()))?;
    Ok(raw)
}

/// Reads a CSV export with `field_name`, `column_name` and `table_name`
/// headers. Words are grouped by their normalized form. Rows without a table
/// still map their word; a later row for the same column overrides its table.
pub fn read_csv_export(path: &Path) -> Result<IndexSource> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers: {}", path.display()))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();
    let position = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .with_context(|| format!("missing '{name}' column in {}", path.display()))
    };
    let field = position(FIELD_NAME)?;
    let column = position(COLUMN_NAME)?;
    let table = position(TABLE_NAME).ok();

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<ColumnId>> = HashMap::new();
    let mut column_tables = HashMap::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let word = record.get(field).unwrap_or("").trim();
        let column_id = record.get(column).unwrap_or("").trim();
        if word.is_empty() || column_id.is_empty() {
            continue;
        }
        // Spellings that normalize alike share one column list.
        let word = Word::new(word).to_string();
        if !grouped.contains_key(&word) {
            order.push(word.clone());
        }
        grouped
            .entry(word)
            .or_default()
            .push(ColumnId::from(column_id));

        let table_name = table
            .and_then(|index| record.get(index))
            .map(str::trim)
            .unwrap_or("");
        if !table_name.is_empty() {
            column_tables.insert(ColumnId::from(column_id), TableName::from(table_name));
        }
    }

    let mappings = order
        .into_iter()
        .filter_map(|word| grouped.remove(&word).map(|columns| (word, columns)))
        .collect();
    Ok(IndexSource {
        mappings,
        column_tables,
    })
}

#[derive(Debug, Deserialize)]
struct RelatedTable {
    table: TableName,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableRelations {
    references: Vec<RelatedTable>,
    referenced_by: Vec<RelatedTable>,
    /// Schema exports nest the two lists one level deeper.
    relationships: Option<Box<TableRelations>>,
}

impl TableRelations {
    fn neighbors(self) -> Vec<TableName> {
        let nested = self
            .relationships
            .map(|inner| inner.neighbors())
            .unwrap_or_default();
        self.references
            .into_iter()
            .chain(self.referenced_by)
            .map(|related| related.table)
            .chain(nested)
            .collect()
    }
}

/// Reads `{"table": {"references": [{"table": ..}], "referenced_by": [..]}}`.
/// Per-table lists may also sit under a `"relationships"` key.
pub fn read_relationships_json(path: &Path) -> Result<RelationshipGraph> {
    let contents = read(path)?;
    let raw: BTreeMap<TableName, TableRelations> = serde_json::from_str(&contents)
        .with_context(|| format!("parse relationships: {}", path.display()))?;
    let graph = RelationshipGraph::from_adjacency(
        raw.into_iter()
            .map(|(table, relations)| (table, relations.neighbors())),
    );
    info!(
        tables = graph.table_count(),
        edges = graph.edge_count(),
        "relationships loaded"
    );
    Ok(graph)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
