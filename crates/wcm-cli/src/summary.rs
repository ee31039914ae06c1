use std::collections::BTreeSet;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use wcm_core::{TableRankEntry, TraversalResult};
use wcm_map::IndexStats;
use wcm_model::{ColumnId, MatchType, SearchResponse, SearchResult, SetOperationResult, TableName, Word};

pub fn print_search(response: &SearchResponse) {
    println!("Query: {} (normalized: {})", response.query, response.normalized);
    if response.results.is_empty() {
        println!("No matches.");
    } else {
        print_results(&response.results);
    }
    if !response.suggestions.is_empty() {
        println!("Did you mean: {}", join_words(&response.suggestions));
    }
}

pub fn print_reverse(column: &str, words: &BTreeSet<Word>) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Word")]);
    apply_table_style(&mut table);
    for word in words {
        table.add_row(vec![Cell::new(word)]);
    }
    println!("Column: {column}");
    println!("{table}");
}

pub fn print_set_operation(result: &SetOperationResult) {
    println!("Operation: {}", result.operation.as_str());
    print_results(&result.resolved);
    if !result.unresolved.is_empty() {
        println!("Unresolved: {}", result.unresolved.join(", "));
    }
    let columns: Vec<&str> = result.columns.iter().map(ColumnId::as_str).collect();
    println!("Columns ({}): {}", columns.len(), columns.join(", "));
}

pub fn print_ranking(entries: &[TableRankEntry], total_occurrences: usize) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Table"),
        header_cell("Keywords"),
        header_cell("Frequency"),
        header_cell("Share"),
        header_cell("Contributing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (rank, entry) in entries.iter().enumerate() {
        let contributing: Vec<&Word> = entry.contributing_keywords.iter().collect();
        table.add_row(vec![
            dim_cell(rank + 1),
            table_cell(&entry.table),
            Cell::new(entry.keyword_count),
            Cell::new(entry.frequency),
            Cell::new(format!("{:.1}%", entry.percentage)),
            Cell::new(join_words(contributing)),
        ]);
    }
    println!("{table}");
    println!("Total occurrences: {total_occurrences}");
}

pub fn print_traversal(result: &TraversalResult) {
    if !result.performed {
        println!("No relationship graph loaded; showing original tables only.");
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Source")]);
    apply_table_style(&mut table);
    for name in &result.all {
        let source = if result.seeds.contains(name) {
            Cell::new("seed").fg(Color::Green).add_attribute(Attribute::Bold)
        } else if result.related.contains(name) {
            Cell::new("related").fg(Color::Yellow)
        } else {
            dim_cell("original")
        };
        table.add_row(vec![table_cell(name), source]);
    }
    println!("{table}");
    if !result.visit_order.is_empty() {
        let order: Vec<&str> = result.visit_order.iter().map(TableName::as_str).collect();
        println!("Visit order: {}", order.join(" -> "));
    }
}

pub fn print_stats(stats: &IndexStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Generation", stats.generation.get() as usize),
        ("Words", stats.total_words),
        ("Mappings", stats.total_mappings),
        ("Unique columns", stats.unique_columns),
        ("Tables", stats.tables),
        ("Columns without table", stats.unknown_table_columns),
        ("Deletion variants", stats.deletion_variants),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");
}

fn print_results(results: &[SearchResult]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Word"),
        header_cell("Match"),
        header_cell("Confidence"),
        header_cell("Distance"),
        header_cell("Changes"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for result in results {
        let columns: Vec<&str> = result.columns.iter().map(ColumnId::as_str).collect();
        table.add_row(vec![
            Cell::new(&result.word).add_attribute(Attribute::Bold),
            match_cell(result.match_type),
            Cell::new(format!("{:.2}", result.confidence)),
            result.edit_distance.map_or_else(|| dim_cell("-"), Cell::new),
            result
                .changes
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(columns.join(", ")),
        ]);
    }
    println!("{table}");
}

fn join_words<'a>(words: impl IntoIterator<Item = &'a Word>) -> String {
    words
        .into_iter()
        .map(Word::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn table_cell(name: &TableName) -> Cell {
    if name.is_unknown() {
        dim_cell(name)
    } else {
        Cell::new(name).fg(Color::Blue).add_attribute(Attribute::Bold)
    }
}

fn match_cell(match_type: MatchType) -> Cell {
    match match_type {
        MatchType::Exact => Cell::new("exact").fg(Color::Green),
        MatchType::Fuzzy => Cell::new("fuzzy").fg(Color::Yellow),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
