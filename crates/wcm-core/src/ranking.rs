//! Table-level aggregation of resolved columns.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use wcm_map::Generation;
use wcm_model::{ColumnId, TableName, Word};

/// Per-table statistics for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRankEntry {
    pub table: TableName,
    /// Distinct query words contributing at least one column.
    pub keyword_count: usize,
    /// (word, column) pairs landing on this table, repeats included.
    pub frequency: usize,
    /// Share of all occurrences, 0 to 100.
    pub percentage: f64,
    pub contributing_keywords: BTreeSet<Word>,
}

/// Which words touched a table, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCoverage {
    pub table: TableName,
    pub keyword_count: usize,
    pub keywords: Vec<Word>,
    pub total_occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSummary {
    pub total_unique_tables: usize,
    pub total_occurrences: usize,
    pub average_keywords_per_table: f64,
    pub tables_across_multiple_keywords: usize,
    pub multi_keyword_percentage: f64,
}

/// Ordered ranking: `keyword_count` desc, then `frequency` desc, then
/// table name asc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRanking {
    entries: Vec<TableRankEntry>,
    total_occurrences: usize,
}

/// `frequency / total * 100`, or 0 when nothing was counted.
pub fn percentage(frequency: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        frequency as f64 / total as f64 * 100.0
    }
}

fn rank_order(a: &TableRankEntry, b: &TableRankEntry) -> Ordering {
    b.keyword_count
        .cmp(&a.keyword_count)
        .then_with(|| b.frequency.cmp(&a.frequency))
        .then_with(|| a.table.cmp(&b.table))
}

/// Ranks the tables owning `columns` in `generation`.
///
/// Columns the generation does not know are counted against the unknown
/// table, like columns built without a table entry.
pub fn rank_tables(generation: &Generation, columns: &[(Word, ColumnId)]) -> TableRanking {
    let hits = columns.iter().map(|(word, column)| {
        let table = match generation.table_of(column) {
            Some(table) => table.clone(),
            None => {
                debug!(column = column.as_str(), "ranking column outside the generation");
                TableName::unknown()
            }
        };
        (word.clone(), table)
    });
    TableRanking::from_hits(hits)
}

impl TableRanking {
    /// Builds a ranking from `(word, table)` hits.
    pub fn from_hits(hits: impl IntoIterator<Item = (Word, TableName)>) -> Self {
        let mut tallies: BTreeMap<TableName, (usize, BTreeSet<Word>)> = BTreeMap::new();
        let mut total_occurrences = 0;
        for (word, table) in hits {
            let (frequency, keywords) = tallies.entry(table).or_default();
            *frequency += 1;
            keywords.insert(word);
            total_occurrences += 1;
        }

        let mut entries: Vec<TableRankEntry> = tallies
            .into_iter()
            .map(|(table, (frequency, keywords))| TableRankEntry {
                table,
                keyword_count: keywords.len(),
                frequency,
                percentage: percentage(frequency, total_occurrences),
                contributing_keywords: keywords,
            })
            .collect();
        entries.sort_by(rank_order);

        Self {
            entries,
            total_occurrences,
        }
    }

    pub fn entries(&self) -> &[TableRankEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TableRankEntry> {
        self.entries
    }

    pub fn total_occurrences(&self) -> usize {
        self.total_occurrences
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, n: usize) -> &[TableRankEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Entries whose percentage is at least `min_percentage`, in rank order.
    pub fn above_threshold(&self, min_percentage: f64) -> Vec<&TableRankEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.percentage >= min_percentage)
            .collect()
    }

    pub fn keyword_coverage(&self, table: &TableName) -> Option<KeywordCoverage> {
        self.entries
            .iter()
            .find(|entry| &entry.table == table)
            .map(|entry| KeywordCoverage {
                table: entry.table.clone(),
                keyword_count: entry.keyword_count,
                keywords: entry.contributing_keywords.iter().cloned().collect(),
                total_occurrences: entry.frequency,
            })
    }

    pub fn summary(&self) -> RankingSummary {
        let tables = self.entries.len();
        let keyword_total: usize = self.entries.iter().map(|entry| entry.keyword_count).sum();
        let multi = self
            .entries
            .iter()
            .filter(|entry| entry.keyword_count > 1)
            .count();
        RankingSummary {
            total_unique_tables: tables,
            total_occurrences: self.total_occurrences,
            average_keywords_per_table: if tables == 0 {
                0.0
            } else {
                keyword_total as f64 / tables as f64
            },
            tables_across_multiple_keywords: multi,
            multi_keyword_percentage: percentage(multi, tables),
        }
    }

    /// Table to frequency, the input for relationship traversal.
    pub fn frequencies(&self) -> BTreeMap<TableName, usize> {
        self.entries
            .iter()
            .map(|entry| (entry.table.clone(), entry.frequency))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(word: &str, table: &str) -> (Word, TableName) {
        (Word::new(word), TableName::from(table))
    }

    #[test]
    fn distinct_keywords_outrank_raw_frequency() {
        let ranking = TableRanking::from_hits([
            hit("date", "events"),
            hit("date", "events"),
            hit("date", "events"),
            hit("date", "orders"),
            hit("amount", "orders"),
        ]);
        let tables: Vec<&str> = ranking
            .entries()
            .iter()
            .map(|entry| entry.table.as_str())
            .collect();
        assert_eq!(tables, vec!["orders", "events"]);
        assert_eq!(ranking.entries()[0].keyword_count, 2);
        assert_eq!(ranking.entries()[1].frequency, 3);
    }

    #[test]
    fn ties_break_on_table_name() {
        let ranking = TableRanking::from_hits([hit("date", "zeta"), hit("date", "alpha")]);
        assert_eq!(ranking.entries()[0].table.as_str(), "alpha");
    }

    #[test]
    fn empty_ranking() {
        let ranking = TableRanking::from_hits(std::iter::empty::<(Word, TableName)>());
        assert!(ranking.is_empty());
        let summary = ranking.summary();
        assert_eq!(summary.total_unique_tables, 0);
        assert_eq!(summary.average_keywords_per_table, 0.0);
        assert_eq!(summary.multi_keyword_percentage, 0.0);
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
