//! Deletion-neighborhood index for bounded edit-distance candidate lookup.
//!
//! Every vocabulary word is expanded into the set of strings reachable by
//! deleting up to `max_distance` characters, and each variant points back to
//! the words it came from. A query is expanded the same way and its variants
//! are probed against the index. Two words within Levenshtein distance `d`
//! always share a variant reachable by at most `d` deletions from each, so
//! the probe returns a superset of the true matches while doing work that
//! depends on the query length and the bound, not on the vocabulary size.
//! Candidates still need exact scoring afterwards.

use std::collections::{BTreeSet, HashMap, HashSet};

use wcm_model::Word;

/// Precomputed deletion variants for one vocabulary.
#[derive(Debug, Clone, Default)]
pub struct DeletionIndex {
    /// Sorted vocabulary; variant postings index into it.
    vocabulary: Vec<Word>,
    /// Deletion variant -> ascending vocabulary positions.
    variants: HashMap<String, Vec<u32>>,
    max_distance: usize,
}

impl DeletionIndex {
    /// Builds the index with neighborhoods up to `max_distance` deletions.
    pub fn build<'a>(words: impl IntoIterator<Item = &'a Word>, max_distance: usize) -> Self {
        let mut vocabulary: Vec<Word> = words.into_iter().cloned().collect();
        vocabulary.sort();
        vocabulary.dedup();

        let mut variants: HashMap<String, Vec<u32>> = HashMap::new();
        for (position, word) in vocabulary.iter().enumerate() {
            let position = position as u32;
            for variant in deletion_neighborhood(word.as_str(), max_distance) {
                variants.entry(variant).or_default().push(position);
            }
        }

        Self {
            vocabulary,
            variants,
            max_distance,
        }
    }

    /// Deepest neighborhood precomputed for the vocabulary.
    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Number of distinct deletion variants stored.
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn vocabulary(&self) -> &[Word] {
        &self.vocabulary
    }

    /// Vocabulary words that may lie within `max_distance` edits of `query`.
    ///
    /// The bound is capped at the depth the index was built with. Results are
    /// in vocabulary order and include the query itself when it is a word.
    pub fn candidates(&self, query: &str, max_distance: usize) -> Vec<&Word> {
        let depth = max_distance.min(self.max_distance);
        let mut hits: BTreeSet<u32> = BTreeSet::new();
        for variant in deletion_neighborhood(query, depth) {
            if let Some(postings) = self.variants.get(&variant) {
                hits.extend(postings.iter().copied());
            }
        }
        hits.into_iter()
            .filter_map(|position| self.vocabulary.get(position as usize))
            .collect()
    }
}

/// All strings obtained by deleting up to `depth` characters from `word`,
/// including `word` itself.
pub fn deletion_neighborhood(word: &str, depth: usize) -> HashSet<String> {
    let mut neighborhood = HashSet::new();
    neighborhood.insert(word.to_string());

    let mut frontier = vec![word.chars().collect::<Vec<char>>()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for chars in &frontier {
            for skip in 0..chars.len() {
                let mut shorter = chars.clone();
                shorter.remove(skip);
                let variant: String = shorter.iter().collect();
                if neighborhood.insert(variant) {
                    next.push(shorter);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    neighborhood
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[&str]) -> Vec<Word> {
        values.iter().map(|v| Word::new(v)).collect()
    }

    #[test]
    fn neighborhood_of_short_word() {
        let variants = deletion_neighborhood("abc", 1);
        let expected: HashSet<String> = ["abc", "bc", "ac", "ab"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(variants, expected);

        let deeper = deletion_neighborhood("abc", 2);
        assert!(deeper.contains("a"));
        assert!(deeper.contains("c"));
        assert_eq!(deeper.len(), 7);
    }

    #[test]
    fn neighborhood_counts_characters_not_bytes() {
        let variants = deletion_neighborhood("äb", 1);
        assert!(variants.contains("ä"));
        assert!(variants.contains("b"));
    }

    #[test]
    fn zero_depth_is_the_word_itself() {
        let variants = deletion_neighborhood("date", 0);
        assert_eq!(variants.len(), 1);
        assert!(variants.contains("date"));
    }

    #[test]
    fn candidates_cover_insertions_deletions_and_substitutions() {
        let vocabulary = words(&["date", "start_date", "end_date", "amount"]);
        let index = DeletionIndex::build(&vocabulary, 2);

        let hits = index.candidates("start_dat", 1);
        assert!(hits.iter().any(|w| w.as_str() == "start_date"));

        let hits = index.candidates("daate", 1);
        assert!(hits.iter().any(|w| w.as_str() == "date"));

        let hits = index.candidates("dote", 1);
        assert!(hits.iter().any(|w| w.as_str() == "date"));

        let hits = index.candidates("amuont", 2);
        assert!(hits.iter().any(|w| w.as_str() == "amount"));
    }

    #[test]
    fn bound_is_capped_at_build_depth() {
        let vocabulary = words(&["amount"]);
        let index = DeletionIndex::build(&vocabulary, 1);
        assert!(index.candidates("amnt", 5).is_empty());
    }
}
