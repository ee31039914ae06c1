use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use wcm_cli::cli::{RankArgs, ReverseArgs, SearchArgs, SourceArgs, TraverseArgs, WordsArgs};
use wcm_cli::config::AppConfig;
use wcm_cli::sources::{load_index_source, load_relationships};
use wcm_core::{MapperService, RankingSummary, TableRankEntry, TraversalResult};
use wcm_model::{ColumnId, MapperError, SetOperation, SetOperationResult, Word};

use crate::summary::{
    print_ranking, print_reverse, print_search, print_set_operation, print_stats,
    print_traversal,
};

/// Loads the sources and publishes the first generation.
pub fn open_service(config: &AppConfig, sources: &SourceArgs) -> Result<MapperService> {
    let mut service = MapperService::new(config.search.clone());
    if let Some(cache) = config.cache.build() {
        service = service.with_cache(Arc::new(cache));
    }
    let source = load_index_source(sources)?;
    let graph = load_relationships(sources)?;
    let generation = service
        .rebuild(source, graph)
        .context("build word index")?;
    debug!(%generation, "index ready");
    Ok(service)
}

pub fn run_search(service: &MapperService, args: &SearchArgs, json: bool) -> Result<()> {
    match service.search(&args.word, args.suggestions) {
        Ok(response) if json => print_json(&response),
        Ok(response) => {
            print_search(&response);
            Ok(())
        }
        Err(MapperError::WordNotFound { word, suggestions }) if !suggestions.is_empty() => {
            let names: Vec<&str> = suggestions.iter().map(Word::as_str).collect();
            Err(anyhow::anyhow!(
                "no match for '{word}', did you mean: {}",
                names.join(", ")
            ))
        }
        Err(error) => Err(error.into()),
    }
}

pub fn run_reverse(service: &MapperService, args: &ReverseArgs, json: bool) -> Result<()> {
    let column = ColumnId::new(args.column.as_str());
    let words = service.reverse(&column)?;
    if json {
        return print_json(&words);
    }
    print_reverse(column.as_str(), &words);
    Ok(())
}

pub fn run_set_operation(
    service: &MapperService,
    args: &WordsArgs,
    operation: SetOperation,
    json: bool,
) -> Result<()> {
    let result = service.set_operation(&args.words, operation)?;
    if json {
        return print_json(&result);
    }
    print_set_operation(&result);
    Ok(())
}

#[derive(Serialize)]
struct RankReport<'a> {
    unresolved: &'a [String],
    tables: &'a [TableRankEntry],
    total_occurrences: usize,
    summary: RankingSummary,
}

pub fn run_rank(service: &MapperService, args: &RankArgs, json: bool) -> Result<()> {
    let (selection, ranking) = service.rank_words(&args.words, SetOperation::Union)?;
    let tables = match args.top {
        Some(n) => ranking.top(n),
        None => ranking.entries(),
    };
    info!(tables = ranking.len(), shown = tables.len(), "tables ranked");
    if json {
        return print_json(&RankReport {
            unresolved: &selection.unresolved,
            tables,
            total_occurrences: ranking.total_occurrences(),
            summary: ranking.summary(),
        });
    }
    print_unresolved(&selection);
    print_ranking(tables, ranking.total_occurrences());
    Ok(())
}

#[derive(Serialize)]
struct TraverseReport<'a> {
    max_depth: usize,
    tables: &'a [TableRankEntry],
    traversal: &'a TraversalResult,
}

pub fn run_traverse(
    service: &MapperService,
    args: &TraverseArgs,
    config: &AppConfig,
    json: bool,
) -> Result<()> {
    let max_depth = args.max_depth.unwrap_or(config.traversal.max_depth);
    let (selection, ranking) = service.rank_words(&args.words, SetOperation::Union)?;
    let traversal = service.traverse(&ranking.frequencies(), max_depth);
    if json {
        return print_json(&TraverseReport {
            max_depth,
            tables: ranking.entries(),
            traversal: &traversal,
        });
    }
    print_unresolved(&selection);
    print_ranking(ranking.entries(), ranking.total_occurrences());
    print_traversal(&traversal);
    Ok(())
}

pub fn run_stats(service: &MapperService, json: bool) -> Result<()> {
    let stats = service.stats();
    if json {
        return print_json(&stats);
    }
    print_stats(&stats);
    Ok(())
}

fn print_unresolved(selection: &SetOperationResult) {
    if !selection.unresolved.is_empty() {
        println!("Unresolved: {}", selection.unresolved.join(", "));
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{rendered}");
    Ok(())
}
