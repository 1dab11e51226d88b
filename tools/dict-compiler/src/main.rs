mod merge;
mod report;
mod source;

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wordtrie_builder::TrieBuilder;
use wordtrie_protocol::MAX_DICTIONARY_SIZE;
use wordtrie_writer::{serialize, WriterConfig};

use crate::merge::WordListMerger;
use crate::report::CompileReport;
use crate::source::SourceFormat;

#[derive(Parser)]
#[command(author, version, about = "Compiles a frequency word list into a binary trie dictionary")]
struct Cli {
    /// Word list to compile; repeat to merge several lists
    #[arg(short, long, value_name = "FILE", required = true)]
    input: Vec<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Word list layout; inferred from each input's extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<SourceFormat>,

    /// Words to drop from the merged list, one per line
    #[arg(long, value_name = "FILE")]
    discard: Option<PathBuf>,

    /// Recompute relative frequencies from the absolute counts
    #[arg(long)]
    normalize: bool,

    /// Output ceiling in bytes (at most 4 MiB)
    #[arg(long, value_name = "BYTES", default_value_t = MAX_DICTIONARY_SIZE)]
    capacity: usize,

    /// Write build statistics as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log the nested trie at debug level before serializing
    #[arg(long)]
    dump_trie: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = WriterConfig::with_capacity(cli.capacity)?;

    let mut merger = WordListMerger::new();
    for input in &cli.input {
        let format = cli.format.unwrap_or_else(|| SourceFormat::infer(input));
        info!(input = %input.display(), ?format, "reading word list");
        let content = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let list = source::parse(&content, format)
            .with_context(|| format!("failed to parse {}", input.display()))?;
        merger.add_list(list);
        info!(words = merger.len(), "loaded words in total");
    }

    if let Some(path) = &cli.discard {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let removed = merger.discard(merge::discard_words(&content));
        info!(discard = %path.display(), removed, "discarded words");
    }

    let (mut entries, merged) = merger.finish();
    if cli.normalize {
        merge::normalize(&mut entries).context("failed to normalize frequencies")?;
        info!(entries = entries.len(), "frequencies normalized");
    }

    info!(entries = entries.len(), duplicates = merged.duplicates, "building trie");
    let mut builder = TrieBuilder::new();
    builder.extend(&entries);
    let (trie, build) = builder.finish();
    info!(nodes = build.nodes, words = build.words_added, ignored = build.words_ignored, "trie built");

    if cli.dump_trie {
        debug!(trie = %trie, "trie dump");
    }

    let dict = serialize(&trie, &config);

    // The absolute frequency only lives in the word list
    let last_absolute = dict.truncation().and_then(|t| {
        entries.iter().rev().find(|e| e.word == t.last_word).and_then(|e| e.absolute)
    });
    if let Some(truncation) = dict.truncation() {
        warn!(
            words_written = truncation.words_written,
            last_word = %truncation.last_word,
            relative_frequency = truncation.last_frequency,
            absolute_frequency = ?last_absolute,
            "could not write all the words due to the size ceiling"
        );
    }

    let stats = dict.stats();
    info!(
        size = stats.bytes_written,
        null_children = stats.null_children,
        non_terminal = stats.non_terminal,
        "dictionary compiled"
    );

    fs::write(&cli.output, dict.as_bytes())
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if let Some(path) = &cli.report {
        let report = CompileReport {
            input: &cli.input,
            output: &cli.output,
            merge: &merged,
            build: &build,
            write: stats,
            truncation: dict.truncation(),
            last_absolute_frequency: last_absolute,
        };
        let json = serde_json::to_vec_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(output = %cli.output.display(), "binary written");
    Ok(())
}
