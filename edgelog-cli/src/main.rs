//! EdgeLog CLI — trading journal import, annotation, and analysis commands.
//!
//! Commands:
//! - `import` — ingest a broker CSV (or snapshot JSON) into the journal
//! - `demo` — generate a seeded demo journal
//! - `list` / `show` — browse trades, one line each or one trade in full
//! - `stats` — the dashboard: win rate, profit factor, breakdowns, combos
//! - `calendar` — daily net P&L summaries
//! - `merge` / `tag` / `note` / `annotate` — edit reconstructed trades
//! - `export` — trade tape as CSV or the full journal as JSON
//!
//! The journal lives in a single JSON snapshot (default `edgelog.json`);
//! every mutating command loads it, applies the change, and writes it back.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use edgelog_core::config::JournalConfig;
use edgelog_core::demo::generate_demo_journal;
use edgelog_core::domain::{
    Annotation, AnnotationId, Direction, NoteCategory, TagKind, Trade, TradeNotes,
};
use edgelog_core::engine::{
    bar_index, daily_summaries, delete_annotation, merge_trades, save_annotation, toggle_tag,
    Outcome, TradeFilter,
};
use edgelog_core::import::{
    import_mapped, import_text, ColumnMapping, ImportError, Snapshot, TimestampFallback,
};
use edgelog_core::stats::{ComboStat, TagBucket, TradeStatistics};

mod export;
mod persistence;

use persistence::Journal;

#[derive(Parser)]
#[command(name = "edgelog", about = "EdgeLog CLI — personal trading journal")]
struct Cli {
    /// Journal snapshot file.
    #[arg(long, global = true, default_value = "edgelog.json")]
    journal: PathBuf,

    /// TOML config overriding tag vocabularies and contract multipliers.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose diagnostics on stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a broker file, replacing the journal's trades.
    Import {
        /// File to import. `.json` loads a snapshot; anything else is parsed as CSV.
        file: PathBuf,

        /// Column mapping for unrecognized CSV layouts, one field=Header pair
        /// per flag (e.g., --map instrument=Symbol --map pnl=Profit).
        #[arg(long = "map", value_name = "FIELD=HEADER")]
        map: Vec<String>,
    },
    /// Generate a seeded demo journal.
    Demo {
        /// Number of trades to generate.
        #[arg(long, default_value_t = 45)]
        count: usize,

        /// RNG seed. Same seed, same journal.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// List trades, oldest first, optionally filtered.
    List {
        /// Case-insensitive substring match on instrument or setup.
        #[arg(long)]
        query: Option<String>,

        /// Exact setup name.
        #[arg(long)]
        setup: Option<String>,

        /// long or short.
        #[arg(long)]
        direction: Option<String>,

        /// win or loss.
        #[arg(long)]
        outcome: Option<String>,

        /// Show at most this many trades.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one trade in full: executions, tags, notes, annotations.
    Show {
        /// Trade id (a unique prefix is enough).
        id: String,

        /// Session open used to label execution bars (HH:MM, UTC).
        #[arg(long, default_value = "09:30")]
        session_start: String,

        /// Bar timeframe in minutes.
        #[arg(long, default_value_t = 5)]
        timeframe: i64,
    },
    /// Dashboard statistics over the journal, optionally filtered.
    Stats {
        /// Case-insensitive substring match on instrument or setup.
        #[arg(long)]
        query: Option<String>,

        /// Exact setup name.
        #[arg(long)]
        setup: Option<String>,

        /// long or short.
        #[arg(long)]
        direction: Option<String>,

        /// win or loss.
        #[arg(long)]
        outcome: Option<String>,
    },
    /// Daily net P&L summaries.
    Calendar,
    /// Merge two or more trades into one.
    Merge {
        /// Trade ids to merge (unique prefixes are enough).
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,
    },
    /// Toggle a tag on a trade.
    Tag {
        /// Trade id (a unique prefix is enough).
        id: String,

        /// Tag kind: setup, mistake, success, mindset.
        kind: String,

        /// Tag value, e.g. "FOMO".
        value: String,
    },
    /// Replace a note field on a trade.
    Note {
        /// Trade id (a unique prefix is enough).
        id: String,

        /// Note field: entry, exit, mgmt, general.
        #[arg(long, default_value = "general")]
        category: String,

        /// New note text.
        #[arg(long)]
        text: String,
    },
    /// Chart annotation commands.
    Annotate {
        #[command(subcommand)]
        action: AnnotateAction,
    },
    /// Export the journal.
    Export {
        #[command(subcommand)]
        format: ExportFormat,
    },
}

#[derive(Subcommand)]
enum AnnotateAction {
    /// Pin a note to chart coordinates, mirrored into the trade's notes.
    Add {
        /// Trade id (a unique prefix is enough).
        id: String,

        /// Horizontal position, percent of chart width (0-100).
        #[arg(long)]
        x: f64,

        /// Vertical position, percent of chart height (0-100).
        #[arg(long)]
        y: f64,

        /// Annotation text.
        #[arg(long)]
        text: String,

        /// Note field the text is mirrored into: entry, exit, mgmt, general.
        #[arg(long, default_value = "general")]
        category: String,

        /// Apply a tag along with the annotation (requires --tag-value).
        #[arg(long)]
        tag_kind: Option<String>,

        /// Value for --tag-kind.
        #[arg(long)]
        tag_value: Option<String>,
    },
    /// Remove an annotation. The mirrored note line stays.
    Delete {
        /// Trade id (a unique prefix is enough).
        id: String,

        /// Annotation id (a unique prefix is enough).
        annotation_id: String,
    },
}

#[derive(Subcommand)]
enum ExportFormat {
    /// Trade tape as CSV.
    Csv {
        /// Write here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Full journal snapshot as JSON.
    Json {
        /// Write here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut journal = persistence::load(&cli.journal);
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        journal.config = JournalConfig::from_toml(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
    }

    match cli.command {
        Commands::Import { file, map } => run_import(&cli.journal, &mut journal, &file, &map),
        Commands::Demo { count, seed } => run_demo(&cli.journal, &mut journal, count, seed),
        Commands::List {
            query,
            setup,
            direction,
            outcome,
            limit,
        } => run_list(&journal, query, setup, direction, outcome, limit),
        Commands::Show {
            id,
            session_start,
            timeframe,
        } => run_show(&journal, &id, &session_start, timeframe),
        Commands::Stats {
            query,
            setup,
            direction,
            outcome,
        } => run_stats(&journal, query, setup, direction, outcome),
        Commands::Calendar => run_calendar(&journal),
        Commands::Merge { ids } => run_merge(&cli.journal, &mut journal, &ids),
        Commands::Tag { id, kind, value } => {
            run_tag(&cli.journal, &mut journal, &id, &kind, &value)
        }
        Commands::Note { id, category, text } => {
            run_note(&cli.journal, &mut journal, &id, &category, text)
        }
        Commands::Annotate { action } => match action {
            AnnotateAction::Add {
                id,
                x,
                y,
                text,
                category,
                tag_kind,
                tag_value,
            } => run_annotate_add(
                &cli.journal,
                &mut journal,
                &id,
                x,
                y,
                text,
                &category,
                tag_kind,
                tag_value,
            ),
            AnnotateAction::Delete { id, annotation_id } => {
                run_annotate_delete(&cli.journal, &mut journal, &id, &annotation_id)
            }
        },
        Commands::Export { format } => match format {
            ExportFormat::Csv { output } => run_export_csv(&journal, output),
            ExportFormat::Json { output } => run_export_json(&journal, output),
        },
    }
}

fn run_import(
    journal_path: &Path,
    journal: &mut Journal,
    file: &Path,
    map: &[String],
) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    if file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        let snapshot = Snapshot::from_json(&text)?;
        journal.trades = snapshot.trades;
        if let Some(config) = snapshot.config {
            journal.config = config;
        }
        persistence::save(journal_path, journal)?;
        println!("Loaded snapshot: {} trades.", journal.trades.len());
        println!("Journal saved to: {}", journal_path.display());
        return Ok(());
    }

    let fallback = TimestampFallback::processing_instant();
    let result = if map.is_empty() {
        import_text(&text, &journal.config, fallback)
    } else {
        let pairs = parse_map_pairs(map)?;
        let mapping =
            ColumnMapping::from_pairs(pairs.iter().map(|(f, h)| (f.as_str(), h.as_str())))?;
        import_mapped(&text, &mapping, &journal.config, fallback)
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err @ ImportError::UnknownFormat { .. }) => bail!(
            "{err}\nPass --map FIELD=HEADER to describe the layout. Fields: {}",
            ColumnMapping::FIELD_NAMES.join(", ")
        ),
        Err(err) => return Err(err.into()),
    };

    journal.trades = outcome.trades;
    persistence::save(journal_path, journal)?;

    println!();
    println!("=== Import ===");
    println!("File:        {}", file.display());
    println!("Format:      {}", outcome.format);
    println!("Lines read:  {}", outcome.lines_read);
    println!("Executions:  {}", outcome.execution_count);
    println!("Trades:      {}", journal.trades.len());
    println!("Source hash: {}", &outcome.source_hash.0[..16]);
    println!();
    println!("Journal saved to: {}", journal_path.display());
    Ok(())
}

fn run_demo(journal_path: &Path, journal: &mut Journal, count: usize, seed: u64) -> Result<()> {
    journal.trades = generate_demo_journal(count, seed, Utc::now(), &journal.config);
    persistence::save(journal_path, journal)?;
    println!("Generated {} demo trades (seed {seed}).", journal.trades.len());
    println!("Journal saved to: {}", journal_path.display());
    Ok(())
}

fn run_list(
    journal: &Journal,
    query: Option<String>,
    setup: Option<String>,
    direction: Option<String>,
    outcome: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    if journal.trades.is_empty() {
        println!("Journal is empty.");
        return Ok(());
    }

    let filter = build_filter(query, setup, direction, outcome)?;
    let matched = filter.apply(&journal.trades);
    if matched.is_empty() {
        println!("No trades match.");
        return Ok(());
    }

    let shown = limit.unwrap_or(matched.len()).min(matched.len());

    println!(
        "{:<18} {:<10} {:<6} {:<17} {:>12} {:>12}  {}",
        "Id", "Instrument", "Dir", "Opened", "PnL", "Equity", "Setup"
    );
    println!("{}", "-".repeat(92));
    for t in matched.iter().take(shown) {
        println!(
            "{:<18} {:<10} {:<6} {:<17} {:>12} {:>12}  {}",
            t.id.to_string(),
            t.instrument,
            format!("{:?}", t.direction),
            t.open_time.format("%Y-%m-%d %H:%M").to_string(),
            round2(t.realized_pnl),
            round2(t.running_equity),
            label_or_dash(&t.setup)
        );
    }
    println!();
    println!("{shown} of {} trades", journal.trades.len());
    Ok(())
}

fn run_show(journal: &Journal, id: &str, session_start: &str, timeframe: i64) -> Result<()> {
    let trade = find_trade(&journal.trades, id)?;
    let session_open = NaiveTime::parse_from_str(session_start, "%H:%M")
        .with_context(|| format!("invalid --session-start '{session_start}' (expected HH:MM)"))?;

    println!();
    println!("=== Trade {} ===", trade.id);
    println!("Instrument:  {}", trade.instrument);
    println!("Direction:   {:?}", trade.direction);
    println!(
        "Opened:      {}",
        trade.open_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Closed:      {}",
        trade.close_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Duration:    {}", format_duration(trade.duration()));
    println!("PnL:         {}", round2(trade.realized_pnl));
    println!("Equity:      {}", round2(trade.running_equity));
    println!(
        "Outcome:     {}",
        if trade.is_winner() { "win" } else { "loss" }
    );
    println!("Setup:       {}", label_or_dash(&trade.setup));
    println!("Mistakes:    {}", join_or_dash(&trade.mistakes));
    println!("Successes:   {}", join_or_dash(&trade.successes));
    println!("Mindsets:    {}", join_or_dash(&trade.mindsets));

    println!();
    println!("--- Executions ---");
    for rec in &trade.executions {
        let bar = bar_index(rec.execution.timestamp, session_open, timeframe).to_string();
        let mut line = format!(
            "{:<8} {:<5} {:>6} @ {:<10} {:<6} pos {}",
            bar,
            format!("{:?}", rec.execution.side),
            rec.execution.quantity.to_string(),
            rec.execution.price.to_string(),
            format!("{:?}", rec.role),
            rec.position_after
        );
        if let Some(pnl) = rec.execution.pnl_contribution {
            line.push_str(&format!("   pnl {}", round2(pnl)));
        }
        println!("{line}");
    }

    print_notes(&trade.notes);

    if !trade.annotations.is_empty() {
        println!();
        println!("--- Annotations ---");
        for a in &trade.annotations {
            let mut line = format!(
                "{:<14} ({:.0}%, {:.0}%) [{}] {}",
                a.id.to_string(),
                a.x,
                a.y,
                category_label(a.category),
                a.text
            );
            if let (Some(kind), Some(value)) = (a.tag_type, &a.tag_value) {
                line.push_str(&format!("  +{} '{value}'", kind_label(kind)));
            }
            println!("{line}");
        }
    }
    println!();
    Ok(())
}

fn run_stats(
    journal: &Journal,
    query: Option<String>,
    setup: Option<String>,
    direction: Option<String>,
    outcome: Option<String>,
) -> Result<()> {
    let filter = build_filter(query, setup, direction, outcome)?;
    let matched = filter.apply(&journal.trades);

    let Some(stats) = TradeStatistics::compute(&matched, &journal.config) else {
        println!("No trades to analyze.");
        return Ok(());
    };

    print_stats(&stats, matched.len(), journal.trades.len());
    Ok(())
}

fn run_calendar(journal: &Journal) -> Result<()> {
    let days = daily_summaries(&journal.trades);
    if days.is_empty() {
        println!("Journal is empty.");
        return Ok(());
    }

    println!("{:<12} {:>7} {:>12}", "Date", "Trades", "PnL");
    println!("{}", "-".repeat(33));
    let mut total = Decimal::ZERO;
    let mut count = 0;
    for day in &days {
        total += day.pnl;
        count += day.count;
        println!(
            "{:<12} {:>7} {:>12}",
            day.date.to_string(),
            day.count,
            round2(day.pnl)
        );
    }
    println!("{}", "-".repeat(33));
    println!("{:<12} {:>7} {:>12}", "Total", count, round2(total));
    Ok(())
}

fn run_merge(journal_path: &Path, journal: &mut Journal, ids: &[String]) -> Result<()> {
    let mut resolved = Vec::with_capacity(ids.len());
    for prefix in ids {
        resolved.push(find_trade(&journal.trades, prefix)?.id.clone());
    }

    match merge_trades(&mut journal.trades, &resolved) {
        Some(merged_id) => {
            persistence::save(journal_path, journal)?;
            println!("Merged {} trades into {merged_id}.", resolved.len());
            Ok(())
        }
        None => bail!("nothing merged: need at least two distinct matching trades"),
    }
}

fn run_tag(
    journal_path: &Path,
    journal: &mut Journal,
    id: &str,
    kind: &str,
    value: &str,
) -> Result<()> {
    let kind = parse_tag_kind(kind)?;
    let idx = find_trade_index(&journal.trades, id)?;
    if !journal.config.vocabulary(kind).iter().any(|v| v == value) {
        warn!(
            "'{value}' is not in the configured {} vocabulary",
            kind_label(kind)
        );
    }

    let trade = &mut journal.trades[idx];
    let added = toggle_tag(trade, kind, value);
    let trade_id = trade.id.clone();
    persistence::save(journal_path, journal)?;

    if added {
        println!("Tagged {trade_id}: {} '{value}'.", kind_label(kind));
    } else {
        println!("Removed {} '{value}' from {trade_id}.", kind_label(kind));
    }
    Ok(())
}

fn run_note(
    journal_path: &Path,
    journal: &mut Journal,
    id: &str,
    category: &str,
    text: String,
) -> Result<()> {
    let category = parse_note_category(category)?;
    let idx = find_trade_index(&journal.trades, id)?;
    journal.trades[idx].set_note(category, text);
    let trade_id = journal.trades[idx].id.clone();
    persistence::save(journal_path, journal)?;
    println!("Note saved on {trade_id}.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_annotate_add(
    journal_path: &Path,
    journal: &mut Journal,
    id: &str,
    x: f64,
    y: f64,
    text: String,
    category: &str,
    tag_kind: Option<String>,
    tag_value: Option<String>,
) -> Result<()> {
    let category = parse_note_category(category)?;
    let tag = match (tag_kind, tag_value) {
        (Some(kind), Some(value)) => Some((parse_tag_kind(&kind)?, value)),
        (None, None) => None,
        _ => bail!("--tag-kind and --tag-value must be given together"),
    };
    let x = x.clamp(0.0, 100.0);
    let y = y.clamp(0.0, 100.0);

    let idx = find_trade_index(&journal.trades, id)?;
    let trade = &mut journal.trades[idx];

    let annotation_id = AnnotationId::derive(&trade.id, x, y, &text);
    let mut annotation = Annotation::new(annotation_id.clone(), x, y, text, category);
    if let Some((kind, value)) = tag {
        annotation = annotation.with_tag(kind, value);
    }
    save_annotation(trade, annotation);
    let trade_id = trade.id.clone();
    persistence::save(journal_path, journal)?;

    println!("Annotation {annotation_id} saved on {trade_id}.");
    Ok(())
}

fn run_annotate_delete(
    journal_path: &Path,
    journal: &mut Journal,
    id: &str,
    annotation_id: &str,
) -> Result<()> {
    let idx = find_trade_index(&journal.trades, id)?;
    let trade = &mut journal.trades[idx];

    let matches: Vec<AnnotationId> = trade
        .annotations
        .iter()
        .filter(|a| a.id.0.starts_with(annotation_id))
        .map(|a| a.id.clone())
        .collect();
    let full_id = match matches.as_slice() {
        [] => bail!("no annotation matches '{annotation_id}' on {}", trade.id),
        [only] => only.clone(),
        _ => bail!(
            "annotation id '{annotation_id}' is ambiguous ({} matches)",
            matches.len()
        ),
    };

    delete_annotation(trade, &full_id);
    persistence::save(journal_path, journal)?;
    println!("Annotation {full_id} removed.");
    Ok(())
}

fn run_export_csv(journal: &Journal, output: Option<PathBuf>) -> Result<()> {
    let csv = export::export_trades_csv(&journal.trades)?;
    write_output(&csv, output.as_deref(), journal.trades.len())
}

fn run_export_json(journal: &Journal, output: Option<PathBuf>) -> Result<()> {
    let json = export::export_journal_json(journal)?;
    write_output(&json, output.as_deref(), journal.trades.len())
}

fn write_output(text: &str, output: Option<&Path>, count: usize) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {count} trades to {}", path.display());
        }
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

// ─── Lookup and parsing helpers ─────────────────────────────────────

fn find_trade<'a>(trades: &'a [Trade], prefix: &str) -> Result<&'a Trade> {
    Ok(&trades[find_trade_index(trades, prefix)?])
}

fn find_trade_index(trades: &[Trade], prefix: &str) -> Result<usize> {
    let matches: Vec<usize> = trades
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id.0.starts_with(prefix))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [] => bail!("no trade matches id '{prefix}'"),
        [idx] => Ok(*idx),
        _ => bail!(
            "trade id '{prefix}' is ambiguous ({} matches)",
            matches.len()
        ),
    }
}

fn build_filter(
    query: Option<String>,
    setup: Option<String>,
    direction: Option<String>,
    outcome: Option<String>,
) -> Result<TradeFilter> {
    let direction = direction
        .as_deref()
        .map(|s| s.parse::<Direction>().map_err(anyhow::Error::msg))
        .transpose()?;
    let outcome = outcome
        .as_deref()
        .map(|s| s.parse::<Outcome>().map_err(anyhow::Error::msg))
        .transpose()?;
    Ok(TradeFilter {
        query,
        setup,
        direction,
        outcome,
    })
}

fn parse_map_pairs(map: &[String]) -> Result<Vec<(String, String)>> {
    map.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(field, header)| (field.trim().to_string(), header.trim().to_string()))
                .ok_or_else(|| anyhow!("invalid --map '{pair}': expected FIELD=HEADER"))
        })
        .collect()
}

fn parse_tag_kind(name: &str) -> Result<TagKind> {
    match name.to_lowercase().as_str() {
        "setup" => Ok(TagKind::Setup),
        "mistake" => Ok(TagKind::Mistake),
        "success" => Ok(TagKind::Success),
        "mindset" => Ok(TagKind::Mindset),
        _ => bail!("unknown tag kind '{name}'. Valid: setup, mistake, success, mindset"),
    }
}

fn parse_note_category(name: &str) -> Result<NoteCategory> {
    match name.to_lowercase().as_str() {
        "entry" => Ok(NoteCategory::Entry),
        "exit" => Ok(NoteCategory::Exit),
        "mgmt" | "management" => Ok(NoteCategory::Management),
        "general" => Ok(NoteCategory::General),
        _ => bail!("unknown note category '{name}'. Valid: entry, exit, mgmt, general"),
    }
}

// ─── Output helpers ─────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stats(stats: &TradeStatistics, matched: usize, total: usize) {
    println!();
    println!("=== Journal Statistics ===");
    if matched == total {
        println!("Trades:         {}", stats.trade_count);
    } else {
        println!("Trades:         {} (of {total})", stats.trade_count);
    }
    println!("Wins / Losses:  {} / {}", stats.win_count, stats.loss_count);
    println!("Total PnL:      {}", round2(stats.total_pnl));
    println!();
    println!("--- Performance ---");
    println!("Win Rate:       {:.1}%", stats.win_rate);
    println!("Profit Factor:  {}", round2(stats.profit_factor));
    println!("Avg Win:        {}", round2(stats.avg_win));
    println!("Avg Loss:       {}", round2(stats.avg_loss));
    println!("R Ratio:        {}", round2(stats.r_ratio));
    println!("Expectancy:     {}", round2(stats.expectancy));

    print_breakdown("Setups", &stats.by_setup);
    print_breakdown("Mistakes", &stats.by_mistake);
    print_breakdown("Successes", &stats.by_success);
    print_breakdown("Mindsets", &stats.by_mindset);

    if !stats.setup_metrics.is_empty() {
        println!();
        println!("--- Setup Scorecard ---");
        println!(
            "{:<20} {:>6} {:>7} {:>8} {:>12} {:>12}",
            "Setup", "Count", "Win%", "PF", "Expectancy", "PnL"
        );
        println!("{}", "-".repeat(70));
        for m in &stats.setup_metrics {
            println!(
                "{:<20} {:>6} {:>7} {:>8} {:>12} {:>12}",
                m.setup,
                m.count,
                format!("{:.1}", m.win_rate),
                round2(m.profit_factor),
                round2(m.expectancy),
                round2(m.pnl)
            );
        }
    }

    if let Some(best) = &stats.best_combo {
        println!();
        println!("--- Combos ---");
        println!("Best:   {}", combo_line(best));
        if let Some(worst) = &stats.worst_combo {
            println!("Worst:  {}", combo_line(worst));
        }
    }
    println!();
}

fn print_breakdown(title: &str, buckets: &[TagBucket]) {
    if buckets.is_empty() {
        return;
    }
    println!();
    println!("--- {title} ---");
    for b in buckets {
        println!("{:<20} {:>5} {:>12}", b.label, b.count, round2(b.pnl));
    }
}

fn print_notes(notes: &TradeNotes) {
    let sections = [
        ("entry", notes.entry.as_str()),
        ("exit", notes.exit.as_str()),
        ("mgmt", notes.management.as_str()),
        ("general", notes.general.as_str()),
    ];
    if sections.iter().all(|(_, text)| text.is_empty()) {
        return;
    }
    println!();
    println!("--- Notes ---");
    for (label, text) in sections {
        if !text.is_empty() {
            println!("[{label}]");
            for line in text.lines() {
                println!("  {line}");
            }
        }
    }
}

fn combo_line(combo: &ComboStat) -> String {
    format!(
        "{}  ({} trades, expectancy {})",
        combo.label,
        combo.count,
        round2(combo.expectancy)
    )
}

fn round2(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn format_duration(d: chrono::Duration) -> String {
    let minutes = d.num_minutes();
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

fn label_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn kind_label(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Setup => "setup",
        TagKind::Mistake => "mistake",
        TagKind::Success => "success",
        TagKind::Mindset => "mindset",
    }
}

fn category_label(category: NoteCategory) -> &'static str {
    match category {
        NoteCategory::Entry => "entry",
        NoteCategory::Exit => "exit",
        NoteCategory::Management => "mgmt",
        NoteCategory::General => "general",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_pairs_parse() {
        let pairs =
            parse_map_pairs(&["instrument=Symbol".into(), "pnl=Net Profit".into()]).unwrap();
        assert_eq!(pairs[0], ("instrument".into(), "Symbol".into()));
        assert_eq!(pairs[1], ("pnl".into(), "Net Profit".into()));
    }

    #[test]
    fn map_pairs_reject_missing_equals() {
        assert!(parse_map_pairs(&["instrument".into()]).is_err());
    }

    #[test]
    fn tag_kind_parses_case_insensitively() {
        assert_eq!(parse_tag_kind("Mistake").unwrap(), TagKind::Mistake);
        assert!(parse_tag_kind("vibe").is_err());
    }

    #[test]
    fn note_category_accepts_both_mgmt_spellings() {
        assert_eq!(
            parse_note_category("mgmt").unwrap(),
            NoteCategory::Management
        );
        assert_eq!(
            parse_note_category("management").unwrap(),
            NoteCategory::Management
        );
    }

    #[test]
    fn duration_formats_hours_and_minutes() {
        assert_eq!(format_duration(chrono::Duration::minutes(34)), "34m");
        assert_eq!(format_duration(chrono::Duration::minutes(95)), "1h 35m");
    }

    #[test]
    fn filter_build_rejects_bad_outcome() {
        assert!(build_filter(None, None, None, Some("draw".into())).is_err());
    }
}
