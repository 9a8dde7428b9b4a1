use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::export::{self, ConflictPolicy, ExportStatus};
use cli::{ingest, report, watch};
use sorter_core::classifier::{self, Stage};
use sorter_core::config::{self, AppConfig};
use sorter_core::pipeline::BatchProgress;
use sorter_core::{taxonomy, SampleLibrary, SorterError};
use std::path::PathBuf;
use tokio::sync::watch as progress_watch;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { paths, json } => run_scan(cfg, paths, json).await,
        Commands::Classify {
            name,
            path,
            explain,
            json,
        } => run_classify(&name, path.as_deref(), explain, json),
        Commands::Rules { json } => run_rules(json),
        Commands::Export {
            paths,
            out,
            categories,
            dry_run,
            conflict,
            json,
        } => run_export(cfg, paths, out, categories, dry_run, conflict, json).await,
        Commands::Watch { paths } => watch::watch_paths(cfg, paths, cancel_on_ctrl_c()).await,
    }
}

#[derive(Parser)]
#[command(name = "sample-sorter")]
#[command(about = "Sorts drum and music samples into categories by name", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import folders or files and print category counts
    Scan {
        /// Folders or files to import; defaults to scan.include
        paths: Vec<PathBuf>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Classify a single file name without touching the disk
    Classify {
        /// File name, e.g. "Kick_01.wav"
        name: String,
        /// Relative path the file was dropped with, e.g. "Kicks/Heavy/x.wav"
        #[arg(long)]
        path: Option<String>,
        /// Show which stage and rule decided
        #[arg(long, default_value_t = false)]
        explain: bool,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the rule tables in evaluation order
    Rules {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Import and copy samples into one folder per category
    Export {
        /// Folders or files to import; defaults to scan.include
        paths: Vec<PathBuf>,
        /// Output directory; defaults to export.output_dir
        #[arg(long)]
        out: Option<PathBuf>,
        /// Category ids to export (comma-separated); defaults to export.categories
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        categories: Vec<String>,
        /// Only print what would be copied
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Conflict policy: rename|skip|overwrite; defaults to export.conflict
        #[arg(long)]
        conflict: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch folders and classify audio files as they appear
    Watch {
        /// Folders to watch; defaults to scan.include
        paths: Vec<PathBuf>,
    },
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

/// Imports `paths`, printing progress to stderr. `None` when the batch was
/// cancelled.
async fn import_with_progress(
    cfg: &AppConfig,
    paths: &[PathBuf],
    quiet: bool,
) -> Result<Option<SampleLibrary>> {
    let cancel = cancel_on_ctrl_c();
    let (tx, mut rx) = progress_watch::channel(BatchProgress::default());
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let p = *rx.borrow();
            if !quiet && p.total > 0 {
                eprint!("\ranalyzing {}/{}", p.analyzed, p.total);
            }
        }
        if !quiet {
            eprintln!();
        }
    });

    let roots = ingest::roots(cfg, paths);
    let mut library = SampleLibrary::new();
    let result = ingest::import(cfg, &roots, &mut library, &cancel, Some(&tx)).await;
    drop(tx);
    let _ = printer.await;

    match result {
        Ok(_) => Ok(Some(library)),
        Err(e) => match e.downcast_ref::<SorterError>() {
            Some(SorterError::Cancelled { processed, total }) => {
                eprintln!("cancelled after {}/{} files, nothing imported", processed, total);
                Ok(None)
            }
            _ => Err(e),
        },
    }
}

async fn run_scan(cfg: AppConfig, paths: Vec<PathBuf>, json: bool) -> Result<()> {
    let Some(library) = import_with_progress(&cfg, &paths, json).await? else {
        return Ok(());
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::counts_json(library.categories()))?
        );
    } else {
        print!("{}", report::counts_text(library.categories()));
    }
    Ok(())
}

fn run_classify(name: &str, path: Option<&str>, explain: bool, json: bool) -> Result<()> {
    let decision = classifier::explain(name, path);
    if json {
        let value = serde_json::json!({
            "file_name": name,
            "relative_path": path,
            "category": decision.category,
            "stage": decision.stage,
            "rule": decision.rule,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if explain {
        let stage = match decision.stage {
            Stage::Name => "file name",
            Stage::Path => "folder path",
            Stage::Spectral => "keyword heuristic",
            Stage::Override => "808 cymbal override",
            Stage::Fallback => "no match",
        };
        println!(
            "{}: {} (by {}, rule {})",
            name,
            decision.category.display_name(),
            stage,
            decision.rule.unwrap_or("-")
        );
    } else {
        println!("{}", decision.category.as_str());
    }
    Ok(())
}

fn run_rules(json: bool) -> Result<()> {
    let view = taxonomy::describe();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    for (title, rules) in [("name rules", &view.name_rules), ("path rules", &view.path_rules)] {
        println!("{}:", title);
        for (i, rule) in rules.iter().enumerate() {
            println!("  {}. {} -> {}", i + 1, rule.name, rule.category);
            for p in &rule.include {
                println!("       + {}", p);
            }
            for p in &rule.exclude {
                println!("       - {}", p);
            }
        }
    }
    println!("low-frequency terms: {}", view.low_frequency_terms.join(", "));
    println!("high-frequency terms: {}", view.high_frequency_terms.join(", "));
    println!("percussive terms: {}", view.percussive_terms.join(", "));
    for p in &view.overrides {
        println!("override -> hihats: {}", p);
    }
    Ok(())
}

async fn run_export(
    cfg: AppConfig,
    paths: Vec<PathBuf>,
    out: Option<PathBuf>,
    categories: Vec<String>,
    dry_run: bool,
    conflict: Option<String>,
    json: bool,
) -> Result<()> {
    let policy: ConflictPolicy = conflict
        .as_deref()
        .unwrap_or(&cfg.export.conflict)
        .parse()?;
    let dry_run = dry_run || cfg.export.dry_run;
    let categories = if categories.is_empty() {
        cfg.export.categories.clone()
    } else {
        categories
    };

    let Some(mut library) = import_with_progress(&cfg, &paths, json).await? else {
        return Ok(());
    };
    library.set_selected_by_name(&categories[..])?;

    let plan = sorter_core::export::plan(&library);
    let root = out
        .unwrap_or_else(|| PathBuf::from(&cfg.export.output_dir))
        .join(sorter_core::export::archive_name(chrono::Local::now().date_naive()));
    let outcomes = export::write_plan(&plan, &root, policy, dry_run)?;

    if json {
        let value = serde_json::json!({
            "root": root,
            "dry_run": dry_run,
            "folders": plan.folders(),
            "entries": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let count = |status: ExportStatus| outcomes.iter().filter(|o| o.status == status).count();
        println!(
            "export summary: root={}, planned={}, copied={}, skipped={}, missing={}, dry_run={}",
            root.display(),
            plan.len(),
            count(ExportStatus::Copied),
            count(ExportStatus::Skipped),
            count(ExportStatus::Missing),
            dry_run
        );
    }
    Ok(())
}
