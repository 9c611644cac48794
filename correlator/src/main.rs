use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hlsrc::diag::DiagLevel;
use hlsrc::document::{ReportDocuments, ReportPaths};
use hlsrc::render::{render_panel, HtmlTable, RenderOptions, TextTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EmitStage {
    Table,
    Html,
    Json,
    Tree,
    BuildInfo,
}

impl EmitStage {
    fn needs_selection(self) -> bool {
        matches!(self, EmitStage::Table | EmitStage::Html | EmitStage::Json)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "hlsrc",
    version,
    about = "HLS Report Correlator — loop pipelining tables from HLS report JSON"
)]
struct Cli {
    /// Directory holding loops.json, func_ordered_block.json, fmax_ii.json, schedule.json
    #[arg(short = 'd', long, default_value = ".")]
    report_dir: PathBuf,

    /// Loop hierarchy document (overrides the report directory)
    #[arg(long)]
    loops: Option<PathBuf>,

    /// Ordered-block ID document (overrides the report directory)
    #[arg(long)]
    blocks: Option<PathBuf>,

    /// Block fMAX/interleaving document (overrides the report directory)
    #[arg(long)]
    fmax_ii: Option<PathBuf>,

    /// Schedule document (overrides the report directory)
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Raw name of the hierarchy node to tabulate
    #[arg(short, long)]
    select: Option<String>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Table)]
    emit: EmitStage,

    /// Include each row's details after the table
    #[arg(long)]
    details: bool,

    /// Hide the node-name column
    #[arg(long)]
    no_name: bool,

    /// Print stage timings and notes
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn paths(&self) -> ReportPaths {
        let mut paths = ReportPaths::in_dir(&self.report_dir);
        if let Some(p) = &self.loops {
            paths.loops = p.clone();
        }
        if let Some(p) = &self.blocks {
            paths.ordered_blocks = p.clone();
        }
        if let Some(p) = &self.fmax_ii {
            paths.timing = p.clone();
        }
        if let Some(p) = &self.schedule {
            paths.schedule = p.clone();
        }
        paths
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.emit.needs_selection() && cli.select.is_none() {
        eprintln!("hlsrc: error: table, html and json output require --select <NAME>");
        eprintln!("hlsrc: hint: use --emit tree to list selectable nodes");
        std::process::exit(1);
    }

    // ── Load documents ──
    let paths = cli.paths();
    let documents = match ReportDocuments::load(&paths) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("hlsrc: error: {}", e);
            std::process::exit(2);
        }
    };

    if cli.verbose {
        eprintln!("hlsrc: loops    = {}", paths.loops.display());
        eprintln!("hlsrc: blocks   = {}", paths.ordered_blocks.display());
        eprintln!("hlsrc: fmax_ii  = {}", paths.timing.display());
        eprintln!("hlsrc: schedule = {}", paths.schedule.display());
    }

    // ── Selection-free outputs ──
    match cli.emit {
        EmitStage::Tree => {
            let entries = hlsrc::outline::outline(&documents.hierarchy);
            print!("{}", hlsrc::outline::emit_outline(&entries));
            return;
        }
        EmitStage::BuildInfo => {
            print!(
                "{}",
                hlsrc::provenance::compute_provenance(&documents).to_json()
            );
            return;
        }
        EmitStage::Table | EmitStage::Html | EmitStage::Json => {}
    }

    // ── Render cycle ──
    let selected = cli.select.as_deref().unwrap_or_default();
    let session = hlsrc::session::Session::new(documents);
    let selection = session.select(selected);

    for diag in &selection.diagnostics {
        if diag.level == DiagLevel::Warning || cli.verbose {
            eprintln!("hlsrc: {}", diag);
        }
    }
    if cli.verbose {
        for t in &selection.timings {
            eprintln!(
                "hlsrc: {} complete, {:.1}ms",
                t.stage.name(),
                t.elapsed.as_secs_f64() * 1000.0
            );
        }
    }

    let options = RenderOptions {
        show_name: !cli.no_name,
        include_details: cli.details,
    };
    match cli.emit {
        EmitStage::Table => {
            print!(
                "{}",
                render_panel(&selection.panel, &mut TextTable::new(&options), &options)
            );
        }
        EmitStage::Html => {
            print!(
                "{}",
                render_panel(&selection.panel, &mut HtmlTable::new(&options), &options)
            );
        }
        EmitStage::Json => match serde_json::to_string_pretty(&selection.panel) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("hlsrc: error: cannot serialize panel: {}", e);
                std::process::exit(2);
            }
        },
        EmitStage::Tree | EmitStage::BuildInfo => {}
    }
}
