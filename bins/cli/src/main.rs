//! Tessera command-line harness.
//!
//! Reads transaction exports and rendered snapshots from disk, runs them through the
//! composition engine and writes the resulting artifacts.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera_core::layout::{LayoutCode, MultiUpCompositor, OutputTarget, RenderedUnit, TargetKind};
use tessera_core::render::{OutputStyle, PrintOptions, ReportFormatter, Rendered, naming, pdf};
use tessera_core::reports::{
    DateRange, ReportType, TabularReportPaginator, TransactionAggregator, TransactionRecord,
};
use tessera_shared::types::Currency;
use tessera_shared::{AppConfig, AppError};

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Multi-up print sheets and financial reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a transaction CSV over a period and write report artifacts.
    Report(ReportArgs),
    /// Tile rendered snapshots onto print sheets.
    Compose(ComposeArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Artifact {
    /// Print-ready PDF.
    Pdf,
    /// Multi-sheet XLSX workbook.
    Xlsx,
    /// One CSV file per workbook sheet.
    Csv,
    /// View model as JSON.
    Json,
    /// Everything above.
    All,
}

impl Artifact {
    fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Transaction CSV with columns date,type,category,amount and optionally
    /// payment_method (or paymentMethod),description,reference.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    start: NaiveDate,

    /// Last day of the period, inclusive.
    #[arg(long)]
    end: NaiveDate,

    /// summary, detailed, income, expense or category.
    #[arg(short = 't', long = "type", default_value = "detailed")]
    report_type: String,

    /// Table rows per page; defaults to the configured value.
    #[arg(long)]
    rows_per_page: Option<usize>,

    /// Artifacts to write.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Artifact::All)]
    format: Artifact,

    /// Directory the artifacts are written to.
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Raw 8-bit RGB rasters. A single input is replicated into every cell; several
    /// inputs fill cells in order, one each.
    #[arg(short = 'i', long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Raster width in pixels.
    #[arg(long)]
    width_px: u32,

    /// Raster height in pixels.
    #[arg(long)]
    height_px: u32,

    /// credit-card, portrait-id, landscape-id or a4; defaults to the configured target.
    #[arg(long)]
    target: Option<String>,

    /// 1, 2, 4, 8 or 9; defaults to the configured layout.
    #[arg(long)]
    layout: Option<String>,

    /// PDF file to write.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<AppError>()
                .map_or(1, AppError::exit_code);
            error!(error = %format!("{err:#}"), code, "command failed");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AppConfig::load()
        .map_err(AppError::from)
        .context("failed to load configuration")?;

    match &cli.command {
        Command::Report(args) => run_report(args, &config),
        Command::Compose(args) => run_compose(args, &config),
    }
}

fn run_report(args: &ReportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let report_type: ReportType = args.report_type.parse().map_err(AppError::from)?;
    let range = DateRange::new(args.start, args.end).map_err(AppError::from)?;
    let rows_per_page = match args.rows_per_page {
        Some(rows) => rows,
        None => usize::try_from(config.report.rows_per_page)?,
    };
    let currency: Currency = config
        .report
        .currency
        .parse()
        .map_err(AppError::Configuration)?;

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let records = parse_records(BufReader::new(file))?;
    info!(path = %args.input.display(), records = records.len(), "loaded transactions");

    let report = TransactionAggregator::aggregate(&records, &range).map_err(AppError::from)?;
    let pages = TabularReportPaginator::paginate(&report, report_type, rows_per_page)
        .map_err(AppError::from)?;
    info!(
        period = %range,
        report_type = %report_type,
        transactions = report.transaction_count,
        pages = pages.len(),
        "report paginated"
    );

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;

    if args.format.includes(Artifact::Pdf) {
        let style = OutputStyle::Print(PrintOptions::from_config(&config.print, currency));
        if let Rendered::Print(stream) =
            ReportFormatter::format(&report, &pages, &style).map_err(AppError::from)?
        {
            let bytes = pdf::write_print_stream(&stream).map_err(AppError::from)?;
            let path = args.out_dir.join(naming::pdf_file_name(&range));
            write_bytes(&path, &bytes)?;
            info!(path = %path.display(), pages = stream.page_count(), "wrote PDF");
        }
    }

    let wants_xlsx = args.format.includes(Artifact::Xlsx);
    let wants_csv = args.format.includes(Artifact::Csv);
    if wants_xlsx || wants_csv {
        if let Rendered::Workbook(workbook) =
            ReportFormatter::format(&report, &pages, &OutputStyle::Workbook)
                .map_err(AppError::from)?
        {
            if wants_xlsx {
                let path = args.out_dir.join(naming::workbook_file_name(&range));
                let mut writer = BufWriter::new(create(&path)?);
                workbook.write_xlsx(&mut writer).map_err(AppError::from)?;
                writer.flush().map_err(AppError::from)?;
                info!(path = %path.display(), sheets = workbook.sheets.len(), "wrote workbook");
            }
            for sheet in workbook.sheets.iter().filter(|_| wants_csv) {
                let path = args
                    .out_dir
                    .join(naming::sheet_csv_file_name(&range, &sheet.name));
                let file = create(&path)?;
                sheet.write_csv(BufWriter::new(file)).map_err(AppError::from)?;
                info!(path = %path.display(), rows = sheet.rows.len(), "wrote sheet");
            }
        }
    }

    if args.format.includes(Artifact::Json) {
        if let Rendered::View(view) =
            ReportFormatter::format(&report, &pages, &OutputStyle::View(currency))
                .map_err(AppError::from)?
        {
            let path = args.out_dir.join(naming::view_file_name(&range));
            let mut writer = BufWriter::new(create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &view)
                .with_context(|| format!("cannot serialize view model to {}", path.display()))?;
            writer.flush().map_err(AppError::from)?;
            info!(path = %path.display(), "wrote view model");
        }
    }

    Ok(())
}

fn run_compose(args: &ComposeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let kind: TargetKind = args
        .target
        .as_deref()
        .unwrap_or(&config.composition.default_target)
        .parse()
        .map_err(AppError::Validation)?;
    let layout: LayoutCode = args
        .layout
        .as_deref()
        .unwrap_or(&config.composition.default_layout)
        .parse()
        .map_err(AppError::from)?;
    let target = OutputTarget::preset(kind);

    let snapshots = args
        .inputs
        .iter()
        .map(|path| load_snapshot(path, args.width_px, args.height_px))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let stream = match snapshots.as_slice() {
        [single] => MultiUpCompositor::compose(single, &target, layout),
        many => MultiUpCompositor::compose_many(many, &target, layout),
    }
    .map_err(AppError::from)?;

    let bytes = pdf::write_page_stream(&stream).map_err(AppError::from)?;
    write_bytes(&args.output, &bytes)?;
    info!(
        path = %args.output.display(),
        target = %kind,
        layout = %layout,
        pages = stream.page_count(),
        "wrote print sheets"
    );
    Ok(())
}

/// Deserializes transaction records from CSV, reporting the 1-based line of a bad row.
fn parse_records<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = rdr
        .deserialize::<TransactionRecord>()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| AppError::Validation(format!("line {}: {e}", i + 2))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn load_snapshot(path: &Path, width_px: u32, height_px: u32) -> anyhow::Result<RenderedUnit> {
    let pixels = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_stem()
        .map_or_else(|| "snapshot".to_string(), |s| s.to_string_lossy().into_owned());
    let unit = RenderedUnit::from_rgb(name, width_px, height_px, pixels).map_err(AppError::from)?;
    Ok(unit)
}

fn create(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("cannot create {}", path.display()))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))
}
