use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdf_sheets::{
    Conversion, ConversionReport, ExtractOptions, PreviewSnapshot, extract_pdf_to_xlsx,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2xlsx",
    version,
    about = "Convert tables in text PDFs into an Excel workbook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract page tables and write one sheet per run of matching headers.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output XLSX path.
    #[arg(short, long)]
    output: PathBuf,

    /// Password for encrypted PDFs.
    #[arg(short, long, env = "PDF2XLSX_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Minimum cells required per candidate table row.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// Write an HTML preview of the first table to this path.
    #[arg(long)]
    preview_html: Option<PathBuf>,

    /// Number of data rows in the preview.
    #[arg(long, default_value_t = pdf_sheets::DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Write header cells without bold formatting.
    #[arg(long)]
    plain_header: bool,

    /// Log a line per sheet.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ConvertArgs) -> Result<ExtractOptions> {
    let options = ExtractOptions {
        password: args.password.clone(),
        min_cols: args.min_cols,
        preview_rows: args.preview_rows,
        bold_header: !args.plain_header,
        ..ExtractOptions::default()
    };

    match args.pages.as_deref() {
        Some(pages) => options
            .with_pages(pages)
            .context("failed to parse --pages"),
        None => Ok(options),
    }
}

fn log_report(report: &ConversionReport) {
    for sheet in &report.sheets {
        tracing::info!(
            sheet = %sheet.name,
            columns = sheet.columns,
            rows = sheet.rows,
            "sheet written"
        );
    }
}

fn write_preview(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html)
        .with_context(|| format!("failed to write preview to '{}'", path.display()))
}

fn run_convert(args: &ConvertArgs) -> Result<Conversion<PathBuf>> {
    let options = parse_options(args)?;
    let conversion = extract_pdf_to_xlsx(&args.input, &args.output, &options)
        .with_context(|| format!("failed to convert tables from '{}'", args.input.display()))?;

    if let (Conversion::Converted { preview, .. }, Some(path)) =
        (&conversion, args.preview_html.as_deref())
    {
        let html = preview
            .as_ref()
            .map_or_else(
                || "<p>No preview available.</p>\n".to_string(),
                PreviewSnapshot::to_html,
            );
        write_preview(path, &html)?;
    }

    Ok(conversion)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Convert(args) = cli.command;

    let default_filter = if args.verbose {
        "pdf_sheets=info,pdf2xlsx=info"
    } else {
        "pdf_sheets=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_convert(&args) {
        Ok(Conversion::Converted { output, report, .. }) => {
            log_report(&report);
            eprintln!(
                "wrote {} sheet(s), {} row(s) to '{}'",
                report.sheet_count(),
                report.row_count,
                output.display()
            );
            ExitCode::SUCCESS
        }
        Ok(Conversion::NoTabularData(report)) => {
            eprintln!(
                "no tabular data found in {} page(s); nothing written",
                report.page_count
            );
            ExitCode::from(2)
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
