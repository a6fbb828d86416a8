use std::{fmt::Write as _, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    dates,
    listing::{display_reference_no, display_status},
    load_settings,
    request_list::LIST_EMPTY_MESSAGE,
    CertificateForm, HttpCertificateApi, ListStatus, RequestListView, SubmissionFlow,
    SubmissionState, SubmitRejected,
};
use shared::{
    domain::{CertificateRequest, FilterField, SortCriteria, SortDirection, SortField},
    protocol::CertificateRequestRecord,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PURPOSE_COLUMN_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "cert-portal", about = "Submit and browse employee certificate requests")]
struct Cli {
    /// Settings file; defaults to ./portal.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and submit a new certificate request.
    Submit {
        #[arg(long)]
        address_to: String,
        #[arg(long)]
        purpose: String,
        /// Target date, YYYY-MM-DD. Must be after today.
        #[arg(long)]
        issued_on: String,
        #[arg(long)]
        employee_id: String,
        /// Print the normalized payload instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch submitted requests and show them filtered and sorted.
    List {
        /// Exact match, case-insensitive.
        #[arg(long, default_value = "")]
        reference_no: String,
        /// Substring match, case-insensitive.
        #[arg(long, default_value = "")]
        address_to: String,
        /// Exact match, case-insensitive.
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long, value_enum, default_value_t = SortArg::IssuedOn)]
        sort: SortArg,
        #[arg(long, value_enum, default_value_t = DirectionArg::Desc)]
        direction: DirectionArg,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    IssuedOn,
    Status,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::IssuedOn => SortField::IssuedOn,
            SortArg::Status => SortField::Status,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Asc,
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Asc => SortDirection::Ascending,
            DirectionArg::Desc => SortDirection::Descending,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())
        .context("failed to load portal settings")?
        .with_overrides(cli.api_base_url, cli.api_key)
        .context("invalid command-line settings")?;

    match cli.command {
        Command::Submit {
            address_to,
            purpose,
            issued_on,
            employee_id,
            dry_run,
        } => {
            let mut form = CertificateForm::with_values(CertificateRequest {
                address_to,
                purpose,
                issued_on,
                employee_id,
            });
            let mut flow = SubmissionFlow::new();
            let today = dates::today();

            if dry_run {
                return match flow.begin(&mut form, today) {
                    Ok(payload) => {
                        info!("dry run: request is valid and was not sent");
                        println!("{}", serde_json::to_string_pretty(&payload)?);
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(rejected) => Ok(report_rejection(&rejected)),
                };
            }

            let api = HttpCertificateApi::new(&settings)?;
            match flow.submit(&api, &mut form, today).await {
                Ok(SubmissionState::Succeeded(message)) => {
                    info!("submit command confirmed");
                    println!("{message}");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(SubmissionState::Failed(err)) => {
                    error!(code = ?err.code, "submit command failed");
                    eprintln!("{}", err.message);
                    Ok(ExitCode::FAILURE)
                }
                Ok(other) => {
                    eprintln!("submission ended in unexpected state: {other:?}");
                    Ok(ExitCode::FAILURE)
                }
                Err(rejected) => Ok(report_rejection(&rejected)),
            }
        }
        Command::List {
            reference_no,
            address_to,
            status,
            sort,
            direction,
            json,
        } => {
            let api = HttpCertificateApi::new(&settings)?;
            let mut view = RequestListView::new();
            view.set_filter(FilterField::ReferenceNo, reference_no);
            view.set_filter(FilterField::AddressTo, address_to);
            view.set_filter(FilterField::Status, status);
            view.set_sort(SortCriteria::new(sort.into(), direction.into()));
            if view.refresh(&api).await && view.error().is_none() {
                info!(
                    fetched = view.records().len(),
                    shown = view.visible().len(),
                    "list command finished"
                );
            }

            let sort = view.sort();
            match view.status() {
                ListStatus::Errored(err) => {
                    error!(code = ?err.code, "list command failed");
                    eprintln!("{}", err.message);
                    Ok(ExitCode::FAILURE)
                }
                ListStatus::Loading => {
                    eprintln!("request list is still loading");
                    Ok(ExitCode::FAILURE)
                }
                ListStatus::Empty if json => {
                    println!("[]");
                    Ok(ExitCode::SUCCESS)
                }
                ListStatus::Empty => {
                    println!("{LIST_EMPTY_MESSAGE}");
                    Ok(ExitCode::SUCCESS)
                }
                ListStatus::Ready(rows) if json => {
                    println!("{}", serde_json::to_string_pretty(rows)?);
                    Ok(ExitCode::SUCCESS)
                }
                ListStatus::Ready(rows) => {
                    print!("{}", render_table(rows, sort));
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
    }
}

fn report_rejection(rejected: &SubmitRejected) -> ExitCode {
    match rejected {
        SubmitRejected::Invalid(errors) => {
            warn!(invalid = errors.len(), "submit rejected by local validation");
            for (field, message) in errors.iter() {
                eprintln!("{}: {message}", field.label());
            }
        }
        SubmitRejected::InFlight => eprintln!("{rejected}"),
    }
    ExitCode::from(2)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

fn header_label(title: &str, sort: SortCriteria, field: SortField) -> String {
    match sort.indicator(field) {
        Some(indicator) => format!("{title} {indicator}"),
        None => title.to_string(),
    }
}

fn render_table(rows: &[CertificateRequestRecord], sort: SortCriteria) -> String {
    let header = [
        "Reference No.".to_string(),
        "Address to".to_string(),
        "Purpose".to_string(),
        header_label("Issued on", sort, SortField::IssuedOn),
        header_label("Status", sort, SortField::Status),
    ];
    let body: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                display_reference_no(row).to_string(),
                row.address_to.replace('\n', " "),
                truncate(&row.purpose.replace('\n', " "), PURPOSE_COLUMN_WIDTH),
                row.issued_on.clone(),
                display_status(row).to_string(),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|cell| cell.chars().count());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for cells in std::iter::once(&header).chain(body.iter()) {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}
