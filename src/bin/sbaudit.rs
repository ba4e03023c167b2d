use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use tracing::debug;

use sbaudit::logging::{init_tracing, init_tracing_json, DEFAULT_FILTER};
use sbaudit::variables::{EfivarfsSource, FileSource, LayeredSource, VariableSource};
use sbaudit::{export_report, log_error, Auditor, DatabaseKind, PolicyThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Audit the UEFI Secure Boot PK, KEK and db signature databases
///
/// Each certificate is checked for expiry and, for the PK, for known test-key
/// markers. The KEK must contain at least one of the required certificates.
/// Exits with 2 when any problem is found.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// efivarfs mount point to read variables from
    #[arg(long, default_value = sbaudit::variables::DEFAULT_EFIVARFS_ROOT)]
    efivars: PathBuf,

    /// Read PK from a raw signature database file instead of efivarfs
    #[arg(long, value_name = "FILE")]
    pk: Option<PathBuf>,

    /// Read KEK from a raw signature database file instead of efivarfs
    #[arg(long, value_name = "FILE")]
    kek: Option<PathBuf>,

    /// Read db from a raw signature database file instead of efivarfs
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Databases to audit (PK, KEK, db); defaults to all three
    #[arg(long = "database", value_name = "KIND")]
    databases: Vec<DatabaseKind>,

    /// JSON policy file overriding the default thresholds
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Save certificates (.der) and hash lists (.hsh) into this directory
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log format on stderr
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    log_format: OutputFormat,
}

impl Args {
    fn source(&self) -> LayeredSource {
        let mut files = FileSource::new();
        for (kind, path) in [
            (DatabaseKind::Pk, &self.pk),
            (DatabaseKind::Kek, &self.kek),
            (DatabaseKind::Db, &self.db),
        ] {
            if let Some(path) = path {
                files.insert(kind.variable_name(), path.clone());
            }
        }
        let layers: Vec<Box<dyn VariableSource>> = vec![
            Box::new(files),
            Box::new(EfivarfsSource::new(self.efivars.clone())),
        ];
        LayeredSource::new(layers)
    }

    fn kinds(&self) -> Vec<DatabaseKind> {
        if self.databases.is_empty() {
            DatabaseKind::ALL.to_vec()
        } else {
            self.databases.clone()
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let thresholds = match &args.policy {
        Some(path) => PolicyThresholds::from_json_file(path)
            .with_context(|| format!("Loading policy {}", path.display()))?,
        None => PolicyThresholds::default(),
    };
    debug!(?thresholds, "Policy loaded");

    let auditor = Auditor::new(thresholds)?;
    let source = args.source();
    let mut reports = auditor.audit_all(&args.kinds(), &source, Utc::now())?;

    if let Some(dir) = &args.export {
        for report in &mut reports {
            export_report(report, dir)
                .with_context(|| format!("Exporting {}", report.database))?;
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report);
            }
        }
    }

    if reports.iter().any(|r| r.has_problems()) {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match args.log_format {
        OutputFormat::Text => init_tracing(DEFAULT_FILTER),
        OutputFormat::Json => init_tracing_json(DEFAULT_FILTER),
    }

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            let err = log_error!(err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
