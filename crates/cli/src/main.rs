use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use passport_core::config::{schema_version_from_env_value, strict_dates_from_env_value};
use passport_core::{
    from_flat_row, merge, to_flat_row, validate_passport_data, CoreConfig, FlatRow,
    PassportRecord,
};

const SCHEMA_VERSION_ENV: &str = "PASSPORT_SCHEMA_VERSION";
const STRICT_DATES_ENV: &str = "PASSPORT_STRICT_DATES";

/// Crates logged at `info` unless `RUST_LOG` says otherwise. The binary's own target is its
/// `[[bin]]` name.
const LOG_TARGETS: [&str; 3] = ["passport", "passport_core", "passport_schema"];

#[derive(Parser)]
#[command(name = "passport")]
#[command(about = "Genebank passport record tools")]
struct Cli {
    /// Schema version written to output documents (overrides PASSPORT_SCHEMA_VERSION)
    #[arg(long, global = true)]
    schema_version: Option<String>,
    /// Accept malformed acquisition/collection dates with a warning
    #[arg(long, global = true)]
    lenient_dates: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate passport documents
    Validate {
        /// JSON or YAML files holding one document or a list of documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Merge passports of the same accession from different data sources
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write the merged documents here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the PDCI of each passport
    Pdci {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Convert passport documents to flat MCPD rows
    ToRow {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Convert flat MCPD rows to passport documents
    FromRow {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Resolve configuration once: flags win over environment variables.
fn resolve_config(cli: &Cli) -> anyhow::Result<CoreConfig> {
    let schema_version = schema_version_from_env_value(
        cli.schema_version
            .clone()
            .or_else(|| std::env::var(SCHEMA_VERSION_ENV).ok()),
    )?;
    let strict_dates = if cli.lenient_dates {
        false
    } else {
        strict_dates_from_env_value(std::env::var(STRICT_DATES_ENV).ok())?
    };
    Ok(CoreConfig::new(schema_version, strict_dates))
}

/// Read a file holding either one document or a list of them.
fn read_documents(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?,
    };
    info!(file = %path.display(), "read input");
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn read_all(files: &[PathBuf]) -> anyhow::Result<Vec<Value>> {
    let mut documents = Vec::new();
    for file in files {
        documents.extend(read_documents(file)?);
    }
    Ok(documents)
}

fn read_records(files: &[PathBuf], config: &CoreConfig) -> anyhow::Result<Vec<PassportRecord>> {
    read_all(files)?
        .iter()
        .map(|doc| PassportRecord::from_document(doc, config.strict_dates()).map_err(Into::into))
        .collect()
}

fn write_output(value: &Value, output: Option<&Path>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!(file = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Group records by accession, keeping first-seen order of accessions and records.
fn group_by_accession(records: Vec<PassportRecord>) -> Vec<Vec<PassportRecord>> {
    let mut keys: Vec<(String, String)> = Vec::new();
    let mut groups: Vec<Vec<PassportRecord>> = Vec::new();
    for record in records {
        let key = record
            .accession_key()
            .map(|(institute, number)| (institute.to_string(), number.to_string()))
            .unwrap_or_default();
        match keys.iter().position(|k| *k == key) {
            Some(index) => groups[index].push(record),
            None => {
                keys.push(key);
                groups.push(vec![record]);
            }
        }
    }
    groups
}

fn run(command: Commands, config: &CoreConfig) -> anyhow::Result<()> {
    match command {
        Commands::Validate { files } => {
            let mut failures = 0usize;
            for doc in read_all(&files)? {
                match validate_passport_data(&doc, config.strict_dates()) {
                    Ok(()) => println!("ok"),
                    Err(e) => {
                        failures += 1;
                        eprintln!("invalid: {e}");
                    }
                }
            }
            if failures > 0 {
                bail!("{failures} document(s) failed validation");
            }
        }
        Commands::Merge { files, output } => {
            let records = read_records(&files, config)?;
            let merged = group_by_accession(records)
                .into_iter()
                .map(|group| {
                    let record = merge(group)?;
                    record.to_document_as(config.schema_version())
                })
                .collect::<Result<Vec<_>, _>>()?;
            info!(accessions = merged.len(), "merged passports");
            write_output(&Value::Array(merged), output.as_deref())?;
        }
        Commands::Pdci { files } => {
            for record in read_records(&files, config)? {
                println!(
                    "{}\t{}\t{:.2}",
                    record.institute_code().unwrap_or_default(),
                    record.germplasm_number().unwrap_or_default(),
                    record.pdci()
                );
            }
        }
        Commands::ToRow { files, output } => {
            let rows = read_records(&files, config)?
                .iter()
                .map(|record| serde_json::to_value(to_flat_row(record)))
                .collect::<Result<Vec<_>, _>>()?;
            write_output(&Value::Array(rows), output.as_deref())?;
        }
        Commands::FromRow { files, output } => {
            let mut documents = Vec::new();
            for row in read_all(&files)? {
                let row: FlatRow = serde_json::from_value(row).context("row must map column names to text")?;
                let record = from_flat_row(&row)?;
                if record.accession_key().is_none() {
                    warn!(
                        accession = record.germplasm_number().unwrap_or_default(),
                        "row has no complete accession identifier"
                    );
                }
                documents.push(record.to_document_as(config.schema_version())?);
            }
            write_output(&Value::Array(documents), output.as_deref())?;
        }
    }
    Ok(())
}

fn log_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{target}=info").parse()?);
    }
    Ok(filter)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter()?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Some(command) => run(command, &config),
        None => {
            println!("Use 'passport --help' for commands");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passport(source: &str, number: &str, crop: &str) -> Value {
        json!({
            "version": "1.0",
            "dataSource": {"code": source},
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": number},
            "cropName": crop
        })
    }

    #[test]
    fn reads_single_documents_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("one.json");
        fs::write(&single, passport("S1", "A", "maize").to_string()).unwrap();
        let list = dir.path().join("many.yaml");
        fs::write(
            &list,
            "- version: '1.0'\n  germplasmNumber:\n    instituteCode: ESP004\n    germplasmNumber: B\n- version: '1.0'\n  germplasmNumber:\n    instituteCode: ESP004\n    germplasmNumber: C\n",
        )
        .unwrap();

        let documents = read_all(&[single, list]).unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[2]["germplasmNumber"]["germplasmNumber"], json!("C"));
    }

    #[test]
    fn groups_passports_by_accession_in_first_seen_order() {
        let records: Vec<_> = [
            passport("S1", "A", "maize"),
            passport("S1", "B", "wheat"),
            passport("S2", "A", "maize"),
        ]
        .iter()
        .map(|doc| PassportRecord::from_document(doc, true).unwrap())
        .collect();

        let groups = group_by_accession(records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1][0].germplasm_number(), Some("B"));

        let merged = merge(groups[0].clone()).unwrap();
        assert_eq!(merged.data_source().code(), Some("S1, S2"));
        assert_eq!(merged.crop_name(), Some("maize"));
    }

    #[test]
    fn log_filter_covers_the_binary_target() {
        let binary = module_path!().split("::").next().unwrap();
        assert_eq!(binary, LOG_TARGETS[0]);
        let filter = log_filter().unwrap().to_string();
        assert!(filter.contains("passport=info"), "{filter}");
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::parse_from(["passport", "--lenient-dates", "--schema-version", "1.0", "pdci", "x.json"]);
        let config = resolve_config(&cli).unwrap();
        assert!(!config.strict_dates());
        assert_eq!(config.schema_version().as_str(), "1.0");

        let cli = Cli::parse_from(["passport", "--schema-version", "9.9", "pdci", "x.json"]);
        assert!(resolve_config(&cli).is_err());
    }
}
