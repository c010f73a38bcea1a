mod logging;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use logging::{LoggingError, init_logging};
use mongoschema_compile::{CompileError, ConstraintRegistry, GenerationOutcome, compile_from};
use mongoschema_core::{Error as CoreError, build_nesting_graph_report, validate_declarations};
use mongoschema_descriptor::{DescriptorError, DescriptorProvider, descriptor_json_schema};
use mongoschema_emit::{EmitError, WrittenArtifacts, emit, write_artifacts};
use serde_json::{Value, json};
use settings::{GeneratorSettings, SettingsError, load_settings};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("declaration error: {0}")]
    Core(#[from] CoreError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} record(s) deferred in strict mode")]
    StrictDeferred(usize),
}

#[derive(Parser, Debug)]
#[command(name = "mongoschema", version, about = "MongoDB $jsonSchema generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a descriptor and write validator documents.
    Generate(GenerateArgs),
    /// Print the nesting graph and constraint registry of a descriptor.
    Inspect(InspectArgs),
    /// Print the JSON Schema of descriptor files.
    DescriptorSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Descriptor file (.json or .toml).
    #[arg(value_name = "DESCRIPTOR")]
    descriptor: PathBuf,
    /// Output directory; overrides `out_dir` from the config file.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Settings file (defaults to ./mongoschema.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fail when any schema root is deferred.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Append NDJSON logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Descriptor file (.json or .toml).
    #[arg(value_name = "DESCRIPTOR")]
    descriptor: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::DescriptorSchema => run_descriptor_schema(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        descriptor,
        out,
        config,
        strict,
        log_file,
    } = args;

    init_logging(log_file.as_deref())?;

    let mut settings = load_settings(config.as_deref())?;
    settings.apply_overrides(out, strict);

    let (outcome, written) = generate(&settings, &descriptor)?;
    print_summary(&settings, &outcome, &written);
    Ok(())
}

/// Compile `descriptor` and write its documents. Strict mode fails before
/// anything is written.
fn generate(
    settings: &GeneratorSettings,
    descriptor: &Path,
) -> Result<(GenerationOutcome, WrittenArtifacts), CliError> {
    tracing::info!(
        event = "run_started",
        descriptor = %descriptor.display(),
        out_dir = %settings.out_dir.display(),
        strict = settings.strict
    );
    let timer = Instant::now();

    let provider = DescriptorProvider::open(descriptor)?;
    let outcome = compile_from(&provider)?;

    if settings.strict && !outcome.deferred.is_empty() {
        return Err(CliError::StrictDeferred(outcome.deferred.len()));
    }

    let artifacts = emit(&outcome.forest, &settings.emit_options())?;
    let written = write_artifacts(&artifacts, &settings.layout())?;

    tracing::info!(
        event = "run_finished",
        schemas = outcome.forest.len(),
        deferred = outcome.deferred.len(),
        elapsed_ms = timer.elapsed().as_millis() as u64
    );

    Ok((outcome, written))
}

fn print_summary(settings: &GeneratorSettings, outcome: &GenerationOutcome, written: &WrittenArtifacts) {
    println!(
        "generated {} schema(s) into {}",
        outcome.forest.len(),
        settings.out_dir.display()
    );
    for path in &written.documents {
        println!("  {}", path.display());
    }
    if let Some(path) = &written.aggregate {
        println!("  {}", path.display());
    }
    if !outcome.deferred.is_empty() {
        println!("deferred {} record(s):", outcome.deferred.len());
        for deferred in &outcome.deferred {
            println!("  {}: {}", deferred.record, deferred.reason);
        }
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    init_logging(None)?;

    let report = inspect(&args.descriptor)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Schema roots, nesting graph and constraint registry of `descriptor`.
fn inspect(descriptor: &Path) -> Result<Value, CliError> {
    let provider = DescriptorProvider::open(descriptor)?;
    let validated = provider.load()?;
    validate_declarations(&validated.graph)?;

    let nesting = build_nesting_graph_report(&validated.graph);
    if nesting.has_cycle() {
        tracing::warn!(event = "nesting_cycle", records = ?nesting.cycle);
    }
    let registry = ConstraintRegistry::collect(&validated.graph)?;
    let schema_roots: Vec<_> = validated
        .graph
        .schema_roots()
        .map(|record| {
            json!({
                "record": record.name,
                "collection": record
                    .schema_root
                    .as_ref()
                    .and_then(|root| root.collection_name.as_deref()),
                "pending": validated.graph.is_pending(&record.name),
            })
        })
        .collect();

    Ok(json!({
        "source": descriptor.display().to_string(),
        "schema_roots": schema_roots,
        "nesting": nesting,
        "registry": registry,
    }))
}

fn run_descriptor_schema() -> Result<(), CliError> {
    let schema = descriptor_json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "mongoschema",
            "generate",
            "model.json",
            "--out",
            "build",
            "--strict",
            "--log-file",
            "run.ndjson",
        ])
        .unwrap();

        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.descriptor, PathBuf::from("model.json"));
                assert_eq!(args.out, Some(PathBuf::from("build")));
                assert!(args.strict);
                assert_eq!(args.config, None);
                assert_eq!(args.log_file, Some(PathBuf::from("run.ndjson")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn descriptor_schema_is_kebab_case() {
        let cli = Cli::try_parse_from(["mongoschema", "descriptor-schema"]).unwrap();
        assert!(matches!(cli.command, Command::DescriptorSchema));
    }

    fn shop_descriptor() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../mongoschema-descriptor/tests/fixtures")
            .join("shop.json")
    }

    fn settings_into(out_dir: &Path, strict: bool) -> GeneratorSettings {
        let mut settings = GeneratorSettings::default();
        settings.apply_overrides(Some(out_dir.to_path_buf()), strict);
        settings
    }

    #[test]
    fn generate_writes_documents_and_reports_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let settings = settings_into(&out_dir, false);

        let (outcome, written) = generate(&settings, &shop_descriptor()).unwrap();

        assert_eq!(outcome.deferred.len(), 2);
        let user = out_dir.join("schema").join("UserSchema.json");
        assert!(user.is_file());
        assert_eq!(written.documents, vec![user]);
        let aggregate = out_dir.join("generated_schemas.rs");
        assert_eq!(written.aggregate.as_deref(), Some(aggregate.as_path()));
        let module = std::fs::read_to_string(aggregate).unwrap();
        assert!(module.contains("\"users\""));
    }

    #[test]
    fn strict_generate_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let settings = settings_into(&out_dir, true);

        let err = generate(&settings, &shop_descriptor()).unwrap_err();

        assert!(matches!(err, CliError::StrictDeferred(2)));
        assert!(!out_dir.exists());
    }

    #[test]
    fn inspect_reports_roots_nesting_and_registry() {
        let report = inspect(&shop_descriptor()).unwrap();

        let roots = report["schema_roots"].as_array().unwrap();
        assert_eq!(roots.len(), 3);
        let order = roots
            .iter()
            .find(|root| root["record"] == "com.shop.model.Order")
            .unwrap();
        assert_eq!(order["collection"], "orders");
        assert_eq!(order["pending"], true);
        assert!(report["nesting"].is_object());
        assert!(report["registry"].is_object());
    }
}
