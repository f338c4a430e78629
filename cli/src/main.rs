use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use openapi_downgrade_core::{convert, ConvertOptions};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "openapi-downgrade")]
#[command(about = "Convert OpenAPI 3.0 documents into Swagger 2.0 documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI 3.0 document to Swagger 2.0
    Convert {
        /// Input OpenAPI document ("-" reads stdin)
        input: PathBuf,

        /// Output Swagger document (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write conversion warnings as JSON to this file
        #[arg(long)]
        warnings: Option<PathBuf>,

        /// Input format
        #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
        input_format: InputFormat,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Max nesting depth for schema conversion
        #[arg(long, default_value_t = 50)]
        max_depth: usize,

        /// Derive collectionFormat from the OpenAPI 3 default style when a
        /// parameter has none
        #[arg(long)]
        infer_parameter_style: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum InputFormat {
    /// YAML for .yaml/.yml files, JSON otherwise
    Auto,
    Json,
    Yaml,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Json,
    JsonCompact,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the document
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            warnings,
            input_format,
            format,
            max_depth,
            infer_parameter_style,
        } => {
            let document = read_document(&input, input_format)?;

            // All fields set explicitly; clippy enforces exhaustiveness
            let options = ConvertOptions {
                max_depth,
                infer_parameter_style,
            };

            let result = convert(&document, &options)
                .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?;

            write_document(&result.document, output.as_deref(), format)?;

            if let Some(path) = warnings {
                write_document(&result.warnings, Some(path.as_path()), OutputFormat::Json)?;
            }
        }
    }

    Ok(())
}

fn read_document(input: &Path, format: InputFormat) -> Result<Value> {
    let mut content = String::new();
    if input == Path::new("-") {
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read document from stdin")?;
    } else {
        File::open(input)
            .with_context(|| format!("Failed to open input file: {}", input.display()))?
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    }

    if is_yaml(input, format, &content) {
        // Through serde_yaml::Value so non-string keys (`200:`) become strings.
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from: {}", input.display()))?;
        serde_json::to_value(yaml)
            .with_context(|| format!("Unsupported YAML content in: {}", input.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", input.display()))
    }
}

fn is_yaml(input: &Path, format: InputFormat, content: &str) -> bool {
    match format {
        InputFormat::Json => false,
        InputFormat::Yaml => true,
        InputFormat::Auto if input == Path::new("-") => {
            !content.trim_start().starts_with(['{', '['])
        }
        InputFormat::Auto => matches!(
            input.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        ),
    }
}

fn write_document<T: serde::Serialize>(
    val: &T,
    path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
            writeln!(writer).context("Failed to write trailing newline")?;
        }
        OutputFormat::JsonCompact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
            writeln!(writer).context("Failed to write trailing newline")?;
        }
        // serde_yaml already ends the document with a newline
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, val).context("Failed to write YAML")?;
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(())
}
