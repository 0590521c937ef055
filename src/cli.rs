use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Route Docs - Document API payloads by walking the shape of their types
#[derive(Parser, Debug)]
#[command(name = "route-docs")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a fully qualified type name and print its structure
    ParseType {
        /// Type name, e.g. `alloc::vec::Vec<u8>` or `Module.Outer.Inner<Swift.Int>`
        #[arg(value_name = "TYPE_NAME")]
        type_name: String,

        /// Output format (yaml or json)
        #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
        output_format: OutputFormat,
    },
    /// Document the bundled pet store API
    Demo {
        /// Output format (yaml or json)
        #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
        output_format: OutputFormat,

        /// Output file path (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_path: Option<PathBuf>,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    match &args.command {
        Command::ParseType {
            type_name,
            output_format,
        } => {
            if type_name.trim().is_empty() {
                anyhow::bail!("Type name must not be empty");
            }
            info!("Type name: {}", type_name);
            info!("Output format: {:?}", output_format);
        }
        Command::Demo {
            output_format,
            output_path,
        } => {
            info!("Output format: {:?}", output_format);
            match output_path {
                Some(output) if output.is_dir() => {
                    anyhow::bail!("Output path is a directory: {}", output.display());
                }
                Some(output) => info!("Output file: {}", output.display()),
                None => info!("Output: stdout"),
            }
        }
    }

    Ok(args)
}

fn serialize<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    use crate::serializer::{serialize_json, serialize_yaml};

    match format {
        OutputFormat::Yaml => serialize_yaml(value),
        OutputFormat::Json => serialize_json(value),
    }
}

/// Run the selected command
pub fn run(args: CliArgs) -> Result<()> {
    use crate::docs_context::DocsViewContext;
    use crate::serializer::write_to_file;
    use crate::type_identity::TypeIdentity;

    match args.command {
        Command::ParseType {
            type_name,
            output_format,
        } => {
            let identity: TypeIdentity = type_name
                .parse()
                .with_context(|| format!("Failed to parse type name '{}'", type_name))?;
            info!("Parsed type: {}", identity);
            println!("{}", serialize(&identity, output_format)?);
        }
        Command::Demo {
            output_format,
            output_path,
        } => {
            info!("Documenting demo routes...");
            let routes = crate::demo::routes().context("Failed to document demo routes")?;
            let context = DocsViewContext::from_routes(&routes);
            info!(
                "Documented {} groups and {} ungrouped endpoints",
                context.grouped_documentations.len(),
                context.other_documentations.len()
            );

            let content = serialize(&context, output_format)?;
            if let Some(output_path) = &output_path {
                info!("Writing output to: {}", output_path.display());
                write_to_file(&content, output_path)?;
                info!("Successfully wrote documentation to {}", output_path.display());
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_type_arguments() {
        let args = CliArgs::try_parse_from(["route-docs", "parse-type", "Vec<u8>", "-f", "json"]).unwrap();
        assert!(!args.verbose);
        match args.command {
            Command::ParseType {
                type_name,
                output_format,
            } => {
                assert_eq!(type_name, "Vec<u8>");
                assert_eq!(output_format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_demo_arguments_with_global_verbose() {
        let args = CliArgs::try_parse_from(["route-docs", "demo", "-o", "docs.yaml", "-v"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Demo {
                output_format,
                output_path,
            } => {
                assert_eq!(output_format, OutputFormat::Yaml);
                assert_eq!(output_path, Some(PathBuf::from("docs.yaml")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(CliArgs::try_parse_from(["route-docs", "demo", "-f", "toml"]).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_type_name() {
        let args = CliArgs::try_parse_from(["route-docs", "parse-type", " "]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_validation_rejects_directory_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().to_str().unwrap();
        let args = CliArgs::try_parse_from(["route-docs", "demo", "-o", output]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_parse_type_reports_malformed_names() {
        let args = CliArgs::try_parse_from(["route-docs", "parse-type", "Vec<"]).unwrap();
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("Failed to parse type name 'Vec<'"));
    }

    #[test]
    fn test_run_demo_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("docs.json");
        let args = CliArgs::try_parse_from([
            "route-docs",
            "demo",
            "-f",
            "json",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        run(args).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert!(parsed["groupedDocumentations"].is_array());
    }
}
