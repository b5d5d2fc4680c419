//! composekit - render parameterized docker-compose templates
//!
//! This is the main CLI entry point for composekit.

use clap::{Args, Parser, Subcommand};
use composekit::compose::ComposeParser;
use composekit::error::{ComposeKitError, Result};
use composekit::template::{builtin, render_dir, Template, VariableSources};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// composekit - compose template renderer
#[derive(Parser)]
#[command(name = "composekit")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Render parameterized docker-compose templates", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to stdout or a file
    Render {
        #[command(flatten)]
        source: TemplateSource,
        #[command(flatten)]
        vars: VarArgs,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Parse and check the rendered compose document
        #[arg(long)]
        check: bool,
    },

    /// List the placeholders a template references
    Placeholders {
        #[command(flatten)]
        source: TemplateSource,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an already-rendered compose file
    Check {
        /// Compose file
        file: PathBuf,
    },

    /// Render every template in a directory
    #[command(name = "render-dir")]
    RenderDir {
        /// Template directory
        src: PathBuf,
        /// Output directory
        dest: PathBuf,
        #[command(flatten)]
        vars: VarArgs,
    },

    /// List built-in templates
    Builtins,
}

#[derive(Args)]
struct TemplateSource {
    /// Template file
    #[arg(conflicts_with = "builtin", required_unless_present = "builtin")]
    template: Option<PathBuf>,
    /// Use a built-in template
    #[arg(short, long)]
    builtin: Option<String>,
}

impl TemplateSource {
    fn load(&self) -> Result<String> {
        match (&self.template, &self.builtin) {
            (_, Some(name)) => Ok(builtin::get(name)?.to_string()),
            (Some(path), None) => Ok(std::fs::read_to_string(path)?),
            (None, None) => Err(ComposeKitError::InvalidConfig(
                "No template given".to_string(),
            )),
        }
    }
}

#[derive(Args)]
struct VarArgs {
    /// Variable as key=value (repeatable)
    #[arg(short, long = "var")]
    var: Vec<String>,
    /// YAML variables file
    #[arg(long)]
    vars_file: Option<PathBuf>,
    /// Ignore COMPOSEKIT_VAR_* environment variables
    #[arg(long)]
    no_env: bool,
}

impl VarArgs {
    fn sources(&self) -> VariableSources {
        VariableSources {
            vars_file: self.vars_file.clone(),
            use_env: !self.no_env,
            pairs: self.var.clone(),
        }
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            source,
            vars,
            output,
            check,
        } => {
            let template = Template::parse(&source.load()?)?;
            let variables = vars.sources().load()?;
            for name in template.missing(&variables) {
                tracing::error!("Variable '{}' is not set", name);
            }
            let rendered = template.render(&variables)?;

            if check {
                let (_, warnings) = ComposeParser::check_str(&rendered)?;
                print_warnings(&warnings);
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Placeholders { source, json } => {
            let template = Template::parse(&source.load()?)?;
            let names = template.placeholders();
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Commands::Check { file } => {
            let (compose, warnings) = ComposeParser::check_file(&file)?;
            print_warnings(&warnings);
            println!(
                "{}: OK ({} service{})",
                file.display(),
                compose.services.len(),
                if compose.services.len() == 1 { "" } else { "s" }
            );
        }

        Commands::RenderDir { src, dest, vars } => {
            let variables = vars.sources().load()?;
            let written = render_dir(&src, &dest, &variables)?;
            println!("Rendered {} template(s) into {}", written.len(), dest.display());
        }

        Commands::Builtins => {
            for name in builtin::names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
