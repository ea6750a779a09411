use bookbuilder::generate::{self, BuildOptions};
use bookbuilder::notebook::JupyterBackend;
use bookbuilder::{config, nav, output, validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "bookbuilder")]
#[command(about = "Build a Leanpub manuscript from an MkDocs book")]
#[command(long_about = "\
Build a Leanpub manuscript from an MkDocs book

The chapter order is the `nav` of mkdocs.yml. Notebooks are executed and
exported to markdown, every chapter is converted to Markua, and the result
is written as one directory per chapter plus a Book.txt manifest.

Project structure:

  book/
  ├── mkdocs.yml                       # nav tree and docs_dir
  ├── bookbuilder.toml                 # optional, overrides stock settings
  └── docs/
      ├── preface/preface.md           # prepended as the first chapter
      └── 01-introduction/
          ├── 01-graphs.md             # markdown chapter
          └── 02-networkx-intro.ipynb  # executed with the configured kernel

Output:

  manuscript/
  ├── Book.txt
  ├── images/
  └── 01-introduction/02-networkx-intro.md/index.md

Run 'bookbuilder gen-config' to generate a documented bookbuilder.toml.")]
#[command(version)]
struct Cli {
    /// Project directory containing mkdocs.yml
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Manuscript directory, relative to the project
    #[arg(long, default_value = "manuscript", global = true)]
    output: PathBuf,

    /// Log progress at info level (otherwise RUST_LOG applies, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: nav → render → Markua → manifest → validation
    Build {
        /// Export stored notebook outputs instead of running the notebooks
        #[arg(long)]
        no_execute: bool,
    },
    /// Print the resolved chapter list
    Nav,
    /// Validate an existing manuscript without building
    Check,
    /// Print a stock bookbuilder.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Default to warn so unconverted math is always reported
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output_dir = cli.project.join(&cli.output);

    match cli.command {
        Command::Build { no_execute } => {
            let options = BuildOptions {
                execute: !no_execute,
            };
            let backend = JupyterBackend::new();

            println!("==> Building {}", cli.project.display());
            let report = generate::build(&cli.project, &output_dir, &backend, options)?;
            output::print_build_output(&report);

            println!("==> Validating {}", output_dir.display());
            let diagnostics = validate::validate_files(&report.written_files())?;
            output::print_diagnostics(&diagnostics, &output_dir);
        }
        Command::Nav => {
            let config = config::load_config(&cli.project)?;
            let plan = nav::resolve_chapters(&cli.project, &config)?;
            output::print_chapter_list(&plan, &config);
        }
        Command::Check => {
            println!("==> Checking {}", output_dir.display());
            let diagnostics = validate::validate_manuscript(&output_dir)?;
            output::print_diagnostics(&diagnostics, &output_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
