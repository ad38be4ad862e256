use clap::{Parser, Subcommand};
use courseware::config::{self, CONFIG_FILENAME, Overrides, Settings};
use courseware::store::DiskStore;
use courseware::{catalog, output, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "courseware")]
#[command(about = "Build a course catalog from numbered lesson files")]
#[command(long_about = "\
Build a course catalog from numbered lesson files

Lessons are files named <number>.<name>.<ext> in one directory. Each becomes
a catalog entry titled by its first line. Lessons numbered at or above the
VIP threshold are protected: their text moves to a backup copy and the
visible file is replaced by a sentinel line.

Lesson directory:

  coursedetail.C0002.wuziqi/
  ├── courseware.toml           # Optional config
  ├── 01.intro.md               # '# Welcome'   → \"1.Welcome\"
  ├── 05.advanced.md            # VIP at threshold 5 → 'encrypt'
  ├── 05.advanced.<id>.md       # Backup holding the original text
  └── board.png                 # Not a lesson (one period)

The catalog is written to ../<catalog_id>.json by default.

Run 'courseware gen-config' to print a documented courseware.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: <DIR>/courseware.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog title
    #[arg(long, global = true)]
    title: Option<String>,

    /// Catalog id used in tutorial links and the output filename
    #[arg(long, global = true)]
    catalog_id: Option<String>,

    /// Identifier inserted into backup filenames
    #[arg(long, global = true)]
    protection_id: Option<String>,

    /// Lessons numbered at or above this are VIP
    #[arg(long, global = true)]
    vip_threshold: Option<u64>,

    /// Catalog output path
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log every file decision to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan, protect VIP lessons, and write the catalog
    Build {
        /// Lesson directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Show what build would do without modifying anything
    Check {
        /// Lesson directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Print a stock courseware.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Build { dir } => {
            let settings = resolve_settings(&cli, dir)?;
            println!("==> Scanning {}", dir.display());
            let report = scan::scan(&DiskStore, dir, &settings)?;
            output::print_scan_report(&report, false);

            let catalog = catalog::Catalog::new(settings.title.clone(), report.catalogue_list());
            catalog::export(&catalog, &settings.output)?;
            output::print_export(&report, &settings.output);
        }
        Command::Check { dir } => {
            let settings = resolve_settings(&cli, dir)?;
            println!("==> Checking {}", dir.display());
            let report = scan::plan(&DiskStore, dir, &settings)?;
            output::print_scan_report(&report, true);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "courseware=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn resolve_settings(cli: &Cli, dir: &Path) -> Result<Settings, config::ConfigError> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| dir.join(CONFIG_FILENAME));
    // Command-line paths are relative to the working directory, not DIR
    let output = cli
        .output
        .as_deref()
        .map(std::path::absolute)
        .transpose()
        .map_err(|source| config::ConfigError::Io {
            path: cli.output.clone().unwrap_or_default(),
            source,
        })?;

    let mut catalog_config = config::load_config(&config_path)?;
    catalog_config.apply(Overrides {
        title: cli.title.clone(),
        catalog_id: cli.catalog_id.clone(),
        protection_id: cli.protection_id.clone(),
        vip_threshold: cli.vip_threshold,
        output,
    });
    catalog_config.resolve(dir)
}
