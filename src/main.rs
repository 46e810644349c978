use clap::{Parser, Subcommand};
use folio::scan::{ContentSource, FsContentSource, Order};
use folio::{config, generate, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Route and redirect planner for a markdown blog")]
#[command(long_about = "\
Route and redirect planner for a markdown blog

Every markdown file with frontmatter becomes an article page under the blog
base path. Articles are listed newest first on paginated listing pages, and
old paths named in `redirect_from` redirect to the article.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── 2021/
  │   ├── typed-configs.md         # Article (any depth, any file name)
  │   └── rust-static-sites.mdx    # MDX: import/export lines are ignored
  └── .drafts/                     # Hidden entries are skipped

Frontmatter:

  ---
  title: Static sites in Rust      # required
  path: rust-static-sites          # required, served at /blog/rust-static-sites
  created_at: 2021-03-04T14:05:00  # required, orders the listing
  updated_at: 2021-03-10 09:30     # optional
  description: ...                 # optional
  redirect_from:                   # optional, must be a list
    - static-sites
  ---

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log planning details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the articles found in the content directory
    Scan,
    /// Show the route table without writing anything
    Plan,
    /// Plan the route table and write it to the output directory
    Build,
    /// Validate content and routes without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan => {
            let site_config = config::load_config(&cli.source)?;
            let source = FsContentSource::new(&cli.source, site_config.content);
            let docs = source.query(Order::CreatedDesc)?;
            output::print_scan_output(&docs, &cli.source);
        }
        Command::Plan => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let source = FsContentSource::new(&cli.source, site_config.content.clone());
            let build = generate::plan_site(&source, &site_config)?;
            output::print_plan_output(&build);
        }
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            println!("==> Planning {}", cli.source.display());
            let source = FsContentSource::new(&cli.source, site_config.content.clone());
            let build = generate::plan_site(&source, &site_config)?;
            output::print_plan_output(&build);

            println!("==> Writing → {}", cli.output.display());
            let written = generate::write_build(&build.table, &cli.output, &site_config.output)?;
            output::print_write_output(&written, &cli.output);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let source = FsContentSource::new(&cli.source, site_config.content.clone());
            let build = generate::plan_site(&source, &site_config)?;
            output::print_plan_output(&build);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Send `log` output to stderr. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
