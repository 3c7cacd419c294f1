use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wordflow::cache::ContentCache;
use wordflow::context::BuildContext;
use wordflow::{config, generate, output, project, scan};

fn version_string() -> &'static str {
    let hash = env!("WORDFLOW_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} (dev@{hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "wordflow")]
#[command(about = "Publish a directory of Word documents as a static website")]
#[command(long_about = "\
Publish a directory of Word documents as a static website

Every directory under the input root is a content type. Documents are parsed
once and cached; only changed documents are parsed again.

Project structure:

  config.toml                      # Site config (run 'wordflow gen-config')
  generated_output.json            # Content cache
  source/
  ├── post/                        # Listed on index.html, newest first
  │   └── Hello World.docx
  └── page/
      └── About.docx
  themes/
  └── default/
      ├── theme.toml               # Optional [snippets] (post = listing entry)
      ├── home.html                # index.html template
      ├── post.html                # One template per content type
      ├── page.html
      └── assets/                  # Copied to out/public/assets/
  out/                             # Generated site

Templates use [[name]] placeholders: title, body, date, display_date, url,
slug, type, key, imagedir, plus the [author] and [site] fields.

Diagnostics are controlled with RUST_LOG (default: wordflow=info).")]
#[command(version = version_string())]
struct Cli {
    /// Project root containing config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Skip confirmation prompts for destructive commands
    #[arg(short, long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create config.toml and the project directories
    Init,
    /// Parse new and changed documents into the content cache
    Scan,
    /// Scan, then render the site into the output directory
    #[command(alias = "gen")]
    Generate,
    /// Remove all project directories, config.toml and the content cache
    Clear,
    /// Remove generated output and the content cache
    #[command(alias = "cc")]
    Clearcontent,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordflow=info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let report = project::init(&cli.root)?;
            output::print_init_output(&report);
        }
        Command::Scan => {
            let ctx = BuildContext::load(&cli.root)?;
            run_scan(&ctx)?;
        }
        Command::Generate => {
            let ctx = BuildContext::load(&cli.root)?;
            println!("==> Scanning {}", ctx.input_dir().display());
            let cache = run_scan(&ctx)?;
            println!("==> Generating → {}", ctx.output_dir().display());
            let report = generate::generate(&ctx, &cache)?;
            output::print_generate_output(&report);
        }
        Command::Clear => {
            let ctx = BuildContext::load(&cli.root)?;
            if confirmed(
                cli.force,
                "Remove every project directory, config.toml and the content cache?",
            )? {
                let report = project::clear(&ctx)?;
                output::print_clear_output(&report);
            } else {
                println!("Nothing removed.");
            }
        }
        Command::Clearcontent => {
            let ctx = BuildContext::load(&cli.root)?;
            if confirmed(cli.force, "Wipe all generated content?")? {
                let report = project::clear_content(&ctx)?;
                output::print_clear_output(&report);
            } else {
                println!("Nothing removed.");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scan into the persisted cache, save it and print the summary.
fn run_scan(ctx: &BuildContext) -> Result<ContentCache, Box<dyn std::error::Error>> {
    let mut cache = ContentCache::load(&ctx.root);
    let report = scan::scan(ctx, &mut cache)?;
    cache.save(&ctx.root)?;
    output::print_scan_output(&report);
    Ok(cache)
}

fn confirmed(force: bool, question: &str) -> io::Result<bool> {
    if force {
        return Ok(true);
    }
    project::confirm(question, &mut io::stdin().lock(), &mut io::stdout())
}
