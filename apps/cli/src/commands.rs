//! CLI command definitions, routing, and tracing setup.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use embed_json_core::{Contents, SourceFile, process_file};
use embed_json_shared::{
    EmbedJsonError, EmbedOptions, MimeTypes, default_config_path, init_config, load_config,
    load_config_from,
};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// embed-json: inline external JSON script sources into HTML.
#[derive(Parser)]
#[command(
    name = "embed-json",
    version,
    about = "Inline <script src=\"*.json\"> references into HTML documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Embed referenced JSON files into HTML documents.
    Embed(EmbedArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `embed`.
#[derive(Args)]
pub(crate) struct EmbedArgs {
    /// HTML files or glob patterns (e.g. "dist/**/*.html").
    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Write results into this directory instead of rewriting files in place.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// List files that would be rewritten without writing anything.
    #[arg(long, conflicts_with = "out_dir")]
    pub check: bool,
}

/// Embedder options. Flags override the config file, which overrides defaults.
#[derive(Args)]
pub(crate) struct OptionArgs {
    /// Config file (defaults to ./embed-json.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory `src` attributes are resolved against.
    #[arg(long, env = "EMBED_JSON_ROOT")]
    pub root: Option<PathBuf>,

    /// Script type to embed (repeatable).
    #[arg(long = "mime-type", value_name = "TYPE")]
    pub mime_types: Vec<String>,

    /// Embed file contents verbatim instead of minifying them.
    #[arg(long)]
    pub no_minify: bool,

    /// Text encoding of the referenced files (utf8, ascii, latin1, utf16le).
    #[arg(long)]
    pub encoding: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write ./embed-json.toml with every default spelled out.
    Init,
    /// Show the resolved options.
    Show {
        #[command(flatten)]
        options: OptionArgs,
    },
}

impl OptionArgs {
    /// Options set explicitly on the command line.
    fn overrides(&self) -> EmbedOptions {
        EmbedOptions {
            root: self.root.clone(),
            mime_types: (!self.mime_types.is_empty())
                .then(|| MimeTypes::Many(self.mime_types.clone())),
            minify: self.no_minify.then_some(false),
            encoding: self.encoding.clone(),
        }
    }

    /// Config file options with command-line overrides applied.
    fn load(&self) -> Result<EmbedOptions> {
        let from_file = match &self.config {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        Ok(from_file.merge(self.overrides()))
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "embed_json=info",
        1 => "embed_json=debug",
        _ => "embed_json=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Embed(args) => cmd_embed(&args),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show { options } => cmd_config_show(&options),
        },
    }
}

// ---------------------------------------------------------------------------
// embed
// ---------------------------------------------------------------------------

/// Per-run counters.
#[derive(Debug, Default)]
struct Summary {
    rewritten: usize,
    unchanged: usize,
    failed: usize,
}

fn cmd_embed(args: &EmbedArgs) -> Result<()> {
    let options = args.options.load()?;
    // Fail fast on bad options instead of once per file.
    options.resolve().wrap_err("invalid options")?;

    let paths = expand_inputs(&args.inputs)?;
    if paths.is_empty() {
        return Err(eyre!("no input files matched"));
    }

    if let Some(out_dir) = &args.out_dir {
        fs::create_dir_all(out_dir)
            .wrap_err_with(|| format!("cannot create output directory {}", out_dir.display()))?;
    }

    info!(files = paths.len(), "embedding json sources");

    let mut summary = Summary::default();
    for path in &paths {
        let file = match load_source(path) {
            Ok(file) => file,
            Err(err) => {
                error!(%err, "failed to read input");
                summary.failed += 1;
                continue;
            }
        };

        let original = file.contents.clone();
        let out = match process_file(file, &options) {
            Ok(out) => out,
            Err(err) => {
                error!(%err, "embed failed");
                summary.failed += 1;
                continue;
            }
        };

        let changed = out.contents != original;
        if changed {
            summary.rewritten += 1;
        } else {
            summary.unchanged += 1;
        }

        if args.check {
            if changed {
                println!("{}", out.path.display());
            }
            continue;
        }

        if let Err(err) = write_output(&out, changed, args.out_dir.as_deref()) {
            error!(%err, "failed to write output");
            summary.failed += 1;
        }
    }

    info!(
        rewritten = summary.rewritten,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "done"
    );

    if summary.failed > 0 {
        return Err(eyre!(
            "{} of {} file(s) failed",
            summary.failed,
            paths.len()
        ));
    }
    if args.check && summary.rewritten > 0 {
        return Err(eyre!("{} file(s) would be rewritten", summary.rewritten));
    }

    Ok(())
}

/// Expand literal paths and glob patterns, keeping first-seen order.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for input in inputs {
        if is_glob(input) {
            let matches =
                glob::glob(input).wrap_err_with(|| format!("invalid glob pattern '{input}'"))?;
            for entry in matches {
                let path = entry.wrap_err("failed to read glob match")?;
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        } else {
            let path = PathBuf::from(input);
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Read a file into the shape the embedder expects. Directories have no body.
fn load_source(path: &Path) -> std::result::Result<SourceFile, EmbedJsonError> {
    if path.is_dir() {
        return Ok(SourceFile {
            path: path.to_path_buf(),
            contents: Contents::Null,
        });
    }

    let bytes = fs::read(path).map_err(|e| EmbedJsonError::io(path, e))?;
    Ok(SourceFile::buffer(path, bytes))
}

/// Write `file` to `out_dir`, or back in place when it changed.
fn write_output(
    file: &SourceFile,
    changed: bool,
    out_dir: Option<&Path>,
) -> std::result::Result<(), EmbedJsonError> {
    let Contents::Buffer(bytes) = &file.contents else {
        return Ok(());
    };

    let dest = match out_dir {
        Some(dir) => {
            let name = file.path.file_name().ok_or_else(|| {
                EmbedJsonError::io(
                    &file.path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;
            dir.join(name)
        }
        None if changed => file.path.clone(),
        None => return Ok(()),
    };

    fs::write(&dest, bytes).map_err(|e| EmbedJsonError::io(&dest, e))?;
    info!(path = %dest.display(), changed, "wrote file");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = default_config_path();
    init_config(&path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show(options: &OptionArgs) -> Result<()> {
    let options = options.load()?;
    let config = options.resolve().wrap_err("invalid options")?;

    let shown = EmbedOptions::defaults().merge(options);
    let rendered = toml::to_string_pretty(&shown).wrap_err("failed to render options")?;

    println!("{rendered}");
    println!("# resolved root: {}", config.root.display());
    println!("# resolved encoding: {}", config.encoding);
    Ok(())
}
