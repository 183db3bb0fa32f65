use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bunnywear", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the outfit key for an item set.
    Fingerprint(FingerprintArgs),
    /// Composite items onto a base image and write a PNG.
    Composite(CompositeArgs),
    /// List generated outfits as JSON.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Directory public URLs resolve against.
    #[arg(long, default_value = "public")]
    public_root: PathBuf,

    /// Generated outfit gallery directory.
    #[arg(long, default_value = "public/generated-bunnies")]
    generated_root: PathBuf,

    /// Composite cache directory.
    #[arg(long, default_value = "public/composites")]
    cache_root: PathBuf,

    /// Public URL prefix of the gallery directory.
    #[arg(long, default_value = bunnywear::DEFAULT_URL_PREFIX)]
    generated_url_prefix: String,

    /// JSON slot table replacing the built-in placements.
    #[arg(long)]
    slot_table: Option<PathBuf>,

    /// Request worker threads.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Generative image API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Generative image model.
    #[arg(long)]
    gemini_model: Option<String>,

    /// Generative API timeout in seconds.
    #[arg(long, default_value_t = 120)]
    gemini_timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// Base character identifier.
    #[arg(long)]
    base: String,

    /// Scene identifier; selects the scene-qualified key.
    #[arg(long)]
    scene: Option<String>,

    /// JSON file holding an array of equipped items.
    #[arg(long)]
    items: PathBuf,
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Base image path.
    #[arg(long)]
    base_image: PathBuf,

    /// JSON file holding an array of equipped items.
    #[arg(long)]
    items: PathBuf,

    /// Directory item image URLs resolve against.
    #[arg(long, default_value = "public")]
    public_root: PathBuf,

    /// JSON slot table replacing the built-in placements.
    #[arg(long)]
    slot_table: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Generated outfit gallery directory.
    #[arg(long, default_value = "public/generated-bunnies")]
    root: PathBuf,

    /// Public URL prefix of the gallery directory.
    #[arg(long, default_value = bunnywear::DEFAULT_URL_PREFIX)]
    url_prefix: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::Composite(args) => cmd_composite(args),
        Command::List(args) => cmd_list(args),
    }
}

fn read_items(path: &Path) -> anyhow::Result<Vec<bunnywear::EquippedItem>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("open items '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| "parse items JSON")
}

fn load_layout(path: Option<&Path>) -> anyhow::Result<bunnywear::SlotLayout> {
    Ok(match path {
        Some(path) => bunnywear::SlotLayout::load_json(path)?,
        None => bunnywear::SlotLayout::with_defaults(),
    })
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut gemini = bunnywear::GeminiConfig {
        api_key: args.gemini_api_key,
        timeout_secs: args.gemini_timeout_secs,
        ..Default::default()
    };
    if let Some(model) = args.gemini_model {
        gemini.model = model;
    }

    let config = bunnywear::ServerConfig {
        bind: args.bind,
        public_root: args.public_root,
        generated_root: args.generated_root,
        cache_root: args.cache_root,
        generated_url_prefix: args.generated_url_prefix,
        slot_table: args.slot_table,
        workers: args.workers,
        gemini,
        ..Default::default()
    };

    let state = bunnywear::AppState::from_config(config)?;
    bunnywear::bind(state)?.run()
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<()> {
    let items = read_items(&args.items)?;
    println!(
        "{}",
        bunnywear::outfit_key(&items, &args.base, args.scene.as_deref())
    );
    Ok(())
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let items = read_items(&args.items)?;
    let layout = Arc::new(load_layout(args.slot_table.as_deref())?);
    let compositor = bunnywear::Compositor::new(layout, args.public_root);

    let png = compositor.composite(&args.base_image, &items)?;
    bunnywear::write_creating_dirs(&args.out, &png)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let outfits = bunnywear::list_generated(&args.root, &args.url_prefix)?;
    println!("{}", serde_json::to_string_pretty(&outfits)?);
    Ok(())
}
