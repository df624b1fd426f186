use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "monstercard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a creature card to `monster-<kind>.png`.
    Render(RenderArgs),
    /// Print the share-link query for a creature.
    Link(LinkArgs),
    /// Print the default card layout as JSON.
    Layout,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Creature kind (name or index 0-5).
    #[arg(long)]
    kind: Option<String>,

    /// Eye score (drives the head).
    #[arg(long, default_value = "")]
    eye: String,

    /// Brain score (drives the arms).
    #[arg(long, default_value = "")]
    brain: String,

    /// Bleeding score (drives the legs).
    #[arg(long, default_value = "")]
    bleeding: String,

    /// Stomach score (drives the torso).
    #[arg(long, default_value = "")]
    stomach: String,

    /// Share-link query instead of the individual fields.
    #[arg(long, conflicts_with = "kind")]
    query: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Directory the `./media/...` paths resolve against. Defaults to `MONSTERCARD_MEDIA_ROOT`
    /// or the working directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Card layout JSON (defaults to the classic card).
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Give up if the assets have not settled after this many milliseconds.
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct LinkArgs {
    #[command(flatten)]
    request: RequestArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Link(args) => cmd_link(args),
        Command::Layout => cmd_layout(),
    }
}

fn parse_request(args: &RequestArgs) -> anyhow::Result<monstercard::GenerationRequest> {
    if let Some(query) = &args.query {
        return monstercard::from_query(query)?
            .context("query does not name a creature kind");
    }
    let kind = args
        .kind
        .clone()
        .context("either --kind or --query is required")?;
    let raw = monstercard::RawRequest {
        kind,
        eye_score: args.eye.clone(),
        brain_score: args.brain.clone(),
        bleeding_score: args.bleeding.clone(),
        stomach_score: args.stomach.clone(),
    };
    Ok(monstercard::GenerationRequest::from_raw(&raw)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = parse_request(&args.request)?;

    let mut opts = monstercard::SessionOpts::from_env();
    if let Some(root) = args.assets_root {
        opts = opts.with_assets_root(root);
    }
    let layout = match &args.layout {
        Some(path) => monstercard::CardLayout::from_json_file(path)
            .with_context(|| format!("load layout '{}'", path.display()))?,
        None => monstercard::CardLayout::default(),
    };

    let mut sess = monstercard::CardSession::new(opts, layout)?;
    sess.submit_request(req);

    let mut surface = sess.cpu_surface()?;
    let settled = sess.run_until_settled(
        &mut surface,
        Duration::from_millis(16),
        Duration::from_millis(args.timeout_ms),
    )?;
    if !settled {
        anyhow::bail!("assets still loading after {} ms", args.timeout_ms);
    }
    if sess.has_any_error() {
        eprintln!("warning: some layers failed to load; exporting what is available");
    }

    let path = sess
        .export_png(&mut surface, &args.out)
        .with_context(|| format!("export card into '{}'", args.out.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_link(args: LinkArgs) -> anyhow::Result<()> {
    let req = parse_request(&args.request)?;
    println!("{}", monstercard::to_query(&req));
    Ok(())
}

fn cmd_layout() -> anyhow::Result<()> {
    println!("{}", monstercard::CardLayout::default().to_json_pretty()?);
    Ok(())
}
