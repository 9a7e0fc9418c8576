//! nld: command line tools for the NetHack session dataset
//!
//! Renders session timesteps to PNG files, prints metadata records and
//! lists the session files under a dataset root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nld_data::{Dataset, MetadataTable, Session, SessionMetadata, layout};
use nld_render::{ImageRenderer, IndexPolicy, RenderConfig};

/// Tools for the NetHack session dataset
#[derive(Parser, Debug)]
#[command(name = "nld")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose logging (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render timesteps of a session file to PNG
    Render {
        /// Session file (.npz)
        session: PathBuf,

        /// Timestep to render
        #[arg(short = 's', long = "step", default_value_t = 0, conflicts_with = "all")]
        step: usize,

        /// Render every timestep into the output directory
        #[arg(short = 'a', long = "all")]
        all: bool,

        /// Output PNG file, or directory with --all
        #[arg(short = 'o', long = "out")]
        out: PathBuf,

        /// Renderer configuration (JSON)
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Clamp out-of-range colours and characters instead of failing
        #[arg(long = "clamp")]
        clamp: bool,

        /// Do not highlight the cursor cell
        #[arg(long = "no-cursor")]
        no_cursor: bool,
    },

    /// Print metadata records
    Info {
        /// Metadata file (JSON)
        metadata: PathBuf,

        /// Only this session
        #[arg(short = 's', long = "session")]
        session: Option<String>,

        /// Only sessions of this user
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },

    /// List session files under a dataset root
    List {
        /// Dataset root directory
        root: PathBuf,

        /// Metadata file, required for --missing
        #[arg(short = 'm', long = "metadata")]
        metadata: Option<PathBuf>,

        /// List metadata entries whose session file is absent
        #[arg(long = "missing", requires = "metadata")]
        missing: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Render {
            session,
            step,
            all,
            out,
            config,
            clamp,
            no_cursor,
        } => {
            let mut config = load_config(config.as_deref())?;
            if clamp {
                config.index_policy = IndexPolicy::Clamp;
            }
            if no_cursor {
                config.highlight_cursor = false;
            }
            render(&session, step, all, &out, config)
        }
        Command::Info {
            metadata,
            session,
            user,
        } => info(&metadata, session.as_deref(), user.as_deref()),
        Command::List {
            root,
            metadata,
            missing,
        } => list(&root, metadata.as_deref(), missing),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config` if given, else the user's config file if present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<RenderConfig> {
    if let Some(path) = explicit {
        return RenderConfig::load_from_file(path)
            .with_context(|| format!("reading config {}", path.display()));
    }
    match dirs::config_dir() {
        Some(dir) => {
            let path = dir.join("nld").join("render.json");
            RenderConfig::load_or_default(&path)
                .with_context(|| format!("reading config {}", path.display()))
        }
        None => Ok(RenderConfig::default()),
    }
}

fn render(session_path: &Path, step: usize, all: bool, out: &Path, config: RenderConfig) -> Result<()> {
    let session = Session::load(session_path)
        .with_context(|| format!("loading session {}", session_path.display()))?;
    let renderer = ImageRenderer::with_config(config);

    if !all {
        let obs = session.observation(step)?;
        let image = renderer
            .render(&obs)
            .with_context(|| format!("rendering step {step}"))?;
        image
            .save(out)
            .with_context(|| format!("writing {}", out.display()))?;
        tracing::info!(step, out = %out.display(), "rendered");
        return Ok(());
    }

    if session.is_empty() {
        bail!("session {} has no timesteps", session_path.display());
    }
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    for (step, obs) in session.observations().enumerate() {
        let image = renderer
            .render(&obs?)
            .with_context(|| format!("rendering step {step}"))?;
        let path = out.join(format!("step_{step:06}.png"));
        image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(steps = session.len(), out = %out.display(), "rendered session");
    Ok(())
}

fn info(metadata_path: &Path, session: Option<&str>, user: Option<&str>) -> Result<()> {
    let table = MetadataTable::load(metadata_path)?;

    if let Some(id) = session {
        let meta = table
            .get(id)
            .with_context(|| format!("no metadata for session {id}"))?;
        print_record(id, meta);
        return Ok(());
    }

    let mut shown = 0;
    for (id, meta) in table.iter() {
        if user.is_some_and(|u| meta.username != u) {
            continue;
        }
        print_record(id, meta);
        shown += 1;
    }
    println!(
        "{shown} session(s), {} user(s), {} timesteps in table",
        table.usernames().len(),
        table.total_length()
    );
    Ok(())
}

fn print_record(id: &str, meta: &SessionMetadata) {
    let started = meta
        .started_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| meta.stamp.to_string());
    println!(
        "{id}: {user} {role} ({alignment}) rank {rank}, {length} steps, started {started}, \
         XL {min_xl}-{max_xl}, XP {min_xp}-{max_xp}, dlvl {min_dl}-{max_dl}, dnum {min_dn}-{max_dn}",
        user = meta.username,
        role = meta.role,
        alignment = meta.alignment,
        rank = meta.rank,
        length = meta.length,
        min_xl = meta.min_experience_level,
        max_xl = meta.max_experience_level,
        min_xp = meta.min_experience_points,
        max_xp = meta.max_experience_points,
        min_dl = meta.min_dungeon_level,
        max_dl = meta.max_dungeon_level,
        min_dn = meta.min_dungeon_number,
        max_dn = meta.max_dungeon_number,
    );
}

fn list(root: &Path, metadata: Option<&Path>, missing: bool) -> Result<()> {
    if missing {
        let Some(metadata) = metadata else {
            bail!("--missing needs --metadata");
        };
        let dataset = Dataset::open(root, metadata)?;
        for id in dataset.missing_sessions() {
            println!("{}", dataset.session_path(id)?.display());
        }
        return Ok(());
    }

    let files = layout::scan_root(root)
        .with_context(|| format!("scanning {}", root.display()))?;
    for file in &files {
        println!("{}/{}", file.username, file.session_id);
    }
    println!("{} session file(s)", files.len());
    Ok(())
}
