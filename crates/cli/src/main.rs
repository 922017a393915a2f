use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use timeline::{EditConfig, Ms, Project, SplitScope, TrackId};
use tracing::{info, warn};

mod replay;

use replay::{read_json, write_json, GestureFile};

#[derive(Parser)]
#[command(name = "timeline-replay")]
#[command(about = "Replay recorded timeline gestures against a project snapshot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a move, trim or scrub gesture and print each proposal
    Replay {
        /// Project snapshot (JSON)
        #[arg(short, long)]
        project: PathBuf,

        /// Recorded gesture (JSON)
        #[arg(short, long)]
        gesture: PathBuf,

        /// Edit configuration (JSON); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Behave as if the snap-override modifier were held
        #[arg(long)]
        no_snap: bool,

        /// Commit the final proposal and write the project here
        #[arg(long)]
        commit: Option<PathBuf>,
    },

    /// Split clips at a time
    Split {
        /// Project snapshot (JSON)
        #[arg(short, long)]
        project: PathBuf,

        /// Split time in milliseconds
        #[arg(long)]
        at: Ms,

        /// Only split clips on this track
        #[arg(long)]
        track: Option<uuid::Uuid>,

        /// Where to write the edited project; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the snap edges of every track
    Edges {
        /// Project snapshot (JSON)
        #[arg(short, long)]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            project,
            gesture,
            config,
            no_snap,
            commit,
        } => replay_command(&project, &gesture, config.as_deref(), no_snap, commit.as_deref()),
        Commands::Split {
            project,
            at,
            track,
            output,
        } => split_command(&project, at, track.map(TrackId), output.as_deref()),
        Commands::Edges { project } => edges_command(&project),
    }
}

fn replay_command(
    project_path: &Path,
    gesture_path: &Path,
    config_path: Option<&Path>,
    no_snap: bool,
    commit: Option<&Path>,
) -> Result<()> {
    let mut project: Project = read_json(project_path)?;
    let gesture: GestureFile = read_json(gesture_path)?;
    let config = match config_path {
        Some(path) => EditConfig::load(path)?,
        None => EditConfig::default(),
    };

    let proposals = replay::replay(&project, &gesture, &config, no_snap)?;
    for proposal in &proposals {
        println!("{}", serde_json::to_string(proposal)?);
    }

    if let Some(out) = commit {
        let Some(last) = proposals.last() else {
            bail!("gesture has no pointer moves, nothing to commit");
        };
        if project.commit(last)?.is_none() {
            warn!("scrub gestures do not change clips; writing project unchanged");
        }
        write_json(out, &project)?;
        info!("wrote {}", out.display());
    }
    Ok(())
}

fn split_command(
    project_path: &Path,
    at: Ms,
    track: Option<TrackId>,
    output: Option<&Path>,
) -> Result<()> {
    let mut project: Project = read_json(project_path)?;
    let scope = match track {
        Some(id) => {
            project.track(id)?;
            SplitScope::Track(id)
        }
        None => SplitScope::AllTracks,
    };

    let outcomes = project.split_at_playhead(&[], at, scope)?;
    if outcomes.is_empty() {
        warn!("no clip strictly contains {}ms", at);
    }
    for outcome in &outcomes {
        info!(
            "split {} into {} and {}",
            outcome.original, outcome.left_id, outcome.right_id
        );
    }

    match output {
        Some(path) => write_json(path, &project)?,
        None => println!("{}", serde_json::to_string_pretty(&project)?),
    }
    Ok(())
}

fn edges_command(project_path: &Path) -> Result<()> {
    let project: Project = read_json(project_path)?;
    println!("{}", serde_json::to_string(&project.all_edges(None))?);
    Ok(())
}
