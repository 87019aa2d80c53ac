//! GameBlitz quest engine - command-line entry point.
//!
//! `validate` checks a quest definition file and lists every problem with it.
//! `replay` runs a JSON-lines file of game events through a quest for one player using
//! in-memory storage, then prints the final progression.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use gameblitz_domain::NewQuest;
use gameblitz_engine::infrastructure::config::{AppConfig, NotifierKind};
use gameblitz_engine::infrastructure::json_logic::JsonLogicEvaluator;
use gameblitz_engine::infrastructure::notifier::{BroadcastNotifier, LogNotifier};
use gameblitz_engine::infrastructure::ports::ProgressionNotifier;
use gameblitz_engine::use_cases::{ProgressionError, TaskGraphValidator};
use gameblitz_engine::App;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: gameblitz-engine <command>

Commands:
  validate <quest.json>
  replay <quest.json> <events.jsonl> [player-id]";

const DEFAULT_PLAYER: &str = "player-1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gameblitz_engine=info,gameblitz_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("validate") => {
            let quest_path = args.next().context(USAGE)?;
            validate(Path::new(&quest_path))
        }
        Some("replay") => {
            let quest_path = args.next().context(USAGE)?;
            let events_path = args.next().context(USAGE)?;
            let player_id = args.next().unwrap_or_else(|| DEFAULT_PLAYER.to_string());
            replay(
                &config,
                Path::new(&quest_path),
                Path::new(&events_path),
                &player_id,
            )
            .await
        }
        Some(cmd) => bail!("Unknown command: {cmd}\n\n{USAGE}"),
        None => bail!(USAGE),
    }
}

fn read_quest(path: &Path) -> anyhow::Result<NewQuest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading quest definition {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing quest definition {}", path.display()))
}

fn validate(quest_path: &Path) -> anyhow::Result<()> {
    let data = read_quest(quest_path)?;
    let validator = TaskGraphValidator::new(Arc::new(JsonLogicEvaluator::new()));

    match validator.validate(&data) {
        Ok(()) => {
            println!("{}: ok ({} tasks)", quest_path.display(), data.tasks.len());
            Ok(())
        }
        Err(err) => {
            for violation in err.violations() {
                println!("{}: {violation}", quest_path.display());
            }
            bail!("{} violation(s) found", err.violations().len())
        }
    }
}

async fn replay(
    config: &AppConfig,
    quest_path: &Path,
    events_path: &Path,
    player_id: &str,
) -> anyhow::Result<()> {
    let data = read_quest(quest_path)?;
    let events = std::fs::read_to_string(events_path)
        .with_context(|| format!("reading events {}", events_path.display()))?;

    let (notifier, subscriber) = build_notifier(config);
    let app = App::in_memory(notifier);
    let quests = &app.use_cases.quest;
    let progressions = &app.use_cases.progression;

    let quest = quests.ops.create(data).await.context("creating quest")?;
    progressions
        .ops
        .start(&quest, player_id)
        .await
        .context("starting quest")?;

    for (index, line) in events.lines().enumerate() {
        let event = line.trim();
        if event.is_empty() {
            continue;
        }

        match progressions
            .apply_event
            .execute(&quest, player_id, event)
            .await
        {
            Ok(progression) => {
                tracing::info!(
                    line = index + 1,
                    active = progression.active_tasks().count(),
                    completed = progression.tasks().iter().filter(|t| t.is_completed()).count(),
                    quest_completed = progression.is_completed(),
                    "Event applied"
                );
            }
            Err(ProgressionError::Notification { source, .. }) => {
                tracing::warn!(line = index + 1, error = %source, "Event applied, notification failed");
            }
            Err(ProgressionError::AlreadyCompleted { .. }) => {
                tracing::info!(line = index + 1, "Quest already completed, skipping event");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("applying event on line {}", index + 1))
            }
        }
    }

    let progression = progressions.ops.get(&quest, player_id).await?;

    // Dropping the app releases the last sender, letting the subscriber drain and exit.
    drop(app);
    if let Some(subscriber) = subscriber {
        subscriber.await.context("progression subscriber failed")?;
    }

    println!("{}", serde_json::to_string_pretty(&progression)?);
    Ok(())
}

fn build_notifier(
    config: &AppConfig,
) -> (Option<Arc<dyn ProgressionNotifier>>, Option<JoinHandle<()>>) {
    tracing::info!(notifier = %config.notifier, "Configuring progression notifier");
    match config.notifier {
        NotifierKind::Log => (Some(Arc::new(LogNotifier::new())), None),
        NotifierKind::Broadcast => {
            let notifier = BroadcastNotifier::new(config.broadcast_capacity);
            let subscriber = notifier.spawn_subscriber(|published| {
                println!("{} {}", published.routing_key, published.body)
            });
            (Some(Arc::new(notifier)), Some(subscriber))
        }
        NotifierKind::None => (None, None),
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
