//! `namesake`: fuzzy contact matching over a local SQLite address book.
//!
//! # Usage
//!
//! ```
//! namesake add --given John --family Smith --email jsmith@example.com
//! namesake match --given Jon --family Smith
//! namesake complete "smi jo"
//! namesake query '(beginswith "email" "jsmith")'
//! ```

mod input;
mod prompt;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use namesake_core::{Contact, ContactId, Query, store::ContactStore};
use namesake_match::{
  MatchConfig, MatchError,
  completion::CompletionSession,
  locate::try_locate_match,
  merging::{DuplicateGate, MergeOutcome, MergeResolver, Resolution},
};
use namesake_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{input::ContactArgs, prompt::PromptResolver};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Fuzzy contact matching and deduplication")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "namesake.toml")]
  config: PathBuf,

  /// SQLite database to use, overriding `store_path` from the config.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Print results as JSON lines.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Add a contact, checking for duplicates first.
  Add {
    #[command(flatten)]
    contact:      ContactArgs,
    /// What to do when the contact resembles an existing one.
    #[arg(long, value_enum, default_value_t = OnDuplicate::Ask)]
    on_duplicate: OnDuplicate,
  },
  /// List every contact.
  List,
  /// Find the existing contact that best matches the given one.
  Match {
    #[command(flatten)]
    contact: ContactArgs,
    /// Ignore this contact id when searching. May be repeated.
    #[arg(long, value_name = "ID")]
    avoid:   Vec<String>,
  },
  /// Rank contacts against typed text, as an address-entry completer would.
  Complete { text: String },
  /// Run a raw filter query, e.g. `(contains "full_name" "smith")`.
  Query { expr: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum OnDuplicate {
  /// Ask on the terminal.
  Ask,
  Merge,
  Add,
  Cancel,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from the config file and `NAMESAKE_*`
/// environment variables.
#[derive(Deserialize)]
struct CliConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  #[serde(default)]
  matching:   MatchConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/namesake/contacts.db") }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(
      config::Environment::with_prefix("NAMESAKE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(cfg.store_path.as_path()));
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command {
    Command::Add { contact, on_duplicate } => {
      let contact = contact.into_contact()?;
      let outcome = match on_duplicate {
        OnDuplicate::Ask => add(store, PromptResolver, contact, &cfg.matching).await?,
        OnDuplicate::Merge => add(store, Resolution::Merge, contact, &cfg.matching).await?,
        OnDuplicate::Add => add(store, Resolution::AddAnyway, contact, &cfg.matching).await?,
        OnDuplicate::Cancel => add(store, Resolution::Cancel, contact, &cfg.matching).await?,
      };
      match outcome {
        Some(outcome) => print_outcome(&outcome, cli.json)?,
        None => eprintln!("cancelled; nothing written"),
      }
    }
    Command::List => {
      for contact in store.list_contacts().await? {
        print_contact(&contact, cli.json)?;
      }
    }
    Command::Match { contact, avoid } => {
      let contact = contact.into_contact()?;
      let avoid: Vec<ContactId> = avoid.into_iter().map(ContactId::from).collect();
      let found = try_locate_match(&*store, contact, &avoid, &cfg.matching)
        .await
        .context("match search failed")?;

      if cli.json {
        let line = serde_json::json!({
          "match_type": found.match_type,
          "contact": found.best,
        });
        println!("{line}");
      } else {
        match &found.best {
          Some(best) => println!("{:?}\t{}", found.match_type, summary(best)),
          None => println!("{:?}", found.match_type),
        }
      }
    }
    Command::Complete { text } => {
      let mut session = CompletionSession::new(store, &cfg.matching);
      let ranked = session.search(&text).collect_ranked().await;
      for hit in &ranked.matches {
        if cli.json {
          let line = serde_json::json!({
            "score": hit.score,
            "match_type": hit.match_type,
            "contact": hit.contact,
          });
          println!("{line}");
        } else {
          println!("{}\t{:?}\t{}", hit.score, hit.match_type, summary(&hit.contact));
        }
      }
      if let Some(status) = ranked.status.filter(|s| !s.is_success()) {
        tracing::warn!(?status, "completion ended early");
      }
    }
    Command::Query { expr } => {
      let query = Query::parse(&expr).context("invalid query")?;
      for contact in store.query(&query).await? {
        print_contact(&contact, cli.json)?;
      }
    }
  }

  Ok(())
}

/// Run the duplicate gate once. `None` means the user cancelled.
async fn add<R: MergeResolver>(
  store: Arc<SqliteStore>,
  resolver: R,
  contact: Contact,
  config: &MatchConfig,
) -> anyhow::Result<Option<MergeOutcome>> {
  let gate = DuplicateGate::new(store, resolver, config);
  match gate.add_contact(contact).await {
    Ok(outcome) => Ok(Some(outcome)),
    Err(MatchError::Cancelled) => Ok(None),
    Err(e) => Err(e).context("failed to add contact"),
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

/// One-line description: id, display name and primary address.
fn summary(contact: &Contact) -> String {
  let id = contact.id.as_ref().map(ContactId::as_str).unwrap_or("-");
  match contact.primary_email() {
    Some(email) => format!("{id}\t{} <{email}>", contact.full_name()),
    None => format!("{id}\t{}", contact.full_name()),
  }
}

fn print_contact(contact: &Contact, json: bool) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string(contact)?);
  } else {
    println!("{}", summary(contact));
  }
  Ok(())
}

fn print_outcome(outcome: &MergeOutcome, json: bool) -> anyhow::Result<()> {
  let (action, id) = match outcome {
    MergeOutcome::Added(id) => ("added", id),
    MergeOutcome::Merged(id) => ("merged", id),
    MergeOutcome::Modified(id) => ("modified", id),
  };
  if json {
    println!("{}", serde_json::json!({ "action": action, "id": id }));
  } else {
    println!("{action} {id}");
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
