use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    restore_session, session_handle, ConfirmationGate, FileTokenStore, HttpResourceClient,
    Outcome, ResourceKind, ResourceListController, ResourceProfile, StaticConfirmation,
    StoreSessionGuard, TokenStore,
};
use serde_json::Value;
use shared::domain::{LookupEntry, LookupId, Resource, ResourceId};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{PromptConfirmation, TerminalNotifier};

#[derive(Parser, Debug)]
#[command(name = "resource-desk", about = "Manage books and users over the REST API")]
struct Cli {
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    token_path: Option<PathBuf>,
    /// Skip delete confirmation prompts.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a bearer token obtained from the sign-in service.
    Login {
        #[arg(long)]
        token: String,
    },
    Logout,
    Books {
        #[command(subcommand)]
        action: ResourceAction,
    },
    Users {
        #[command(subcommand)]
        action: ResourceAction,
    },
}

#[derive(Subcommand, Debug)]
enum ResourceAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Add {
        /// `name=value`; values that parse as JSON are sent as JSON.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    Edit {
        id: i64,
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    Delete {
        id: i64,
    },
    Lookup,
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = client_core::load_settings();
    if let Some(url) = cli.api_base_url.clone() {
        settings.api_base_url = url;
    }
    if let Some(path) = cli.token_path.clone() {
        settings.token_path = path;
    }
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(settings.token_path.clone()));

    let (kind, action) = match cli.command {
        Command::Login { token } => {
            store.save(token.trim()).context("failed to store token")?;
            println!("Token stored at {}", settings.token_path.display());
            return Ok(());
        }
        Command::Logout => {
            store.clear().context("failed to clear token")?;
            println!("Signed out");
            return Ok(());
        }
        Command::Books { action } => (ResourceKind::Books, action),
        Command::Users { action } => (ResourceKind::Users, action),
    };

    let session = restore_session(store.as_ref())?;
    if !session.is_authenticated() {
        bail!("not signed in; run `resource-desk login --token <TOKEN>` first");
    }
    let session = session_handle(session);
    let profile = ResourceProfile::for_kind(kind);
    let client = HttpResourceClient::new(settings.base_url()?, profile.endpoints, session.clone());
    let confirmation: Arc<dyn ConfirmationGate> = if cli.yes {
        Arc::new(StaticConfirmation(true))
    } else {
        Arc::new(PromptConfirmation)
    };
    let controller = ResourceListController::new(
        profile.schema,
        Arc::new(client),
        Arc::new(TerminalNotifier),
        confirmation,
        Arc::new(StoreSessionGuard::new(session, store)),
    )
    .with_page_size(settings.page_size);

    let outcome = match controller.mount().await {
        Outcome::Applied => run_action(&controller, action).await,
        other => other,
    };

    match outcome {
        Outcome::Applied => {
            render(&controller).await;
            Ok(())
        }
        Outcome::Skipped | Outcome::Cancelled => Ok(()),
        Outcome::SignedOut => Err(anyhow!(
            "session expired; run `resource-desk login --token <TOKEN>` to sign in again"
        )),
        Outcome::Failed(err) => Err(err.into()),
    }
}

async fn run_action(controller: &ResourceListController, action: ResourceAction) -> Outcome {
    match action {
        ResourceAction::List { page } => {
            controller.change_page(page).await;
            Outcome::Applied
        }
        ResourceAction::Add { fields } => {
            for (name, value) in fields {
                controller.update_add_draft(name, value).await;
            }
            controller.submit_add().await
        }
        ResourceAction::Edit { id, fields } => {
            if !controller.begin_edit_by_id(ResourceId(id)).await {
                eprintln!("{} {id} not found", controller.schema().singular);
                return Outcome::Skipped;
            }
            for (name, value) in fields {
                controller.update_edit_draft(name, value).await;
            }
            controller.submit_edit().await
        }
        ResourceAction::Delete { id } => controller.request_delete(ResourceId(id)).await,
        ResourceAction::Lookup => {
            for entry in controller.lookup_entries().await {
                println!("{:>4}  {}", entry.id.0, entry.name);
            }
            Outcome::Skipped
        }
    }
}

async fn render(controller: &ResourceListController) {
    let page = controller.page().await;
    let lookup = controller.lookup_entries().await;
    if page.items.is_empty() {
        println!("No {} available.", controller.schema().plural);
    }
    for record in &page.items {
        println!("{}", describe(record, &lookup));
    }
    println!("{}", pager(page.page_numbers(), page.effective_page));
}

/// `Page 2 of 3: 1 [2] 3`
fn pager(pages: impl Iterator<Item = usize>, current: usize) -> String {
    let numbers: Vec<String> = pages
        .map(|number| {
            if number == current {
                format!("[{number}]")
            } else {
                number.to_string()
            }
        })
        .collect();
    format!(
        "Page {current} of {}: {}",
        numbers.len(),
        numbers.join(" ")
    )
}

fn describe(record: &Resource, lookup: &[LookupEntry]) -> String {
    let mut line = format!("#{:<4}", record.id.0);
    for (name, value) in &record.fields {
        let shown = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        line.push_str(&format!("  {name}={shown}"));
        let label = value
            .as_i64()
            .filter(|_| name.ends_with("_id"))
            .and_then(|id| lookup.iter().find(|entry| entry.id == LookupId(id)));
        if let Some(entry) = label {
            line.push_str(&format!(" ({})", entry.name));
        }
    }
    line
}
