mod render;
mod repl;

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use docvault::api::http::HttpVaultApi;
use docvault::api::rag::RagClient;
use docvault::api::{ApiError, VaultApi};
use docvault::chat::{ChatError, ChatPanel};
use docvault::config::{AppConfig, ConfigError};
use docvault::demo;
use docvault::notify::Notifier;
use docvault::store::{StoreError, VaultStore};
use docvault::upload::{MAX_UPLOAD_BYTES, PendingFile, UploadError, UploadQueue};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::render::{StderrNotifier, render_message};
use crate::repl::Repl;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "docvault", about = "Document vault chat client")]
struct Cli {
    #[arg(long, env = "DOCVAULT_API_BASE_URL")]
    api_url: Option<String>,

    #[arg(long, env = "DOCVAULT_USER_ID")]
    user_id: Option<String>,

    #[arg(long, env = "DOCVAULT_RAG_BASE_URL")]
    rag_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Vault(VaultCommand),
    Doc(DocCommand),
    /// Answer a question from one vault's documents.
    Ask {
        vault_id: String,
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    Rag(RagCommand),
    /// Interactive chat.
    Chat {
        /// Run against seeded in-memory data instead of the API.
        #[arg(long, default_value_t = false)]
        demo: bool,
    },
}

#[derive(Args, Debug)]
struct VaultCommand {
    #[command(subcommand)]
    command: VaultSubcommand,
}

#[derive(Subcommand, Debug)]
enum VaultSubcommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        vault_id: String,
    },
}

#[derive(Args, Debug)]
struct DocCommand {
    #[command(subcommand)]
    command: DocSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocSubcommand {
    List {
        vault_id: String,
    },
    Upload {
        vault_id: String,
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RagCommand {
    #[command(subcommand)]
    command: RagSubcommand,
}

#[derive(Subcommand, Debug)]
enum RagSubcommand {
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    Upload {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(api = %config.api_base_url, rag = %config.rag_base_url, "config resolved");

    match cli.command {
        Command::Vault(vault) => run_vault(&config, vault).await,
        Command::Doc(doc) => run_doc(&config, doc).await,
        Command::Ask { vault_id, question } => run_ask(&config, &vault_id, &question.join(" ")).await,
        Command::Rag(rag) => run_rag(&config, rag).await,
        Command::Chat { demo } => run_chat(&config, demo).await,
    }
}

/// Environment first, then explicit flags on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_owned();
    }
    if let Some(user_id) = &cli.user_id {
        config.user_id.clone_from(user_id);
    }
    if let Some(url) = &cli.rag_url {
        config.rag_base_url = url.trim_end_matches('/').to_owned();
    }
    Ok(config)
}

fn notifier() -> Arc<dyn Notifier> {
    Arc::new(StderrNotifier)
}

async fn run_vault(config: &AppConfig, vault: VaultCommand) -> Result<(), CliError> {
    let api = HttpVaultApi::new(config.api_config())?;
    let mut store = VaultStore::new(notifier());
    match vault.command {
        VaultSubcommand::List => {
            store.load_vaults(&api).await?;
            print_json(&serde_json::to_value(store.vaults())?)
        }
        VaultSubcommand::Create { name, description } => {
            let vault = store.create_vault_remote(&api, &name, description.as_deref()).await?;
            print_json(&serde_json::to_value(vault)?)
        }
        VaultSubcommand::Delete { vault_id } => {
            store.load_vaults(&api).await?;
            store.delete_vault_remote(&api, &vault_id).await?;
            println!("ok");
            Ok(())
        }
    }
}

async fn run_doc(config: &AppConfig, doc: DocCommand) -> Result<(), CliError> {
    let api = HttpVaultApi::new(config.api_config())?;
    let notifier = notifier();
    match doc.command {
        DocSubcommand::List { vault_id } => {
            let mut store = VaultStore::new(Arc::clone(&notifier));
            store.load_vaults(&api).await?;
            store.load_documents(&api, &vault_id).await?;
            print_json(&serde_json::to_value(store.documents_in(&vault_id))?)
        }
        DocSubcommand::Upload { vault_id, paths } => {
            let policy = config.upload_policy();
            let files = read_files(&paths, policy.max_bytes).await?;
            let mut queue = UploadQueue::new(policy);
            queue.stage(files, notifier.as_ref());
            let documents = queue
                .submit(&api, &vault_id, notifier.as_ref(), |p| eprintln!("progress: {p}%"))
                .await?;
            print_json(&serde_json::to_value(documents)?)
        }
    }
}

async fn run_ask(config: &AppConfig, vault_id: &str, question: &str) -> Result<(), CliError> {
    let api = HttpVaultApi::new(config.api_config())?;
    let mut store = VaultStore::new(notifier());
    store.load_vaults(&api).await?;
    store.select_vault(vault_id)?;
    store.load_documents(&api, vault_id).await?;

    let mut panel = ChatPanel::new(&store);
    let reply = panel.ask(&mut store, question)?;
    print!("{}", render_message(&reply));
    Ok(())
}

async fn run_rag(config: &AppConfig, rag: RagCommand) -> Result<(), CliError> {
    let client = RagClient::new(config.rag_base_url.clone())?;
    match rag.command {
        RagSubcommand::Ask { question } => {
            let answer = client.ask(&question.join(" ")).await?;
            println!("{answer}");
        }
        RagSubcommand::Upload { paths } => {
            let files = read_files(&paths, MAX_UPLOAD_BYTES).await?;
            let message = client.upload_files(&files).await?;
            println!("{}", message.as_deref().unwrap_or("ok"));
        }
    }
    Ok(())
}

async fn run_chat(config: &AppConfig, demo_mode: bool) -> Result<(), CliError> {
    let notifier = notifier();
    let queue = UploadQueue::new(config.upload_policy());
    let rag = RagClient::new(config.rag_base_url.clone()).ok();

    let mut repl = if demo_mode {
        let store = demo::seed_store(notifier);
        Repl::new(store, Arc::new(demo::seed_api()), queue, rag, false)
    } else {
        let api: Arc<dyn VaultApi> = Arc::new(HttpVaultApi::new(config.api_config())?);
        let mut repl = Repl::new(VaultStore::new(notifier), api, queue, rag, true);
        repl.load().await;
        repl
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl.run(BufReader::new(stdin.lock()), &mut stdout).await?;
    Ok(())
}

async fn read_files(paths: &[PathBuf], max_bytes: u64) -> Result<Vec<PendingFile>, CliError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(PendingFile::from_path(path, max_bytes).await?);
    }
    Ok(files)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
