//! Interactive chat loop.
//!
//! DESIGN
//! ======
//! Each input line parses into a [`ReplCommand`]; slash commands drive the
//! store and sidebar, anything else is a question for the chat panel. Errors
//! from the library have already been toasted, so the loop logs them and
//! carries on.

#[cfg(test)]
#[path = "repl_test.rs"]
mod repl_test;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use docvault::api::VaultApi;
use docvault::api::rag::RagClient;
use docvault::chat::ChatPanel;
use docvault::notify::Notifier;
use docvault::sidebar::Sidebar;
use docvault::store::VaultStore;
use docvault::upload::{PendingFile, UploadQueue};
use time::OffsetDateTime;

use crate::render::{render_message, render_samples, sample_by_number};

const HELP: &str = "\
/vaults              보관함 목록
/use <id>            보관함 선택
/new-vault <name>    보관함 생성
/drop-vault <id>     보관함 삭제
/docs                문서 목록
/upload <paths...>   문서 업로드
/drop-doc <id>       문서 삭제
/sessions            채팅 이력
/open <id>           채팅 열기
/new                 새 채팅
/drop-session <id>   채팅 삭제
/rag <question>      RAG 서비스에 질문
/help                도움말
/quit                종료
그 외 입력은 질문으로 처리됩니다.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Vaults,
    Use(String),
    NewVault(String),
    DropVault(String),
    Docs,
    Upload(Vec<String>),
    DropDoc(String),
    Sessions,
    Open(String),
    New,
    DropSession(String),
    Rag(String),
    Help,
    Quit,
    Ask(String),
    Empty,
    Invalid(String),
}

/// Parse one input line.
#[must_use]
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line.to_owned());
    };
    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let arg = arg.trim();
    let required = |build: fn(String) -> ReplCommand| {
        if arg.is_empty() {
            ReplCommand::Invalid(format!("/{name} 명령에는 인자가 필요합니다"))
        } else {
            build(arg.to_owned())
        }
    };
    match name {
        "vaults" => ReplCommand::Vaults,
        "use" => required(ReplCommand::Use),
        "new-vault" => required(ReplCommand::NewVault),
        "drop-vault" => required(ReplCommand::DropVault),
        "docs" => ReplCommand::Docs,
        "upload" => required(|a| ReplCommand::Upload(a.split_whitespace().map(str::to_owned).collect())),
        "drop-doc" => required(ReplCommand::DropDoc),
        "sessions" => ReplCommand::Sessions,
        "open" => required(ReplCommand::Open),
        "new" => ReplCommand::New,
        "drop-session" => required(ReplCommand::DropSession),
        "rag" => required(ReplCommand::Rag),
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("알 수 없는 명령: /{other}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    store: VaultStore,
    panel: ChatPanel,
    sidebar: Sidebar,
    queue: UploadQueue,
    api: Arc<dyn VaultApi>,
    rag: Option<RagClient>,
    /// Reload a vault's documents from the API when it is selected.
    live: bool,
}

impl Repl {
    #[must_use]
    pub fn new(store: VaultStore, api: Arc<dyn VaultApi>, queue: UploadQueue, rag: Option<RagClient>, live: bool) -> Self {
        let panel = ChatPanel::new(&store);
        let sidebar = Sidebar::new(&store);
        Self { store, panel, sidebar, queue, api, rag, live }
    }

    #[must_use]
    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    #[must_use]
    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(self.store.notifier())
    }

    /// Pull vaults (and the selected vault's documents) from the API.
    pub async fn load(&mut self) {
        if self.store.load_vaults(self.api.as_ref()).await.is_err() {
            return;
        }
        self.reload_selected_documents().await;
        self.sidebar = Sidebar::new(&self.store);
        self.panel.refresh_greeting(&self.store);
    }

    async fn reload_selected_documents(&mut self) {
        if !self.live {
            return;
        }
        if let Some(vault_id) = self.store.selected_vault_id().map(str::to_owned) {
            let _ = self.store.load_documents(self.api.as_ref(), &vault_id).await;
        }
    }

    /// Print the current conversation state: greeting and sample questions.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn print_intro(&self, out: &mut impl Write) -> io::Result<()> {
        for message in self.panel.messages() {
            write!(out, "{}", render_message(message))?;
        }
        if self.panel.is_fresh() {
            write!(out, "{}", render_samples())?;
        }
        Ok(())
    }

    /// Read lines from `input` until EOF or `/quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        self.print_intro(out)?;
        for line in input.lines() {
            let line = line?;
            if self.handle_line(&line, out).await? == Flow::Quit {
                break;
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Handle one input line. A bare number picks a sample question while the
    /// conversation is fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let command = match sample_by_number(line) {
            Some(question) if self.panel.is_fresh() => ReplCommand::Ask(question.to_owned()),
            _ => parse_line(line),
        };
        self.handle(command, out).await
    }

    /// Execute one command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub async fn handle(&mut self, command: ReplCommand, out: &mut impl Write) -> io::Result<Flow> {
        tracing::debug!(?command, "repl command");
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Quit => return Ok(Flow::Quit),
            ReplCommand::Help => write!(out, "{HELP}")?,
            ReplCommand::Invalid(message) => writeln!(out, "{message}")?,
            ReplCommand::Vaults => write!(out, "{}", self.sidebar.render_vaults(&self.store))?,
            ReplCommand::Docs => write!(out, "{}", self.sidebar.render_documents(&self.store))?,
            ReplCommand::Sessions => {
                write!(out, "{}", self.sidebar.render_sessions(&self.store, OffsetDateTime::now_utc()))?;
            }
            ReplCommand::Use(vault_id) => {
                if self.store.select_vault(&vault_id).is_ok() {
                    self.reload_selected_documents().await;
                    if !self.sidebar.is_expanded(&vault_id) {
                        self.sidebar.toggle_vault(&vault_id);
                    }
                    self.reset_panel(out)?;
                }
            }
            ReplCommand::NewVault(name) => {
                if let Ok(vault) = self.store.create_vault_remote(self.api.as_ref(), &name, None).await {
                    writeln!(out, "보관함 생성됨: [{}] {}", vault.id, vault.name)?;
                    self.sidebar.toggle_vault(&vault.id);
                    self.refresh_fresh_greeting();
                }
            }
            ReplCommand::DropVault(vault_id) => {
                if self.store.delete_vault_remote(self.api.as_ref(), &vault_id).await.is_ok() {
                    self.reload_selected_documents().await;
                    self.panel.sync(&self.store);
                    self.refresh_fresh_greeting();
                }
            }
            ReplCommand::Upload(paths) => self.upload(&paths, out).await?,
            ReplCommand::DropDoc(document_id) => {
                if self.store.delete_document(&document_id).is_ok() {
                    self.refresh_fresh_greeting();
                }
            }
            ReplCommand::Open(session_id) => {
                if self.store.select_session(Some(&session_id)).is_ok() {
                    self.reset_panel(out)?;
                }
            }
            ReplCommand::New => {
                let _ = self.store.select_session(None);
                self.reset_panel(out)?;
            }
            ReplCommand::DropSession(session_id) => {
                if self.store.delete_session(&session_id).is_ok() {
                    self.panel.sync(&self.store);
                }
            }
            ReplCommand::Ask(query) => match self.panel.ask(&mut self.store, &query) {
                Ok(reply) => write!(out, "{}", render_message(&reply))?,
                Err(e) => tracing::debug!(error = %e, "question not answered"),
            },
            ReplCommand::Rag(query) => match &self.rag {
                Some(rag) => match self.panel.ask_remote(&mut self.store, rag, &query).await {
                    Ok(reply) => write!(out, "{}", render_message(&reply))?,
                    Err(e) => tracing::debug!(error = %e, "rag question not answered"),
                },
                None => writeln!(out, "RAG 서비스가 설정되지 않았습니다")?,
            },
        }
        Ok(Flow::Continue)
    }

    async fn upload(&mut self, paths: &[String], out: &mut impl Write) -> io::Result<()> {
        let Ok(vault_id) = self.sidebar.request_upload(&self.store) else {
            return Ok(());
        };
        let notifier = self.notifier();
        let max_bytes = self.queue.policy().max_bytes;
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match PendingFile::from_path(path, max_bytes).await {
                Ok(file) => files.push(file),
                Err(e) => notifier.error(&e.to_string()),
            }
        }
        self.queue.stage(files, notifier.as_ref());
        if self.queue.is_empty() {
            return Ok(());
        }

        let mut progress = Vec::new();
        let result = self
            .queue
            .submit(self.api.as_ref(), &vault_id, notifier.as_ref(), |p| progress.push(p))
            .await;
        let marks: Vec<String> = progress.iter().map(|p| format!("{p}%")).collect();
        writeln!(out, "업로드 진행: {}", marks.join(" → "))?;
        if let Ok(documents) = result {
            self.store.upload_documents(documents);
            self.refresh_fresh_greeting();
        }
        Ok(())
    }

    fn reset_panel(&mut self, out: &mut impl Write) -> io::Result<()> {
        self.panel.refresh_greeting(&self.store);
        self.print_intro(out)
    }

    fn refresh_fresh_greeting(&mut self) {
        if self.panel.session_id().is_none() && self.panel.is_fresh() {
            self.panel.refresh_greeting(&self.store);
        }
    }
}
