//! Document-vault chat client.
//!
//! DESIGN
//! ======
//! Users keep documents in named vaults and ask questions about them. The
//! [`store::VaultStore`] owns every vault, document and session and is the
//! only thing that mutates them; [`chat::ChatPanel`], [`sidebar::Sidebar`]
//! and [`upload::UploadQueue`] issue intents against it. Answers come from a
//! keyword scorer ([`retrieval`]) and a rule-table synthesizer ([`synth`]),
//! or from the prototype RAG service.
//!
//! Persistence lives behind [`api::VaultApi`]: the HTTP client for a real
//! server, or [`api::memory::MemoryApi`] for offline use.

pub mod api;
pub mod chat;
pub mod config;
pub mod demo;
pub mod model;
pub mod notify;
pub mod retrieval;
pub mod sidebar;
pub mod store;
pub mod synth;
pub mod upload;
