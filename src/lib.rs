//! Personal finance advisor core: tiered question resolution and deterministic
//! savings/investment projections, served over MCP.
//!
//! A question is answered by the first tier that can answer it:
//!
//! | Tier | Source | Match | Moderated |
//! |------|--------|-------|-----------|
//! | **Static** | Curated FAQ corpus | Nearest embedding (L2, optional cutoff) | Always authoritative |
//! | **Dynamic** | Previously generated answers | Case-insensitive substring, first inserted wins | Only approved entries match |
//! | **Generated** | External LLM | - | Queued unapproved for review |
//!
//! Projections are pure functions of their inputs. Narratives from the LLM are
//! optional decoration and never change the numbers.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (bundled) with forward-only migrations
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions),
//!   or a hashed bag-of-words provider that needs no model files
//! - **Static index**: in-memory flat index rebuilt on every start
//! - **Generation**: OpenAI-compatible chat completions over `reqwest`
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: configuration from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema and migrations
//! - [`embedding`]: text-to-vector providers
//! - [`knowledge`]: static/dynamic stores, the static index and the resolution pipeline
//! - [`projection`]: savings annuity and portfolio growth math, plus the audit trail
//! - [`generation`]: the generator capability, its HTTP client and prompts
//! - [`advisor`]: projections with optional narrative and audit
//! - [`error`]: the shared error taxonomy

pub mod advisor;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod projection;
