//! # Report Harness
//!
//! Retrieval-grounded chat and report generation over a single Korean
//! markdown document.
//!
//! The document is split into lines, each line is reduced to its content
//! words (nouns and adjectives) by a morphological analyzer, and the
//! normalized lines are embedded in a TF-IDF space. Questions are answered
//! by retrieving the most similar lines and handing them to a completion
//! backend; generating a report replaces the document and rebuilds the
//! index.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │  report.md │──▶│ report-harness-core │──▶│   snapshot   │
//! │ (document) │   │ analyze · TF-IDF    │   │ (Arc, swap)  │
//! └─────▲──────┘   └─────────────────────┘   └──────┬───────┘
//!       │                                           │ top-k lines
//!       │ save                   ┌──────────────────┤
//!       │                        ▼                  ▼
//! ┌─────┴──────┐           ┌──────────┐       ┌──────────┐
//! │ LLM backend│◀──prompt──│   CLI    │       │   HTTP   │
//! │ Anthropic/ │           │  (rh)    │       │  (axum)  │
//! │   Ollama   │           │          │       │          │
//! └────────────┘           └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rh inspect                          # index the document, show a summary
//! rh search "주식 시장"                # ranked lines for a query
//! rh chat "요즘 시장은 어때?"          # grounded answer
//! rh report "30대 직장인, 공격형"      # generate and save a new report
//! rh serve                            # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`document`] | Loading and atomically replacing the document |
//! | [`engine`] | Analyzer and index construction from config |
//! | [`llm`] | Completion backends (Anthropic, Ollama) |
//! | [`profiles`] | Investor profile tables and label legend |
//! | [`prompt`] | Chat and report prompt templates |
//! | [`chat`] | Retrieval-grounded question answering |
//! | [`report`] | Report generation and publication |
//! | [`search`] | `rh search` |
//! | [`inspect`] | `rh inspect` |
//! | [`server`] | HTTP API |
//!
//! Tokenization, vectorization, and ranking live in the
//! [`report_harness_core`] crate.

pub mod chat;
pub mod config;
pub mod document;
pub mod engine;
pub mod inspect;
pub mod llm;
pub mod profiles;
pub mod prompt;
pub mod report;
pub mod search;
pub mod server;
