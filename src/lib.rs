//! # ankigen
//!
//! A two-step pipeline that turns study notes into Anki flashcards.
//!
//! ## Features
//!
//! - Batch note generation through a chat-completion API, one request per
//!   source file, with timestamped run directories
//! - Resumable runs that skip already-generated outputs
//! - `Q:`/`A:` pair extraction from generated text
//! - Self-contained `.apkg` deck packaging with stable deck identifiers
//!
//! ## Quick Start
//!
//! ```no_run
//! use ankigen::{GenerateConfig, PackConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Step one: generate Q:/A: notes for every listed file.
//! let config = GenerateConfig::builder()
//!     .filelist("filelist.txt")
//!     .output_root("results")
//!     .build()?;
//! let stats = ankigen::generate(config)?;
//!
//! // Step two (after inspecting the output): bundle a run into a deck.
//! let config = PackConfig::builder()
//!     .notes_dir(stats.output_directory)
//!     .deck_name("My Deck")
//!     .build()?;
//! ankigen::pack(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The two jobs are independent and run manually in sequence:
//! 1. **Generator**: reads the file list, calls the completion service for
//!    each file, writes replies to `results/<date>/<time>/`
//! 2. **Packer**: scans one run directory, extracts QA pairs, serializes
//!    them into a single `.apkg` package

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod deck;
mod error;
mod extract;
mod filelist;
mod generator;
mod packer;
mod prompt;
mod stamp;

pub use client::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, CompletionClient, OpenAiClient};
pub use config::{GenerateConfig, GenerateConfigBuilder, PackConfig, PackConfigBuilder};
pub use deck::{build_deck, deck_id, note_model};
pub use error::{Error, Result};
pub use extract::{extract_pairs, QaPair};
pub use generator::{GenerateStats, Generator};
pub use packer::{PackStats, Packer};
pub use prompt::{PromptTemplate, SYSTEM_INSTRUCTION};
pub use stamp::RunStamp;

/// Runs the note-generation batch with the given configuration.
///
/// This is the main entry point for step one of the pipeline.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The API credential is absent from the environment
/// - An input file is missing or unreadable
/// - A completion request fails
/// - An output file cannot be written
pub fn generate(config: GenerateConfig) -> Result<GenerateStats> {
    Generator::new(config)?.run()
}

/// Bundles one run directory into an Anki deck package.
///
/// This is the main entry point for step two of the pipeline.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The directory cannot be listed or a file cannot be read
/// - The package cannot be written
pub fn pack(config: PackConfig) -> Result<PackStats> {
    Packer::new(config)?.run()
}
