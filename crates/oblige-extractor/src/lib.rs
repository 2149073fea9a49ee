//! Oblige Extractor
//!
//! Turns PDF bytes into text and text into obligation lists.
//!
//! # Architecture
//!
//! ```text
//! PDF bytes → TextExtraction → text → ObligationEngine → Completer → ObligationList
//! ```
//!
//! # Key Features
//!
//! - **Empty-text detection**: blank documents fail instead of yielding no obligations
//! - **Prompting**: separate prompts for obligation extraction and legislation discovery
//! - **Token budget**: legislation text is cut to a leading character window
//! - **Normalization**: bullet markers and blank lines are stripped from model output
//!
//! # Example Usage
//!
//! ```no_run
//! use oblige_extractor::{ExtractorConfig, LopdfExtractor, ObligationEngine, TextExtraction};
//! use oblige_llm::MockCompleter;
//! use std::sync::Arc;
//!
//! # async fn example(pdf: Vec<u8>) -> Result<(), oblige_extractor::ExtractorError> {
//! let text = TextExtraction::new(Arc::new(LopdfExtractor))
//!     .extract_text_blocking(pdf)
//!     .await?;
//!
//! let engine = ObligationEngine::new(
//!     Arc::new(MockCompleter::new("- File annual reports")),
//!     ExtractorConfig::default(),
//! );
//! let obligations = engine.extract_obligations("Company X", &text).await?;
//! println!("{} obligations", obligations.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod parser;
mod prompt;
mod text;


pub use config::{ExtractorConfig, DEFAULT_LEGISLATION_WINDOW_CHARS};
pub use engine::ObligationEngine;
pub use error::ExtractorError;
pub use parser::parse_completion;
pub use prompt::{leading_chars, PromptBuilder, PromptPair};
pub use text::{assemble_pages, LopdfExtractor, TextExtraction};
