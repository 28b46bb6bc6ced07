//! Story synthesis core for the maerchen service.
//!
//! This crate provides:
//! - Admission control under per-caller and global daily limits
//! - Grade-tier aware prompt construction
//! - Completion post-processing (title, markup, end marker)
//! - Grundwortschatz indexing and matching
//! - The synthesis pipeline tying it all together
//!
//! # Quick Start
//!
//! ```ignore
//! use maerchen_core::{Config, GradeTier, Limits, StoryRequest, StoryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = StoryService::new(&Config::from_env(), Limits::default());
//!
//!     let request = StoryRequest {
//!         thema: "Freundschaft".into(),
//!         personen_tiere: "Ein kleiner Hase namens Erwin".into(),
//!         ort: "im Wald".into(),
//!         stimmung: "fröhlich".into(),
//!         laenge: 3,
//!         klassenstufe: GradeTier::Lower,
//!         stil: None,
//!         model: None,
//!     };
//!
//!     let story = service.generate("203.0.113.7", &request).await?;
//!     println!("{}: {}", story.title, story.content);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod gate;
pub mod generator;
pub mod prompt;
pub mod service;
pub mod suggestions;
pub mod text;
pub mod vocabulary;

// Primary public API
pub use config::{AiProvider, Config, Limits};
pub use gate::{Admission, AdmissionGate, GateStats};
pub use generator::{GenerateError, Generator, Story};
pub use prompt::{build_prompt, GradeTier, StoryRequest};
pub use service::{ServiceError, StoryService};
pub use suggestions::Suggestions;
pub use vocabulary::VocabularyIndex;
