//! Word-level language identification for two-language code-switched text.
//!
//! The crate exposes both a library API and a `codeswitch` command line
//! interface. Each language is modelled by a frequency lexicon plus a smoothed
//! character n-gram Markov model; per-token evidence from both sources is
//! blended and a two-state Viterbi search assigns the globally most probable
//! label sequence. Typical usage trains one [`NgramModel`] per language from a
//! frequency lexicon, pairs the resulting [`LanguageModel`]s, and decodes
//! pre-tokenized sentences.
//!
//! ```
//! use codeswitch::{
//!     Decoder, DecoderConfig, LanguageModel, LanguagePair, Lexicon, NgramModel, TrainingConfig,
//! };
//!
//! # fn main() -> codeswitch::Result<()> {
//! let ga_entries = vec![("agus".to_string(), 20), ("maith".to_string(), 9)];
//! let en_entries = vec![("the".to_string(), 25), ("good".to_string(), 9)];
//! let cfg = TrainingConfig::builder().show_progress(false).build()?;
//!
//! let ga = LanguageModel::new(
//!     "ga",
//!     Lexicon::from_entries(&ga_entries),
//!     NgramModel::train("ga", &ga_entries, &cfg)?,
//!     1.0,
//! )?;
//! let en = LanguageModel::new(
//!     "en",
//!     Lexicon::from_entries(&en_entries),
//!     NgramModel::train("en", &en_entries, &cfg)?,
//!     1.0,
//! )?;
//! let pair = LanguagePair::new(ga, en)?;
//!
//! let decoder = Decoder::new(DecoderConfig::default());
//! let labels = decoder.decode(&pair, &["agus", "the"])?;
//! assert_eq!(labels, ["ga", "en"]);
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature. Users targeting
//! the library portion only can disable default features to avoid the CLI
//! dependencies: `codeswitch = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod config;
pub mod decode;
pub mod error;
pub mod lexicon;
pub mod model;
pub mod ngram;
pub mod score;
pub mod serialization;

pub use config::{DecodeMode, DecoderBuilder, DecoderConfig, TrainingBuilder, TrainingConfig};
pub use decode::Decoder;
pub use error::{CodeswitchError, Result};
pub use lexicon::Lexicon;
pub use model::{LanguageModel, LanguagePair, Slot};
pub use ngram::NgramModel;
pub use score::{score, TokenScores};
