//! Path parsing and library indexing for Tesla dashcam footage trees (§4.1, §4.2).

pub mod error;
pub mod indexer;
pub mod path_parser;

pub use error::{IndexerError, IndexerResult, RejectReason};
pub use indexer::build_index;
pub use path_parser::{parse, render, EventAssetKind, ParsedClip, ParsedEntry, ParsedEventAsset};
