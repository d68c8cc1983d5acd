pub mod analysis;
pub mod api;
pub mod chords;
pub mod config;
pub mod core_types;
pub mod error;
pub mod keys;
pub mod midi;
pub mod naming;
pub mod optimizer;
pub mod render;
pub mod scorer;
// cmd and reports are modules of the binary crate (main.rs).

pub use api::{generate, harmonize, run_search, Collaborators, Harmonization};
pub use error::{CfResult, ChordForgeError};
