pub mod blank;
pub mod blank_group;
pub mod commands;
pub mod config;
pub mod crud;
pub mod exercise;
pub mod palette;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod state;
pub mod telemetry;
pub mod tui;
pub mod utils;

pub use blank::Blank;
pub use blank_group::BlankGroup;
pub use config::{ExerciseConfig, RawExerciseConfig, apply_defaults};
pub use exercise::{BlankRef, ChooserOption, Exercise, ExerciseError, Interaction};
pub use parser::{DeconstructError, Deconstruction, SymbolAlphabet, deconstruct};
pub use report::Report;
pub use scoring::Score;
pub use state::PersistedState;
