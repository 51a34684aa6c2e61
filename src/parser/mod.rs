pub mod deconstruct;
pub mod hash;
pub mod load;
pub mod normalize;
pub mod symbols;
pub mod template;

pub use deconstruct::{
    DeconstructError, DeconstructOptions, Deconstruction, deconstruct, deconstruct_with,
};
pub use hash::exercise_fingerprint;
pub use load::{ExerciseFormat, load_exercise, markdown_to_html};
pub use normalize::{NBSP, ZERO_WIDTH_SPACE, normalize_text};
pub use symbols::SymbolAlphabet;
pub use template::{PLACEHOLDER_TOKEN, Segment, Template, count_placeholders};
