pub mod render;
pub mod theme;

pub use render::exercise_text;
pub use theme::Theme;
