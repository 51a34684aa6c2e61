use std::fmt;

/// Token written in place of each placeholder by [`Template::render`].
pub const PLACEHOLDER_TOKEN: &str = "@@PTS_PLACEHOLDER@@";
pub const WORD_GROUP_CLASS: &str = "h5p-pick-the-symbols-word-group";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, entities left encoded.
    Text(String),
    /// A complete tag or comment copied through verbatim.
    Markup(String),
    Placeholder(usize),
    /// A word kept on the same line as the blank group that follows it.
    WordGroup { word: String, placeholder: usize },
}

/// Display template: literal segments interleaved with numbered placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    pub(crate) fn push_markup(&mut self, markup: String) {
        self.segments.push(Segment::Markup(markup));
    }

    pub(crate) fn push_placeholder(&mut self, placeholder: usize) {
        self.segments.push(Segment::Placeholder(placeholder));
    }

    pub(crate) fn push_word_group(&mut self, word: String, placeholder: usize) {
        self.segments.push(Segment::WordGroup { word, placeholder });
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| {
                matches!(
                    segment,
                    Segment::Placeholder(_) | Segment::WordGroup { .. }
                )
            })
            .count()
    }

    pub fn has_word_groups(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::WordGroup { .. }))
    }

    /// The same template with every word group unwrapped, leaving only
    /// literal text, markup and placeholders.
    pub fn placeholder_template(&self) -> Template {
        let mut template = Template::default();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => template.push_text(text),
                Segment::Markup(markup) => template.push_markup(markup.clone()),
                Segment::Placeholder(index) => template.push_placeholder(*index),
                Segment::WordGroup { word, placeholder } => {
                    template.push_text(word);
                    template.push_placeholder(*placeholder);
                }
            }
        }
        template
    }

    /// Renders to HTML, asking `fill` for the markup of each placeholder.
    pub fn render_with<F>(&self, mut fill: F) -> String
    where
        F: FnMut(usize) -> String,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Markup(markup) => out.push_str(markup),
                Segment::Placeholder(index) => out.push_str(&fill(*index)),
                Segment::WordGroup { word, placeholder } => {
                    out.push_str(&format!("<span class=\"{WORD_GROUP_CLASS}\">"));
                    out.push_str(word);
                    out.push_str(&fill(*placeholder));
                    out.push_str("</span>");
                }
            }
        }
        out
    }

    pub fn render(&self, token: &str) -> String {
        self.render_with(|_| token.to_string())
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PLACEHOLDER_TOKEN))
    }
}

/// Counts [`PLACEHOLDER_TOKEN`] occurrences in a rendered template.
pub fn count_placeholders(rendered: &str) -> usize {
    rendered.matches(PLACEHOLDER_TOKEN).count()
}
