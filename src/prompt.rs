use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

/// Fixed system instruction sent with every completion request.
pub const SYSTEM_INSTRUCTION: &str =
    "Only respond with what the user asks. Nothing else. Instructions end after CONTENT:";

const TEMPLATE_NAME: &str = "anki";
const CONTENT_VAR: &str = "content";

/// Prompt template with a single insertion point for the note content.
///
/// The built-in instruction template asks the model for `Q:`/`A:` pairs in
/// the exact textual convention the deck builder later extracts. An external
/// Tera template may override it as long as it references `content`.
pub struct PromptTemplate {
    tera: Tera,
}

impl PromptTemplate {
    /// Creates a prompt template, optionally from an external template file.
    ///
    /// # Errors
    ///
    /// Returns an error if the external template cannot be read, contains
    /// invalid Tera syntax, or never references the `content` variable.
    pub fn new(template_path: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();

        match template_path {
            Some(path) => {
                let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                tera.add_raw_template(TEMPLATE_NAME, &source)
                    .map_err(|e| Error::template(path.display().to_string(), e))?;
            }
            None => {
                tera.add_raw_template(TEMPLATE_NAME, include_str!("../templates/anki.tera"))
                    .map_err(|e| Error::template(TEMPLATE_NAME, e))?;
            }
        }

        let template = Self { tera };
        template.validate()?;
        Ok(template)
    }

    /// Renders the user message for one source file's content.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self, content: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert(CONTENT_VAR, content);

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| Error::template(TEMPLATE_NAME, e))
    }

    /// Checks that the template actually embeds the content variable.
    fn validate(&self) -> Result<()> {
        const PROBE: &str = "__ankigen_probe__";

        let rendered = self.render(PROBE)?;
        if !rendered.contains(PROBE) {
            return Err(Error::config(
                "prompt template never references the 'content' variable",
            ));
        }

        Ok(())
    }
}
