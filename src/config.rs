use crate::error::{Error, Result};
use std::path::PathBuf;

const DEFAULT_FILELIST: &str = "filelist.txt";
const DEFAULT_OUTPUT_ROOT: &str = "results";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_NOTE_EXTENSION: &str = "md";

/// Configuration for the note-generation batch.
///
/// Use [`GenerateConfig::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GenerateConfig {
    /// Newline-delimited list of input file paths
    pub filelist: PathBuf,

    /// Root directory for run output (`<root>/<DD_MM_YYYY>/<HHMMSS>/`)
    pub output_root: PathBuf,

    /// Model name sent with each completion request
    pub model: String,

    /// Chat-completions endpoint URL
    pub api_url: String,

    /// Path to an external prompt template file
    pub template_path: Option<PathBuf>,

    /// Existing run directory to continue into, skipping finished outputs
    pub resume_dir: Option<PathBuf>,

    /// Dry run mode (no service calls, no file writes)
    pub dry_run: bool,
}

impl GenerateConfig {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ankigen::GenerateConfig;
    ///
    /// let config = GenerateConfig::builder()
    ///     .filelist("filelist.txt")
    ///     .output_root("results")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> GenerateConfigBuilder {
        GenerateConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file list doesn't exist or is not a file
    /// - The model name or API URL is empty
    /// - A resume directory is given but doesn't exist
    pub fn validate(&self) -> Result<()> {
        if !self.filelist.exists() {
            return Err(Error::config(format!(
                "File list does not exist: {}",
                self.filelist.display()
            )));
        }

        if !self.filelist.is_file() {
            return Err(Error::config(format!(
                "File list path is not a file: {}",
                self.filelist.display()
            )));
        }

        if self.model.is_empty() {
            return Err(Error::config("model must not be empty"));
        }

        if self.api_url.is_empty() {
            return Err(Error::config("api_url must not be empty"));
        }

        if let Some(ref template_path) = self.template_path {
            if !template_path.is_file() {
                return Err(Error::config(format!(
                    "Template file does not exist: {}",
                    template_path.display()
                )));
            }
        }

        if let Some(ref resume_dir) = self.resume_dir {
            if !resume_dir.is_dir() {
                return Err(Error::config(format!(
                    "Resume directory does not exist: {}",
                    resume_dir.display()
                )));
            }
        }

        Ok(())
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            filelist: PathBuf::from(DEFAULT_FILELIST),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            template_path: None,
            resume_dir: None,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`GenerateConfig`].
#[derive(Debug, Default)]
pub struct GenerateConfigBuilder {
    filelist: Option<PathBuf>,
    output_root: Option<PathBuf>,
    model: Option<String>,
    api_url: Option<String>,
    template_path: Option<PathBuf>,
    resume_dir: Option<PathBuf>,
    dry_run: bool,
}

impl GenerateConfigBuilder {
    /// Sets the path to the newline-delimited file list.
    #[must_use]
    pub fn filelist(mut self, path: impl Into<PathBuf>) -> Self {
        self.filelist = Some(path.into());
        self
    }

    /// Sets the root directory for run output.
    #[must_use]
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = Some(path.into());
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the chat-completions endpoint URL.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the path to an external prompt template file.
    ///
    /// When provided, this template is used instead of the built-in
    /// instruction template. It must reference the `content` variable.
    #[must_use]
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Continues a previous run: outputs land in the given directory and
    /// files whose output already exists are skipped.
    #[must_use]
    pub fn resume_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.resume_dir = Some(path.into());
        self
    }

    /// Enables dry run mode (no service calls, no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<GenerateConfig> {
        let config = GenerateConfig {
            filelist: self.filelist.unwrap_or_else(|| PathBuf::from(DEFAULT_FILELIST)),
            output_root: self
                .output_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_url: self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            template_path: self.template_path,
            resume_dir: self.resume_dir,
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the deck-building step.
///
/// Use [`PackConfig::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PackConfig {
    /// Directory holding the generated response files
    pub notes_dir: PathBuf,

    /// Name of the produced deck; also names the package file
    pub deck_name: String,

    /// Extension of the response files to scan for (without leading dot)
    pub extension: String,
}

impl PackConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PackConfigBuilder {
        PackConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The notes directory doesn't exist or is not a directory
    /// - The deck name is empty
    /// - The extension is empty or carries a leading dot
    pub fn validate(&self) -> Result<()> {
        if !self.notes_dir.exists() {
            return Err(Error::config(format!(
                "Notes directory does not exist: {}",
                self.notes_dir.display()
            )));
        }

        if !self.notes_dir.is_dir() {
            return Err(Error::config(format!(
                "Notes path is not a directory: {}",
                self.notes_dir.display()
            )));
        }

        if self.deck_name.is_empty() {
            return Err(Error::config("deck_name must not be empty"));
        }

        if self.extension.is_empty() {
            return Err(Error::config("extension must not be empty"));
        }

        if self.extension.starts_with('.') {
            return Err(Error::config(format!(
                "extension '{}' must not include the leading dot",
                self.extension
            )));
        }

        Ok(())
    }

    /// Returns the path the package file will be written to.
    #[must_use]
    pub fn package_path(&self) -> PathBuf {
        self.notes_dir.join(format!("{}.apkg", self.deck_name))
    }
}

/// Builder for creating a [`PackConfig`].
#[derive(Debug, Default)]
pub struct PackConfigBuilder {
    notes_dir: Option<PathBuf>,
    deck_name: Option<String>,
    extension: Option<String>,
}

impl PackConfigBuilder {
    /// Sets the directory holding the generated response files.
    #[must_use]
    pub fn notes_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.notes_dir = Some(path.into());
        self
    }

    /// Sets the deck name.
    #[must_use]
    pub fn deck_name(mut self, name: impl Into<String>) -> Self {
        self.deck_name = Some(name.into());
        self
    }

    /// Sets the response file extension to scan for (without leading dot).
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<PackConfig> {
        let config = PackConfig {
            notes_dir: self.notes_dir.unwrap_or_else(|| PathBuf::from(".")),
            deck_name: self.deck_name.unwrap_or_default(),
            extension: self
                .extension
                .unwrap_or_else(|| DEFAULT_NOTE_EXTENSION.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}
