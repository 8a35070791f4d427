use std::path::{Path, PathBuf};

/// Date/time stamp naming one generation run.
///
/// Computed once at the start of a batch so every output of the run lands
/// under the same `<DD_MM_YYYY>/<HHMMSS>` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    date: String,
    time: String,
}

impl RunStamp {
    /// Captures the current local date and time.
    #[must_use]
    pub fn now() -> Self {
        let now = chrono::Local::now();
        Self {
            date: now.format("%d_%m_%Y").to_string(),
            time: now.format("%H%M%S").to_string(),
        }
    }

    /// Returns the run directory under the given output root.
    #[must_use]
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.date).join(&self.time)
    }

    /// Date component, `DD_MM_YYYY`.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Time component, `HHMMSS`.
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }
}
