use crate::{
    config::PackConfig,
    deck::{build_deck, write_package},
    error::{Error, Result},
    extract::{extract_pairs, QaPair},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

/// Statistics collected while building a deck package.
#[derive(Debug, Clone, Serialize)]
pub struct PackStats {
    /// Number of response files scanned
    pub files_scanned: usize,

    /// Number of notes added to the deck
    pub notes_added: usize,

    /// Path of the written package file
    pub package_path: String,

    /// Total execution time
    pub duration: Duration,
}

impl PackStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║               Deck Build Summary                      ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files Scanned:        {:>8}                        ║",
            self.files_scanned
        );
        println!(
            "║ Notes Added:          {:>8}                        ║",
            self.notes_added
        );
        println!(
            "║ Duration:             {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("║ Package File:                                         ║");
        println!("║   {}                                              ║", self.package_path);
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Bundles extracted QA pairs from one run directory into a deck package.
pub struct Packer {
    config: PackConfig,
}

impl Packer {
    /// Creates a packer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: PackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scans the notes directory, extracts QA pairs, and writes the package.
    ///
    /// The listing is non-recursive and sorted by file name so the note
    /// order across files is deterministic. Files that yield no pairs
    /// contribute nothing; an empty directory still produces a package with
    /// zero notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed, a matching file
    /// cannot be read, or the package cannot be written.
    #[instrument(skip(self), fields(dir = %self.config.notes_dir.display()))]
    pub fn run(self) -> Result<PackStats> {
        let start_time = Instant::now();

        let files = self.list_note_files()?;
        info!(
            "Scanning {} response files in {}",
            files.len(),
            self.config.notes_dir.display()
        );

        let mut pairs: Vec<QaPair> = Vec::new();
        for file in &files {
            let content = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
            let extracted = extract_pairs(&content);
            debug!("{}: {} pairs", file.display(), extracted.len());
            pairs.extend(extracted);
        }

        let deck = build_deck(&self.config.deck_name, "", &pairs)?;
        let package_path = self.config.package_path();
        write_package(deck, &package_path)?;

        let duration = start_time.elapsed();
        info!(
            "✓ Created Anki package: {} ({} notes from {} files in {:.2}s)",
            package_path.display(),
            pairs.len(),
            files.len(),
            duration.as_secs_f64()
        );

        Ok(PackStats {
            files_scanned: files.len(),
            notes_added: pairs.len(),
            package_path: package_path.display().to_string(),
            duration,
        })
    }

    /// Lists matching files directly under the notes directory, sorted.
    fn list_note_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.config.notes_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.config.notes_dir.clone());
                match e.into_io_error() {
                    Some(io) => Error::io(path, io),
                    None => Error::config(format!("Walk error under {}", path.display())),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let matches = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == self.config.extension.as_str());
            if matches {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}
