use crate::{
    client::{CompletionClient, OpenAiClient},
    config::GenerateConfig,
    error::{Error, Result},
    filelist::read_filelist,
    prompt::PromptTemplate,
    stamp::RunStamp,
};
use serde::Serialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateStats {
    /// Number of entries in the file list
    pub total_files: usize,

    /// Number of responses written
    pub generated: usize,

    /// Number of files skipped because their output already existed
    pub skipped: usize,

    /// Total execution time
    pub duration: Duration,

    /// Run output directory
    pub output_directory: String,

    /// Whether this was a dry run
    pub dry_run: bool,
}

impl GenerateStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Generation Run Summary                   ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Files Listed:         {:>8}                        ║",
            self.total_files
        );
        println!(
            "║ Responses Written:    {:>8}                        ║",
            self.generated
        );
        println!(
            "║ Skipped (resumed):    {:>8}                        ║",
            self.skipped
        );
        println!(
            "║ Duration:             {:>8.2}s                       ║",
            self.duration.as_secs_f64()
        );
        println!("║ Output Directory:                                     ║");
        println!("║   {}                                              ║", self.output_directory);
        if self.dry_run {
            println!("║                                                       ║");
            println!("║ ⚠ No files were written (dry run mode)               ║");
        }
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Batch driver for the note-generation step.
///
/// Reads the file list, sends each file's content to the completion service
/// one at a time, and persists every reply under a single timestamped run
/// directory.
pub struct Generator {
    config: GenerateConfig,
    template: PromptTemplate,
    client: Box<dyn CompletionClient>,
}

impl Generator {
    /// Creates a generator backed by the OpenAI-compatible client.
    ///
    /// The service credential is resolved here, so a missing key fails
    /// before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The API key is absent from the environment
    /// - The prompt template cannot be loaded
    pub fn new(config: GenerateConfig) -> Result<Self> {
        config.validate()?;
        let client = Box::new(OpenAiClient::from_env(&config)?);
        Self::with_client(config, client)
    }

    /// Creates a generator with an explicit completion client.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation or template loading
    /// fails.
    pub fn with_client(
        config: GenerateConfig,
        client: Box<dyn CompletionClient>,
    ) -> Result<Self> {
        config.validate()?;
        let template = PromptTemplate::new(config.template_path.as_deref())?;

        Ok(Self {
            config,
            template,
            client,
        })
    }

    /// Executes the batch and returns statistics.
    ///
    /// # Process
    ///
    /// Files are handled strictly one at a time: read the full text, render
    /// the prompt, call the service, write the reply. The run directory is
    /// computed once, so every output of one invocation lands together. A
    /// failed read or service call aborts the remaining batch; there is no
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is unreadable, any service call fails,
    /// or an output cannot be written.
    #[instrument(skip(self), fields(filelist = %self.config.filelist.display()))]
    pub fn run(self) -> Result<GenerateStats> {
        let start_time = Instant::now();

        let files = read_filelist(&self.config.filelist)?;
        let total = files.len();

        let output_dir = match &self.config.resume_dir {
            Some(dir) => dir.clone(),
            None => RunStamp::now().dir(&self.config.output_root),
        };

        info!(
            "Generating notes for {} files into {}",
            total,
            output_dir.display()
        );

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping service calls and file writes");
        }

        let mut generated = 0;
        let mut skipped = 0;

        for (index, file) in files.iter().enumerate() {
            debug!("Working on file: {}", file.display());

            let target = Self::output_path(&output_dir, file)?;

            if self.config.resume_dir.is_some() && target.exists() {
                debug!("Output already exists, skipping: {}", target.display());
                skipped += 1;
                Self::report_progress(index, total);
                continue;
            }

            let content = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
            let user_message = self.template.render(&content)?;

            if self.config.dry_run {
                debug!(
                    "Would send {} prompt bytes for {}",
                    user_message.len(),
                    file.display()
                );
                Self::report_progress(index, total);
                continue;
            }

            let response = self.client.complete(&user_message)?;
            debug!("Got response for {}", file.display());

            Self::write_response(&output_dir, &target, &response)?;
            generated += 1;

            debug!("Saved response to {}", target.display());
            Self::report_progress(index, total);
        }

        let duration = start_time.elapsed();

        info!(
            "✓ Generation completed: {} written, {} skipped in {:.2}s",
            generated,
            skipped,
            duration.as_secs_f64()
        );

        Ok(GenerateStats {
            total_files: total,
            generated,
            skipped,
            duration,
            output_directory: output_dir.display().to_string(),
            dry_run: self.config.dry_run,
        })
    }

    /// Computes the output path for one source file.
    fn output_path(output_dir: &Path, file: &Path) -> Result<PathBuf> {
        let name = file
            .file_name()
            .ok_or_else(|| Error::config(format!("Invalid input path: {}", file.display())))?;

        Ok(output_dir.join(name))
    }

    /// Writes one reply, creating the run directory on first use.
    fn write_response(output_dir: &Path, target: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

        // Temp file + rename so an interrupted run never leaves a torn reply.
        let temp_path = target.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        drop(temp_file);

        fs::rename(&temp_path, target).map_err(|e| Error::io(target, e))?;

        Ok(())
    }

    /// Reports progress after each file (index/total and percentage).
    fn report_progress(index: usize, total: usize) {
        let done = index + 1;
        info!(
            "{}/{} ({:.0}%)",
            done,
            total,
            (done as f64 / total as f64) * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedClient {
        reply: String,
        calls: Rc<Cell<usize>>,
    }

    impl FixedClient {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Rc::new(Cell::new(0)),
            }
        }

        fn call_counter(&self) -> Rc<Cell<usize>> {
            Rc::clone(&self.calls)
        }
    }

    impl CompletionClient for FixedClient {
        fn complete(&self, _user_message: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.reply.clone())
        }
    }

    struct FailingClient;

    impl CompletionClient for FailingClient {
        fn complete(&self, _user_message: &str) -> Result<String> {
            Err(Error::api("service unavailable"))
        }
    }

    fn write_fixtures(temp: &assert_fs::TempDir, names: &[&str]) -> std::path::PathBuf {
        let mut listing = String::new();
        for name in names {
            let file = temp.child(name);
            file.write_str("note content").unwrap();
            listing.push_str(&file.path().to_string_lossy());
            listing.push('\n');
        }

        let filelist = temp.child("filelist.txt");
        filelist.write_str(&listing).unwrap();
        filelist.path().to_path_buf()
    }

    fn config_for(temp: &assert_fs::TempDir, filelist: &Path) -> GenerateConfig {
        GenerateConfig::builder()
            .filelist(filelist)
            .output_root(temp.path().join("results"))
            .build()
            .unwrap()
    }

    fn run_outputs(results_root: &Path) -> Vec<PathBuf> {
        let mut outputs = Vec::new();
        for date in fs::read_dir(results_root).unwrap() {
            for time in fs::read_dir(date.unwrap().path()).unwrap() {
                for file in fs::read_dir(time.unwrap().path()).unwrap() {
                    outputs.push(file.unwrap().path());
                }
            }
        }
        outputs.sort();
        outputs
    }

    #[test]
    fn test_writes_one_response_per_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["one.txt", "two.txt", "three.txt"]);
        let config = config_for(&temp, &filelist);

        let generator =
            Generator::with_client(config, Box::new(FixedClient::new("Q: q?\nA: a\n\n")))
                .unwrap();
        let stats = generator.run().unwrap();

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.generated, 3);
        assert_eq!(stats.skipped, 0);

        let outputs = run_outputs(&temp.path().join("results"));
        assert_eq!(outputs.len(), 3);
        assert_eq!(fs::read_to_string(&outputs[0]).unwrap(), "Q: q?\nA: a\n\n");
    }

    #[test]
    fn test_outputs_share_one_run_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["one.txt", "two.txt"]);
        let config = config_for(&temp, &filelist);

        let generator =
            Generator::with_client(config, Box::new(FixedClient::new("reply"))).unwrap();
        generator.run().unwrap();

        let outputs = run_outputs(&temp.path().join("results"));
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].parent(), outputs[1].parent());
    }

    #[test]
    fn test_output_named_after_source_basename() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["chapter_4.txt"]);
        let config = config_for(&temp, &filelist);

        let generator =
            Generator::with_client(config, Box::new(FixedClient::new("reply"))).unwrap();
        generator.run().unwrap();

        let outputs = run_outputs(&temp.path().join("results"));
        assert_eq!(
            outputs[0].file_name().and_then(|n| n.to_str()),
            Some("chapter_4.txt")
        );
    }

    #[test]
    fn test_missing_input_aborts_batch() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = temp.child("filelist.txt");
        filelist
            .write_str(&format!("{}\n", temp.path().join("absent.txt").display()))
            .unwrap();
        let config = config_for(&temp, filelist.path());

        let generator =
            Generator::with_client(config, Box::new(FixedClient::new("reply"))).unwrap();
        let result = generator.run();

        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_service_failure_aborts_batch() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["one.txt"]);
        let config = config_for(&temp, &filelist);

        let generator = Generator::with_client(config, Box::new(FailingClient)).unwrap();
        let result = generator.run();

        assert!(matches!(result, Err(Error::Api { .. })));
    }

    #[test]
    fn test_resume_skips_existing_outputs() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["one.txt", "two.txt"]);

        let run_dir = temp.child("results/03_12_2023/224351");
        run_dir.create_dir_all().unwrap();
        run_dir.child("one.txt").write_str("earlier reply").unwrap();

        let config = GenerateConfig::builder()
            .filelist(&filelist)
            .output_root(temp.path().join("results"))
            .resume_dir(run_dir.path())
            .build()
            .unwrap();

        let client = Box::new(FixedClient::new("fresh reply"));
        let generator = Generator::with_client(config, client).unwrap();
        let stats = generator.run().unwrap();

        assert_eq!(stats.generated, 1);
        assert_eq!(stats.skipped, 1);
        // The finished output is untouched, only the missing one is filled in.
        assert_eq!(
            fs::read_to_string(run_dir.child("one.txt").path()).unwrap(),
            "earlier reply"
        );
        assert_eq!(
            fs::read_to_string(run_dir.child("two.txt").path()).unwrap(),
            "fresh reply"
        );
    }

    #[test]
    fn test_dry_run_calls_nothing_and_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let filelist = write_fixtures(&temp, &["one.txt", "two.txt"]);

        let config = GenerateConfig::builder()
            .filelist(&filelist)
            .output_root(temp.path().join("results"))
            .dry_run(true)
            .build()
            .unwrap();

        let client = FixedClient::new("reply");
        let calls = client.call_counter();
        let generator = Generator::with_client(config, Box::new(client)).unwrap();
        let stats = generator.run().unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(stats.generated, 0);
        assert!(stats.dry_run);
        assert!(!temp.path().join("results").exists());
    }
}
