use ankigen::{GenerateConfig, PackConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "ankigen",
    version,
    author,
    about = "Turn study notes into Anki flashcards",
    long_about = "Turn study notes into Anki flashcards with a chat-completion API.\n\n\
    The pipeline has two manual steps. 'generate' sends every file listed in a \
    newline-delimited file list to the completion service and saves each reply under \
    results/<date>/<time>/. After inspecting the output, 'pack' extracts Q:/A: pairs \
    from one run directory and bundles them into a single .apkg deck.\n\n\
    USAGE EXAMPLES:\n  \
      # Generate notes for every file in filelist.txt\n  \
      ankigen generate\n\n  \
      # Continue a partially failed run\n  \
      ankigen generate --resume results/03_12_2023/224351\n\n  \
      # Bundle a run into a deck\n  \
      ankigen pack --dir results/03_12_2023/224351 --name \"Biology\""
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate Q:/A: notes for every file in the file list
    Generate {
        /// Newline-delimited list of input file paths
        #[arg(short, long, default_value = "filelist.txt", value_name = "FILE")]
        filelist: PathBuf,

        /// Root directory for run output
        #[arg(short, long, default_value = "results", value_name = "PATH")]
        out: PathBuf,

        /// Model name sent with each request
        #[arg(short, long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
        model: String,

        /// Chat-completions endpoint URL
        #[arg(
            long,
            env = "OPENAI_API_URL",
            default_value = "https://api.openai.com/v1/chat/completions",
            value_name = "URL"
        )]
        api_url: String,

        /// Path to a custom Tera prompt template (must reference 'content')
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Continue into an existing run directory, skipping finished outputs
        #[arg(long, value_name = "DIR")]
        resume: Option<PathBuf>,

        /// Dry run (no service calls, no file writes)
        #[arg(long)]
        dry_run: bool,
    },

    /// Bundle one run directory into an Anki deck package
    Pack {
        /// Run directory holding the generated response files
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Deck name; also names the .apkg file
        #[arg(short, long, value_name = "NAME")]
        name: String,

        /// Response file extension to scan for (without leading dot)
        #[arg(long, default_value = "md", value_name = "EXT")]
        ext: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Generate {
            filelist,
            out,
            model,
            api_url,
            template,
            resume,
            dry_run,
        } => {
            let mut builder = GenerateConfig::builder()
                .filelist(filelist)
                .output_root(out)
                .model(model)
                .api_url(api_url)
                .dry_run(dry_run);

            if let Some(template_path) = template {
                builder = builder.template_path(template_path);
            }

            if let Some(resume_dir) = resume {
                builder = builder.resume_dir(resume_dir);
            }

            let config = builder.build().context("Failed to build configuration")?;

            let stats = ankigen::generate(config).context("Note generation failed")?;
            stats.print_summary();
        }
        Command::Pack { dir, name, ext } => {
            let config = PackConfig::builder()
                .notes_dir(dir)
                .deck_name(name)
                .extension(ext)
                .build()
                .context("Failed to build configuration")?;

            let stats = ankigen::pack(config).context("Deck build failed")?;
            stats.print_summary();
        }
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("ankigen=info"),
        1 => EnvFilter::new("ankigen=debug"),
        _ => EnvFilter::new("ankigen=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
