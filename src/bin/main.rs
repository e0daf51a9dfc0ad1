use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use langid_core::corpus::Corpus;
use langid_core::persistence::{
    frequency_path, load_profiles, save_bundle, save_frequency_table, save_profile_dir,
};
use langid_core::{ClassificationResult, Classifier, Config, LangIdError, ProfileTrainer};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Identify the language of a text with character n-gram rank profiles.
#[derive(Parser)]
#[command(name = "langid", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "LANGID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build reference profiles from a corpus of per-language documents
    Train(TrainArgs),
    /// Detect the language of a text
    Detect(DetectArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Corpus root: one subdirectory of documents per language
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Output directory for <language>.ngrams.txt profiles
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Keep only the N best-ranked n-grams per language
    #[arg(long)]
    limit: Option<usize>,
    /// Also write every profile into one binary bundle
    #[arg(long)]
    bundle: Option<PathBuf>,
    /// Keep Project Gutenberg headers and footers
    #[arg(long)]
    keep_boilerplate: bool,
    /// Save the languages that trained even if others have no usable documents
    #[arg(long)]
    allow_partial: bool,
}

#[derive(Args)]
struct DetectArgs {
    /// Text to classify (reads --file or stdin when absent)
    text: Option<String>,
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,
    /// Profile directory or bundle file
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Rank charged for n-grams a profile has never seen
    #[arg(long)]
    penalty: Option<u64>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
    /// Show the distance to every language
    #[arg(long)]
    distances: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<LangIdError>() {
                Some(e) if e.is_input_error() => {
                    eprintln!("{} {}", "No usable input text:".red().bold(), e);
                }
                Some(e) if e.is_configuration_error() => {
                    eprintln!("{} {}", "No usable trained profiles:".red().bold(), e);
                }
                _ => eprintln!("{} {:#}", "Error:".red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_file_or_default(cli.config.as_deref())?;
    match cli.command {
        Command::Train(args) => train(config, args),
        Command::Detect(args) => detect(config, args),
    }
}

fn train(mut config: Config, args: TrainArgs) -> Result<()> {
    if let Some(corpus) = args.corpus {
        config.corpus_root = corpus;
    }
    if let Some(profiles) = args.profiles {
        config.profile_root = profiles;
    }
    if args.limit.is_some() {
        config.profile_limit = args.limit;
    }
    if args.keep_boilerplate {
        config.strip_boilerplate = false;
    }

    let corpus = Corpus::discover(&config.corpus_root)?
        .with_boilerplate_stripping(config.strip_boilerplate);
    let trainer = ProfileTrainer::new(&config);
    let reports = if args.allow_partial {
        let mut reports = Vec::new();
        for (language, result) in trainer.train_each(&corpus) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => println!("{} {}: {}", "skipped".yellow(), language.bold(), e),
            }
        }
        if reports.is_empty() {
            return Err(LangIdError::NoProfiles.into());
        }
        reports
    } else {
        trainer.train_corpus(&corpus)?
    };

    for report in &reports {
        save_frequency_table(
            &frequency_path(&config.profile_root, report.profile.language()),
            &report.table,
        )?;
        println!(
            "{} {}: {} n-grams from {} documents ({} skipped)",
            "trained".green(),
            report.profile.language().bold(),
            report.profile.len(),
            report.documents_used,
            report.failures.len()
        );
    }

    let profiles: Vec<_> = reports.into_iter().map(|r| r.profile).collect();
    save_profile_dir(&config.profile_root, &profiles)?;
    if let Some(bundle) = args.bundle {
        save_bundle(&bundle, &profiles)?;
    }
    Ok(())
}

fn detect(mut config: Config, args: DetectArgs) -> Result<()> {
    if let Some(profiles) = args.profiles {
        config.profile_root = profiles;
    }
    if let Some(penalty) = args.penalty {
        config.out_of_profile_penalty = penalty;
    }

    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let profiles = load_profiles(&config.profile_root)?;
    let classifier = Classifier::with_penalty(profiles, config.out_of_profile_penalty)?;
    let result = classifier.classify(&text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, args.distances);
    }
    Ok(())
}

fn print_result(result: &ClassificationResult, distances: bool) {
    println!("{}", result.language.as_str().green().bold());
    if distances {
        for (language, distance) in result.ranked() {
            println!("  {:<20} {}", language, distance);
        }
    }
}
