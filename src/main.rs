// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use deepl_client::app_config::{Config, LogLevel};
use deepl_client::translation::{
    BatchTarget, BatchTranslator, DocumentTranslateOptions, Formality, GlossaryEntries,
    TextTranslateOptions, Translator,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Formality to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormality {
    Default,
    More,
    Less,
    PreferMore,
    PreferLess,
}

impl From<CliFormality> for Formality {
    fn from(cli_formality: CliFormality) -> Self {
        match cli_formality {
            CliFormality::Default => Formality::Default,
            CliFormality::More => Formality::More,
            CliFormality::Less => Formality::Less,
            CliFormality::PreferMore => Formality::PreferMore,
            CliFormality::PreferLess => Formality::PreferLess,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "deepl-client", version, about = "Resilient DeepL API client")]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate one or more texts
    Text {
        /// Texts to translate
        #[arg(required = true)]
        texts: Vec<String>,

        /// Target language code (e.g. 'DE', 'EN-GB')
        #[arg(short, long)]
        target_language: String,

        /// Source language code; detected when omitted
        #[arg(short, long)]
        source_language: Option<String>,

        #[arg(short, long, value_enum)]
        formality: Option<CliFormality>,

        #[arg(short, long)]
        glossary_id: Option<String>,
    },

    /// Translate a document file
    Document {
        /// Document to translate
        input: PathBuf,

        /// Where to write the translated document
        output: PathBuf,

        #[arg(short, long)]
        target_language: String,

        #[arg(short, long)]
        source_language: Option<String>,

        #[arg(short, long, value_enum)]
        formality: Option<CliFormality>,

        #[arg(short, long)]
        glossary_id: Option<String>,

        /// Output file extension, e.g. 'pdf' or 'docx'
        #[arg(long)]
        output_format: Option<String>,
    },

    /// Translate texts into several target languages
    Batch {
        #[arg(required = true)]
        texts: Vec<String>,

        /// Comma separated target language codes
        #[arg(short, long, value_delimiter = ',', required = true)]
        targets: Vec<String>,

        #[arg(short, long)]
        source_language: Option<String>,

        /// Translate targets one after another
        #[arg(long)]
        sequential: bool,
    },

    /// Show character and document usage
    Usage,

    /// List supported languages
    Languages {
        /// List target instead of source languages
        #[arg(long)]
        target: bool,
    },

    /// Manage glossaries
    Glossaries {
        #[command(subcommand)]
        command: GlossaryCommands,
    },

    /// Generate shell completions for deepl-client
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum GlossaryCommands {
    /// List all glossaries
    List,

    /// Create a glossary from a tab-separated file
    Create {
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        source_language: String,

        #[arg(short, long)]
        target_language: String,

        /// File with one `source<TAB>target` entry per line
        entries: PathBuf,
    },

    /// Print the entries of a glossary
    Entries { glossary_id: String },

    /// Delete a glossary
    Delete { glossary_id: String },

    /// List language pairs glossaries support
    Pairs,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with info level; the config may lower or raise it
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "deepl-client", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load(&cli.config_path)?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.into());
    config.validate().context("Configuration validation failed")?;

    let translator = Translator::from_config(&config)?;

    // Ctrl-C cancels whatever operation is in flight
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling...");
            signal_token.cancel();
        }
    });

    match cli.command {
        Commands::Text {
            texts,
            target_language,
            source_language,
            formality,
            glossary_id,
        } => {
            let options = TextTranslateOptions {
                formality: formality.map(Into::into),
                glossary_id,
                ..Default::default()
            };
            let results = translator
                .translate_text(
                    &texts[..],
                    source_language.as_deref(),
                    &target_language,
                    &options,
                    &cancel,
                )
                .await?;
            for result in results {
                println!("{}", result.text);
            }
        }
        Commands::Document {
            input,
            output,
            target_language,
            source_language,
            formality,
            glossary_id,
            output_format,
        } => {
            let options = DocumentTranslateOptions {
                formality: formality.map(Into::into),
                glossary_id,
                output_format,
            };
            match translator
                .translate_document_path(
                    &input,
                    &output,
                    source_language.as_deref(),
                    &target_language,
                    &options,
                    &cancel,
                )
                .await
            {
                Ok(status) => {
                    let billed = status
                        .billed_characters
                        .map(|c| format!(", {} characters billed", c))
                        .unwrap_or_default();
                    info!("Translated document written to {}{}", output.display(), billed);
                }
                Err(e) => {
                    if let Some(handle) = e.document_handle() {
                        error!(
                            "Document {} was uploaded; it can be resumed with its document key",
                            handle.document_id
                        );
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Batch {
            texts,
            targets,
            source_language,
            sequential,
        } => {
            let targets: Vec<BatchTarget> = targets.into_iter().map(BatchTarget::new).collect();
            let batch = BatchTranslator::new(translator)
                .with_max_concurrent_requests(config.batch.concurrent_requests)
                .with_parallel(config.batch.parallel && !sequential);
            let results = batch
                .translate_batch(&texts[..], source_language.as_deref(), &targets, &cancel)
                .await;

            let mut failed = 0;
            for result in &results {
                if result.completed {
                    println!("[{}]", result.target_language);
                    for translation in &result.translations {
                        println!("{}", translation.text);
                    }
                } else {
                    failed += 1;
                    println!(
                        "[{}] failed: {}",
                        result.target_language,
                        result.error_message.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            if failed > 0 {
                return Err(anyhow!("{} of {} targets failed", failed, results.len()));
            }
        }
        Commands::Usage => {
            let usage = translator.get_usage(&cancel).await?;
            if let Some(character) = usage.character {
                println!("Characters: {}", character);
            }
            if let Some(document) = usage.document {
                println!("Documents: {}", document);
            }
            if let Some(team_document) = usage.team_document {
                println!("Team documents: {}", team_document);
            }
            if usage.any_limit_reached() {
                warn!("A usage limit has been reached");
            }
        }
        Commands::Languages { target } => {
            let languages = if target {
                translator.get_target_languages(&cancel).await?
            } else {
                translator.get_source_languages(&cancel).await?
            };
            for language in languages {
                let formality = match language.supports_formality {
                    Some(true) => " (formality)",
                    _ => "",
                };
                println!("{:<8} {}{}", language.code, language.name, formality);
            }
        }
        Commands::Glossaries { command } => run_glossary_command(&translator, command, &cancel).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

async fn run_glossary_command(
    translator: &Translator,
    command: GlossaryCommands,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        GlossaryCommands::List => {
            for glossary in translator.list_glossaries(cancel).await? {
                println!(
                    "{}  {} ({} -> {}, {} entries{})",
                    glossary.glossary_id,
                    glossary.name,
                    glossary.source_lang,
                    glossary.target_lang,
                    glossary.entry_count,
                    if glossary.ready { "" } else { ", not ready" }
                );
            }
        }
        GlossaryCommands::Create {
            name,
            source_language,
            target_language,
            entries,
        } => {
            let content = tokio::fs::read_to_string(&entries)
                .await
                .with_context(|| format!("Failed to read glossary entries: {}", entries.display()))?;
            let entries = GlossaryEntries::from_tsv(&content)?;
            let glossary = translator
                .create_glossary(&name, &source_language, &target_language, &entries, cancel)
                .await?;
            info!(
                "Created glossary {} with {} entries",
                glossary.glossary_id, glossary.entry_count
            );
            println!("{}", glossary.glossary_id);
        }
        GlossaryCommands::Entries { glossary_id } => {
            let entries = translator.get_glossary_entries(&glossary_id, cancel).await?;
            println!("{}", entries.to_tsv());
        }
        GlossaryCommands::Delete { glossary_id } => {
            translator.delete_glossary(&glossary_id, cancel).await?;
            info!("Deleted glossary {}", glossary_id);
        }
        GlossaryCommands::Pairs => {
            for pair in translator.get_glossary_language_pairs(cancel).await? {
                println!("{} -> {}", pair.source_lang, pair.target_lang);
            }
        }
    }
    Ok(())
}
