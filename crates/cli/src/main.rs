//! CLI tool for analyzing PowerPoint templates and generating decks from text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use slidegen_llm::{api_key_from_env, LlmClient, LlmConfig, OutlineRequest, OutlineSource, Provider};
use slidegen_pptx::{DeckReader, PresentationAssembler, TemplateAnalyzer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Turn text into a PowerPoint deck styled after a template.
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a template's style profile as JSON
    Analyze {
        /// Template file (.pptx or .potx)
        template: PathBuf,
    },

    /// Print the text of each slide in a deck
    Inspect {
        /// Presentation file (.pptx)
        deck: PathBuf,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Generate a deck from a text file and a template
    Generate {
        /// Source text file ("-" for stdin)
        #[arg(short, long)]
        text: PathBuf,

        /// Template file (.pptx or .potx)
        #[arg(short = 'T', long)]
        template: PathBuf,

        /// LLM provider: openai, anthropic, gemini or aipipe
        #[arg(short, long)]
        provider: Provider,

        /// API key (default: <PROVIDER>_API_KEY from the environment)
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Tone and structure hint, e.g. "investor pitch"
        #[arg(short, long)]
        guidance: Option<String>,

        /// Output file (default: <text stem>.pptx next to the text file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Analyze { template } => analyze(&template),
        Command::Inspect { deck, json } => inspect(&deck, json),
        Command::Generate {
            text,
            template,
            provider,
            api_key,
            guidance,
            out,
        } => {
            let api_key = match api_key {
                Some(key) => SecretString::from(key),
                None => api_key_from_env(provider).with_context(|| {
                    format!(
                        "No API key given; pass --api-key or set {}_API_KEY",
                        provider.env_prefix()
                    )
                })?,
            };
            let output_path = get_output_path(&text, out.as_ref());
            generate(&text, &template, provider, api_key, guidance, &output_path).await
        }
    }
}

fn analyze(template: &Path) -> Result<()> {
    let analyzed = TemplateAnalyzer::new()
        .analyze_file(template)
        .with_context(|| format!("Failed to analyze {}", template.display()))?;
    let json = serde_json::to_string_pretty(analyzed.profile())?;
    println!("{}", json);
    Ok(())
}

fn inspect(deck: &Path, json: bool) -> Result<()> {
    let file = File::open(deck).with_context(|| format!("Failed to open {}", deck.display()))?;
    let slides = DeckReader::new()
        .read(file)
        .with_context(|| format!("Failed to read {}", deck.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }

    for slide in &slides {
        println!(
            "Slide {}: {}",
            slide.number,
            slide.title.as_deref().unwrap_or("(untitled)")
        );
        for line in &slide.lines {
            println!("  {}", line);
        }
        if slide.pictures > 0 {
            println!("  [{} picture(s)]", slide.pictures);
        }
    }
    Ok(())
}

async fn generate(
    text_path: &Path,
    template_path: &Path,
    provider: Provider,
    api_key: SecretString,
    guidance: Option<String>,
    output_path: &Path,
) -> Result<()> {
    let text = read_text(text_path)?;
    if text.trim().is_empty() {
        anyhow::bail!("{} contains no text", text_path.display());
    }

    let template = TemplateAnalyzer::new()
        .analyze_file(template_path)
        .with_context(|| format!("Failed to analyze {}", template_path.display()))?;
    log::info!(
        "Template: {} layout(s), fonts {} / {}",
        template.profile().layouts.len(),
        template.profile().font(slidegen_core::FontRole::Title),
        template.profile().font(slidegen_core::FontRole::Body)
    );

    let client = LlmClient::new(LlmConfig::from_env())?;
    let outline = client
        .generate_outline(&OutlineRequest {
            provider,
            api_key,
            text,
            guidance,
        })
        .await
        .with_context(|| format!("Failed to get an outline from {}", provider))?;
    log::info!("Outline: {} slide(s)", outline.len());

    let deck = PresentationAssembler::new()
        .assemble(&template, &outline)
        .context("Failed to assemble presentation")?;
    write_output(output_path, &deck.bytes)?;

    eprintln!(
        "Wrote {} slide(s) to {}",
        deck.report.slide_count,
        output_path.display()
    );
    if deck.report.truncations > 0 {
        eprintln!(
            "  {} text block(s) were shortened to fit",
            deck.report.truncations
        );
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut text))
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(text)
}

/// Determine the output path for a generated deck.
fn get_output_path(text_path: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(out) = out {
        return out.clone();
    }
    let stem = text_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "-")
        .unwrap_or("generated_presentation");
    let output_filename = format!("{}.pptx", stem);

    match text_path.parent() {
        Some(parent) if text_path != Path::new("-") => parent.join(output_filename),
        _ => PathBuf::from(output_filename),
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
