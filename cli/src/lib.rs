use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slide_common::{
    themes, GenerationOptions, ImageMode, DEFAULT_SLIDES, DEFAULT_STYLE, DEFAULT_THEME,
};
use slide_core::{Config, Generator};
use slide_server::AppState;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slide")]
#[command(about = "Generate themed PowerPoint decks from a topic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to a config file (TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override model (e.g., gemini-2.0-flash, gpt-4o-mini)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Text provider: gemini | openai
    #[arg(long, global = true)]
    pub provider: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a presentation about a topic
    Generate {
        /// What the presentation is about
        topic: String,
        /// Number of slides (3-30)
        #[arg(short, long, default_value_t = DEFAULT_SLIDES)]
        slides: usize,
        /// Output file; defaults to a timestamped name in the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Colour theme
        #[arg(short, long, default_value = DEFAULT_THEME)]
        theme: String,
        /// professional | educational | technical | creative | minimalist | playful
        #[arg(long, default_value = DEFAULT_STYLE)]
        style: String,
        /// Intended audience
        #[arg(long, default_value = "")]
        audience: String,
        /// Ask for code examples
        #[arg(long)]
        code: bool,
        /// Add stock photos
        #[arg(long)]
        images: bool,
        /// Add generated images instead of stock photos
        #[arg(long)]
        ai_images: bool,
        /// Leave diagrams out
        #[arg(long)]
        no_diagrams: bool,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List available themes
    Themes,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        std::env::set_var("RUST_LOG", "debug");
    }
    init_logging();

    match cli.command {
        Commands::Themes => {
            print_themes();
            Ok(())
        }
        Commands::Generate {
            ref topic,
            slides,
            ref output,
            ref theme,
            ref style,
            ref audience,
            code,
            images,
            ai_images,
            no_diagrams,
        } => {
            let options = GenerationOptions {
                topic: topic.clone(),
                num_slides: slides,
                style: style.clone(),
                audience: audience.clone(),
                include_code: code,
                images: ImageMode::from_flags(images, ai_images),
                include_diagrams: !no_diagrams,
                theme: theme.clone(),
            }
            .validated()?;
            let config = load_config(&cli)?;
            generate(&config, options, output.clone()).await
        }
        Commands::Serve { ref host, port } => {
            let mut config = load_config(&cli)?;
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(port) = port {
                config.port = port;
            }
            let generator = Generator::from_config(&config)?;
            slide_server::serve(AppState::new(generator), &config.bind_address()).await
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file and environment, then command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(provider) = &cli.provider {
        config.provider = provider.parse()?;
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    Ok(config)
}

async fn generate(
    config: &Config,
    options: GenerationOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    let generator = Generator::from_config(config)?;
    println!(
        "Generating {} slides about \"{}\" ({} theme, {})",
        options.num_slides,
        options.topic,
        options.theme,
        options.images.describe()
    );

    let outcome = match output {
        Some(path) => generator.generate_to(options, &path).await?,
        None => generator.generate(options).await?,
    };

    println!("Presentation saved to: {}", outcome.output_path.display());
    println!("Slide data cached at: {}", outcome.cache_path.display());
    for (i, slide) in outcome.slides.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, slide.title);
    }
    Ok(())
}

fn print_themes() {
    println!("Available themes:");
    for (key, theme) in themes() {
        let marker = if key == DEFAULT_THEME { " (default)" } else { "" };
        println!(
            "  {key:<16} {:<20} primary {} secondary {} accent {}{marker}",
            theme.name, theme.primary, theme.secondary, theme.accent
        );
    }
}
