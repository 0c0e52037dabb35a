//! fOS Accessibility Debugger - headless entry point
//!
//! Loads an HTML file, applies the persisted (and requested) overlay
//! features, optionally hovers one element, and prints the annotated
//! markup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fos_a11y::{Feature, ScreenReaderSummary};
use fos_a11y_debug::{Inspector, InspectorConfig, JsonFileStore, MemoryStore, SettingsStore};
use fos_dom::Viewport;
use fos_html::{HtmlParser, HtmlSerializer};

#[derive(Parser)]
#[command(name = "fos-a11y-debug")]
#[command(about = "Annotate an HTML document with accessibility debugging markers")]
#[command(version)]
struct Cli {
    /// HTML file to inspect
    input: PathBuf,

    /// JSON settings file holding the feature flags
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Turn a feature on and persist it (focusable, no-alt, no-name,
    /// high-contrast, screenreader-info)
    #[arg(short, long = "enable", value_delimiter = ',')]
    enable: Vec<Feature>,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Horizontal scroll offset
    #[arg(long, default_value_t = 0.0)]
    scroll_x: f64,

    /// Vertical scroll offset
    #[arg(long, default_value_t = 0.0)]
    scroll_y: f64,

    /// Hover the element with this id and print its screen reader summary
    #[arg(long, value_name = "ID")]
    hover: Option<String>,

    /// Indent the output markup
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.settings {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("failed to open settings {}", path.display()))?;
            run(&cli, store)
        }
        None => run(&cli, MemoryStore::new()),
    }
}

fn run<S: SettingsStore>(cli: &Cli, store: S) -> Result<()> {
    let html = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let url = format!("file://{}", cli.input.display());
    let document = HtmlParser::new()
        .parse_with_url(&html, &url)
        .context("failed to parse HTML")?;

    let mut viewport = Viewport::new(cli.width, cli.height);
    viewport.scroll_to(cli.scroll_x, cli.scroll_y);
    let config = InspectorConfig {
        viewport,
        ..Default::default()
    };

    let mut inspector = Inspector::load(document, store, config);
    for feature in &cli.enable {
        inspector
            .set_feature(*feature, true)
            .with_context(|| format!("failed to persist {feature}"))?;
    }
    for (feature, enabled) in inspector.flags().iter() {
        tracing::info!("{}: {}", feature.label(), if enabled { "on" } else { "off" });
    }

    if let Some(id) = &cli.hover {
        let element = inspector.hover_element(id)?;
        match inspector.hover().tooltip() {
            Some(_) => {
                if let Some(summary) = ScreenReaderSummary::compute(inspector.document(), element) {
                    eprintln!("{summary}");
                }
            }
            None => tracing::warn!(
                "no tooltip for #{id}; it needs the focusable and screenreader-info features"
            ),
        }
    }

    let serializer = if cli.pretty {
        HtmlSerializer::pretty()
    } else {
        HtmlSerializer::new()
    };
    let document = inspector.into_document();
    println!("{}", serializer.serialize_inner(document.tree(), document.tree().root()));
    Ok(())
}
