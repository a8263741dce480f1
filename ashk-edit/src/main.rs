//! ashk - edit a text file on the element tree.
//!
//! Runs headless: loads the file, optionally types into it and saves, and
//! can write the rendered window to a PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ashk_edit::{AppConfig, EditorApp};
use ashk_tree::{CosmicShaper, FixedCellShaper, InputEvent, SoftwareSurfaces, TextShaper};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ashk", version, about = "Plain-text editor on a retained element tree")]
struct Cli {
    /// File to edit (created on save if missing)
    file: PathBuf,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the rendered window to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Window width (overrides the config)
    #[arg(long)]
    width: Option<i32>,

    /// Window height (overrides the config)
    #[arg(long)]
    height: Option<i32>,

    /// Type this text at the start of the document
    #[arg(long = "type", value_name = "TEXT")]
    type_text: Option<String>,

    /// Save the document before exiting
    #[arg(long)]
    save: bool,

    /// Draw glyphs as boxes on a fixed grid instead of shaping with fonts
    #[arg(long)]
    fixed_cell: bool,
}

fn main() -> Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(width) = cli.width {
        config.window_size.0 = width;
    }
    if let Some(height) = cli.height {
        config.window_size.1 = height;
    }

    let mut app = EditorApp::open(&cli.file, config)
        .with_context(|| format!("failed to open {}", cli.file.display()))?;
    let (width, height) = app.config().window_size;
    app.handle(&InputEvent::Resize { width, height })?;

    if let Some(text) = &cli.type_text {
        app.handle(&InputEvent::Text(text.clone()))?;
    }

    if cli.save {
        let bytes = app.save()?;
        tracing::info!(path = %cli.file.display(), bytes, "saved");
    }

    if let Some(snapshot) = &cli.snapshot {
        let mut shaper: Box<dyn TextShaper> = if cli.fixed_cell {
            Box::new(FixedCellShaper::new())
        } else {
            let mut cosmic = CosmicShaper::new();
            for font in &app.config().font_files {
                cosmic
                    .load_font_file(font)
                    .with_context(|| format!("failed to load font {}", font.display()))?;
            }
            Box::new(cosmic)
        };

        let mut surfaces = SoftwareSurfaces::new();
        let frame = app.render_frame(&mut surfaces, shaper.as_mut())?;
        let image = surfaces.into_image(frame);
        if surfaces.live() != 0 {
            tracing::warn!(live = surfaces.live(), "surfaces left alive after frame");
        }
        image
            .save(snapshot)
            .with_context(|| format!("failed to write {}", snapshot.display()))?;
        tracing::info!(path = %snapshot.display(), width = image.width(), height = image.height(), "snapshot written");
    }

    tracing::info!(rows = app.rows().len(), "done");
    Ok(())
}
