use std::path::PathBuf;

use anyhow::{Context as _, Error};
use clap::Parser;
use gpui::*;
use gpui_block_core::EditorConfig;
use gpui_component::{Root, TitleBar};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gpui_block_editor_story::{BlockEditorStory, StoryOptions, app_menus, load_blocks, themes};

/// A block-based rich text editor.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Blocks JSON file to open on start.
    #[arg(long)]
    open: Option<PathBuf>,

    /// Editor config JSON (drag thresholds, undo depth, palette width, placeholder).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn story_options(&self) -> anyhow::Result<StoryOptions> {
        let config = match &self.config {
            Some(path) => EditorConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EditorConfig::default(),
        };
        let blocks = self.open.as_deref().map(load_blocks).transpose()?;

        Ok(StoryOptions {
            config,
            blocks,
            file_path: self.open.clone(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = Args::parse().story_options()?;
    let app = Application::new();

    app.run(move |cx| {
        gpui_component::init(cx);
        themes::init(cx);
        gpui_block_editor::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(
                WindowOptions {
                    titlebar: Some(TitleBar::title_bar_options()),
                    ..Default::default()
                },
                |window, cx| {
                    window.set_window_title("Block Editor");
                    let app_menu_bar = app_menus::init("Block Editor", window, cx);
                    let view = BlockEditorStory::view(options, app_menu_bar, window, cx);
                    cx.new(|cx| Root::new(view, window, cx))
                },
            )?;

            Ok::<_, Error>(())
        })
        .detach();
    });

    Ok(())
}
