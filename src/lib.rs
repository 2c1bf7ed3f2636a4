mod cli;
mod config;
mod controls;
mod dom;
mod error;
mod toolbar;

use std::io::Write as _;

use anyhow::Context as _;

pub use cli::Args as CliArgs;
pub use config::ControlsConfig;
pub use controls::{
    ArticleControls, Command, ContentElement, ControlsState, Pixels, Theme, ThemeSwitch,
};
pub use dom::{DomContent, DomThemeSwitch, ElementMetrics, Page, attach};
pub use error::ControlsError;
pub use toolbar::{inject_toolbar, render_toolbar};

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut config = ControlsConfig::load(args.config.as_deref())?;
    if let Some(id) = args.content_id {
        config.content_id = id;
    }
    if let Some(id) = args.theme_button_id {
        config.theme_button_id = id;
    }
    config.validate()?;

    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let page = Page::parse(&html);

    if args.toolbar && inject_toolbar(&page, &config, Theme::from_dark(config.dark_theme)) {
        tracing::info!("injected reader toolbar");
    }

    let metrics = ElementMetrics {
        offset_height: args.offset_height,
        scroll_height: args.scroll_height,
    };
    let mut controls = attach(&page, &config, metrics)
        .with_context(|| format!("attach controls to {}", args.input.display()))?;

    for command in &args.commands {
        controls
            .apply(*command)
            .with_context(|| format!("apply {command}"))?;
    }

    let state = controls.state();
    tracing::info!(
        commands = args.commands.len(),
        scroll_position = state.scroll_position,
        zoom = state.zoom,
        dark_theme = state.dark_theme,
        "applied commands"
    );

    let out_html = page.to_html()?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, out_html).with_context(|| format!("write {}", path.display()))?
        }
        None => std::io::stdout()
            .lock()
            .write_all(out_html.as_bytes())
            .context("write page to stdout")?,
    }

    if let Some(path) = &args.state {
        let json = serde_json::to_string_pretty(&state).context("serialize state")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }

    Ok(())
}
