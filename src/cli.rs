use std::path::PathBuf;

use clap::Parser;

use crate::controls::{Command, Pixels};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Article page (HTML) to operate on.
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the updated page. Defaults to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// JSON file with controls settings (ids, zoom step and bounds, icon classes).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Id of the content element, e.g. `article` or `body`. Overrides the config file.
    #[arg(long)]
    pub content_id: Option<String>,

    /// Id of the theme toggle button. Overrides the config file.
    #[arg(long)]
    pub theme_button_id: Option<String>,

    /// Rendered height of the content element.
    ///
    /// If omitted, it is read from the element's `data-offset-height` attribute.
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub offset_height: Option<Pixels>,

    /// Full content height of the content element.
    ///
    /// If omitted, it is read from the element's `data-scroll-height` attribute.
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub scroll_height: Option<Pixels>,

    /// Insert the reader toolbar at the top of `<body>` unless the page already has one.
    #[arg(long)]
    pub toolbar: bool,

    /// Write the final scroll/zoom/theme state as JSON to this file.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Commands to apply, in order.
    #[arg(value_enum)]
    pub commands: Vec<Command>,
}
