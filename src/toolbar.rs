use kuchiki::traits::TendrilSink as _;
use maud::{Markup, html};

use crate::config::ControlsConfig;
use crate::controls::{Command, Theme};
use crate::dom::Page;

pub const TOOLBAR_ID: &str = "article-controls";

fn command_icon(command: Command) -> &'static str {
    match command {
        Command::ScrollToTop => "fa-angle-double-up",
        Command::ScrollUp => "fa-angle-up",
        Command::ScrollDown => "fa-angle-down",
        Command::ScrollToBottom => "fa-angle-double-down",
        Command::ZoomOut => "fa-search-minus",
        Command::ZoomIn => "fa-search-plus",
        Command::ToggleTheme => "fa-adjust",
    }
}

fn command_label(command: Command) -> &'static str {
    match command {
        Command::ScrollToTop => "Scroll to top",
        Command::ScrollUp => "Scroll up",
        Command::ScrollDown => "Scroll down",
        Command::ScrollToBottom => "Scroll to bottom",
        Command::ZoomOut => "Zoom out",
        Command::ZoomIn => "Zoom in",
        Command::ToggleTheme => "Toggle theme",
    }
}

/// Toolbar with one button per command. The theme button shows the icon for `theme`.
pub fn render_toolbar(config: &ControlsConfig, theme: Theme) -> Markup {
    let theme_icon = match theme {
        Theme::Light => config.light_icon_class.as_str(),
        Theme::Dark => config.dark_icon_class.as_str(),
    };

    html! {
        nav id=(TOOLBAR_ID) class="article-controls" aria-controls=(config.content_id) {
            @for command in Command::ALL {
                @if command == Command::ToggleTheme {
                    button type="button"
                        id=(config.theme_button_id)
                        class=(format!("fa {theme_icon}"))
                        data-command=(command.as_str())
                        title=(command_label(command)) {}
                } @else {
                    button type="button"
                        class=(format!("fa {}", command_icon(command)))
                        data-command=(command.as_str())
                        title=(command_label(command)) {}
                }
            }
        }
    }
}

/// Inserts the toolbar as the first child of `<body>`.
///
/// Returns `false` without touching the page when it already has a theme button.
pub fn inject_toolbar(page: &Page, config: &ControlsConfig, theme: Theme) -> bool {
    if page.element_by_id(&config.theme_button_id).is_some() {
        tracing::warn!(
            id = %config.theme_button_id,
            "page already has a theme button; not injecting toolbar"
        );
        return false;
    }

    let Ok(body) = page.document().select_first("body") else {
        tracing::warn!("page has no <body>; not injecting toolbar");
        return false;
    };

    let fragment = kuchiki::parse_html().one(render_toolbar(config, theme).into_string());
    let Ok(nav) = fragment.select_first("nav") else {
        return false;
    };
    let nav = nav.as_node().clone();
    nav.detach();
    body.as_node().prepend(nav);
    true
}
