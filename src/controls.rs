use clap::ValueEnum;
use serde::Serialize;

use crate::config::ControlsConfig;
use crate::error::ControlsError;

/// Vertical distances in CSS pixels.
pub type Pixels = i64;

/// The element whose scroll offset and zoom are being controlled.
pub trait ContentElement {
    /// Rendered height of the element (the visible page).
    fn offset_height(&self) -> Pixels;
    /// Full height of the element's content.
    fn scroll_height(&self) -> Pixels;
    fn scroll_to(&mut self, top: Pixels);
    fn set_zoom(&mut self, zoom: f64);
}

/// The alternate stylesheets and the button icon that make up the theme.
pub trait ThemeSwitch {
    /// Flips `disabled` on every alternate stylesheet and returns how many were flipped.
    fn toggle_alternate_stylesheets(&mut self) -> usize;
    fn show_icon(&mut self, theme: Theme) -> Result<(), ControlsError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    ScrollUp,
    ScrollDown,
    ScrollToTop,
    ScrollToBottom,
    ZoomIn,
    ZoomOut,
    ToggleTheme,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::ScrollToTop,
        Command::ScrollUp,
        Command::ScrollDown,
        Command::ScrollToBottom,
        Command::ZoomOut,
        Command::ZoomIn,
        Command::ToggleTheme,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::ScrollUp => "scroll-up",
            Command::ScrollDown => "scroll-down",
            Command::ScrollToTop => "scroll-to-top",
            Command::ScrollToBottom => "scroll-to-bottom",
            Command::ZoomIn => "zoom-in",
            Command::ZoomOut => "zoom-out",
            Command::ToggleTheme => "toggle-theme",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlsState {
    pub scroll_position: Pixels,
    pub zoom: f64,
    pub dark_theme: bool,
}

#[derive(Debug, Clone, Copy)]
struct ZoomLimits {
    step: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ZoomLimits {
    fn clamp(&self, zoom: f64) -> f64 {
        let zoom = self.min.map_or(zoom, |min| zoom.max(min));
        let zoom = self.max.map_or(zoom, |max| zoom.min(max));
        // Keep repeated steps from accumulating float error.
        (zoom * 1e6).round() / 1e6
    }
}

/// Scroll, zoom and theme state for one content element.
pub struct ArticleControls<C, T> {
    content: C,
    theme_switch: T,
    zoom_limits: ZoomLimits,
    offset_not_scroll: Pixels,
    scroll_position: Pixels,
    zoom: f64,
    theme: Theme,
}

impl<C: ContentElement, T: ThemeSwitch> ArticleControls<C, T> {
    pub fn new(content: C, theme_switch: T, config: &ControlsConfig) -> Self {
        let offset_not_scroll =
            (content.offset_height() as f64 * config.overlap_ratio).round() as Pixels;
        Self {
            content,
            theme_switch,
            zoom_limits: ZoomLimits {
                step: config.zoom_step,
                min: config.min_zoom,
                max: config.max_zoom,
            },
            offset_not_scroll,
            scroll_position: 0,
            zoom: config.initial_zoom,
            theme: Theme::from_dark(config.dark_theme),
        }
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn theme_switch(&self) -> &T {
        &self.theme_switch
    }

    pub fn offset_not_scroll(&self) -> Pixels {
        self.offset_not_scroll
    }

    pub fn scroll_position(&self) -> Pixels {
        self.scroll_position
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn state(&self) -> ControlsState {
        ControlsState {
            scroll_position: self.scroll_position,
            zoom: self.zoom,
            dark_theme: self.theme.is_dark(),
        }
    }

    /// Distance covered by one page scroll.
    pub fn scroll_step(&self) -> Pixels {
        self.content
            .offset_height()
            .saturating_sub(self.offset_not_scroll)
            .max(0)
    }

    /// Largest offset that still leaves a full page of content visible.
    pub fn max_scroll(&self) -> Pixels {
        self.content
            .scroll_height()
            .saturating_sub(self.content.offset_height())
            .max(0)
    }

    pub fn apply(&mut self, command: Command) -> Result<(), ControlsError> {
        match command {
            Command::ScrollUp => self.scroll_up(),
            Command::ScrollDown => self.scroll_down(),
            Command::ScrollToTop => self.scroll_to_top(),
            Command::ScrollToBottom => self.scroll_to_bottom(),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ToggleTheme => self.toggle_theme()?,
        }
        tracing::debug!(
            %command,
            scroll_position = self.scroll_position,
            zoom = self.zoom,
            dark_theme = self.theme.is_dark(),
            "applied command"
        );
        Ok(())
    }

    pub fn scroll_down(&mut self) {
        // Clamped to the last full page rather than to scroll_height, so the stored
        // position never runs ahead of the offset the element can actually show.
        let target = self
            .scroll_position
            .saturating_add(self.scroll_step())
            .min(self.max_scroll());
        self.scroll(target);
    }

    pub fn scroll_up(&mut self) {
        let target = self
            .scroll_position
            .saturating_sub(self.scroll_step())
            .max(0);
        self.scroll(target);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        let target = self.max_scroll();
        self.scroll(target);
    }

    fn scroll(&mut self, top: Pixels) {
        self.scroll_position = top;
        self.content.scroll_to(top);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_limits.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_limits.step);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.zoom_limits.clamp(zoom);
        self.content.set_zoom(self.zoom);
    }

    /// Switches theme. A missing toggle button leaves the page and state untouched.
    pub fn toggle_theme(&mut self) -> Result<(), ControlsError> {
        let next = self.theme.toggled();
        self.theme_switch.show_icon(next)?;
        let flipped = self.theme_switch.toggle_alternate_stylesheets();
        if flipped == 0 {
            tracing::warn!("no alternate stylesheets to toggle");
        }
        self.theme = next;
        Ok(())
    }
}
