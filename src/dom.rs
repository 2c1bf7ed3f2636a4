use std::sync::LazyLock;

use anyhow::Context as _;
use kuchiki::traits::{NodeIterator as _, TendrilSink as _};
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use regex::Regex;

use crate::config::ControlsConfig;
use crate::controls::{ArticleControls, ContentElement, Pixels, Theme, ThemeSwitch};
use crate::error::ControlsError;

pub const OFFSET_HEIGHT_ATTR: &str = "data-offset-height";
pub const SCROLL_HEIGHT_ATTR: &str = "data-scroll-height";
pub const SCROLL_TOP_ATTR: &str = "data-scroll-top";

const ALTERNATE_STYLESHEETS: &str = "link[rel=stylesheet].alternate";

static ZOOM_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*zoom\s*:[^;]*").expect("zoom declaration regex")
});

/// Layout of the content element. Values left as `None` are read from the
/// `data-offset-height` / `data-scroll-height` attributes the host renderer writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementMetrics {
    pub offset_height: Option<Pixels>,
    pub scroll_height: Option<Pixels>,
}

/// A parsed HTML page the controls operate on.
pub struct Page {
    document: NodeRef,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeDataRef<ElementData>> {
        find_by_id(&self.document, id)
    }

    pub fn content(
        &self,
        id: &str,
        metrics: ElementMetrics,
    ) -> Result<DomContent, ControlsError> {
        let element = self
            .element_by_id(id)
            .ok_or_else(|| ControlsError::ElementNotFound { id: id.to_string() })?;

        let offset_height = match metrics.offset_height {
            Some(v) => check_metric(v, id, OFFSET_HEIGHT_ATTR)?,
            None => read_metric(&element, id, OFFSET_HEIGHT_ATTR)?,
        };
        let scroll_height = match metrics.scroll_height {
            Some(v) => check_metric(v, id, SCROLL_HEIGHT_ATTR)?,
            None => read_metric(&element, id, SCROLL_HEIGHT_ATTR)?,
        };

        Ok(DomContent {
            element,
            offset_height,
            scroll_height,
        })
    }

    pub fn theme_switch(&self, config: &ControlsConfig) -> DomThemeSwitch {
        DomThemeSwitch {
            document: self.document.clone(),
            button_id: config.theme_button_id.clone(),
            light_icon_class: config.light_icon_class.clone(),
            dark_icon_class: config.dark_icon_class.clone(),
        }
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document
            .serialize(&mut out)
            .context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }
}

/// Looks up the content element named in `config` and binds the controls to it.
pub fn attach(
    page: &Page,
    config: &ControlsConfig,
    metrics: ElementMetrics,
) -> Result<ArticleControls<DomContent, DomThemeSwitch>, ControlsError> {
    let content = page.content(&config.content_id, metrics)?;
    tracing::debug!(
        id = %config.content_id,
        offset_height = content.offset_height,
        scroll_height = content.scroll_height,
        "attached to content element"
    );
    Ok(ArticleControls::new(
        content,
        page.theme_switch(config),
        config,
    ))
}

fn find_by_id(document: &NodeRef, id: &str) -> Option<NodeDataRef<ElementData>> {
    document
        .inclusive_descendants()
        .elements()
        .find(|e| e.attributes.borrow().get("id") == Some(id))
}

fn read_metric(
    element: &NodeDataRef<ElementData>,
    id: &str,
    attribute: &'static str,
) -> Result<Pixels, ControlsError> {
    let attrs = element.attributes.borrow();
    let raw = attrs
        .get(attribute)
        .ok_or_else(|| ControlsError::MissingMetric {
            id: id.to_string(),
            attribute,
        })?;
    let value = raw
        .trim()
        .parse::<Pixels>()
        .map_err(|_| ControlsError::InvalidMetric {
            id: id.to_string(),
            attribute,
            value: raw.to_string(),
        })?;
    check_metric(value, id, attribute)
}

/// Heights are never negative.
fn check_metric(
    value: Pixels,
    id: &str,
    attribute: &'static str,
) -> Result<Pixels, ControlsError> {
    if value < 0 {
        return Err(ControlsError::InvalidMetric {
            id: id.to_string(),
            attribute,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Content element backed by a node of a parsed page.
///
/// There is no layout engine behind the page, so the scroll offset is recorded as a
/// `data-scroll-top` attribute and the heights are fixed at lookup time.
pub struct DomContent {
    element: NodeDataRef<ElementData>,
    offset_height: Pixels,
    scroll_height: Pixels,
}

impl DomContent {
    pub fn style(&self) -> Option<String> {
        self.element
            .attributes
            .borrow()
            .get("style")
            .map(|s| s.to_string())
    }
}

impl ContentElement for DomContent {
    fn offset_height(&self) -> Pixels {
        self.offset_height
    }

    fn scroll_height(&self) -> Pixels {
        self.scroll_height
    }

    fn scroll_to(&mut self, top: Pixels) {
        self.element
            .attributes
            .borrow_mut()
            .insert(SCROLL_TOP_ATTR, top.to_string());
    }

    fn set_zoom(&mut self, zoom: f64) {
        let style = self.style().unwrap_or_default();
        self.element
            .attributes
            .borrow_mut()
            .insert("style", with_zoom(&style, zoom));
    }
}

/// Replaces the `zoom` declaration of an inline style, keeping everything else.
fn with_zoom(style: &str, zoom: f64) -> String {
    let rest = ZOOM_DECLARATION.replace_all(style, "");
    let rest = rest.trim().trim_matches(';').trim();
    if rest.is_empty() {
        format!("zoom: {zoom}")
    } else {
        format!("{rest}; zoom: {zoom}")
    }
}

pub struct DomThemeSwitch {
    document: NodeRef,
    button_id: String,
    light_icon_class: String,
    dark_icon_class: String,
}

impl DomThemeSwitch {
    fn icon_class(&self, theme: Theme) -> &str {
        match theme {
            Theme::Light => &self.light_icon_class,
            Theme::Dark => &self.dark_icon_class,
        }
    }
}

impl ThemeSwitch for DomThemeSwitch {
    fn toggle_alternate_stylesheets(&mut self) -> usize {
        let mut flipped = 0;
        if let Ok(nodes) = self.document.select(ALTERNATE_STYLESHEETS) {
            for node in nodes {
                let mut attrs = node.attributes.borrow_mut();
                if attrs.contains("disabled") {
                    attrs.remove("disabled");
                } else {
                    attrs.insert("disabled", String::new());
                }
                flipped += 1;
            }
        }
        flipped
    }

    fn show_icon(&mut self, theme: Theme) -> Result<(), ControlsError> {
        let button = find_by_id(&self.document, &self.button_id).ok_or_else(|| {
            ControlsError::ElementNotFound {
                id: self.button_id.clone(),
            }
        })?;

        let wanted = self.icon_class(theme);
        let mut attrs = button.attributes.borrow_mut();
        let current = attrs.get("class").unwrap_or("").to_string();
        let classes = swap_icon_class(
            &current,
            [self.light_icon_class.as_str(), self.dark_icon_class.as_str()],
            wanted,
        );
        attrs.insert("class", classes);
        Ok(())
    }
}

/// Puts `wanted` where an icon class used to be, or appends it when there was none.
fn swap_icon_class(classes: &str, icons: [&str; 2], wanted: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut placed = false;
    for class in classes.split_whitespace() {
        if icons.contains(&class) || class == wanted {
            if !placed {
                out.push(wanted);
                placed = true;
            }
            continue;
        }
        out.push(class);
    }
    if !placed {
        out.push(wanted);
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Command;

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <link rel="stylesheet" href="/static/css/light.css">
    <link rel="stylesheet" class="alternate" href="/static/css/dark.css" disabled>
    <link rel="stylesheet" class="alternate" href="/static/css/dark-code.css" disabled>
  </head>
  <body>
    <button id="toggleThemeButton" class="fa fa-sun-o"></button>
    <div id="article" style="font-size: 18px" data-offset-height="1000" data-scroll-height="5000">
      <p>Hello</p>
    </div>
  </body>
</html>"#;

    fn link_disabled(page: &Page) -> Vec<bool> {
        page.document()
            .select("link")
            .unwrap()
            .map(|l| l.attributes.borrow().contains("disabled"))
            .collect()
    }

    fn button_class(page: &Page) -> String {
        page.element_by_id("toggleThemeButton")
            .unwrap()
            .attributes
            .borrow()
            .get("class")
            .unwrap()
            .to_string()
    }

    #[test]
    fn reads_metrics_from_data_attributes() {
        let page = Page::parse(PAGE);
        let mut controls = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .unwrap();
        controls.apply(Command::ScrollDown).unwrap();
        controls.apply(Command::ScrollDown).unwrap();

        let article = page.element_by_id("article").unwrap();
        assert_eq!(
            article.attributes.borrow().get(SCROLL_TOP_ATTR),
            Some("1800")
        );
    }

    #[test]
    fn explicit_metrics_win_over_attributes() {
        let page = Page::parse(PAGE);
        let metrics = ElementMetrics {
            offset_height: Some(500),
            scroll_height: Some(800),
        };
        let mut controls = attach(&page, &ControlsConfig::default(), metrics).unwrap();
        controls.apply(Command::ScrollToBottom).unwrap();
        assert_eq!(controls.scroll_position(), 300);
    }

    #[test]
    fn missing_content_element_is_an_error() {
        let page = Page::parse("<html><body><p>nothing</p></body></html>");
        let err = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .err()
            .unwrap();
        assert!(matches!(err, ControlsError::ElementNotFound { id } if id == "article"));
    }

    #[test]
    fn body_variant_uses_configured_id() {
        let page = Page::parse(
            r#"<html><body><div id="body" data-offset-height="200" data-scroll-height="1000"></div></body></html>"#,
        );
        let config = ControlsConfig {
            content_id: "body".to_string(),
            ..ControlsConfig::default()
        };
        let mut controls = attach(&page, &config, ElementMetrics::default()).unwrap();
        controls.apply(Command::ScrollDown).unwrap();
        assert_eq!(controls.scroll_position(), 180);
    }

    #[test]
    fn bad_metric_attribute_is_reported() {
        let page = Page::parse(
            r#"<html><body><div id="article" data-offset-height="tall" data-scroll-height="10"></div></body></html>"#,
        );
        let err = page
            .content("article", ElementMetrics::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ControlsError::InvalidMetric { attribute: OFFSET_HEIGHT_ATTR, .. }
        ));

        let page = Page::parse(r#"<html><body><div id="article"></div></body></html>"#);
        let err = page
            .content("article", ElementMetrics::default())
            .err()
            .unwrap();
        assert!(matches!(err, ControlsError::MissingMetric { .. }));
    }

    #[test]
    fn negative_heights_are_rejected() {
        let page = Page::parse(
            r#"<html><body><div id="article" data-offset-height="-100" data-scroll-height="500"></div></body></html>"#,
        );
        let err = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ControlsError::InvalidMetric { attribute: OFFSET_HEIGHT_ATTR, ref value, .. } if value == "-100"
        ));

        let page = Page::parse(
            r#"<html><body><div id="article" data-offset-height="-9223372036854775808" data-scroll-height="500"></div></body></html>"#,
        );
        assert!(matches!(
            page.content("article", ElementMetrics::default()),
            Err(ControlsError::InvalidMetric { .. })
        ));

        let page = Page::parse(PAGE);
        let metrics = ElementMetrics {
            offset_height: Some(1000),
            scroll_height: Some(-1),
        };
        assert!(matches!(
            page.content("article", metrics),
            Err(ControlsError::InvalidMetric { attribute: SCROLL_HEIGHT_ATTR, .. })
        ));
    }

    #[test]
    fn zoom_rewrites_only_the_zoom_declaration() {
        let page = Page::parse(PAGE);
        let mut controls = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .unwrap();
        controls.apply(Command::ZoomIn).unwrap();
        assert_eq!(
            controls.content().style().as_deref(),
            Some("font-size: 18px; zoom: 1.1")
        );
        controls.apply(Command::ZoomIn).unwrap();
        assert_eq!(
            controls.content().style().as_deref(),
            Some("font-size: 18px; zoom: 1.2")
        );
    }

    #[test]
    fn with_zoom_handles_existing_declarations() {
        assert_eq!(with_zoom("", 1.0), "zoom: 1");
        assert_eq!(with_zoom("zoom:2;color:red", 1.5), "color:red; zoom: 1.5");
        assert_eq!(
            with_zoom("color: red; ZOOM: 3; margin: 0;", 0.9),
            "color: red; margin: 0; zoom: 0.9"
        );
    }

    #[test]
    fn toggle_theme_flips_alternate_stylesheets_and_icon() {
        let page = Page::parse(PAGE);
        let mut controls = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .unwrap();

        controls.apply(Command::ToggleTheme).unwrap();
        assert_eq!(link_disabled(&page), vec![false, false, false]);
        assert_eq!(button_class(&page), "fa fa-moon-o");

        controls.apply(Command::ToggleTheme).unwrap();
        assert_eq!(link_disabled(&page), vec![false, true, true]);
        assert_eq!(button_class(&page), "fa fa-sun-o");
    }

    #[test]
    fn toggle_without_button_fails_and_changes_nothing() {
        let page = Page::parse(
            r#"<html><head><link rel="stylesheet" class="alternate" href="d.css" disabled></head>
<body><div id="article" data-offset-height="10" data-scroll-height="10"></div></body></html>"#,
        );
        let mut controls = attach(&page, &ControlsConfig::default(), ElementMetrics::default())
            .unwrap();
        assert!(controls.apply(Command::ToggleTheme).is_err());
        assert_eq!(link_disabled(&page), vec![true]);
        assert!(!controls.state().dark_theme);
    }

    #[test]
    fn swap_icon_class_keeps_position() {
        let icons = ["fa-sun-o", "fa-moon-o"];
        assert_eq!(
            swap_icon_class("fa-sun-o fa big", icons, "fa-moon-o"),
            "fa-moon-o fa big"
        );
        assert_eq!(swap_icon_class("fa", icons, "fa-sun-o"), "fa fa-sun-o");
        assert_eq!(
            swap_icon_class("fa-sun-o fa-moon-o", icons, "fa-sun-o"),
            "fa-sun-o"
        );
    }
}
