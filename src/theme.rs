use crate::{
    config::AppConfig,
    palette::{derive_palette, Shade},
};
use std::collections::BTreeMap;

pub const FONT_FAMILY_VARIABLE: &str = "--font-family";

pub fn shade_variable(shade: Shade) -> String {
    format!("--color-primary-{}", shade.key())
}

/// Where theme values end up: a single global root of named variables, plus
/// the window title.
pub trait StyleSink {
    fn set_variable(&mut self, name: &str, value: &str);
    fn set_title(&mut self, title: &str);
    fn set_dark_mode(&mut self, _dark: bool) {}
}

/// Records what was applied. Useful for tests and for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    pub variables: BTreeMap<String, String>,
    pub title: Option<String>,
    pub dark_mode: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|s| s.as_str())
    }
}

impl StyleSink for MemorySink {
    fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }
}

/// Renders applied variables as a stylesheet.
#[derive(Debug, Clone, Default)]
pub struct CssSink(MemorySink);

impl CssSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.0.title.as_deref()
    }

    pub fn render(&self) -> String {
        let selector = if self.0.dark_mode { ":root.dark" } else { ":root" };
        let mut s = format!("{} {{\n", selector);
        for (name, value) in &self.0.variables {
            s += &format!("  {}: {};\n", name, value);
        }
        s += "}\n";
        s
    }
}

impl StyleSink for CssSink {
    fn set_variable(&mut self, name: &str, value: &str) {
        self.0.set_variable(name, value)
    }

    fn set_title(&mut self, title: &str) {
        self.0.set_title(title)
    }

    fn set_dark_mode(&mut self, dark: bool) {
        self.0.set_dark_mode(dark)
    }
}

/// Pushes font, palette and title into the sink. An underivable primary color
/// leaves the existing shade variables alone. Returns whether the palette was
/// written.
pub fn apply_theme(config: &AppConfig, sink: &mut impl StyleSink) -> bool {
    sink.set_variable(
        FONT_FAMILY_VARIABLE,
        &format!("\"{}\"", config.font_family()),
    );

    let applied = match derive_palette(&config.primary_color()) {
        Some(palette) => {
            for (shade, color) in palette.iter() {
                sink.set_variable(&shade_variable(shade), &color.to_channels());
            }
            true
        }
        None => {
            log::warn!(
                "primary color {:?} is not a hex color; keeping the current palette",
                config.primary_color()
            );
            false
        }
    };

    sink.set_title(&config.app_name());
    applied
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Applied {
    app_name: String,
    primary_color: String,
    font_family: String,
}

impl From<&AppConfig> for Applied {
    fn from(value: &AppConfig) -> Self {
        Self {
            app_name: value.app_name(),
            primary_color: value.primary_color(),
            font_family: value.font_family(),
        }
    }
}

/// Owns a sink and re-applies the theme only when the name, primary color or
/// font changed since the last application. Dark mode is tracked on its own.
#[derive(Debug)]
pub struct ThemeApplier<S: StyleSink> {
    sink: S,
    last: Option<Applied>,
    dark_mode: Option<bool>,
}

impl<S: StyleSink> ThemeApplier<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last: None,
            dark_mode: None,
        }
    }

    /// Applies unconditionally and records the result.
    pub fn init(&mut self, config: &AppConfig) {
        self.last = None;
        self.dark_mode = None;
        self.sync(config);
    }

    /// Returns true when the theme was re-applied.
    pub fn sync(&mut self, config: &AppConfig) -> bool {
        if self.dark_mode != Some(config.dark_mode()) {
            self.sink.set_dark_mode(config.dark_mode());
            self.dark_mode = Some(config.dark_mode());
        }

        let current = Applied::from(config);
        if self.last.as_ref() == Some(&current) {
            return false;
        }

        log::debug!(
            "applying theme for {:?} ({}, {})",
            current.app_name,
            current.primary_color,
            current.font_family
        );
        apply_theme(config, &mut self.sink);
        self.last = Some(current);
        true
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPatch;

    fn config(color: &str) -> AppConfig {
        AppConfig::default().merge(ConfigPatch {
            primary_color: Some(color.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_apply_theme() {
        let mut sink = MemorySink::new();
        assert!(apply_theme(&config("#0ea5e9"), &mut sink));

        assert_eq!(sink.variables.len(), 11);
        assert_eq!(sink.variable("--color-primary-500"), Some("14 165 233"));
        assert_eq!(sink.variable("--color-primary-900"), Some("15 66 99"));
        assert_eq!(sink.variable(FONT_FAMILY_VARIABLE), Some("\"Inter\""));
        assert_eq!(sink.title.as_deref(), Some("OpenCRM"));
    }

    #[test]
    fn test_invalid_color_keeps_palette() {
        let mut sink = MemorySink::new();
        apply_theme(&config("#0ea5e9"), &mut sink);
        let before = sink.variables.clone();

        let broken = config("not a color").merge(ConfigPatch {
            font_family: Some("Roboto".to_string()),
            app_name: Some("Acme".to_string()),
            ..Default::default()
        });
        assert!(!apply_theme(&broken, &mut sink));

        for shade in Shade::ALL {
            let name = shade_variable(shade);
            assert_eq!(sink.variables.get(&name), before.get(&name));
        }
        assert_eq!(sink.variable(FONT_FAMILY_VARIABLE), Some("\"Roboto\""));
        assert_eq!(sink.title.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_applier_ignores_unrelated_changes() {
        let mut applier = ThemeApplier::new(MemorySink::new());
        let base = AppConfig::default();
        applier.init(&base);
        assert_eq!(applier.sink().title.as_deref(), Some("OpenCRM"));

        let unrelated = base.clone().merge(ConfigPatch {
            ai_provider: Some("gemini".to_string()),
            storage_type: Some("supabase".to_string()),
            ..Default::default()
        });
        assert!(!applier.sync(&unrelated));

        let dark = unrelated.clone().merge(ConfigPatch {
            dark_mode: Some(true),
            ..Default::default()
        });
        assert!(!applier.sync(&dark));
        assert!(applier.sink().dark_mode);

        let renamed = dark.merge(ConfigPatch {
            app_name: Some("Acme CRM".to_string()),
            ..Default::default()
        });
        assert!(applier.sync(&renamed));
        assert_eq!(applier.sink().title.as_deref(), Some("Acme CRM"));
    }

    #[test]
    fn test_css_render() {
        let mut sink = CssSink::new();
        apply_theme(&AppConfig::default(), &mut sink);
        let css = sink.render();

        assert!(css.starts_with(":root {\n"));
        assert!(css.contains("  --color-primary-500: 14 165 233;\n"));
        assert!(css.contains("  --font-family: \"Inter\";\n"));
        assert_eq!(sink.title(), Some("OpenCRM"));
    }
}
