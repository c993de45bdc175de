use std::collections::HashMap;

use glance_config::Settings;
use glance_types::{Preview, ReplaceRule};

use crate::error::RenderError;

/// Apply rules in order, each one seeing the previous one's output.
/// Inert rules are skipped.
pub fn apply_rules(text: &str, rules: &[ReplaceRule]) -> String {
    rules
        .iter()
        .filter(|rule| !rule.is_inert())
        .fold(text.to_string(), |acc, rule| acc.replace(&rule.search, &rule.replace))
}

/// Formats resolved definitions according to a validated [`Settings`] snapshot
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    settings: Settings,
}

impl ContentRenderer {
    pub fn new(settings: &Settings) -> Result<Self, RenderError> {
        validate(settings)?;
        Ok(Self {
            settings: settings.clone(),
        })
    }

    /// Render the first candidate that has a non-empty definition.
    ///
    /// Returns [`Preview::empty`] when nothing resolves.
    pub fn generate(
        &self,
        candidates: &[String],
        definitions: &HashMap<String, String>,
        is_ascii_like: bool,
    ) -> Preview {
        let resolved = candidates.iter().find_map(|candidate| {
            definitions
                .get(candidate)
                .filter(|body| !body.trim().is_empty())
                .map(|body| (candidate, body))
        });

        let Some((head, body)) = resolved else {
            return Preview::empty();
        };

        let s = &self.settings;
        let body = if is_ascii_like
            && s.cut_short_word_description
            && head.chars().count() <= s.short_word_length as usize
        {
            body.lines().next().unwrap_or_default()
        } else {
            body.as_str()
        };
        let body = escape_html(&apply_rules(body, &s.replace_rules)).replace('\n', "<br/>");

        let mut html = format!(
            r#"<div class="glance-entry" style="font-family:{};background-color:{};width:{}px;max-height:{}px;opacity:{};">"#,
            s.font_family, s.background_color, s.dialog_width, s.dialog_height, s.dialog_opacity,
        );
        html.push_str(&format!(
            r#"<span class="glance-head" style="font-size:{}px;color:{};">{}</span>"#,
            s.head_font_size,
            s.head_font_color,
            escape_html(head),
        ));
        html.push_str(&format!(
            r#"<div class="glance-desc" style="font-size:{}px;color:{};">{}</div></div>"#,
            s.desc_font_size, s.desc_font_color, body,
        ));

        Preview {
            html,
            head: Some(head.clone()),
        }
    }
}

fn validate(settings: &Settings) -> Result<(), RenderError> {
    let invalid = |name: &'static str, value: String| RenderError::InvalidSetting { name, value };

    for (name, color) in [
        ("head_font_color", &settings.head_font_color),
        ("desc_font_color", &settings.desc_font_color),
        ("background_color", &settings.background_color),
    ] {
        if !is_hex_color(color) {
            return Err(invalid(name, color.clone()));
        }
    }

    for (name, size) in [
        ("head_font_size", settings.head_font_size),
        ("desc_font_size", settings.desc_font_size),
        ("dialog_width", settings.dialog_width),
        ("dialog_height", settings.dialog_height),
    ] {
        if size == 0 {
            return Err(invalid(name, size.to_string()));
        }
    }

    if !(0.0..=1.0).contains(&settings.dialog_opacity) {
        return Err(invalid("dialog_opacity", settings.dialog_opacity.to_string()));
    }

    let family = settings.font_family.trim();
    if family.is_empty() || family.contains([';', '"', '<', '>', '{', '}']) {
        return Err(invalid("font_family", settings.font_family.clone()));
    }

    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
