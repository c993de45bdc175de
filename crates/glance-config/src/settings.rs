use glance_types::{OptionValue, ReplaceRule, RuleField, SettingsCommand};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

const REPLACE_RULES: &str = "replace_rules";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Option {name} expects a {expected} value")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("No replace rule at index {index} ({len} rules)")]
    RuleOutOfRange { index: usize, len: usize },

    #[error("Invalid settings: {0}")]
    Invalid(#[from] serde_json::Error),
}

fn default_replace_rules() -> Vec<ReplaceRule> {
    vec![
        ReplaceRule::new("default-example", "◆", "\n◆"),
        ReplaceRule::new("default-subentry", "■・", "\n・"),
    ]
}

/// User-facing preview settings: flat named options plus ordered replace rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lookup_with_capitalized: bool,
    pub short_word_length: u32,
    pub cut_short_word_description: bool,
    pub font_family: String,
    pub head_font_color: String,
    pub desc_font_color: String,
    pub background_color: String,
    pub head_font_size: u32,
    pub desc_font_size: u32,
    pub dialog_width: u32,
    pub dialog_height: u32,
    pub dialog_opacity: f64,
    pub replace_rules: Vec<ReplaceRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookup_with_capitalized: true,
            short_word_length: 2,
            cut_short_word_description: false,
            font_family: "sans-serif".to_string(),
            head_font_color: "#000088".to_string(),
            desc_font_color: "#101010".to_string(),
            background_color: "#ffffff".to_string(),
            head_font_size: 14,
            desc_font_size: 13,
            dialog_width: 350,
            dialog_height: 450,
            dialog_opacity: 0.95,
            replace_rules: default_replace_rules(),
        }
    }
}

impl Settings {
    /// Overlay a stored JSON blob onto the defaults.
    ///
    /// Each stored key is checked on its own against the defaults, and replace
    /// rules one at a time. Unknown keys, values the schema rejects and broken
    /// rules are dropped, so an old or hand-edited blob still yields usable
    /// settings.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let stored: Value = serde_json::from_str(json)?;
        let mut merged = Self::default().to_map()?;

        if let Value::Object(stored) = stored {
            for (name, value) in stored {
                if !merged.contains_key(&name) {
                    continue;
                }
                let value = match (name.as_str(), value) {
                    (REPLACE_RULES, Value::Array(items)) => {
                        let rules: Vec<ReplaceRule> = items
                            .into_iter()
                            .filter_map(|item| serde_json::from_value(item).ok())
                            .collect();
                        serde_json::to_value(rules)?
                    }
                    (_, value) => value,
                };
                if Self::accepts(&name, &value) {
                    merged.insert(name, value);
                }
            }
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Whether the defaults with just this one key replaced still deserialize
    fn accepts(name: &str, value: &Value) -> bool {
        let mut single = Map::new();
        single.insert(name.to_string(), value.clone());
        serde_json::from_value::<Self>(Value::Object(single)).is_ok()
    }

    /// Settings as they should be persisted: inert rules dropped
    pub fn persisted(&self) -> Self {
        let mut settings = self.clone();
        settings.replace_rules.retain(|rule| !rule.is_inert());
        settings
    }

    /// Names accepted by `SettingsCommand::UpdateOption`
    pub fn option_names() -> Vec<String> {
        Self::default()
            .to_map()
            .map(|map| map.into_iter().map(|(name, _)| name).filter(|n| n != REPLACE_RULES).collect())
            .unwrap_or_default()
    }

    /// Interpret a raw string as a value for the named option, using the option's type
    pub fn parse_option(&self, name: &str, raw: &str) -> Result<OptionValue, SettingsError> {
        let map = self.to_map()?;
        let current = option(&map, name)?;

        let mismatch = || SettingsError::TypeMismatch {
            name: name.to_string(),
            expected: kind(current),
        };

        match current {
            Value::Bool(_) => raw.parse().map(OptionValue::Bool).map_err(|_| mismatch()),
            Value::Number(_) => raw.parse().map(OptionValue::Number).map_err(|_| mismatch()),
            Value::String(_) => Ok(OptionValue::Text(raw.to_string())),
            _ => Err(mismatch()),
        }
    }

    pub fn apply(&mut self, command: SettingsCommand) -> Result<(), SettingsError> {
        match command {
            SettingsCommand::UpdateOption { name, value } => self.update_option(&name, value),
            SettingsCommand::AddRule => {
                self.replace_rules.push(ReplaceRule::new(
                    uuid::Uuid::new_v4().to_string(),
                    "",
                    "",
                ));
                Ok(())
            }
            SettingsCommand::UpdateRule {
                index,
                field,
                value,
            } => {
                let len = self.replace_rules.len();
                let rule = self
                    .replace_rules
                    .get_mut(index)
                    .ok_or(SettingsError::RuleOutOfRange { index, len })?;
                match field {
                    RuleField::Search => rule.search = value,
                    RuleField::Replace => rule.replace = value,
                }
                Ok(())
            }
            SettingsCommand::MoveRule { index, offset } => {
                // Only swaps when both neighbours exist
                if let Some(target) = index.checked_add_signed(offset)
                    && index < self.replace_rules.len()
                    && target < self.replace_rules.len()
                {
                    self.replace_rules.swap(index, target);
                }
                Ok(())
            }
            SettingsCommand::RemoveRule { index } => {
                if index >= self.replace_rules.len() {
                    return Err(SettingsError::RuleOutOfRange {
                        index,
                        len: self.replace_rules.len(),
                    });
                }
                self.replace_rules.remove(index);
                Ok(())
            }
            SettingsCommand::ResetToDefaults => {
                *self = Self::default();
                Ok(())
            }
        }
    }

    fn update_option(&mut self, name: &str, value: OptionValue) -> Result<(), SettingsError> {
        let mut map = self.to_map()?;
        let current = option(&map, name)?;

        let mismatch = || SettingsError::TypeMismatch {
            name: name.to_string(),
            expected: kind(current),
        };

        let new_value = match (current, value) {
            (Value::Bool(_), OptionValue::Bool(b)) => Value::Bool(b),
            (Value::String(_), OptionValue::Text(s)) => Value::String(s),
            (Value::Number(n), OptionValue::Number(x)) => {
                let number = if n.is_f64() {
                    Number::from_f64(x)
                } else if x.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&x) {
                    Some(Number::from(x as u64))
                } else {
                    None
                };
                Value::Number(number.ok_or_else(mismatch)?)
            }
            _ => return Err(mismatch()),
        };

        map.insert(name.to_string(), new_value);
        *self = serde_json::from_value(Value::Object(map))?;
        Ok(())
    }

    fn to_map(&self) -> Result<Map<String, Value>, SettingsError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

fn option<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a Value, SettingsError> {
    if name == REPLACE_RULES {
        return Err(SettingsError::UnknownOption(name.to_string()));
    }
    map.get(name)
        .ok_or_else(|| SettingsError::UnknownOption(name.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(search: &str, replace: &str) -> ReplaceRule {
        ReplaceRule::new(format!("{search}->{replace}"), search, replace)
    }

    #[test]
    fn update_option_checks_schema() {
        let mut settings = Settings::default();

        settings
            .apply(SettingsCommand::UpdateOption {
                name: "head_font_color".into(),
                value: OptionValue::Text("#ff0000".into()),
            })
            .unwrap();
        assert_eq!(settings.head_font_color, "#ff0000");

        settings
            .apply(SettingsCommand::UpdateOption {
                name: "head_font_size".into(),
                value: OptionValue::Number(20.0),
            })
            .unwrap();
        assert_eq!(settings.head_font_size, 20);

        let err = settings
            .apply(SettingsCommand::UpdateOption {
                name: "no_such_option".into(),
                value: OptionValue::Bool(true),
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnknownOption(_)));

        let err = settings
            .apply(SettingsCommand::UpdateOption {
                name: "lookup_with_capitalized".into(),
                value: OptionValue::Text("yes".into()),
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));

        let err = settings
            .apply(SettingsCommand::UpdateOption {
                name: "head_font_size".into(),
                value: OptionValue::Number(12.5),
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        assert_eq!(settings.head_font_size, 20);
    }

    #[test]
    fn replace_rules_are_not_an_option() {
        let mut settings = Settings::default();
        let err = settings
            .apply(SettingsCommand::UpdateOption {
                name: REPLACE_RULES.into(),
                value: OptionValue::Text("[]".into()),
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnknownOption(_)));
        assert!(!Settings::option_names().contains(&REPLACE_RULES.to_string()));
    }

    #[test]
    fn parse_option_uses_option_type() {
        let settings = Settings::default();
        assert_eq!(
            settings.parse_option("dialog_opacity", "0.5").unwrap(),
            OptionValue::Number(0.5)
        );
        assert_eq!(
            settings.parse_option("cut_short_word_description", "true").unwrap(),
            OptionValue::Bool(true)
        );
        assert_eq!(
            settings.parse_option("font_family", "serif").unwrap(),
            OptionValue::Text("serif".into())
        );
        assert!(settings.parse_option("dialog_width", "wide").is_err());
    }

    #[test]
    fn rule_commands() {
        let mut settings = Settings {
            replace_rules: vec![rule("a", "b"), rule("c", "d")],
            ..Settings::default()
        };

        settings.apply(SettingsCommand::AddRule).unwrap();
        assert_eq!(settings.replace_rules.len(), 3);
        assert!(settings.replace_rules[2].is_inert());
        assert!(!settings.replace_rules[2].key.is_empty());

        settings
            .apply(SettingsCommand::UpdateRule {
                index: 2,
                field: RuleField::Search,
                value: "e".into(),
            })
            .unwrap();
        assert_eq!(settings.replace_rules[2].search, "e");

        settings
            .apply(SettingsCommand::MoveRule { index: 0, offset: 1 })
            .unwrap();
        assert_eq!(settings.replace_rules[0].search, "c");
        assert_eq!(settings.replace_rules[1].search, "a");

        // Moving past either end leaves the order alone
        settings
            .apply(SettingsCommand::MoveRule { index: 0, offset: -1 })
            .unwrap();
        settings
            .apply(SettingsCommand::MoveRule { index: 2, offset: 1 })
            .unwrap();
        assert_eq!(settings.replace_rules[0].search, "c");
        assert_eq!(settings.replace_rules[2].search, "e");

        settings
            .apply(SettingsCommand::RemoveRule { index: 0 })
            .unwrap();
        assert_eq!(settings.replace_rules.len(), 2);
        assert_eq!(settings.replace_rules[0].search, "a");

        assert!(matches!(
            settings.apply(SettingsCommand::RemoveRule { index: 5 }),
            Err(SettingsError::RuleOutOfRange { index: 5, len: 2 })
        ));
        assert!(matches!(
            settings.apply(SettingsCommand::UpdateRule {
                index: 9,
                field: RuleField::Replace,
                value: "x".into(),
            }),
            Err(SettingsError::RuleOutOfRange { .. })
        ));
    }

    #[test]
    fn inert_rules_are_kept_in_memory_but_not_persisted() {
        let settings = Settings {
            replace_rules: vec![rule("a", "b"), rule("", "x"), rule("y", "")],
            ..Settings::default()
        };
        assert_eq!(settings.replace_rules.len(), 3);

        let restored = Settings::from_json(&serde_json::to_string(&settings.persisted()).unwrap()).unwrap();
        assert_eq!(restored.replace_rules, vec![rule("a", "b")]);
    }

    #[test]
    fn stored_json_overlays_defaults() {
        let settings = Settings::from_json(
            r##"{"head_font_color": "#123456", "head_font_size": "huge", "legacy": 1, "dialog_opacity": 1}"##,
        )
        .unwrap();
        assert_eq!(settings.head_font_color, "#123456");
        assert_eq!(settings.head_font_size, Settings::default().head_font_size);
        assert_eq!(settings.dialog_opacity, 1.0);
        assert_eq!(settings.replace_rules, default_replace_rules());

        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn bad_stored_values_drop_only_themselves() {
        let settings = Settings::from_json(
            r##"{"head_font_color": "#123456", "head_font_size": 12.5, "desc_font_size": -1}"##,
        )
        .unwrap();
        assert_eq!(settings.head_font_color, "#123456");
        assert_eq!(settings.head_font_size, Settings::default().head_font_size);
        assert_eq!(settings.desc_font_size, Settings::default().desc_font_size);

        let settings = Settings::from_json(
            r##"{"font_family": "serif", "replace_rules": [
                {"search": "a", "replace": "b"},
                {"key": "k1", "search": "c", "replace": "d"},
                "junk"
            ]}"##,
        )
        .unwrap();
        assert_eq!(settings.font_family, "serif");
        assert_eq!(settings.replace_rules, vec![ReplaceRule::new("k1", "c", "d")]);

        let settings = Settings::from_json(r##"{"replace_rules": {"key": "k1"}}"##).unwrap();
        assert_eq!(settings.replace_rules, default_replace_rules());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut settings = Settings {
            font_family: "serif".into(),
            replace_rules: vec![],
            ..Settings::default()
        };
        settings.apply(SettingsCommand::ResetToDefaults).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
