use glance_types::{AppEvent, OptionValue, RuleField, SettingsCommand};

use crate::io::parse_command;

fn settings(line: &str) -> SettingsCommand {
    match parse_command(line) {
        Ok(Some(AppEvent::Settings(command))) => command,
        other => panic!("expected a settings command for {line:?}, got {other:?}"),
    }
}

#[test]
fn test_set_uses_option_type() {
    assert_eq!(
        settings("set head_font_size 20"),
        SettingsCommand::UpdateOption {
            name: "head_font_size".into(),
            value: OptionValue::Number(20.0),
        }
    );
    assert_eq!(
        settings("set lookup_with_capitalized false"),
        SettingsCommand::UpdateOption {
            name: "lookup_with_capitalized".into(),
            value: OptionValue::Bool(false),
        }
    );
    assert_eq!(
        settings("set font_family Noto Sans JP"),
        SettingsCommand::UpdateOption {
            name: "font_family".into(),
            value: OptionValue::Text("Noto Sans JP".into()),
        }
    );
}

#[test]
fn test_set_rejects_bad_input() {
    assert!(parse_command("set head_font_size big").is_err());
    assert!(parse_command("set no_such_option 1").is_err());
    assert!(parse_command("set").is_err());
}

#[test]
fn test_rule_commands() {
    assert_eq!(settings("add-rule"), SettingsCommand::AddRule);
    assert_eq!(
        settings("set-rule 1  replace \\n・ see also"),
        SettingsCommand::UpdateRule {
            index: 1,
            field: RuleField::Replace,
            value: "\n・ see also".into(),
        }
    );
    assert_eq!(
        settings("move-rule 2 -1"),
        SettingsCommand::MoveRule {
            index: 2,
            offset: -1
        }
    );
    assert_eq!(settings("remove-rule 0"), SettingsCommand::RemoveRule { index: 0 });
    assert_eq!(settings("reset"), SettingsCommand::ResetToDefaults);

    assert!(parse_command("set-rule 0 middle x").is_err());
    assert!(parse_command("move-rule x 1").is_err());
}

#[test]
fn test_other_commands() {
    assert!(matches!(
        parse_command("text  Rained cats"),
        Ok(Some(AppEvent::TrialText(text))) if text == "Rained cats"
    ));
    assert!(matches!(parse_command("save"), Ok(Some(AppEvent::SaveSettings))));
    assert!(matches!(parse_command("quit"), Ok(Some(AppEvent::Shutdown))));
    assert!(matches!(parse_command("   "), Ok(None)));
    assert!(parse_command("frobnicate").is_err());
}
