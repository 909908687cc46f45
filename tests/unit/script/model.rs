use super::*;

const SCRIPT: &str = r##"[
    {
        "location": "COURTROOM_LEFT",
        "audio": "trial",
        "scene": [
            { "character": "PHOENIX", "emotion": "confident", "action": "TEXT", "text": "Hold it!" },
            { "action": "SHAKE" },
            { "length": 10, "repeat": false },
            { "name": "???", "colour": "#ff8800", "action": "TEXT_SHAKE", "text": "Who said that?" }
        ]
    },
    {
        "location": "JUDGE_STAND",
        "scene": [
            { "character": "JUDGE", "action": "OBJECTION" }
        ]
    }
]"##;

#[test]
fn parses_blocks_and_directions() {
    let script = SceneScript::from_json_str(SCRIPT).unwrap();
    assert_eq!(script.blocks.len(), 2);
    assert_eq!(script.direction_count(), 5);

    let first = &script.blocks[0];
    assert_eq!(first.location, Location::CourtroomLeft);
    assert_eq!(first.audio.as_deref(), Some("trial"));
    assert_eq!(first.scene[0].character, Some(Character::Phoenix));
    assert_eq!(first.scene[0].emotion.as_deref(), Some("confident"));
    assert_eq!(first.scene[1].action, Some(Action::Shake));
    assert_eq!(first.scene[2].length, Some(10));
    assert_eq!(first.scene[2].repeat, Some(false));
    assert_eq!(first.scene[2].action, None);
    assert_eq!(first.scene[3].action, Some(Action::TextShake));
    assert_eq!(first.scene[3].colour.as_deref(), Some("#ff8800"));

    assert_eq!(script.blocks[1].audio, None);
    assert_eq!(script.blocks[1].scene[0].action, Some(Action::Objection));
}

#[test]
fn unknown_action_parses_as_other() {
    let json = r#"[{"location": "COURTROOM_LEFT", "scene": [
        {"character": "PHOENIX", "action": "WAVE"}
    ]}]"#;
    let script = SceneScript::from_json_str(json).unwrap();
    assert_eq!(script.blocks[0].scene[0].action, Some(Action::Other));
    script.validate().unwrap();
}

#[test]
fn unknown_character_is_serde_error() {
    let json = r#"[{ "location": "COURTROOM_LEFT", "scene": [{ "character": "NOBODY" }] }]"#;
    assert!(matches!(
        SceneScript::from_json_str(json),
        Err(TurnaboutError::Serde(_))
    ));
}

#[test]
fn empty_script_is_rejected() {
    assert!(matches!(
        SceneScript::from_json_str("[]"),
        Err(TurnaboutError::Validation(_))
    ));
}

#[test]
fn dialogue_without_text_is_rejected() {
    let json = r#"[{ "location": "COURTROOM_LEFT", "scene": [{ "character": "PHOENIX", "action": "TEXT" }] }]"#;
    assert!(matches!(
        SceneScript::from_json_str(json),
        Err(TurnaboutError::Validation(_))
    ));
}

#[test]
fn zero_length_pause_is_rejected() {
    let json = r#"[{ "location": "COURTROOM_LEFT", "scene": [{ "length": 0 }] }]"#;
    assert!(matches!(
        SceneScript::from_json_str(json),
        Err(TurnaboutError::Validation(_))
    ));
}

#[test]
fn directions_serialize_without_unset_fields() {
    let dir = StageDirection {
        action: Some(Action::Shake),
        ..StageDirection::default()
    };
    assert_eq!(
        serde_json::to_string(&dir).unwrap(),
        r#"{"action":"SHAKE"}"#
    );
}

#[test]
fn display_names_are_capitalised_slugs() {
    assert_eq!(Character::Phoenix.display_name(), "Phoenix");
    assert_eq!(Character::Gumshoe.to_string(), "Gumshoe");
    assert!(Character::ALL.iter().all(|c| {
        c.display_name().to_lowercase() == c.slug()
    }));
}

#[test]
fn default_locations_follow_roles() {
    assert_eq!(Character::Phoenix.default_location(), Location::CourtroomLeft);
    assert_eq!(Character::Edgeworth.default_location(), Location::CourtroomRight);
    assert_eq!(Character::Judge.default_location(), Location::JudgeStand);
    assert_eq!(Character::Maya.default_location(), Location::CoCouncil);
    assert_eq!(Character::Larry.default_location(), Location::WitnessStand);
}
