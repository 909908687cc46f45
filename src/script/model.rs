use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{TurnaboutError, TurnaboutResult};

/// Courtroom camera position for a location block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Location {
    /// Defense bench.
    CourtroomLeft,
    /// Witness stand.
    WitnessStand,
    /// Prosecution bench.
    CourtroomRight,
    /// Co-council position next to the defense.
    CoCouncil,
    /// Judge's seat.
    JudgeStand,
    /// Wide shot of the courtroom.
    CourtHouse,
}

/// Fixed playable cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Character {
    /// Phoenix Wright, defense attorney.
    Phoenix,
    /// Miles Edgeworth, prosecutor.
    Edgeworth,
    /// Godot, prosecutor.
    Godot,
    /// Franziska von Karma, prosecutor.
    Franziska,
    /// The Judge.
    Judge,
    /// Larry Butz, witness.
    Larry,
    /// Maya Fey, co-council.
    Maya,
    /// Manfred von Karma, prosecutor.
    Karma,
    /// Winston Payne, prosecutor.
    Payne,
    /// Maggey Byrde, witness.
    Maggey,
    /// Pearl Fey, witness.
    Pearl,
    /// Lotta Hart, witness.
    Lotta,
    /// Dick Gumshoe, detective.
    Gumshoe,
    /// Marvin Grossberg, witness.
    Grossberg,
}

impl Character {
    /// Every character in roster order.
    pub const ALL: [Character; 14] = [
        Character::Phoenix,
        Character::Edgeworth,
        Character::Godot,
        Character::Franziska,
        Character::Judge,
        Character::Larry,
        Character::Maya,
        Character::Karma,
        Character::Payne,
        Character::Maggey,
        Character::Pearl,
        Character::Lotta,
        Character::Gumshoe,
        Character::Grossberg,
    ];

    /// Lowercase identifier used in sprite filenames, e.g. `phoenix`.
    pub fn slug(self) -> &'static str {
        match self {
            Character::Phoenix => "phoenix",
            Character::Edgeworth => "edgeworth",
            Character::Godot => "godot",
            Character::Franziska => "franziska",
            Character::Judge => "judge",
            Character::Larry => "larry",
            Character::Maya => "maya",
            Character::Karma => "karma",
            Character::Payne => "payne",
            Character::Maggey => "maggey",
            Character::Pearl => "pearl",
            Character::Lotta => "lotta",
            Character::Gumshoe => "gumshoe",
            Character::Grossberg => "grossberg",
        }
    }

    /// Name shown in the name tag, e.g. `Phoenix`.
    pub fn display_name(self) -> String {
        let slug = self.slug();
        let mut chars = slug.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Where the character is usually framed.
    pub fn default_location(self) -> Location {
        match self {
            Character::Phoenix => Location::CourtroomLeft,
            Character::Edgeworth
            | Character::Godot
            | Character::Franziska
            | Character::Karma
            | Character::Payne => Location::CourtroomRight,
            Character::Judge => Location::JudgeStand,
            Character::Maya => Location::CoCouncil,
            Character::Larry
            | Character::Maggey
            | Character::Pearl
            | Character::Lotta
            | Character::Gumshoe
            | Character::Grossberg => Location::WitnessStand,
        }
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Stage action attached to a direction. Directions without one pause on the idle sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Typed-out dialogue.
    Text,
    /// Typed-out dialogue while the stage shakes.
    TextShake,
    /// Stage shake with no new dialogue.
    Shake,
    /// "Objection!" outburst.
    Objection,
    /// Any unrecognised action; handled like a direction without one.
    #[serde(other)]
    Other,
}

/// One entry of a location block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDirection {
    /// Selects (or re-selects) the speaker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
    /// Sprite emotion, e.g. `confident`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// Name tag override for this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Dialogue colour override (`#RRGGBB`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    /// What happens on stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Dialogue text for `TEXT` / `TEXT_SHAKE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Pause length in frames (no-action directions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// `false` plays the idle sprite once and holds the last frame for this pause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<bool>,
}

/// A run of stage directions framed at one location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationBlock {
    /// Camera position.
    pub location: Location,
    /// Background music track started at the top of this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Ordered stage directions.
    pub scene: Vec<StageDirection>,
}

/// Complete input script: ordered location blocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneScript {
    /// Ordered location blocks.
    pub blocks: Vec<LocationBlock>,
}

impl SceneScript {
    /// Parse a script from JSON text.
    pub fn from_json_str(s: &str) -> TurnaboutResult<Self> {
        let script: Self =
            serde_json::from_str(s).map_err(|e| TurnaboutError::serde(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> TurnaboutResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read scene script '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check structural constraints that do not need assets.
    pub fn validate(&self) -> TurnaboutResult<()> {
        if self.blocks.is_empty() {
            return Err(TurnaboutError::validation("scene script has no location blocks"));
        }
        for (bi, block) in self.blocks.iter().enumerate() {
            for (di, dir) in block.scene.iter().enumerate() {
                let at = || format!("block {bi}, direction {di}");
                let speaks = matches!(dir.action, Some(Action::Text | Action::TextShake));
                if speaks && dir.text.is_none() {
                    return Err(TurnaboutError::validation(format!(
                        "{}: dialogue action without text",
                        at()
                    )));
                }
                if dir.length == Some(0) {
                    return Err(TurnaboutError::validation(format!(
                        "{}: pause length must be > 0",
                        at()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of stage directions across all blocks.
    pub fn direction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.scene.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
