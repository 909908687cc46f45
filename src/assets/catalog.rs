use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::source::AssetSource;
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::script::model::{Character, Location};

/// Emotion used when a direction names none, and the last-resort sprite.
pub const DEFAULT_EMOTION: &str = "normal";

/// Read-only description of an asset bundle, injected into the expander and the sound bank.
///
/// All paths are relative to the bundle root (see [`crate::FsAssetSource`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    /// Empty-stage background per location.
    pub backgrounds: BTreeMap<Location, PathBuf>,
    /// Foreground bench overlay, only for locations that have one.
    #[serde(default)]
    pub benches: BTreeMap<Location, PathBuf>,
    /// Sprite directory per character.
    pub characters: BTreeMap<Character, PathBuf>,
    /// Interface chrome.
    pub ui: UiAssets,
    /// TrueType font for the name tag and dialogue. Text is not drawn when unset.
    #[serde(default)]
    pub font: Option<PathBuf>,
    /// Sound effects and music.
    pub sounds: SoundAssets,
}

/// Interface chrome sprites.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiAssets {
    /// Dialogue box, scaled to the background width.
    pub textbox: PathBuf,
    /// "Continue" arrow shown while a line is held.
    pub arrow: PathBuf,
    /// "OBJECTION!" burst graphic.
    pub objection: PathBuf,
}

/// Sound effect and music locations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundAssets {
    /// Single dialogue blip, repeated while text is typed out.
    pub blip: PathBuf,
    /// Cue played at the start of every typed line.
    pub blink: PathBuf,
    /// Impact sound for stage shakes.
    pub shock: PathBuf,
    /// Character-specific objection stingers.
    #[serde(default)]
    pub objections: BTreeMap<Character, PathBuf>,
    /// Stinger used for characters without their own.
    pub default_objection: PathBuf,
    /// Directory holding background music tracks.
    pub music_dir: PathBuf,
    /// File extension of music tracks.
    #[serde(default = "default_music_ext")]
    pub music_ext: String,
}

fn default_music_ext() -> String {
    "mp3".to_owned()
}

impl SoundAssets {
    /// Stinger for `character`, falling back to the generic one.
    pub fn objection_for(&self, character: Option<Character>) -> &Path {
        character
            .and_then(|c| self.objections.get(&c))
            .unwrap_or(&self.default_objection)
    }

    /// File for the music track called `name`.
    pub fn music_track(&self, name: &str) -> PathBuf {
        self.music_dir.join(format!("{name}.{}", self.music_ext))
    }
}

/// Idle (blinking) and talking sprite loops for one character and emotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpritePair {
    /// Loop shown while the character is silent.
    pub idle: PathBuf,
    /// Loop shown while text is being typed out.
    pub talking: PathBuf,
}

/// One ranked entry of the sprite resolution policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteCandidate {
    /// File probed for existence.
    pub path: PathBuf,
    /// Matching talking loop; `None` means the candidate is used for both.
    pub talking: Option<PathBuf>,
}

impl AssetCatalog {
    /// Parse a catalog from JSON text.
    pub fn from_json_str(s: &str) -> TurnaboutResult<Self> {
        serde_json::from_str(s).map_err(|e| TurnaboutError::serde(e.to_string()))
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: &Path) -> TurnaboutResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read asset catalog '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Conventional bundle layout.
    pub fn standard() -> Self {
        let backgrounds = [
            (Location::CourtroomLeft, "defenseempty.png"),
            (Location::WitnessStand, "witnessempty.png"),
            (Location::CourtroomRight, "prosecutorempty.png"),
            (Location::CoCouncil, "helperstand.png"),
            (Location::JudgeStand, "judgestand.png"),
            (Location::CourtHouse, "courtroomoverview.png"),
        ]
        .into_iter()
        .map(|(l, f)| (l, PathBuf::from(f)))
        .collect();

        let benches = [
            (Location::CourtroomLeft, "logo-left.png"),
            (Location::CourtroomRight, "logo-right.png"),
            (Location::WitnessStand, "witness_stand.png"),
        ]
        .into_iter()
        .map(|(l, f)| (l, PathBuf::from(f)))
        .collect();

        let characters = [
            (Character::Phoenix, "Sprites-phoenix"),
            (Character::Edgeworth, "Sprites-edgeworth"),
            (Character::Godot, "Sprites-Godot"),
            (Character::Franziska, "Sprites-franziska"),
            (Character::Judge, "Sprites-judge"),
            (Character::Larry, "Sprites-larry"),
            (Character::Maya, "Sprites-maya"),
            (Character::Karma, "Sprites-karma"),
            (Character::Payne, "Sprites-payne"),
            (Character::Maggey, "Sprites-Maggey"),
            (Character::Pearl, "Sprites-Pearl"),
            (Character::Lotta, "Sprites-lotta"),
            (Character::Gumshoe, "Sprites-gumshoe"),
            (Character::Grossberg, "Sprites-grossberg"),
        ]
        .into_iter()
        .map(|(c, d)| (c, PathBuf::from(d)))
        .collect();

        let objections = [
            (Character::Phoenix, "Phoenix - objection.mp3"),
            (Character::Edgeworth, "Edgeworth - (English) objection.mp3"),
        ]
        .into_iter()
        .map(|(c, f)| (c, PathBuf::from(f)))
        .collect();

        Self {
            backgrounds,
            benches,
            characters,
            ui: UiAssets {
                textbox: PathBuf::from("textbox4.png"),
                arrow: PathBuf::from("arrow.png"),
                objection: PathBuf::from("objection.gif"),
            },
            font: Some(PathBuf::from("igiari/Igiari.ttf")),
            sounds: SoundAssets {
                blip: PathBuf::from("sfx general/sfx-blipmale.wav"),
                blink: PathBuf::from("sfx general/sfx-blink.wav"),
                shock: PathBuf::from("sfx general/sfx-fwashing.wav"),
                objections,
                default_objection: PathBuf::from("Payne - Objection.mp3"),
                music_dir: PathBuf::new(),
                music_ext: default_music_ext(),
            },
        }
    }

    /// Background for `location`.
    pub fn background(&self, location: Location) -> TurnaboutResult<&Path> {
        self.backgrounds
            .get(&location)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                TurnaboutError::asset(format!("no background configured for {location:?}"))
            })
    }

    /// Bench overlay for `location`, if the location has one.
    pub fn bench(&self, location: Location) -> Option<&Path> {
        self.benches.get(&location).map(PathBuf::as_path)
    }

    /// Sprite directory for `character`.
    pub fn character_dir(&self, character: Character) -> TurnaboutResult<&Path> {
        self.characters
            .get(&character)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                TurnaboutError::asset(format!("no sprite directory configured for {character:?}"))
            })
    }

    /// Ranked sprite candidates for `(character, emotion)`:
    /// `<emotion>(a)`, then `<emotion>`, then `normal(a)`.
    pub fn sprite_candidates(
        &self,
        character: Character,
        emotion: &str,
    ) -> TurnaboutResult<Vec<SpriteCandidate>> {
        let dir = self.character_dir(character)?;
        let file = |suffix: &str| dir.join(format!("{}-{suffix}.gif", character.slug()));
        Ok(vec![
            SpriteCandidate {
                path: file(&format!("{emotion}(a)")),
                talking: Some(file(&format!("{emotion}(b)"))),
            },
            SpriteCandidate {
                path: file(emotion),
                talking: None,
            },
            SpriteCandidate {
                path: file(&format!("{DEFAULT_EMOTION}(a)")),
                talking: Some(file(&format!("{DEFAULT_EMOTION}(b)"))),
            },
        ])
    }

    /// Resolve the idle/talking pair: the first existing candidate wins.
    pub fn resolve_sprites(
        &self,
        source: &dyn AssetSource,
        character: Character,
        emotion: Option<&str>,
    ) -> TurnaboutResult<SpritePair> {
        let emotion = emotion.unwrap_or(DEFAULT_EMOTION);
        let candidates = self.sprite_candidates(character, emotion)?;
        let Some(hit) = candidates.iter().find(|c| source.exists(&c.path)) else {
            let tried: Vec<String> = candidates
                .iter()
                .map(|c| c.path.display().to_string())
                .collect();
            return Err(TurnaboutError::asset(format!(
                "no sprite for {character:?} ({emotion}); tried {}",
                tried.join(", ")
            )));
        };
        tracing::debug!(?character, emotion, sprite = %hit.path.display(), "resolved sprite");

        Ok(SpritePair {
            idle: hit.path.clone(),
            talking: hit.talking.clone().unwrap_or_else(|| hit.path.clone()),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
