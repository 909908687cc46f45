use super::*;

fn cue(track: &str) -> SoundEvent {
    SoundEvent::MusicCue {
        track: track.to_owned(),
    }
}

#[test]
fn cues_cover_no_frames() {
    let events = vec![
        cue("trial"),
        SoundEvent::Blip { length: 39 },
        SoundEvent::Silence { length: 25 },
        SoundEvent::Objection {
            length: 22,
            character: Some(Character::Phoenix),
        },
        SoundEvent::Shock { length: 25 },
    ];
    assert_eq!(cue("x").frames(), None);
    assert_eq!(total_event_frames(&events), 39 + 25 + 22 + 25);
}

#[test]
fn slice_runs_until_the_next_cue() {
    let events = vec![
        cue("a"),
        SoundEvent::Blip { length: 60 },
        SoundEvent::Silence { length: 40 },
        cue("b"),
        SoundEvent::Silence { length: 10 },
    ];
    assert_eq!(
        music_slices(&events),
        vec![
            MusicSlice {
                track: "a".into(),
                start_frame: 0,
                frames: 100,
            },
            MusicSlice {
                track: "b".into(),
                start_frame: 100,
                frames: 10,
            },
        ]
    );
}

#[test]
fn first_slice_covers_frames_before_its_cue() {
    let events = vec![
        SoundEvent::Silence { length: 50 },
        cue("a"),
        SoundEvent::Silence { length: 100 },
    ];
    assert_eq!(
        music_slices(&events),
        vec![MusicSlice {
            track: "a".into(),
            start_frame: 0,
            frames: 150,
        }]
    );
}

#[test]
fn later_cues_start_where_they_appear() {
    let events = vec![
        SoundEvent::Blip { length: 5 },
        cue("a"),
        SoundEvent::Silence { length: 10 },
        cue("b"),
    ];
    let slices = music_slices(&events);
    assert_eq!(slices.len(), 2);
    assert_eq!((slices[0].start_frame, slices[0].frames), (0, 15));
    assert_eq!((slices[1].start_frame, slices[1].frames), (15, 0));
}

#[test]
fn events_serialize_with_kind_tag() {
    let json = serde_json::to_value(SoundEvent::Objection {
        length: 22,
        character: Some(Character::Edgeworth),
    })
    .unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "kind": "objection", "length": 22, "character": "EDGEWORTH" })
    );
    let back: SoundEvent =
        serde_json::from_value(serde_json::json!({ "kind": "music_cue", "track": "t" })).unwrap();
    assert_eq!(back, cue("t"));
}
