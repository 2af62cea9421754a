#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure audio system that turns world events into sound cues.

use tracing::debug;
use trap_labs_core::Event;

/// Background music tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    /// Loop played while the menu is shown.
    Menu,
    /// Loop played during a run.
    Game,
}

/// Sound instruction produced for the audio backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Switch the background loop to the given track.
    Music(Track),
    /// Spike sound played when a trap arms.
    TrapArmed,
    /// Pain sound played when the player is hurt.
    PlayerHurt,
}

/// Tracks the active music loop and the mute toggle.
#[derive(Debug)]
pub struct AudioCues {
    track: Track,
    muted: bool,
}

impl AudioCues {
    /// Creates an unmuted audio system playing the menu loop.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            track: Track::Menu,
            muted: false,
        }
    }

    /// Track currently selected.
    #[must_use]
    pub const fn track(&self) -> Track {
        self.track
    }

    /// Returns `true` while sound is muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flips the mute toggle and returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        debug!(muted = self.muted, "audio mute toggled");
        self.muted
    }

    /// Consumes world events and emits the cues they imply.
    ///
    /// Music switches are always reported so unmuting resumes the right loop.
    /// Sound effects are dropped while muted.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Cue>) {
        for event in events {
            match event {
                Event::RunStarted => self.switch_to(Track::Game, out),
                Event::ReturnedToMenu => self.switch_to(Track::Menu, out),
                Event::TrapArmed { .. } => self.effect(Cue::TrapArmed, out),
                Event::PlayerDamaged { .. } => self.effect(Cue::PlayerHurt, out),
                _ => {}
            }
        }
    }

    fn switch_to(&mut self, track: Track, out: &mut Vec<Cue>) {
        if self.track != track {
            self.track = track;
            out.push(Cue::Music(track));
        }
    }

    fn effect(&self, cue: Cue, out: &mut Vec<Cue>) {
        if !self.muted {
            out.push(cue);
        }
    }
}

impl Default for AudioCues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioCues, Cue, Track};
    use trap_labs_core::{Event, Position};

    #[test]
    fn music_switches_only_on_track_changes() {
        let mut audio = AudioCues::new();
        let mut cues = Vec::new();

        audio.handle(&[Event::ReturnedToMenu], &mut cues);
        assert!(cues.is_empty());

        audio.handle(&[Event::RunStarted, Event::RunStarted], &mut cues);
        assert_eq!(cues, vec![Cue::Music(Track::Game)]);
        assert_eq!(audio.track(), Track::Game);
    }

    #[test]
    fn mute_silences_effects_but_not_music_selection() {
        let mut audio = AudioCues::new();
        let mut cues = Vec::new();
        assert!(audio.toggle_mute());

        audio.handle(
            &[
                Event::RunStarted,
                Event::TrapArmed {
                    position: Position::new(2, 2),
                },
                Event::PlayerDamaged {
                    position: Position::new(2, 2),
                    health: 80,
                },
            ],
            &mut cues,
        );
        assert_eq!(cues, vec![Cue::Music(Track::Game)]);

        assert!(!audio.toggle_mute());
        assert!(!audio.is_muted());
    }
}
