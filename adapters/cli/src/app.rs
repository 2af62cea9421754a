use tracing::debug;
use trap_labs_core::{Command, Event, RunState, MOVEMENT_STEPS};
use trap_labs_rendering::{DirectionPad, FrameInput, PlayerPresentation, Scene, TrapPresentation};
use trap_labs_system_audio::{AudioCues, Cue, Track};
use trap_labs_system_progress::{HighestLevelStore, Progress};
use trap_labs_world::{self as world, query, Config, World};

/// Application context owning the world and every system.
#[derive(Debug)]
pub(crate) struct App<S> {
    world: World,
    audio: AudioCues,
    progress: Progress<S>,
    pad: DirectionPad,
}

impl<S: HighestLevelStore> App<S> {
    /// Builds the world and seeds it with persisted progress.
    pub(crate) fn new(config: Config, store: S) -> Self {
        let mut app = Self {
            world: World::new(config),
            audio: AudioCues::new(),
            progress: Progress::new(store),
            pad: DirectionPad::default(),
        };
        let restore = app.progress.restore_command();
        let _ = app.dispatch(restore, &mut Vec::new());
        app
    }

    /// Banner shown when the experience boots.
    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Note describing the music loop selected at boot.
    pub(crate) fn opening_note(&self) -> String {
        describe_cue(Cue::Music(self.audio.track()))
    }

    /// Applies a frame of input and returns the messages it produced.
    pub(crate) fn handle_input(&mut self, input: &FrameInput) -> Vec<String> {
        let mut notes = Vec::new();

        if input.toggle_mute {
            let muted = self.audio.toggle_mute();
            notes.push(if muted { "sound off" } else { "sound on" }.to_owned());
        }

        if let Some(direction) = input.direction_with(&self.pad) {
            let events = self.dispatch(Command::MovePlayer { direction }, &mut notes);
            let moved = events
                .iter()
                .any(|event| matches!(event, Event::PlayerMoved { .. }));
            if moved {
                let _ = self.dispatch(
                    Command::AdvanceAnimation {
                        steps: MOVEMENT_STEPS,
                    },
                    &mut notes,
                );
            }
        } else if input.confirm {
            let command = match query::run_state(&self.world) {
                RunState::Menu => Some(Command::StartRun),
                RunState::LevelIntro { .. } => Some(Command::BeginLevel),
                RunState::Victory { .. } | RunState::GameOver { .. } => Some(Command::Acknowledge),
                RunState::Playing { .. } => None,
            };
            if let Some(command) = command {
                let _ = self.dispatch(command, &mut notes);
            }
        }

        notes
    }

    /// Captures the current world state for the renderer.
    pub(crate) fn scene(&self) -> Scene {
        let run_state = query::run_state(&self.world);
        let layout = query::current_layout(&self.world);
        let tiles = layout
            .map(|layout| layout.tiles().map(|(_, tile)| tile).collect())
            .unwrap_or_default();
        let player = layout.map(|_| PlayerPresentation::from(query::player(&self.world)));
        let traps = query::trap_view(&self.world)
            .into_vec()
            .into_iter()
            .map(TrapPresentation::from)
            .collect();
        let hud = query::stats(&self.world).into();

        let mut scene = match Scene::new(tiles, traps, player, hud, run_state) {
            Ok(scene) => scene,
            Err(error) => {
                debug!(%error, "falling back to the menu scene");
                Scene::menu()
            }
        };
        scene.muted = self.audio.is_muted();
        scene
    }

    /// Applies `command` and routes the resulting events through every system.
    fn dispatch(&mut self, command: Command, notes: &mut Vec<String>) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        let mut cues = Vec::new();
        self.audio.handle(&events, &mut cues);
        self.progress.handle(&events);

        notes.extend(events.iter().filter_map(describe_event));
        notes.extend(cues.into_iter().map(describe_cue));
        events
    }
}

fn describe_event(event: &Event) -> Option<String> {
    let note = match event {
        Event::LevelIntroduced { level, step_budget } => {
            format!("level {level}: survive {step_budget} steps")
        }
        Event::PlayerDamaged { health, .. } => format!("ouch! health {health}%"),
        Event::LevelCompleted { level } => format!("level {level} cleared"),
        Event::Victory { .. } => "you escaped the labs".to_owned(),
        Event::GameOver { level } => format!("game over on level {level}"),
        Event::HighestLevelRecorded { level } => format!("best level: {level}"),
        _ => return None,
    };
    Some(note)
}

fn describe_cue(cue: Cue) -> String {
    match cue {
        Cue::Music(Track::Menu) => "[music] menu theme".to_owned(),
        Cue::Music(Track::Game) => "[music] game theme".to_owned(),
        Cue::TrapArmed => "[sound] spikes".to_owned(),
        Cue::PlayerHurt => "[sound] pain".to_owned(),
    }
}
