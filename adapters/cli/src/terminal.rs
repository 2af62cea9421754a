//! Line-oriented terminal backend.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use glam::Vec2;
use trap_labs_core::{Direction, Position, RunState, TileKind, GRID_SIZE};
use trap_labs_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

/// Backend reading one input per line and drawing the scene as text.
#[derive(Debug)]
pub(crate) struct TerminalBackend<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalBackend<R, W> {
    pub(crate) const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> RenderingBackend for TerminalBackend<R, W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene),
    {
        let Presentation { title, mut scene } = presentation;
        writeln!(self.output, "{title}")?;
        draw(&scene, &mut self.output)?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read input")?;
            if read == 0 {
                break;
            }
            let Some(input) = parse_input(&line) else {
                writeln!(self.output, "? unrecognised input {:?}", line.trim())?;
                continue;
            };
            if input.quit {
                break;
            }
            update_scene(input, &mut scene);
            draw(&scene, &mut self.output)?;
        }

        self.output.flush().context("failed to flush output")
    }
}

/// Converts a scripted input list into one input per line.
///
/// `click` consumes the two coordinates that follow it.
pub(crate) fn script_lines(script: &str) -> String {
    let mut lines = Vec::new();
    let mut tokens = script.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("click") {
            let x = tokens.next().unwrap_or_default();
            let y = tokens.next().unwrap_or_default();
            lines.push(format!("click {x} {y}"));
        } else {
            lines.push(token.to_owned());
        }
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn parse_input(line: &str) -> Option<FrameInput> {
    let command = line.trim().to_ascii_lowercase();
    let mut input = FrameInput::default();
    match command.as_str() {
        "" | "enter" => input.confirm = true,
        "m" | "mute" => input.toggle_mute = true,
        "q" | "quit" => input.quit = true,
        "w" | "\u{1b}[a" => input.direction = Some(Direction::Up),
        "s" | "\u{1b}[b" => input.direction = Some(Direction::Down),
        "d" | "\u{1b}[c" => input.direction = Some(Direction::Right),
        "a" | "\u{1b}[d" => input.direction = Some(Direction::Left),
        other => {
            if let Some(coordinates) = other.strip_prefix("click") {
                let mut parts = coordinates.split_whitespace().map(str::parse::<f32>);
                let x = parts.next()?.ok()?;
                let y = parts.next()?.ok()?;
                if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
                    return None;
                }
                input.pointer = Some(Vec2::new(x, y));
            } else {
                input.direction = Some(other.parse().ok()?);
            }
        }
    }
    Some(input)
}

fn draw<W: Write>(scene: &Scene, out: &mut W) -> Result<()> {
    match scene.run_state {
        RunState::Menu => writeln!(out, "Press enter to start, m to mute, q to quit.")?,
        RunState::LevelIntro { level } => writeln!(out, "Level {level}. Press enter to begin.")?,
        RunState::Playing { .. } => {}
        RunState::Victory { .. } => writeln!(out, "Victory! Press enter for the menu.")?,
        RunState::GameOver { .. } => writeln!(out, "Game over. Press enter for the menu.")?,
    }

    if scene.has_grid() {
        for row in 0..GRID_SIZE {
            let text: String = (0..GRID_SIZE)
                .map(|column| glyph(scene, Position::new(column, row)))
                .collect();
            writeln!(out, "{text}")?;
        }
    }

    let hud = scene.hud;
    write!(
        out,
        "Level: {}  Steps to go: {}  Health: {}%  Best: {}",
        hud.level, hud.steps_to_go, hud.health, hud.highest_level
    )?;
    if scene.muted {
        write!(out, "  [muted]")?;
    }
    writeln!(out)?;

    for note in &scene.notes {
        writeln!(out, "> {note}")?;
    }
    Ok(())
}

fn glyph(scene: &Scene, position: Position) -> char {
    if let Some(player) = scene.player.filter(|player| player.position == position) {
        return match player.facing {
            Direction::Up => 'A',
            Direction::Down => 'V',
            Direction::Left => '<',
            Direction::Right => '>',
        };
    }
    if let Some(trap) = scene.trap_at(position) {
        return if trap.armed { 'X' } else { '^' };
    }
    match scene.tile(position) {
        Some(TileKind::Floor) => '.',
        Some(TileKind::Block) | None => '#',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use trap_labs_core::Level;
    use trap_labs_rendering::{Hud, PlayerPresentation, TrapPresentation};

    #[test]
    fn keys_map_to_directions() {
        let cases = [
            ("w\n", Direction::Up),
            ("UP\n", Direction::Up),
            ("s", Direction::Down),
            ("left", Direction::Left),
            ("\u{1b}[C\n", Direction::Right),
            ("\u{1b}[D", Direction::Left),
        ];
        for (line, direction) in cases {
            let input = parse_input(line).expect("known input");
            assert_eq!(input.direction, Some(direction), "{line:?}");
        }
    }

    #[test]
    fn control_inputs_are_recognised() {
        assert!(parse_input("\n").expect("enter").confirm);
        assert!(parse_input("enter").expect("enter").confirm);
        assert!(parse_input("m").expect("mute").toggle_mute);
        assert!(parse_input("q\n").expect("quit").quit);
        assert_eq!(
            parse_input("click 10 70").expect("click").pointer,
            Some(Vec2::new(10.0, 70.0))
        );
        assert!(parse_input("click 10").is_none());
        assert!(parse_input("click nan nan").is_none());
        assert!(parse_input("click inf 3").is_none());
        assert!(parse_input("north").is_none());
    }

    #[test]
    fn script_keeps_click_coordinates_together() {
        assert_eq!(
            script_lines("enter d click 5 6 q"),
            "enter\nd\nclick 5 6\nq\n"
        );
    }

    #[test]
    fn grid_shows_player_traps_and_hud() {
        let mut tiles = vec![TileKind::Floor; (GRID_SIZE * GRID_SIZE) as usize];
        tiles[0] = TileKind::Block;
        let traps = vec![
            TrapPresentation {
                position: Position::new(1, 0),
                armed: true,
                frame: 4,
            },
            TrapPresentation {
                position: Position::new(2, 0),
                armed: false,
                frame: 0,
            },
        ];
        let player = PlayerPresentation {
            position: Position::new(3, 0),
            facing: Direction::Right,
            frame: 0,
            pixel: Vec2::ZERO,
        };
        let hud = Hud {
            level: Level::new(2),
            steps_to_go: 17,
            health: 60,
            highest_level: Level::new(1),
        };
        let mut scene = Scene::new(
            tiles,
            traps,
            Some(player),
            hud,
            RunState::Playing {
                level: Level::new(2),
            },
        )
        .expect("valid scene");
        scene.notes.push("ouch".to_owned());

        let mut out = Vec::new();
        draw(&scene, &mut out).expect("draw");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#X^>......");
        assert_eq!(lines[1], "..........");
        assert_eq!(
            lines[10],
            "Level: 2  Steps to go: 17  Health: 60%  Best: 1"
        );
        assert_eq!(lines[11], "> ouch");
    }

    #[test]
    fn backend_stops_on_quit() {
        let backend = TerminalBackend::new(Cursor::new("enter\nbogus\nq\nenter\n"), Vec::new());
        let mut frames = 0;
        backend
            .run(Presentation::new("title", Scene::menu()), |input, _scene| {
                assert!(input.confirm);
                frames += 1;
            })
            .expect("run");
        assert_eq!(frames, 1);
    }
}
