//! Drives the whole pipeline: replay files written into a watched folder, decoded by a toy
//! line-based decoder, filtered, and queued.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use slippi_combo::{ComboRecord, MatchContext, MeleeCharacter, MoveLanded, PlayerInfo, PlayerType};
use slippi_combo_clipper::{ClipperError, ComboClipper, GameEvent, LiveClipper, ReplayDecoder};
use slippi_config::ClipperConfig;
use slippi_dolphin_queue::DolphinQueueDocument;
use slippi_folder_stream::{StreamError, StreamState};

/// Understands `start <path>`, `combo <hits> <kill>` and `end` lines. A `crash` line makes
/// it panic.
#[derive(Debug, Default)]
struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    fn context() -> MatchContext {
        let player = |player_index: u8, character: MeleeCharacter| PlayerInfo {
            player_index,
            port: player_index + 1,
            character_id: character as u8,
            player_type: PlayerType::Human,
            name_tag: String::new(),
        };

        MatchContext {
            stage_id: 2,
            players: vec![player(0, MeleeCharacter::Falco), player(1, MeleeCharacter::Marth)],
        }
    }

    fn parse(line: &str) -> Option<GameEvent> {
        let mut parts = line.split_whitespace();

        match parts.next()? {
            "start" => Some(GameEvent::GameStart {
                path: parts.next()?.to_string(),
                context: Self::context(),
                metadata: None,
            }),

            "combo" => {
                let hits: usize = parts.next()?.parse().ok()?;
                let did_kill = parts.next()? == "kill";

                Some(GameEvent::ComboEnd(ComboRecord {
                    attacker_index: 0,
                    defender_index: 1,
                    start_frame: 1000,
                    end_frame: None,
                    start_percent: 0.0,
                    current_percent: 20.0 * hits as f32,
                    end_percent: None,
                    moves: (0..hits)
                        .map(|_| MoveLanded {
                            frame: 1000,
                            move_id: 17,
                            hit_count: 1,
                            damage: 20.0,
                        })
                        .collect(),
                    did_kill,
                }))
            },

            "end" => Some(GameEvent::GameEnd),
            "crash" => panic!("decoder crashed"),
            _ => None,
        }
    }
}

impl ReplayDecoder for LineDecoder {
    fn decode(&mut self, chunk: &[u8]) -> Vec<GameEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(event) = Self::parse(String::from_utf8_lossy(&line).trim()) {
                events.push(event);
            }
        }

        events
    }
}

fn pump_until<D: ReplayDecoder>(live: &LiveClipper<D>, clipper: &mut ComboClipper, accepted: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut total = 0;

    while total < accepted && Instant::now() < deadline {
        total += live.pump(clipper).unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    total
}

fn config(output: &Path) -> ClipperConfig {
    let toml = format!(
        "output_path = {:?}\n[combo]\nminComboLength = 3\n[stream]\npoll_interval_ms = 20\n",
        output.display().to_string()
    );
    ClipperConfig::from_toml_str(&toml).unwrap()
}

#[test]
fn queues_kills_from_new_replays() {
    let folder = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let output = output_dir.path().join("queue.json");

    fs::write(folder.path().join("Game_old.slp"), b"start Game_old.slp\ncombo 5 kill\n").unwrap();

    let config = config(&output);
    let mut clipper = ComboClipper::from_config(&config);
    let live = LiveClipper::start_in(folder.path(), &config, LineDecoder::default()).unwrap();
    assert_eq!(live.state(), StreamState::Watching);

    fs::write(
        folder.path().join("Game_1.slp"),
        b"start Game_1.slp\ncombo 2 kill\ncombo 4 none\ncombo 4 kill\n",
    )
    .unwrap();
    assert_eq!(pump_until(&live, &mut clipper, 1), 1);

    fs::write(folder.path().join("Game_2.slp"), b"start Game_2.slp\ncombo 3 kill\nend\n").unwrap();
    assert_eq!(pump_until(&live, &mut clipper, 1), 1);

    live.finish(&mut clipper).unwrap();

    let written: DolphinQueueDocument = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let paths: Vec<_> = written.queue.iter().map(|entry| entry.path.as_str()).collect();
    assert_eq!(paths, ["Game_1.slp", "Game_2.slp"]);

    // Live combos haven't ended, so they play out to the longest possible game.
    assert_eq!(written.queue[0].start_frame, Some(760));
    assert_eq!(written.queue[0].end_frame, Some(28800 + 180));
}

#[test]
fn missing_folder_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClipperConfig::default();

    assert!(LiveClipper::start(&config, LineDecoder::default()).is_err());
    assert!(LiveClipper::start_in(dir.path().join("missing"), &config, LineDecoder::default()).is_err());
}

#[test]
fn decoder_panics_surface_as_stream_faults() {
    let folder = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let config = config(&output_dir.path().join("queue.json"));
    let mut clipper = ComboClipper::from_config(&config);
    let live = LiveClipper::start_in(folder.path(), &config, LineDecoder::default()).unwrap();

    fs::write(folder.path().join("Game_1.slp"), b"start Game_1.slp\ncrash\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let result = loop {
        match live.pump(&mut clipper) {
            Ok(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(20)),
            result => break result,
        }
    };

    assert!(matches!(result, Err(ClipperError::Stream(StreamError::SinkPanicked))));
    assert_eq!(live.state(), StreamState::Stopped);

    // A fault is reported once.
    assert!(live.pump(&mut clipper).is_ok());
}
