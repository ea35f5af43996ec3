//! Exercises the folder stream against a real (temporary) directory.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use slippi_folder_stream::{ByteSink, FolderStreamOptions, SlpFolderStream, StreamError, StreamEvent, StreamState};

const SETTLE: Duration = Duration::from_millis(300);

fn options() -> FolderStreamOptions {
    FolderStreamOptions {
        poll_interval: Duration::from_millis(20),
        ..Default::default()
    }
}

/// Collects forwarded bytes until `expected` bytes arrived or a few seconds passed.
fn collect(rx: &Receiver<StreamEvent>, expected: usize) -> Vec<u8> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut bytes = Vec::new();

    while bytes.len() < expected && Instant::now() < deadline {
        if let Ok(StreamEvent::Data(chunk)) = rx.recv_timeout(Duration::from_millis(50)) {
            bytes.extend(chunk);
        }
    }

    bytes
}

fn append(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
}

#[test]
fn missing_folder_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel::<StreamEvent>();
    let mut stream = SlpFolderStream::with_options(tx, options());

    let result = stream.start(dir.path().join("nope"));
    assert!(matches!(result, Err(StreamError::FolderNotFound(_))));
    assert_eq!(stream.state(), StreamState::Stopped);

    // Stopped is terminal.
    assert!(matches!(stream.start(dir.path()), Err(StreamError::Stopped)));
}

#[test]
fn stop_and_end_are_safe_before_start() {
    let (tx, rx) = mpsc::channel::<StreamEvent>();
    let mut stream = SlpFolderStream::with_options(tx, options());

    stream.stop();
    stream.stop();
    assert_eq!(stream.state(), StreamState::Idle);

    stream.end();
    stream.end();
    assert_eq!(stream.state(), StreamState::Stopped);
    assert_eq!(rx.try_recv(), Ok(StreamEvent::End));
    assert!(rx.try_recv().is_err());
}

#[test]
fn cannot_start_twice() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel::<StreamEvent>();
    let mut stream = SlpFolderStream::with_options(tx, options());

    stream.start(dir.path()).unwrap();
    assert_eq!(stream.state(), StreamState::Watching);
    assert!(matches!(stream.start(dir.path()), Err(StreamError::AlreadyStarted)));

    stream.stop();
    assert_eq!(stream.state(), StreamState::Stopped);
}

#[test]
fn ignores_existing_hidden_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("Game_old.slp");
    fs::write(&existing, b"old").unwrap();

    let (tx, rx) = mpsc::channel::<StreamEvent>();
    let mut stream = SlpFolderStream::with_options(tx, options());
    stream.start(dir.path()).unwrap();

    append(&existing, b"still old");
    fs::write(dir.path().join(".Game_hidden.slp"), b"hidden").unwrap();
    fs::write(dir.path().join("notes.txt"), b"notes").unwrap();
    thread::sleep(SETTLE);

    assert!(rx.try_recv().is_err());
    assert_eq!(stream.state(), StreamState::Watching);

    fs::write(dir.path().join("Game_new.slp"), b"new").unwrap();
    assert_eq!(collect(&rx, 3), b"new");
    assert_eq!(stream.state(), StreamState::Tailing);
}

#[test]
fn tails_growing_files_and_rotates_without_interleaving() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel::<StreamEvent>();
    let mut stream = SlpFolderStream::with_options(tx, options());
    stream.start(dir.path()).unwrap();

    let first = dir.path().join("Game_1.slp");
    fs::write(&first, b"first-").unwrap();
    assert_eq!(collect(&rx, 6), b"first-");

    // Grow the first file and immediately start the second one.
    append(&first, b"tail");
    let second = dir.path().join("Game_2.slp");
    fs::write(&second, b"second-").unwrap();
    thread::sleep(SETTLE);
    append(&second, b"more");

    let rest = collect(&rx, b"tailsecond-more".len());
    assert_eq!(rest, b"tailsecond-more");

    stream.end();
    assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(StreamEvent::End));
    assert_eq!(stream.state(), StreamState::Stopped);
}

#[test]
fn stop_drains_the_active_file_and_returns_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    let mut stream = SlpFolderStream::with_options(Vec::new(), FolderStreamOptions {
        // Long enough that only events and the final drain move data.
        poll_interval: Duration::from_secs(60),
        ..Default::default()
    });
    stream.start(dir.path()).unwrap();

    let path = dir.path().join("Game_1.slp");
    fs::write(&path, b"abc").unwrap();
    thread::sleep(SETTLE);

    let sink = stream.into_sink().unwrap();
    assert_eq!(sink, b"abc");
}

struct PanickingSink;

impl ByteSink for PanickingSink {
    fn write_chunk(&mut self, _chunk: &[u8]) {
        panic!("decoder blew up");
    }
}

#[test]
fn sink_panics_stop_the_stream_and_keep_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    let mut stream = SlpFolderStream::with_options(PanickingSink, options());
    stream.start(dir.path()).unwrap();

    fs::write(dir.path().join("Game_1.slp"), b"boom").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while stream.state() != StreamState::Stopped && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(stream.state(), StreamState::Stopped);
    assert!(matches!(stream.take_fault(), Some(StreamError::SinkPanicked)));
    assert!(stream.into_sink().is_some());
}
