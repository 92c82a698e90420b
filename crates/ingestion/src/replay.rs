//! Replay feed - publish recorded sensor messages
//!
//! A recording is a JSON-lines file, one `SensorMessage` per line in wire
//! shape. Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{ReplayConfig, SensorMessage};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::pacing::{sleep_while_running, RunningGuard};
use crate::world_view::LocalWorldView;

/// Slowest accepted playback rate
const MIN_SPEED: f64 = 0.01;

/// Replay feed
///
/// Publishes records in file order. Records carrying `time` are paced by
/// their offset from the first timed record, divided by the speed
/// multiplier; records without `time` go out immediately.
pub struct ReplayFeed {
    path: PathBuf,
    records: Arc<Vec<SensorMessage>>,
    speed_multiplier: f64,
    loop_playback: bool,
    running: Arc<AtomicBool>,
    published: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayFeed {
    /// Load the recording named by `config`.
    #[instrument(name = "replay_load", skip(config), fields(path = %config.path.display()))]
    pub fn load(config: &ReplayConfig) -> Result<Self> {
        let records = read_recording(&config.path)?;

        info!(records = records.len(), "recording loaded");

        Ok(Self::from_records(records, config))
    }

    /// Build a feed over in-memory records.
    pub fn from_records(records: Vec<SensorMessage>, config: &ReplayConfig) -> Self {
        Self {
            path: config.path.clone(),
            records: Arc::new(records),
            speed_multiplier: config.speed_multiplier.max(MIN_SPEED),
            loop_playback: config.loop_playback,
            running: Arc::new(AtomicBool::new(false)),
            published: Arc::new(AtomicU64::new(0)),
            handle: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[SensorMessage] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start playback into `world_view`. No-op while already running.
    pub fn start(&self, world_view: Arc<LocalWorldView>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let records = self.records.clone();
        let running = self.running.clone();
        let published = self.published.clone();
        let speed = self.speed_multiplier;
        let loop_playback = self.loop_playback;
        let path = self.path.display().to_string();

        let handle = thread::spawn(move || {
            let _running = RunningGuard(&running);
            debug!(path = %path, "replay thread started");

            loop {
                if records.is_empty() {
                    warn!(path = %path, "no records to replay");
                    break;
                }

                if !play_once(&records, speed, &running, &published, &world_view) {
                    debug!(path = %path, "replay stopped");
                    return;
                }

                if !loop_playback {
                    info!(path = %path, "replay completed");
                    break;
                }

                debug!(path = %path, "looping replay");
            }
        });

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stop playback and wait for the replay thread.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.join();
    }

    /// Wait until playback finishes on its own (never, when looping).
    pub fn wait(&self) {
        self.join();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Messages published so far, across loops
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn join(&self) {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(path = %self.path.display(), "replay thread panicked");
            }
        }
    }
}

impl Drop for ReplayFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pass over the records. Returns `false` if stopped midway.
fn play_once(
    records: &[SensorMessage],
    speed: f64,
    running: &AtomicBool,
    published: &AtomicU64,
    world_view: &LocalWorldView,
) -> bool {
    let start_time = Instant::now();
    let first_time = records.iter().find_map(|r| r.time);

    for record in records {
        if !running.load(Ordering::Relaxed) {
            return false;
        }

        if let (Some(first), Some(time)) = (first_time, record.time) {
            match Duration::try_from_secs_f64((time - first).max(0.0) / speed) {
                Ok(target) => {
                    let wait = target.saturating_sub(start_time.elapsed());
                    if !sleep_while_running(wait, running) {
                        return false;
                    }
                }
                Err(_) => warn!(
                    name = %record.name,
                    time,
                    "record time offset out of range, publishing immediately"
                ),
            }
        }

        world_view.publish(record);
        published.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sensor_master_feed_messages_total", "feed" => "replay").increment(1);
    }

    true
}

/// Parse a JSON-lines recording.
pub fn read_recording(path: &Path) -> Result<Vec<SensorMessage>> {
    let io_error = |source: std::io::Error| IngestionError::ReplayIo {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let mut records = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_error)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: SensorMessage =
            serde_json::from_str(line).map_err(|source| IngestionError::ReplayParse {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorMessageCallback, WorldView};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn recording(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn collect(view: &LocalWorldView) -> Arc<Mutex<Vec<SensorMessage>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: SensorMessageCallback = Arc::new(move |message: &SensorMessage| {
            sink.lock().unwrap().push(message.clone());
        });
        view.subscribe(callback).unwrap();
        seen
    }

    #[test]
    fn test_load_skips_blank_and_comment_lines() {
        let file = recording(&[
            "# recorded on the test track",
            r#"{"type":"range","name":"r1","time":0.0,"value":3.2}"#,
            "",
            r#"{"type":"range","name":"r1","time":0.1,"value":5.0}"#,
        ]);

        let feed = ReplayFeed::load(&ReplayConfig::new(file.path())).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.records()[1].time, Some(0.1));
    }

    #[test]
    fn test_load_reports_line_number() {
        let file = recording(&[
            r#"{"type":"range","name":"r1","value":3.2}"#,
            r#"{"type":"range","value":5.0}"#,
        ]);

        let err = ReplayFeed::load(&ReplayConfig::new(file.path())).err().unwrap();
        match err {
            IngestionError::ReplayParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = ReplayFeed::load(&ReplayConfig::new("/nonexistent/recording.jsonl"));
        assert!(matches!(result, Err(IngestionError::ReplayIo { .. })));
    }

    #[test]
    fn test_replay_in_file_order() {
        let file = recording(&[
            r#"{"type":"range","name":"a","time":0.00,"value":1.0}"#,
            r#"{"type":"range","name":"b","time":0.02,"value":2.0}"#,
            r#"{"type":"gps","name":"c","latitude":1.0,"longitude":2.0}"#,
        ]);
        let config = ReplayConfig {
            speed_multiplier: 4.0,
            ..ReplayConfig::new(file.path())
        };

        let view = Arc::new(LocalWorldView::new());
        let seen = collect(&view);

        let feed = ReplayFeed::load(&config).unwrap();
        feed.start(view.clone());
        feed.wait();

        assert!(!feed.is_running());
        assert_eq!(feed.published(), 3);
        let names: Vec<String> = seen.lock().unwrap().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_out_of_range_time_offset_publishes_immediately() {
        let records = vec![
            SensorMessage::new("range", "r1").at(0.0).with_field("value", 1.0),
            SensorMessage::new("range", "r1").at(1e20).with_field("value", 2.0),
        ];
        let config = ReplayConfig {
            speed_multiplier: 0.01,
            ..ReplayConfig::new("memory")
        };

        let view = Arc::new(LocalWorldView::new());
        let seen = collect(&view);

        let feed = ReplayFeed::from_records(records, &config);
        let started = Instant::now();
        feed.start(view.clone());
        feed.wait();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!feed.is_running());
        assert_eq!(feed.published(), 2);
        assert_eq!(seen.lock().unwrap()[1].fields["value"], 2.0);
    }

    #[test]
    fn test_stop_interrupts_long_gap() {
        let records = vec![
            SensorMessage::new("range", "r1").at(0.0).with_field("value", 1.0),
            SensorMessage::new("range", "r1").at(3600.0).with_field("value", 2.0),
        ];

        let view = Arc::new(LocalWorldView::new());
        let feed = ReplayFeed::from_records(records, &ReplayConfig::new("memory"));
        feed.start(view.clone());
        while feed.published() < 1 {
            thread::sleep(Duration::from_millis(1));
        }

        let stopping = Instant::now();
        feed.stop();
        assert!(stopping.elapsed() < Duration::from_secs(1));
        assert!(!feed.is_running());
        assert_eq!(feed.published(), 1);
    }

    #[test]
    fn test_looping_replay_until_stopped() {
        let records = vec![
            SensorMessage::new("range", "r1").with_field("value", 1.0),
            SensorMessage::new("range", "r1").with_field("value", 2.0),
        ];
        let config = ReplayConfig {
            loop_playback: true,
            ..ReplayConfig::new("memory")
        };

        let view = Arc::new(LocalWorldView::new());
        let seen = collect(&view);

        let feed = ReplayFeed::from_records(records, &config);
        feed.start(view.clone());
        while feed.published() < 10 {
            thread::sleep(Duration::from_millis(1));
        }
        feed.stop();

        assert!(seen.lock().unwrap().len() >= 10);
    }
}
