use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Environment variable consulted when no level is given on the command line
pub const LOG_LEVEL_ENV: &str = "EQ_PLAYER_LOG_LEVEL";

/// Initialize logging with the given level, else the environment, else `warn`
pub fn init(level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| "warn".to_string());

    let mut builder = env_logger::Builder::new();

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}:{}] {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    });

    builder.filter_level(parse_level(&log_level));
    builder.try_init()?;

    info!("Player logging initialized with level: {}", log_level);
    Ok(())
}

fn parse_level(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Warn,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEventKind {
    TrackStarted,
    TrackFinished,
    Paused,
    Resumed,
    Seek,
    Volume,
    Effect,
    Selection,
    Acknowledged,
    ErrorSwallowed,
}

impl ControlEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlEventKind::TrackStarted => "TRACK_STARTED",
            ControlEventKind::TrackFinished => "TRACK_FINISHED",
            ControlEventKind::Paused => "PAUSED",
            ControlEventKind::Resumed => "RESUMED",
            ControlEventKind::Seek => "SEEK",
            ControlEventKind::Volume => "VOLUME",
            ControlEventKind::Effect => "EFFECT",
            ControlEventKind::Selection => "SELECTION",
            ControlEventKind::Acknowledged => "ACKNOWLEDGED",
            ControlEventKind::ErrorSwallowed => "ERROR_SWALLOWED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: ControlEventKind,
    pub details: String,
}

/// Bounded history of what the controllers did
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<ControlEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Record an event and forward it to the `log` facade
    pub fn record(&mut self, kind: ControlEventKind, details: impl Into<String>) {
        let details = details.into();
        match kind {
            ControlEventKind::TrackStarted
            | ControlEventKind::TrackFinished
            | ControlEventKind::Paused
            | ControlEventKind::Resumed
            | ControlEventKind::Selection => info!("[{}] {}", kind.as_str(), details),
            ControlEventKind::ErrorSwallowed => warn!("[{}] {}", kind.as_str(), details),
            _ => debug!("[{}] {}", kind.as_str(), details),
        }

        self.events.push_back(ControlEvent {
            timestamp: Utc::now(),
            kind,
            details,
        });
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    /// Most recent `count` events, oldest first
    pub fn recent(&self, count: usize) -> Vec<&ControlEvent> {
        let skip = self.events.len().saturating_sub(count);
        self.events.iter().skip(skip).collect()
    }

    pub fn count(&self, kind: ControlEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_creation() {
        let log = EventLog::default();
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn test_record_event() {
        let mut log = EventLog::default();
        log.record(ControlEventKind::TrackStarted, "meow.mp3");

        let events = log.recent(1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].details, "meow.mp3");
        assert_eq!(events[0].kind, ControlEventKind::TrackStarted);
    }

    #[test]
    fn test_event_history_limit() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.record(ControlEventKind::Seek, format!("Event {}", i));
        }

        assert_eq!(log.len(), 3);
        let events = log.recent(10);
        assert_eq!(events[0].details, "Event 2");
        assert_eq!(events[2].details, "Event 4");
    }

    #[test]
    fn test_count_by_kind() {
        let mut log = EventLog::default();
        log.record(ControlEventKind::Volume, "up");
        log.record(ControlEventKind::Volume, "down");
        log.record(ControlEventKind::Effect, "echo");

        assert_eq!(log.count(ControlEventKind::Volume), 2);
        assert_eq!(log.count(ControlEventKind::ErrorSwallowed), 0);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), log::LevelFilter::Debug);
        assert_eq!(parse_level("nonsense"), log::LevelFilter::Warn);
    }
}
