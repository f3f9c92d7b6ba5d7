use std::path::Path;
use std::time::Duration;

use crate::config::PlayerConfig;
use crate::error::{ControlError, ErrorSeverity, LibraryError, PlayerError};
use crate::library::TrackList;
use crate::logging::EventLog;
use crate::models::{EffectStatus, PlaybackState, PlayerStatus};

/// Status display formatter for the CLI
pub struct StatusDisplay;

impl StatusDisplay {
    /// Display player status with track, position, volume and equalizer
    pub fn display_full_status(status: &PlayerStatus) {
        println!("┌─ Player Status ─────────────────────────────────────────┐");

        match &status.track {
            Some(track) => {
                let name = TrackList::display_name(track);
                println!("│ Track: {}", Self::truncate(&name, 50));
                Self::display_playback_info(status);
            }
            None => println!("│ No track loaded"),
        }

        println!("│ Status: {}", Self::format_playback_state(status.state));
        match status.volume {
            Some(volume) => println!("│ Volume: {}%", (volume * 100.0).round() as u8),
            None => println!("│ Volume: -"),
        }

        println!("│");
        for line in Self::equalizer_lines(status) {
            println!("│ {}", line);
        }
        println!("└─────────────────────────────────────────────────────────┘");
    }

    /// Display compact status information
    pub fn display_compact_status(status: &PlayerStatus) {
        println!("{}", Self::compact_line(status));
    }

    pub fn compact_line(status: &PlayerStatus) -> String {
        match &status.track {
            Some(track) => format!(
                "{} | {} | {}/{} ({}%)",
                status.state.as_str(),
                Self::truncate(&TrackList::display_name(track), 30),
                Self::format_ms(status.position_ms),
                Self::format_ms(status.length_ms),
                (status.progress() * 100.0) as u8
            ),
            None => format!("{} | No track loaded", status.state.as_str()),
        }
    }

    /// Current settings and the file they are saved to
    pub fn display_config(config: &PlayerConfig, path: Option<&Path>) {
        println!("┌─ Settings ──────────────────────────────────────────────┐");
        for line in Self::config_lines(config) {
            println!("│ {}", line);
        }
        match path {
            Some(path) => println!("│ File: {}", Self::truncate(&path.display().to_string(), 50)),
            None => println!("│ File: - (changes last until exit)"),
        }
        println!("└─────────────────────────────────────────────────────────┘");
    }

    pub fn config_lines(config: &PlayerConfig) -> Vec<String> {
        vec![
            format!("Error policy: {}", config.error_policy.as_str()),
            format!("Seek step:    {} ms", config.seek_step_ms),
            format!("Extension:    .{}", config.media_extension),
            format!("Confirm exit: {}", if config.confirm_exit { "on" } else { "off" }),
            format!("History size: {}", config.event_history),
        ]
    }

    /// The equalizer panel: one caption per unit plus filter cutoffs
    pub fn display_equalizer(status: &PlayerStatus) {
        println!("┌─ Equalizer ─────────────────────────────────────────────┐");
        for line in Self::equalizer_lines(status) {
            println!("│ {}", line);
        }
        println!("└─────────────────────────────────────────────────────────┘");
    }

    pub fn equalizer_lines(status: &PlayerStatus) -> Vec<String> {
        status.effects.iter().map(Self::effect_line).collect()
    }

    fn effect_line(effect: &EffectStatus) -> String {
        match effect.cutoff_hz {
            Some(hz) => format!("{:<9} {:<3} cutoff {:.0} Hz", effect.kind.as_str(), effect.caption(), hz),
            None => format!("{:<9} {}", effect.kind.as_str(), effect.caption()),
        }
    }

    fn display_playback_info(status: &PlayerStatus) {
        println!(
            "│ Position: {} / {}",
            Self::format_ms(status.position_ms),
            Self::format_ms(status.length_ms)
        );

        let progress = status.progress();
        println!(
            "│ Progress: [{}] {:.1}%",
            Self::create_progress_bar(progress, 40),
            progress * 100.0
        );
    }

    pub fn display_track_list(tracks: &TrackList) {
        if tracks.is_empty() {
            println!("Song list is empty. Add files with 'add <path>'.");
            return;
        }
        for (number, path) in tracks.entries().iter().enumerate() {
            println!("{:>3}. {}", number + 1, Self::truncate(&TrackList::display_name(path), 60));
        }
    }

    /// Most recent `count` control events, oldest first
    pub fn display_history(events: &EventLog, count: usize) {
        if events.is_empty() {
            println!("No events yet.");
            return;
        }
        for event in events.recent(count) {
            println!(
                "{} [{}] {}",
                event.timestamp.format("%H:%M:%S%.3f"),
                event.kind.as_str(),
                event.details
            );
        }
    }

    /// Display error message with formatting and recovery suggestions
    pub fn display_error(error: &PlayerError) {
        let severity = error.severity();
        let severity_icon = match severity {
            ErrorSeverity::Info => "ℹ",
            ErrorSeverity::Warning => "⚠",
            ErrorSeverity::Error => "✗",
            ErrorSeverity::Critical => "🔥",
        };

        eprintln!(
            "┌─ {} {} ─────────────────────────────────────────────────┐",
            severity_icon,
            severity.as_str()
        );

        for line in Self::wrap_text(&error.user_message(), 55) {
            eprintln!("│ {}", line);
        }

        let suggestions = error.recovery_suggestions();
        if !suggestions.is_empty() {
            eprintln!("│");
            eprintln!("│ Suggestions:");
            for suggestion in suggestions.iter().take(3) {
                for line in Self::wrap_text(&format!("• {}", suggestion), 53) {
                    eprintln!("│   {}", line);
                }
            }
        }

        if let Some(hint) = Self::error_hint(error) {
            eprintln!("│");
            eprintln!("│ {}", hint);
        }

        eprintln!("└─────────────────────────────────────────────────────────┘");
    }

    fn error_hint(error: &PlayerError) -> Option<&'static str> {
        match error {
            PlayerError::Control(ControlError::NoActiveChannel) => {
                Some("Start a track with 'select <n>' or 'play <path>'")
            }
            PlayerError::Library(LibraryError::InvalidIndex { .. }) => {
                Some("Use 'list' to see the song numbers")
            }
            PlayerError::Config(_) => Some("Configuration will use default values"),
            _ => None,
        }
    }

    /// Display a simple error message for non-interactive contexts
    pub fn display_simple_error(error: &PlayerError) {
        eprintln!("[{}] {}", error.severity().as_str(), error.user_message());

        if let Some(suggestion) = error.recovery_suggestions().first() {
            eprintln!("Suggestion: {}", suggestion);
        }
    }

    /// Wrap text to fit within specified width
    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + word.chars().count() < width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }

        lines
    }

    /// Format milliseconds as MM:SS, `--:--` when unknown
    pub fn format_ms(ms: Option<u32>) -> String {
        match ms {
            Some(ms) => Self::format_duration(Duration::from_millis(u64::from(ms))),
            None => "--:--".to_string(),
        }
    }

    /// Format duration as MM:SS or HH:MM:SS for longer tracks
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    /// Truncate string to fit display width
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len || max_len <= 3 {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        }
    }

    pub fn create_progress_bar(progress: f32, width: usize) -> String {
        let filled = ((progress.clamp(0.0, 1.0) * width as f32) as usize).min(width);
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }

    pub fn format_playback_state(state: PlaybackState) -> String {
        match state {
            PlaybackState::Playing => "▶ Playing".to_string(),
            PlaybackState::Paused => "⏸ Paused".to_string(),
            PlaybackState::Idle => "⏹ Idle".to_string(),
        }
    }
}
