use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cli::{Action, CliApp, Setting, StatusDisplay};
use crate::command::{Command, Dispatcher, Outcome};
use crate::config::{ConfigManager, PlayerConfig};
use crate::controller::{ErrorPolicy, PlayerContext};
use crate::engine::AudioEngine;
use crate::error::{ConfigError, PlayerError};
use crate::library::TrackList;
use crate::models::PlayerStatus;

/// Interval of the position/end-of-track poll
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

const HISTORY_LINES: usize = 20;

/// Whether the interactive loop keeps going after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Main application controller that coordinates all components
pub struct AppController<E: AudioEngine> {
    dispatcher: Dispatcher<E>,
    config: PlayerConfig,
    config_manager: Option<ConfigManager>,
    awaiting_exit_confirmation: bool,
}

impl<E: AudioEngine> AppController<E> {
    /// Build the player context on `engine`. `policy` overrides the configured one.
    pub fn new(engine: E, config: PlayerConfig, policy: Option<ErrorPolicy>) -> Result<Self, PlayerError> {
        let policy = policy.unwrap_or(config.error_policy);
        let context = PlayerContext::new(engine, policy)?.with_event_capacity(config.event_history);
        let tracks = TrackList::new(config.media_extension.as_str());

        info!(
            "Application controller initialized (policy: {}, extension: {})",
            policy.as_str(),
            tracks.extension()
        );

        Ok(Self {
            dispatcher: Dispatcher::new(context, tracks),
            config,
            config_manager: None,
            awaiting_exit_confirmation: false,
        })
    }

    /// Persist settings changed from the prompt through `manager`
    pub fn with_config_manager(mut self, manager: ConfigManager) -> Self {
        self.config_manager = Some(manager);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher<E> {
        &self.dispatcher
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Execute a single command
    pub fn execute_command(&mut self, command: Command) -> Result<Outcome, PlayerError> {
        let outcome = self.dispatcher.dispatch(command)?;
        match &outcome {
            Outcome::TrackAdded { index } => {
                if let Ok(path) = self.dispatcher.tracks().select(*index) {
                    println!("Added #{}: {}", index + 1, TrackList::display_name(path));
                }
            }
            Outcome::Acknowledged { message, .. } => println!("{}", message),
            Outcome::Applied => {}
        }
        Ok(outcome)
    }

    /// Handle one line from the prompt
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();

        if self.awaiting_exit_confirmation {
            self.awaiting_exit_confirmation = false;
            if matches!(line.to_lowercase().as_str(), "y" | "yes") {
                return Flow::Exit;
            }
            println!("Exit cancelled.");
            return Flow::Continue;
        }

        if line.is_empty() {
            return Flow::Continue;
        }

        match CliApp::parse_command(line, self.config.seek_step_ms) {
            Ok(Action::Control(command)) => {
                if let Err(e) = self.execute_command(command) {
                    self.handle_error(&e);
                }
            }
            Ok(Action::List) => StatusDisplay::display_track_list(self.dispatcher.tracks()),
            Ok(Action::Status) => {
                let status = PlayerStatus::capture(self.dispatcher.context_mut());
                StatusDisplay::display_full_status(&status);
            }
            Ok(Action::Now) => {
                let status = PlayerStatus::capture(self.dispatcher.context_mut());
                StatusDisplay::display_compact_status(&status);
            }
            Ok(Action::Equalizer) => {
                let status = PlayerStatus::capture(self.dispatcher.context_mut());
                StatusDisplay::display_equalizer(&status);
            }
            Ok(Action::History) => {
                StatusDisplay::display_history(self.dispatcher.context().events(), HISTORY_LINES)
            }
            Ok(Action::SetPolicy(policy)) => self.set_policy(policy),
            Ok(Action::ShowConfig) => StatusDisplay::display_config(
                self.config(),
                self.config_manager.as_ref().map(ConfigManager::config_path),
            ),
            Ok(Action::Set(setting)) => self.apply_setting(setting),
            Ok(Action::ResetConfig) => self.reset_config(),
            Ok(Action::Help) => CliApp::display_help(),
            Ok(Action::About) => CliApp::display_about(),
            Ok(Action::Exit) => {
                if !self.config.confirm_exit {
                    return Flow::Exit;
                }
                println!("Are you sure? [y/N]");
                self.awaiting_exit_confirmation = true;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                println!("Type 'help' for available commands.");
            }
        }
        Flow::Continue
    }

    fn set_policy(&mut self, policy: ErrorPolicy) {
        self.dispatcher.context_mut().set_policy(policy);
        self.config.error_policy = policy;
        println!("Error policy: {}", policy.as_str());
        self.persist(|manager| manager.set_error_policy(policy));
    }

    fn apply_setting(&mut self, setting: Setting) {
        match setting {
            Setting::SeekStep(ms) => {
                self.config.seek_step_ms = ms;
                println!("Seek step: {} ms", ms);
                self.persist(|manager| manager.set_seek_step(ms));
            }
            Setting::MediaExtension(extension) => {
                self.dispatcher.tracks_mut().set_extension(&extension);
                println!("Accepting .{} files", self.dispatcher.tracks().extension());
                self.persist(|manager| manager.set_media_extension(&extension));
                self.config.media_extension = extension;
            }
            Setting::ConfirmExit(confirm) => {
                self.config.confirm_exit = confirm;
                println!("Confirm exit: {}", if confirm { "on" } else { "off" });
                self.persist(|manager| manager.update_config(|config| config.confirm_exit = confirm));
            }
        }
    }

    fn reset_config(&mut self) {
        self.config = PlayerConfig::default();
        self.dispatcher.context_mut().set_policy(self.config.error_policy);
        self.dispatcher
            .tracks_mut()
            .set_extension(&self.config.media_extension);
        println!("Settings restored to defaults");
        self.persist(ConfigManager::reset_to_defaults);
    }

    /// Save through the config manager; without one changes stay in memory
    fn persist<F>(&mut self, save: F)
    where
        F: FnOnce(&mut ConfigManager) -> Result<(), ConfigError>,
    {
        let result = match self.config_manager.as_mut() {
            Some(manager) => save(manager),
            None => return,
        };
        if let Err(e) = result {
            self.handle_error(&PlayerError::Config(e));
        }
    }

    /// Periodic poll; announces a track that ran to its end
    pub fn tick(&mut self) -> bool {
        let finished = self.dispatcher.tick();
        if finished {
            println!("\nTrack finished");
        }
        finished
    }

    /// Run the prompt until exit, end of input, or `shutdown` is raised
    pub async fn run_interactive_mode(
        &mut self,
        mut lines: UnboundedReceiver<String>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<(), PlayerError> {
        println!("Equalizer Player - Interactive Mode");
        println!("Type 'help' for available commands, 'exit' to quit.");

        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let mut awaiting_input = false;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            if !awaiting_input {
                print!("> ");
                let _ = std::io::Write::flush(&mut std::io::stdout());
                awaiting_input = true;
            }

            tokio::select! {
                biased;

                line = lines.recv() => {
                    awaiting_input = false;
                    match line {
                        Some(line) => {
                            if self.handle_line(&line) == Flow::Exit {
                                println!("Goodbye!");
                                break;
                            }
                        }
                        None => {
                            println!();
                            break;
                        }
                    }
                }

                _ = interval.tick() => {
                    if self.tick() {
                        awaiting_input = false;
                    }
                }
            }
        }

        Ok(())
    }

    /// Release the track and the effect rack, returning the engine
    pub fn shutdown(self) -> Result<E, PlayerError> {
        println!("Shutting down...");
        let engine = self.dispatcher.into_context().shutdown()?;
        info!("Player shut down cleanly");
        Ok(engine)
    }

    /// Log by severity and show the error with its suggestions
    pub fn handle_error(&self, error: &PlayerError) {
        log::log!(error.severity().log_level(), "{}", error);
        StatusDisplay::display_error(error);
    }
}
