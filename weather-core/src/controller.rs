//! Input handling and UI state transitions.
//!
//! [`Controller::handle`] is synchronous and performs no I/O. It mutates
//! [`UiState`] and returns the [`Effect`]s the session must carry out.

use std::time::{Duration, Instant};

use crate::{
    error::LookupError,
    model::{SearchQuery, WeatherResult},
    theme::Theme,
    voice::{VoiceEvent, VoiceMachine},
};

/// Everything the widget shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub query: String,
    pub result: Option<WeatherResult>,
    pub theme: Option<Theme>,
    pub is_loading: bool,
    pub is_listening: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Page load. Fetches the default city.
    Started,
    /// Text typed into the search box. Not redrawn; the box already shows it.
    QueryChanged(String),
    /// Search button.
    SubmitClicked,
    KeyDown(Key),
    /// Microphone button, pressed at the given instant.
    VoiceRequested(Instant),
    Voice(VoiceEvent),
    FetchCompleted {
        seq: u64,
        outcome: Result<WeatherResult, LookupError>,
    },
    Tick(Instant),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { seq: u64, query: SearchQuery },
    StartListening,
    Alert(String),
    Unavailable(String),
    ApplyTheme(Theme),
    Render,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub default_city: SearchQuery,
    /// `false` blocks every search with a configuration alert.
    pub has_api_key: bool,
    pub listen_timeout: Duration,
}

#[derive(Debug)]
pub struct Controller {
    state: UiState,
    voice: VoiceMachine,
    options: ControllerOptions,
    /// Sequence number of the most recently issued request.
    latest_seq: u64,
}

impl Controller {
    pub fn new(options: ControllerOptions) -> Self {
        Self {
            state: UiState::default(),
            voice: VoiceMachine::new(options.listen_timeout),
            options,
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn voice(&self) -> &VoiceMachine {
        &self.voice
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::Started => {
                let city = self.options.default_city.clone();
                self.fetch(city, &mut effects);
            }
            Event::QueryChanged(text) => {
                self.state.query = text;
                return effects;
            }
            Event::SubmitClicked | Event::KeyDown(Key::Enter) => {
                let text = self.state.query.clone();
                self.submit(&text, &mut effects);
            }
            Event::KeyDown(Key::Other) => return effects,
            Event::VoiceRequested(now) => {
                if self.voice.request(now) {
                    effects.push(Effect::StartListening);
                }
            }
            Event::Voice(voice_event) => {
                let transcript = self.voice.on_event(voice_event);
                self.sync_listening();
                if let Some(text) = transcript {
                    self.submit(&text, &mut effects);
                }
            }
            Event::FetchCompleted { seq, outcome } => self.complete(seq, outcome, &mut effects),
            Event::Tick(now) => {
                if !self.voice.expire(now) {
                    return effects;
                }
            }
        }

        self.sync_listening();
        effects.push(Effect::Render);
        effects
    }

    /// Shared path for the search button, the Enter key and voice transcripts.
    fn submit(&mut self, text: &str, effects: &mut Vec<Effect>) {
        match SearchQuery::parse(text) {
            Ok(query) => self.fetch(query, effects),
            Err(err) => {
                tracing::debug!(input = %text, "rejected search input");
                effects.push(Effect::Alert(err.alert_text()));
                self.state.query.clear();
            }
        }
    }

    fn fetch(&mut self, query: SearchQuery, effects: &mut Vec<Effect>) {
        if !self.options.has_api_key {
            effects.push(Effect::Alert(LookupError::MissingApiKey.alert_text()));
            return;
        }

        self.latest_seq += 1;
        self.state.is_loading = true;
        tracing::info!(seq = self.latest_seq, city = %query, "issuing weather lookup");
        effects.push(Effect::Fetch { seq: self.latest_seq, query });
    }

    fn complete(
        &mut self,
        seq: u64,
        outcome: Result<WeatherResult, LookupError>,
        effects: &mut Vec<Effect>,
    ) {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "discarding stale weather response");
            return;
        }

        self.state.is_loading = false;

        match outcome {
            Ok(result) => {
                let theme = result.condition().map(Theme::from_condition).unwrap_or_default();
                self.state.result = Some(result);
                self.state.theme = Some(theme);
                self.state.query.clear();
                effects.push(Effect::ApplyTheme(theme));
            }
            Err(LookupError::Unavailable(reason)) => {
                effects.push(Effect::Unavailable(reason));
            }
            Err(err) => {
                effects.push(Effect::Alert(err.alert_text()));
                self.state.query.clear();
            }
        }
    }

    fn sync_listening(&mut self) {
        self.state.is_listening = self.voice.is_listening();
    }
}
