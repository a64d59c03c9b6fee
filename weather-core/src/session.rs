//! Event loop glue between the controller, the weather provider, the speech
//! recognizer and whatever draws the widget.

use anyhow::Context;
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::Instant as TokioInstant};

use crate::{
    Config,
    controller::{Controller, ControllerOptions, Effect, Event, UiState},
    error::LookupError,
    model::SearchQuery,
    provider::WeatherProvider,
    theme::Theme,
    voice::{RecognizerFactory, RecognizerOptions, SpeechRecognizer, VoiceEvent, VoiceSink},
};

const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// The presentation boundary. Receives display state, never produces it.
pub trait Presenter {
    fn alert(&mut self, message: &str);
    fn unavailable(&mut self, reason: &str);
    /// Replace the root theme with `theme`. Called on every successful lookup.
    fn apply_theme(&mut self, theme: Theme);
    fn render(&mut self, state: &UiState);
}

enum RecognizerSlot {
    Pending(RecognizerFactory),
    Ready(Box<dyn SpeechRecognizer>),
    Absent,
}

pub struct Session<P> {
    controller: Controller,
    provider: Option<Arc<dyn WeatherProvider>>,
    recognizer: RecognizerSlot,
    recognizer_options: RecognizerOptions,
    presenter: P,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl<P: Presenter> Session<P> {
    /// `provider` is `None` when no API key is configured; every search then
    /// ends in an alert. `recognizer` is `None` when the platform has no
    /// speech-to-text support.
    pub fn new(
        config: &Config,
        provider: Option<Arc<dyn WeatherProvider>>,
        recognizer: Option<RecognizerFactory>,
        presenter: P,
    ) -> anyhow::Result<Self> {
        let default_city = SearchQuery::parse(&config.default_city)
            .with_context(|| format!("Invalid default city '{}'", config.default_city))?;

        let controller = Controller::new(ControllerOptions {
            default_city,
            has_api_key: provider.is_some(),
            listen_timeout: config.voice.listen_timeout(),
        });

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            controller,
            provider,
            recognizer: recognizer.map_or(RecognizerSlot::Absent, RecognizerSlot::Pending),
            recognizer_options: RecognizerOptions::final_only(config.voice.locale.as_str()),
            presenter,
            tx,
            rx,
        })
    }

    pub fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// A lookup or a listening session is still open.
    pub fn is_busy(&self) -> bool {
        let state = self.controller.state();
        state.is_loading || state.is_listening
    }

    /// Run one event through the controller and carry out the resulting
    /// effects. Events produced synchronously by those effects are handled
    /// before returning.
    pub fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            for effect in self.controller.handle(event) {
                match effect {
                    Effect::Fetch { seq, query } => {
                        if let Some(event) = self.spawn_fetch(seq, query) {
                            queue.push_back(event);
                        }
                    }
                    Effect::StartListening => {
                        if let Some(voice_event) = self.start_listening() {
                            queue.push_back(Event::Voice(voice_event));
                        }
                    }
                    Effect::Alert(message) => self.presenter.alert(&message),
                    Effect::Unavailable(reason) => self.presenter.unavailable(&reason),
                    Effect::ApplyTheme(theme) => self.presenter.apply_theme(theme),
                    Effect::Render => self.presenter.render(self.controller.state()),
                }
            }
        }
    }

    /// Wait for the next event from a background task.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Process background events until no lookup is loading and no
    /// listening session is open.
    pub async fn settle(&mut self) {
        let start = TokioInstant::now() + TICK_INTERVAL;
        let mut ticker = tokio::time::interval_at(start, TICK_INTERVAL);

        while self.is_busy() {
            tokio::select! {
                Some(event) = self.rx.recv() => self.dispatch(event),
                _ = ticker.tick() => self.dispatch(Event::Tick(std::time::Instant::now())),
            }
        }
    }

    fn spawn_fetch(&self, seq: u64, query: SearchQuery) -> Option<Event> {
        let Some(provider) = self.provider.clone() else {
            return Some(Event::FetchCompleted {
                seq,
                outcome: Err(LookupError::MissingApiKey),
            });
        };

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = provider.current_weather(&query).await;
            if tx.send(Event::FetchCompleted { seq, outcome }).is_err() {
                tracing::debug!(seq, "session closed before weather response arrived");
            }
        });

        None
    }

    /// Build the recognizer on first use and start it. Returns an event to
    /// feed back when starting is impossible.
    fn start_listening(&mut self) -> Option<VoiceEvent> {
        let slot = std::mem::replace(&mut self.recognizer, RecognizerSlot::Absent);

        let mut recognizer = match slot {
            RecognizerSlot::Ready(recognizer) => recognizer,
            RecognizerSlot::Pending(factory) => match factory(&self.recognizer_options) {
                Some(recognizer) => {
                    let locale = &self.recognizer_options.locale;
                    tracing::debug!(%locale, "speech recognizer ready");
                    recognizer
                }
                None => return Some(VoiceEvent::Unsupported),
            },
            RecognizerSlot::Absent => return Some(VoiceEvent::Unsupported),
        };

        let started = recognizer.start(VoiceSink::new(self.tx.clone()));
        self.recognizer = RecognizerSlot::Ready(recognizer);

        started.err().map(|e| VoiceEvent::Error(e.to_string()))
    }
}
