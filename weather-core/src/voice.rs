//! Voice search: a small state machine around a platform speech recognizer.
//!
//! The machine only tracks whether a listening session is open. Starting the
//! actual recognizer is the session's job; recognizers report back through a
//! [`VoiceSink`] and every terminal event (transcript, no speech, error,
//! timeout) returns the machine to idle.

use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::controller::Event;

/// Settings handed to the recognizer when it is first constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOptions {
    pub locale: String,
    /// Always `false`: only final transcripts reach the voice machine.
    pub interim_results: bool,
}

impl RecognizerOptions {
    pub fn final_only(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            interim_results: false,
        }
    }
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self::final_only("en-US")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// Final result; alternatives in recognizer confidence order.
    Transcript(Vec<String>),
    /// The session ended without usable speech.
    NoSpeech,
    Error(String),
    Timeout,
    /// The platform has no recognizer. Sent once, on first use.
    Unsupported,
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("speech recognizer is already listening")]
    Busy,
    #[error("failed to start speech recognizer: {0}")]
    Start(String),
}

/// A platform speech-to-text capability.
pub trait SpeechRecognizer: Send + std::fmt::Debug {
    /// Begin one listening session. Exactly one terminal [`VoiceEvent`] is
    /// expected on `sink` per successful call.
    fn start(&mut self, sink: VoiceSink) -> Result<(), VoiceError>;
}

/// Builds the recognizer on first use. `None` means the capability is absent.
pub type RecognizerFactory =
    Box<dyn FnOnce(&RecognizerOptions) -> Option<Box<dyn SpeechRecognizer>> + Send>;

/// Where recognizers deliver their events.
#[derive(Debug, Clone)]
pub struct VoiceSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl VoiceSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Returns `false` once the session has gone away.
    pub fn send(&self, event: VoiceEvent) -> bool {
        self.tx.send(Event::Voice(event)).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Uninitialized,
    Unsupported,
    Idle,
    Listening { since: Instant },
}

#[derive(Debug, Clone)]
pub struct VoiceMachine {
    state: VoiceState,
    listen_timeout: Duration,
}

impl VoiceMachine {
    pub fn new(listen_timeout: Duration) -> Self {
        Self {
            state: VoiceState::Uninitialized,
            listen_timeout,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, VoiceState::Listening { .. })
    }

    /// User asked for voice search. Returns `true` when the recognizer should
    /// be started.
    pub fn request(&mut self, now: Instant) -> bool {
        match self.state {
            VoiceState::Uninitialized | VoiceState::Idle => {
                self.state = VoiceState::Listening { since: now };
                true
            }
            VoiceState::Listening { .. } => {
                tracing::debug!("voice search already listening");
                false
            }
            VoiceState::Unsupported => false,
        }
    }

    /// Feed a recognizer event. Returns the trimmed transcript to submit, if any.
    pub fn on_event(&mut self, event: VoiceEvent) -> Option<String> {
        if event == VoiceEvent::Unsupported {
            tracing::debug!("speech recognition not available on this platform");
            self.state = VoiceState::Unsupported;
            return None;
        }

        if !self.is_listening() {
            tracing::debug!(?event, "voice event outside a listening session dropped");
            return None;
        }

        self.state = VoiceState::Idle;

        match event {
            VoiceEvent::Transcript(alternatives) => match alternatives.into_iter().next() {
                Some(first) => Some(first.trim().to_string()),
                None => {
                    tracing::debug!("recognizer returned no alternatives");
                    None
                }
            },
            VoiceEvent::NoSpeech => None,
            VoiceEvent::Error(reason) => {
                tracing::warn!(%reason, "speech recognition failed");
                None
            }
            VoiceEvent::Timeout => {
                tracing::debug!("recognizer timed out");
                None
            }
            VoiceEvent::Unsupported => None,
        }
    }

    /// Close a listening session that outlived the timeout. Returns `true` if
    /// the state changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            VoiceState::Listening { since }
                if now.saturating_duration_since(since) >= self.listen_timeout =>
            {
                tracing::debug!("listening session expired");
                self.state = VoiceState::Idle;
                true
            }
            _ => false,
        }
    }
}
