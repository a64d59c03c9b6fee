//! Core library for the `wxlookup` weather search widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its provider abstraction
//! - Input validation and UI state transitions (the controller)
//! - The voice search state machine
//! - Mapping weather conditions to display themes
//! - A session that runs the controller's effects on a tokio runtime
//!
//! Rendering is left to the binary through the [`Presenter`] trait.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod theme;
pub mod voice;

pub use config::{Config, VoiceConfig};
pub use controller::{Effect, Event, Key, UiState};
pub use error::LookupError;
pub use model::{SearchQuery, WeatherDisplay, WeatherResult};
pub use provider::{WeatherProvider, provider_from_config};
pub use session::{Presenter, Session};
pub use theme::Theme;
pub use voice::{
    RecognizerFactory, RecognizerOptions, SpeechRecognizer, VoiceError, VoiceEvent, VoiceSink,
};
