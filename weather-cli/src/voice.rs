//! Speech-to-text through an external dictation program.
//!
//! The program is started once per listening session. It receives the locale
//! in `WXLOOKUP_LOCALE` and should print the final transcript, one alternative
//! per line, then exit.

use std::{
    process::Stdio,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::process::Command;
use wxlookup_core::{
    RecognizerFactory, RecognizerOptions, SpeechRecognizer, VoiceError, VoiceEvent, VoiceSink,
};

#[derive(Debug)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    options: RecognizerOptions,
    timeout: Duration,
    active: Arc<AtomicBool>,
}

impl CommandRecognizer {
    /// `None` when no command is configured, i.e. voice search is unavailable.
    pub fn factory(command: Option<Vec<String>>, timeout: Duration) -> Option<RecognizerFactory> {
        let command = command.filter(|c| !c.is_empty())?;

        Some(Box::new(move |options: &RecognizerOptions| {
            let recognizer = Self::new(command, options.clone(), timeout)?;
            Some(Box::new(recognizer) as Box<dyn SpeechRecognizer>)
        }))
    }

    fn new(command: Vec<String>, options: RecognizerOptions, timeout: Duration) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            options,
            timeout,
            active: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&mut self, sink: VoiceSink) -> Result<(), VoiceError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(VoiceError::Busy);
        }

        let interim = if self.options.interim_results { "1" } else { "0" };
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .env("WXLOOKUP_LOCALE", &self.options.locale)
            .env("WXLOOKUP_INTERIM_RESULTS", interim)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                return Err(VoiceError::Start(format!("{}: {e}", self.program)));
            }
        };

        tracing::debug!(program = %self.program, "dictation started");

        let active = self.active.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            // On timeout the child is dropped, which kills it.
            let event = match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Err(_) => VoiceEvent::Timeout,
                Ok(Err(e)) => VoiceEvent::Error(e.to_string()),
                Ok(Ok(output)) if !output.status.success() => {
                    VoiceEvent::Error(format!("dictation command exited with {}", output.status))
                }
                Ok(Ok(output)) => transcript_event(&String::from_utf8_lossy(&output.stdout)),
            };

            active.store(false, Ordering::SeqCst);
            sink.send(event);
        });

        Ok(())
    }
}

fn transcript_event(stdout: &str) -> VoiceEvent {
    let alternatives: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if alternatives.is_empty() {
        VoiceEvent::NoSpeech
    } else {
        VoiceEvent::Transcript(alternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use wxlookup_core::Event;

    #[test]
    fn no_command_means_no_capability() {
        assert!(CommandRecognizer::factory(None, Duration::from_secs(1)).is_none());
        assert!(CommandRecognizer::factory(Some(vec![]), Duration::from_secs(1)).is_none());
    }

    #[test]
    fn stdout_lines_become_alternatives() {
        assert_eq!(
            transcript_event(" paris \nparish\n\n"),
            VoiceEvent::Transcript(vec!["paris".into(), "parish".into()])
        );
        assert_eq!(transcript_event("  \n"), VoiceEvent::NoSpeech);
    }

    #[cfg(unix)]
    async fn run(command: &[&str], timeout: Duration) -> Event {
        let factory = CommandRecognizer::factory(
            Some(command.iter().map(|s| s.to_string()).collect()),
            timeout,
        )
        .expect("configured");
        let mut recognizer = factory(&RecognizerOptions::default()).expect("recognizer");

        let (tx, mut rx) = mpsc::unbounded_channel();
        recognizer.start(VoiceSink::new(tx)).expect("started");
        rx.recv().await.expect("event")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_output_is_delivered() {
        let event = run(&["sh", "-c", "echo \" paris \""], Duration::from_secs(5)).await;
        assert_eq!(event, Event::Voice(VoiceEvent::Transcript(vec!["paris".into()])));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn locale_is_passed_through_env() {
        let event = run(&["sh", "-c", "echo \"$WXLOOKUP_LOCALE\""], Duration::from_secs(5)).await;
        assert_eq!(event, Event::Voice(VoiceEvent::Transcript(vec!["en-US".into()])));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_error() {
        let event = run(&["sh", "-c", "exit 3"], Duration::from_secs(5)).await;
        assert!(matches!(event, Event::Voice(VoiceEvent::Error(_))), "{event:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let event = run(&["sleep", "5"], Duration::from_millis(100)).await;
        assert_eq!(event, Event::Voice(VoiceEvent::Timeout));
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let factory = CommandRecognizer::factory(
            Some(vec!["wxlookup-no-such-dictation-binary".into()]),
            Duration::from_secs(1),
        )
        .expect("configured");
        let mut recognizer = factory(&RecognizerOptions::default()).expect("recognizer");

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = recognizer.start(VoiceSink::new(tx)).unwrap_err();
        assert!(matches!(err, VoiceError::Start(_)), "{err:?}");
    }
}
