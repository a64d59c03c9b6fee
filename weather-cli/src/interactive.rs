use std::{io::Write, time::Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use wxlookup_core::{Event, Key, Presenter, Session};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Search(String),
    Voice,
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":v" | ":voice" => Input::Voice,
            ":h" | ":help" => Input::Help,
            ":q" | ":quit" | ":exit" => Input::Quit,
            _ => Input::Search(line.to_string()),
        }
    }
}

pub const HELP: &str = "Type a city and press Enter to search. \
:voice starts voice search, :help shows this text, :quit exits.";

/// Drive the session from stdin until EOF or `:quit`.
pub async fn run<P: Presenter>(
    session: &mut Session<P>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(500));

    writeln!(out, "{HELP}")?;
    session.dispatch(Event::Started);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Quit => break,
                    Input::Help => writeln!(out, "{HELP}")?,
                    Input::Voice => session.dispatch(Event::VoiceRequested(Instant::now())),
                    Input::Search(text) => {
                        session.dispatch(Event::QueryChanged(text));
                        session.dispatch(Event::KeyDown(Key::Enter));
                    }
                }
            }
            Some(event) = session.next_event() => session.dispatch(event),
            _ = ticker.tick() => session.dispatch(Event::Tick(Instant::now())),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_recognised() {
        assert_eq!(Input::parse(":voice"), Input::Voice);
        assert_eq!(Input::parse(" :q "), Input::Quit);
        assert_eq!(Input::parse(":help"), Input::Help);
    }

    #[test]
    fn anything_else_is_a_search_kept_verbatim() {
        assert_eq!(Input::parse("  paris "), Input::Search("  paris ".into()));
        assert_eq!(Input::parse(""), Input::Search(String::new()));
        assert_eq!(Input::parse("42"), Input::Search("42".into()));
    }
}
