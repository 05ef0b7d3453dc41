use crate::clock::RaceClock;
use itertools::Itertools;
use std::time::Duration;
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RaceError {
    #[error("the race text must not be empty")]
    EmptyText,
    #[error("elapsed seconds must be finite and greater than 0, got {0}")]
    InvalidSeconds(f64),
    #[error("the race has not started")]
    NotStarted,
    #[error("the race is already running")]
    AlreadyRunning,
    #[error("the race is already over")]
    AlreadyOver,
    #[error("no more words can be matched, the race is over")]
    RaceOver,
    #[error("no race has been set up")]
    NoRace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceState {
    Created,
    Running,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum OverReason {
    #[strum(serialize = "time is up")]
    TimeUp,
    #[strum(serialize = "text completed")]
    Completed,
}

/// Transitions reported back to whoever drives the race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceEvent {
    Started,
    Over(OverReason),
}

/// Splits a text into words, each one keeping the whitespace character that follows it.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_inclusive(char::is_whitespace)
        .map(str::to_owned)
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Player {
    typed_words: Vec<String>,
    typing_text: String,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed_words(&self) -> &[String] {
        &self.typed_words
    }

    pub fn typing_text(&self) -> &str {
        &self.typing_text
    }

    /// Index of the word the player is currently typing.
    pub fn typing_index(&self) -> usize {
        self.typed_words.len()
    }

    pub fn text_matches(&self, word: &str) -> bool {
        self.typing_text == word
    }
}

/// A single-passage typing race
#[derive(Debug)]
pub struct Race {
    text: String,
    words: Vec<String>,
    // only the local player is ever populated
    players: Vec<Player>,
    state: RaceState,
    over_reason: Option<OverReason>,
    clock: Option<RaceClock>,
    // time on the clock when the race ended
    final_elapsed: Option<Duration>,
}

impl Race {
    pub fn new(text: impl Into<String>) -> Result<Self, RaceError> {
        let text = text.into();
        if text.is_empty() {
            return Err(RaceError::EmptyText);
        }

        let words = split_words(&text);
        Ok(Self {
            text,
            words,
            players: vec![Player::new()],
            state: RaceState::Created,
            over_reason: None,
            clock: None,
            final_elapsed: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[0]
    }

    fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[0]
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RaceState::Running
    }

    pub fn is_over(&self) -> bool {
        self.state == RaceState::Over
    }

    pub fn over_reason(&self) -> Option<OverReason> {
        self.over_reason
    }

    pub fn clock(&self) -> Option<&RaceClock> {
        self.clock.as_ref()
    }

    /// Race time so far, capped at the limit. Frozen once the race is over.
    pub fn elapsed(&self) -> Option<Duration> {
        if self.is_over() {
            return self.final_elapsed;
        }
        self.clock.map(|c| c.elapsed().min(c.limit()))
    }

    pub fn elapsed_secs(&self) -> Option<f64> {
        self.elapsed().map(|d| d.as_secs_f64())
    }

    /// The word the current player has to type next, if any is left.
    pub fn current_word(&self) -> Option<&str> {
        self.words
            .get(self.current_player().typing_index())
            .map(String::as_str)
    }

    pub fn start(&mut self) -> Result<RaceEvent, RaceError> {
        match self.state {
            RaceState::Running => return Err(RaceError::AlreadyRunning),
            RaceState::Over => return Err(RaceError::AlreadyOver),
            RaceState::Created => {}
        }

        self.state = RaceState::Running;
        self.clock = Some(RaceClock::start_now());
        info!("race started with {} words", self.words.len());

        Ok(RaceEvent::Started)
    }

    /// Ends the race. Ending a race that is already over does nothing.
    pub fn end(&mut self, reason: OverReason) -> Option<RaceEvent> {
        if self.is_over() {
            return None;
        }

        self.final_elapsed = self.elapsed();
        self.state = RaceState::Over;
        self.over_reason = Some(reason);
        info!(
            "race over ({reason}) after {} of {} words",
            self.current_player().typing_index(),
            self.words.len()
        );

        Some(RaceEvent::Over(reason))
    }

    /// Sets the seconds elapsed since the start, ending the race once they reach the limit.
    pub fn set_time(&mut self, seconds: f64) -> Result<Option<RaceEvent>, RaceError> {
        let clock = self.clock.ok_or(RaceError::NotStarted)?;

        if clock.passes_end_time(seconds)? {
            let event = self.end(OverReason::TimeUp);
            if event.is_some() {
                self.final_elapsed = Some(clock.limit());
            }
            return Ok(event);
        }

        Ok(None)
    }

    pub fn set_typing_text(&mut self, text: impl Into<String>) {
        self.current_player_mut().typing_text = text.into();
    }

    /// The words still to be typed, the current one included.
    pub fn remaining_text(&self) -> String {
        self.words[self.current_player().typing_index()..]
            .iter()
            .join("")
    }

    /// Splits the typing text into the prefix matching the current word and the rest.
    pub fn matched_typing_chars(&self) -> (String, String) {
        let typing_text = self.current_player().typing_text();
        let word = self.current_word().unwrap_or("");

        let matched_len = typing_text
            .chars()
            .zip(word.chars())
            .take_while(|(typed, expected)| typed == expected)
            .count();

        let split_at = typing_text
            .char_indices()
            .nth(matched_len)
            .map_or(typing_text.len(), |(idx, _)| idx);

        let (matched, unmatched) = typing_text.split_at(split_at);
        (matched.to_owned(), unmatched.to_owned())
    }

    /// Compares the typing text against the current word, moving it to the typed
    /// words on an exact match.
    pub fn match_word(&mut self) -> Result<(bool, Option<RaceEvent>), RaceError> {
        if self.is_over() {
            return Err(RaceError::RaceOver);
        }

        let Some(word) = self.current_word().map(str::to_owned) else {
            return Ok((false, None));
        };

        if !self.current_player().text_matches(&word) {
            return Ok((false, None));
        }

        debug!("matched word {word:?}");
        let player = self.current_player_mut();
        player.typing_text.clear();
        player.typed_words.push(word);

        let event = if self.current_word().is_none() {
            self.end(OverReason::Completed)
        } else {
            None
        };

        Ok((true, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn race(text: &str) -> Race {
        Race::new(text).unwrap()
    }

    #[test]
    fn test_split_words_keeps_trailing_space() {
        assert_eq!(split_words("This is a test."), vec!["This ", "is ", "a ", "test."]);
    }

    #[test]
    fn test_split_words_longer_text() {
        let text = "A man who doesn't spend time with his family can never be a real man.";
        let words = split_words(text);

        assert_eq!(words.len(), 15);
        assert_eq!(words[3], "doesn't ");
        assert_eq!(words.last().unwrap(), "man.");
        assert_eq!(words.concat(), text);
    }

    #[test]
    fn test_split_words_double_space() {
        assert_eq!(split_words("a  b"), vec!["a ", " ", "b"]);
    }

    #[test]
    fn test_split_words_other_whitespace() {
        assert_eq!(split_words("one\ntwo\tthree"), vec!["one\n", "two\t", "three"]);
    }

    #[test]
    fn test_player_typing_index() {
        let mut player = Player::new();
        player.typed_words = vec!["typed ".into(), "words ".into(), "to ".into(), "test ".into()];

        assert_eq!(player.typing_index(), 4);
    }

    #[test]
    fn test_player_text_matches() {
        let mut player = Player::new();
        player.typing_text = "asdffds".into();
        assert!(!player.text_matches("word "));

        player.typing_text = "word ".into();
        assert!(player.text_matches("word "));
    }

    #[test]
    fn test_new_player_is_empty() {
        let player = Player::new();
        assert!(player.typed_words().is_empty());
        assert_eq!(player.typing_text(), "");
    }

    #[test]
    fn test_new_rejects_empty_text() {
        assert_matches!(Race::new(""), Err(RaceError::EmptyText));
    }

    #[test]
    fn test_new_race_defaults() {
        let text = "Never hate your enemies. It affects your judgment.";
        let race = race(text);

        assert_eq!(race.text(), text);
        assert_eq!(race.words().len(), 8);
        assert_eq!(race.words()[3], "enemies. ");
        assert_eq!(race.players(), &[Player::new()]);
        assert_eq!(race.current_player(), &Player::new());
        assert_eq!(race.state(), RaceState::Created);
        assert!(!race.is_running());
        assert!(!race.is_over());
        assert!(race.clock().is_none());
    }

    #[test]
    fn test_set_typing_text() {
        let mut race = race("This is a test text.");
        race.set_typing_text("Test");

        assert_eq!(race.current_player().typing_text(), "Test");
    }

    #[test]
    fn test_match_word_rejects_wrong_text() {
        let mut race = race("This is a test text.");
        race.set_typing_text("asdf");

        assert_eq!(race.match_word().unwrap(), (false, None));
        assert_eq!(race.current_player().typing_text(), "asdf");
    }

    #[test]
    fn test_match_word_needs_trailing_space() {
        let mut race = race("This is a test text.");
        race.set_typing_text("This");

        assert_eq!(race.match_word().unwrap(), (false, None));
    }

    #[test]
    fn test_match_word_moves_word_to_typed() {
        let mut race = race("This is a test text.");
        race.set_typing_text("This ");

        assert_eq!(race.match_word().unwrap(), (true, None));
        assert_eq!(race.current_player().typing_text(), "");
        assert_eq!(race.current_player().typed_words(), &["This ".to_string()]);
        assert_eq!(race.remaining_text(), "is a test text.");
        assert_eq!(race.current_word(), Some("is "));
    }

    #[test]
    fn test_matched_typing_chars_empty_input() {
        let race = race("testing text.");
        assert_eq!(race.matched_typing_chars(), (String::new(), String::new()));
    }

    #[test]
    fn test_matched_typing_chars_prefix() {
        let mut race = race("testing text.");
        race.set_typing_text("tes");

        assert_eq!(race.matched_typing_chars(), ("tes".into(), String::new()));
    }

    #[test]
    fn test_matched_typing_chars_mismatch() {
        let mut race = race("testing text.");
        race.set_typing_text("asdf");
        assert_eq!(race.matched_typing_chars(), (String::new(), "asdf".into()));

        race.set_typing_text("tex");
        assert_eq!(race.matched_typing_chars(), ("te".into(), "x".into()));
    }

    #[test]
    fn test_matched_typing_chars_past_word_end() {
        let mut race = race("testing text.");
        race.set_typing_text("testing te");

        assert_eq!(race.matched_typing_chars(), ("testing ".into(), "te".into()));
    }

    #[test]
    fn test_matched_typing_chars_multibyte() {
        let mut race = race("café olé");
        race.set_typing_text("cafe");

        assert_eq!(race.matched_typing_chars(), ("caf".into(), "e".into()));

        race.set_typing_text("café");
        assert_eq!(race.matched_typing_chars(), ("café".into(), String::new()));
    }

    #[test]
    fn test_start_runs_race() {
        let mut race = race("test");

        assert_eq!(race.start().unwrap(), RaceEvent::Started);
        assert!(race.is_running());
        assert!(!race.is_over());
        assert!(race.clock().is_some());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut race = race("test");
        race.start().unwrap();

        assert_matches!(race.start(), Err(RaceError::AlreadyRunning));
    }

    #[test]
    fn test_set_time_before_start_fails() {
        let mut race = race("test");
        assert_matches!(race.set_time(12.0), Err(RaceError::NotStarted));
    }

    #[test]
    fn test_set_time_within_limit() {
        let mut race = race("test");
        race.start().unwrap();

        assert_eq!(race.set_time(12.0).unwrap(), None);
        assert!(race.is_running());
        assert!(!race.is_over());
    }

    #[test]
    fn test_set_time_past_limit_ends_race() {
        let mut race = race("test");
        race.start().unwrap();

        assert_eq!(
            race.set_time(82.0).unwrap(),
            Some(RaceEvent::Over(OverReason::TimeUp))
        );
        assert!(!race.is_running());
        assert!(race.is_over());
        assert_eq!(race.over_reason(), Some(OverReason::TimeUp));
    }

    #[test]
    fn test_set_time_at_limit_ends_race_mid_word() {
        let mut race = race("test game");
        race.start().unwrap();
        race.set_typing_text("tes");

        assert_eq!(
            race.set_time(60.0).unwrap(),
            Some(RaceEvent::Over(OverReason::TimeUp))
        );
        assert!(race.is_over());
        assert_eq!(race.current_player().typing_text(), "tes");
    }

    #[test]
    fn test_set_time_rejects_invalid_seconds() {
        let mut race = race("test");
        race.start().unwrap();

        assert_matches!(race.set_time(0.0), Err(RaceError::InvalidSeconds(_)));
        assert_matches!(race.set_time(-3.0), Err(RaceError::InvalidSeconds(_)));
        assert!(race.is_running());
    }

    #[test]
    fn test_no_transitions_after_over() {
        let mut race = race("test");
        race.start().unwrap();
        race.set_time(61.0).unwrap();

        assert_eq!(race.set_time(120.0).unwrap(), None);
        assert_matches!(race.start(), Err(RaceError::AlreadyOver));
        assert_eq!(race.end(OverReason::Completed), None);
        race.set_typing_text("test");
        assert_matches!(race.match_word(), Err(RaceError::RaceOver));
        assert_eq!(race.state(), RaceState::Over);
    }

    #[test]
    fn test_completing_text_ends_race_early() {
        let mut race = race("test game ending");
        race.start().unwrap();

        race.set_typing_text("test ");
        assert_eq!(race.match_word().unwrap(), (true, None));
        race.set_typing_text("game ");
        assert_eq!(race.match_word().unwrap(), (true, None));
        race.set_typing_text("ending");
        assert_eq!(
            race.match_word().unwrap(),
            (true, Some(RaceEvent::Over(OverReason::Completed)))
        );

        assert!(race.is_over());
        assert!(!race.is_running());
        assert_eq!(race.over_reason(), Some(OverReason::Completed));
        assert_eq!(race.current_player().typed_words().len(), 3);
        assert_eq!(race.remaining_text(), "");
        assert_eq!(race.current_word(), None);
    }

    #[test]
    fn test_matched_typing_chars_without_current_word() {
        let mut race = race("done");
        race.set_typing_text("done");
        race.match_word().unwrap();
        race.set_typing_text("xy");

        assert_eq!(race.matched_typing_chars(), (String::new(), "xy".into()));
    }

    #[test]
    fn test_elapsed_frozen_after_completion() {
        let mut race = race("hello");
        race.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        race.set_typing_text("hello");
        race.match_word().unwrap();

        let at_finish = race.elapsed().unwrap();
        assert!(at_finish >= Duration::from_millis(20));

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(race.elapsed(), Some(at_finish));
        assert_eq!(race.elapsed_secs(), Some(at_finish.as_secs_f64()));
    }

    #[test]
    fn test_time_up_records_full_limit() {
        let mut race = race("slow");
        race.start().unwrap();
        race.set_time(75.0).unwrap();

        assert_eq!(race.elapsed(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_elapsed_before_start() {
        assert_eq!(race("idle").elapsed(), None);
    }

    #[test]
    fn test_over_reason_display() {
        assert_eq!(OverReason::TimeUp.to_string(), "time is up");
        assert_eq!(OverReason::Completed.to_string(), "text completed");
    }
}
