use crate::race::Race;

/// Standard length of a "word" when computing words per minute.
const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaceSummary {
    pub words_typed: usize,
    pub total_words: usize,
    pub chars_typed: usize,
    pub elapsed_secs: f64,
    pub wpm: f64,
    pub progress: f64,
}

impl RaceSummary {
    pub fn new(race: &Race, elapsed_secs: f64) -> Self {
        let typed_words = race.current_player().typed_words();
        let chars_typed = typed_words.iter().map(|w| w.chars().count()).sum::<usize>();
        let total_chars = race.text().chars().count();

        let wpm = if elapsed_secs > 0.0 {
            ((chars_typed as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)).floor()
        } else {
            0.0
        };

        Self {
            words_typed: typed_words.len(),
            total_words: race.words().len(),
            chars_typed,
            elapsed_secs,
            wpm,
            progress: (chars_typed as f64 / total_chars as f64 * 100.0).round(),
        }
    }

    /// Summary using the race's own elapsed time, which stops when the race ends.
    pub fn from_race(race: &Race) -> Self {
        Self::new(race, race.elapsed_secs().unwrap_or(0.0))
    }
}
