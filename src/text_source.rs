use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

static PASSAGES_DIR: Dir = include_dir!("src/passages");

const QUOTES_FILE: &str = "quotes.json";

#[derive(Debug, Error)]
pub enum TextSourceError {
    #[error("passage file {0} not found")]
    MissingFile(String),
    #[error("passage file {0} is not valid utf-8")]
    NotUtf8(String),
    #[error("unable to parse passages: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("quote {index} does not exist, there are {count} quotes")]
    QuoteOutOfRange { index: usize, count: usize },
    #[error("no quotes available")]
    NoQuotes,
    #[error("at least one sentence is needed")]
    NoSentences,
}

#[derive(Deserialize, Clone, Debug)]
pub struct QuoteSet {
    pub name: String,
    pub quotes: Vec<String>,
}

impl QuoteSet {
    /// Loads the quote set embedded in the binary.
    pub fn bundled() -> Result<Self, TextSourceError> {
        let file = PASSAGES_DIR
            .get_file(QUOTES_FILE)
            .ok_or_else(|| TextSourceError::MissingFile(QUOTES_FILE.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| TextSourceError::NotUtf8(QUOTES_FILE.to_string()))?;

        Ok(serde_json::from_str(contents)?)
    }

    pub fn get(&self, index: usize) -> Result<&str, TextSourceError> {
        self.quotes
            .get(index)
            .map(String::as_str)
            .ok_or(TextSourceError::QuoteOutOfRange {
                index,
                count: self.quotes.len(),
            })
    }

    pub fn random(&self) -> Result<&str, TextSourceError> {
        self.quotes
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .ok_or(TextSourceError::NoQuotes)
    }
}

/// Where the race passage comes from
#[derive(Clone, Debug, PartialEq)]
pub enum TextSource {
    Custom(String),
    /// A bundled quote, random when no index is given.
    Quote(Option<usize>),
    Sentences(usize),
}

impl Default for TextSource {
    fn default() -> Self {
        Self::Quote(None)
    }
}

impl TextSource {
    pub fn generate(&self) -> Result<String, TextSourceError> {
        let text = match self {
            Self::Custom(text) => text.clone(),
            Self::Quote(Some(index)) => QuoteSet::bundled()?.get(*index)?.to_string(),
            Self::Quote(None) => QuoteSet::bundled()?.random()?.to_string(),
            Self::Sentences(count) => random_sentences(*count)?,
        };
        debug!("generated passage from {self:?}");
        Ok(text)
    }
}

fn random_sentences(count: usize) -> Result<String, TextSourceError> {
    if count == 0 {
        return Err(TextSourceError::NoSentences);
    }

    let rng = &mut rand::thread_rng();
    let text = (0..count)
        .map(|_| {
            cgisf(
                rng.gen_range(1..3),
                rng.gen_range(1..3),
                rng.gen_range(1..5),
                rng.gen_bool(0.5),
                rng.gen_range(1..3),
                rng.gen_bool(0.5),
            )
        })
        .collect::<String>();

    // each sentence ends with a space, the race text should not
    Ok(text.trim_end().to_string())
}
