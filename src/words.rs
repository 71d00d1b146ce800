use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::error::Error;

static WORDS_DIR: Dir = include_dir!("src/words");

/// The word pools a game can draw its target words from
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WordSet {
    /// Several hundred object names the classifier knows about
    #[default]
    General,
    /// A handful of words that suit a stock simulator photo album
    Demo,
}

impl WordSet {
    pub fn load(&self) -> WordList {
        // both files are embedded at compile time and covered by tests
        read_word_list(&format!("{self}.json")).unwrap_or_else(|e| {
            log::error!("{e}");
            WordList::empty(self.to_string())
        })
    }

    pub fn toggled(&self) -> Self {
        match self {
            WordSet::General => WordSet::Demo,
            WordSet::Demo => WordSet::General,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

impl WordList {
    pub fn empty(name: String) -> Self {
        Self {
            name,
            words: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Uniform draw over the whole list; repeats are allowed.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }
}

fn read_word_list(file_name: &str) -> Result<WordList, Box<dyn Error>> {
    let file = WORDS_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("word list {file_name} not found"))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| format!("word list {file_name} is not utf-8"))?;

    Ok(from_str(file_as_str)?)
}
