use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::Classifier;
use crate::matching::contains_word;
use crate::picker::Photo;
use crate::runtime::Countdown;
use crate::util::format_clock;

/// Length of a game when nothing else is configured
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 300;

/// Points awarded for every scoring match
pub const MATCH_POINTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    NotStarted,
    Running,
    Over,
}

/// When a true match evaluation is worth points
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScoringRule {
    /// Every new word or new prediction that matches scores, even if the
    /// previous pairing already matched
    #[default]
    EveryMatch,
    /// Only a change from "no match" to "match" scores
    NewMatchOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Game length; anything below one second is played as one second
    pub time_limit_secs: u32,
    pub scoring: ScoringRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            scoring: ScoringRule::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game is not running")]
    NotRunning,
    #[error("the word list is empty")]
    EmptyWordList,
}

/// Result of re-checking the prediction against the target word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: bool,
    pub awarded: u32,
}

/// One play-through of the game
pub struct GameSession {
    pub config: SessionConfig,
    score: u32,
    remaining_secs: u32,
    target_word: String,
    last_prediction: String,
    is_matched: bool,
    status: Status,
    // set by a word or prediction change, consumed by the next evaluation
    changed: bool,
    classifier: Box<dyn Classifier>,
    countdown: Box<dyn Countdown>,
    rng: StdRng,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("score", &self.score)
            .field("remaining_secs", &self.remaining_secs)
            .field("target_word", &self.target_word)
            .field("last_prediction", &self.last_prediction)
            .field("is_matched", &self.is_matched)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    pub fn new(
        config: SessionConfig,
        classifier: Box<dyn Classifier>,
        countdown: Box<dyn Countdown>,
    ) -> Self {
        Self::with_rng(config, classifier, countdown, StdRng::from_entropy())
    }

    pub fn with_rng(
        config: SessionConfig,
        classifier: Box<dyn Classifier>,
        countdown: Box<dyn Countdown>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            score: 0,
            remaining_secs: config.time_limit_secs.max(1),
            target_word: String::new(),
            last_prediction: String::new(),
            is_matched: false,
            status: Status::NotStarted,
            changed: false,
            classifier,
            countdown,
            rng,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn last_prediction(&self) -> &str {
        &self.last_prediction
    }

    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn countdown(&self) -> &dyn Countdown {
        self.countdown.as_ref()
    }

    /// Remaining time as `MM:SS`
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }

    fn draw<S: AsRef<str>>(&mut self, words: &[S]) -> Option<String> {
        words.choose(&mut self.rng).map(|w| w.as_ref().to_string())
    }

    pub fn start<S: AsRef<str>>(&mut self, words: &[S]) -> Result<(), SessionError> {
        if self.status != Status::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        let word = self.draw(words).ok_or(SessionError::EmptyWordList)?;

        self.status = Status::Running;
        self.score = 0;
        self.target_word = word;
        let generation = self.countdown.start();
        log::info!(
            "game started: target {:?}, {}s, countdown generation {generation}",
            self.target_word,
            self.remaining_secs
        );
        Ok(())
    }

    /// One elapsed second. Ends the game when the clock reaches zero.
    pub fn tick(&mut self) -> Result<Status, SessionError> {
        if self.status != Status::Running {
            return Err(SessionError::NotRunning);
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.status = Status::Over;
            self.countdown.stop();
            log::info!("game over with {} points", self.score);
        }
        Ok(self.status)
    }

    /// Ticks only for the current countdown generation; stale ticks are dropped.
    pub fn on_countdown(&mut self, generation: u64) -> Result<Status, SessionError> {
        if !self.countdown.is_running() || generation != self.countdown.generation() {
            log::debug!("ignoring tick from countdown generation {generation}");
            return Err(SessionError::NotRunning);
        }
        self.tick()
    }

    /// Submits a photo whose load began during countdown `generation`.
    /// Loads that began in an earlier game are dropped.
    pub fn on_picked(
        &mut self,
        generation: u64,
        photo: Option<&Photo>,
    ) -> Result<Option<Evaluation>, SessionError> {
        if generation != self.countdown.generation() {
            log::debug!("ignoring photo picked during countdown generation {generation}");
            return Err(SessionError::NotRunning);
        }
        self.submit_image(photo)
    }

    /// Classifies `photo` and re-checks the match. A cancelled pick
    /// (`None`) or a failed classification changes nothing and yields `Ok(None)`.
    pub fn submit_image(&mut self, photo: Option<&Photo>) -> Result<Option<Evaluation>, SessionError> {
        if self.status != Status::Running {
            return Err(SessionError::NotRunning);
        }
        let Some(photo) = photo else {
            log::debug!("photo pick cancelled");
            return Ok(None);
        };
        let Some(label) = self.classifier.classify(photo) else {
            log::warn!("no prediction for {}", photo.path.display());
            return Ok(None);
        };

        log::info!("{} classified as {label:?}", photo.path.display());
        self.last_prediction = label;
        self.changed = true;
        Ok(Some(self.evaluate_match()))
    }

    /// Draws another target word (repeats allowed) and re-checks the match.
    pub fn new_word<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Evaluation, SessionError> {
        if self.status != Status::Running {
            return Err(SessionError::NotRunning);
        }
        let word = self.draw(words).ok_or(SessionError::EmptyWordList)?;

        log::info!("new target word {word:?}");
        self.target_word = word;
        self.changed = true;
        Ok(self.evaluate_match())
    }

    /// Recomputes the match flag. Points are only ever awarded once per
    /// word or prediction change, so repeated calls are idempotent.
    pub fn evaluate_match(&mut self) -> Evaluation {
        let was_matched = self.is_matched;
        self.is_matched = contains_word(&self.last_prediction, &self.target_word);

        let eligible = match self.config.scoring {
            ScoringRule::EveryMatch => self.changed,
            ScoringRule::NewMatchOnly => self.changed && !was_matched,
        };
        self.changed = false;

        let awarded = if self.is_matched && eligible {
            MATCH_POINTS
        } else {
            0
        };
        self.score += awarded;
        if awarded > 0 {
            log::info!("match on {:?}: +{awarded}, score {}", self.target_word, self.score);
        }

        Evaluation {
            matched: self.is_matched,
            awarded,
        }
    }

    /// Back to a fresh, unstarted game. The countdown is stopped.
    pub fn reset(&mut self) {
        self.countdown.stop();
        self.score = 0;
        self.remaining_secs = self.config.time_limit_secs.max(1);
        self.target_word.clear();
        self.last_prediction.clear();
        self.is_matched = false;
        self.status = Status::NotStarted;
        self.changed = false;
        log::debug!("session reset");
    }
}
