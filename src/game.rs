use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::data::Dataset;
use crate::error::GameError;
use crate::recency::RecencyPenalty;
use crate::sampler::{exponent_denominator, weighted_sample};

/// How many guesses the history log retains before old entries fall off.
pub const HISTORY_CAP: usize = 1000;

/// One country in an answer set: code plus canonical display name.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRef {
    pub code: String,
    pub name: String,
}

/// The currently open question: a city and every country it belongs to.
#[derive(Debug, Clone)]
pub struct Question {
    pub city: String,
    /// Code of the country the sampler drew; always present in `answers`.
    pub drawn_code: String,
    /// Every country containing a positive-population city of this name,
    /// in code order. A one-element set for unambiguous cities.
    pub answers: Vec<CountryRef>,
}

impl Question {
    /// Whether `code` counts as a correct answer.
    pub fn accepts(&self, code: &str) -> bool {
        self.answers.iter().any(|answer| answer.code == code)
    }
}

/// One evaluated guess. History keeps these newest-first.
#[derive(Debug, Clone)]
pub struct Guess {
    pub city: String,
    pub answers: Vec<CountryRef>,
    pub drawn_code: String,
    pub guessed: CountryRef,
    pub correct: bool,
}

/// The whole mutable game state: dataset, difficulty, open question and
/// capped guess history. Owned by one caller; every transition goes through
/// its methods, so there is exactly one open question at all times.
pub struct Game {
    dataset: Dataset,
    rng: SmallRng,
    recency: RecencyPenalty,
    difficulty: u8,
    question: Question,
    history: VecDeque<Guess>,
}

impl Game {
    /// Creates a game over `dataset` and opens the first question.
    pub fn new(dataset: Dataset, difficulty: u8) -> Result<Self, GameError> {
        Self::with_rng(dataset, difficulty, SmallRng::from_entropy())
    }

    /// Same as [`Game::new`] with a fixed seed, for reproducible sessions.
    pub fn seeded(dataset: Dataset, difficulty: u8, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(dataset, difficulty, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(dataset: Dataset, difficulty: u8, mut rng: SmallRng) -> Result<Self, GameError> {
        let recency = RecencyPenalty::default();
        let question = Self::draw_question(&dataset, &mut rng, &recency, &[], difficulty)?;
        Ok(Self {
            dataset,
            rng,
            recency,
            difficulty,
            question,
            history: VecDeque::new(),
        })
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// Guesses newest-first.
    pub fn history(&self) -> impl Iterator<Item = &Guess> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Takes effect from the next question on.
    pub fn set_difficulty(&mut self, level: u8) -> Result<(), GameError> {
        exponent_denominator(level)?;
        self.difficulty = level;
        Ok(())
    }

    /// Evaluates `code` against the open question, records the guess and
    /// immediately opens the next question — one transition from the
    /// caller's point of view.
    pub fn submit_guess(&mut self, code: &str) -> Result<Guess, GameError> {
        let guessed = self
            .dataset
            .country(code)
            .map(|country| CountryRef {
                code: country.code.clone(),
                name: country.name().to_owned(),
            })
            .ok_or_else(|| GameError::UnknownCountry(code.to_owned()))?;

        let guess = Guess {
            city: self.question.city.clone(),
            answers: self.question.answers.clone(),
            drawn_code: self.question.drawn_code.clone(),
            correct: self.question.accepts(code),
            guessed,
        };
        self.history.push_front(guess.clone());
        self.history.truncate(HISTORY_CAP);
        self.advance()?;
        Ok(guess)
    }

    /// Replaces the open question without recording a guess.
    pub fn skip(&mut self) -> Result<&Question, GameError> {
        self.advance()?;
        Ok(&self.question)
    }

    fn advance(&mut self) -> Result<(), GameError> {
        let recent: Vec<String> = self
            .history
            .iter()
            .take(self.recency.window())
            .map(|guess| guess.drawn_code.clone())
            .collect();
        self.question =
            Self::draw_question(&self.dataset, &mut self.rng, &self.recency, &recent, self.difficulty)?;
        Ok(())
    }

    /// Two-stage draw: a country weighted by aggregate city population (with
    /// the recency penalty applied against the last drawn codes), then a city
    /// within it weighted by population. Both draws share the difficulty's
    /// exponent denominator. Fails loudly when no positive-weight candidate
    /// remains.
    fn draw_question(
        dataset: &Dataset,
        rng: &mut SmallRng,
        recency: &RecencyPenalty,
        recent: &[String],
        difficulty: u8,
    ) -> Result<Question, GameError> {
        let denominator = exponent_denominator(difficulty)?;

        let country_weights: Vec<(String, u64)> = dataset
            .countries()
            .map(|country| {
                let base = dataset.country_population(&country.code);
                let weight = recency.adjusted_weight(recent, &country.code, base);
                (country.code.clone(), weight)
            })
            .filter(|(_, weight)| *weight > 0)
            .collect();
        let drawn_code = weighted_sample(rng, &country_weights, denominator)?.clone();

        let city_weights = dataset.cities(&drawn_code);
        let city = weighted_sample(rng, city_weights, denominator)?.clone();

        let mut answers: Vec<CountryRef> = dataset
            .occurrences(&city)
            .iter()
            .filter_map(|occurrence| dataset.country(&occurrence.country_code))
            .map(|country| CountryRef {
                code: country.code.clone(),
                name: country.name().to_owned(),
            })
            .collect();
        answers.sort_by(|a, b| a.code.cmp(&b.code));
        // A city name can repeat within one shard; the answer set must not.
        answers.dedup_by(|a, b| a.code == b.code);

        debug!(%city, %drawn_code, answers = answers.len(), "question drawn");
        Ok(Question {
            city,
            drawn_code,
            answers,
        })
    }
}
