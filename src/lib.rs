pub mod data;
pub mod error;
pub mod game;
pub mod matcher;
pub mod recency;
pub mod sampler;

pub use data::{CityOccurrence, Country, Dataset};
pub use error::GameError;
pub use game::{CountryRef, Game, Guess, HISTORY_CAP, Question};
pub use matcher::{MAX_MATCHES, find_matches, normalize_query};
pub use recency::{RECENT_COUNTRY_WINDOW, RecencyPenalty};
pub use sampler::{DIFFICULTY_LEVELS, exponent_denominator, weighted_sample};
