use std::collections::BTreeMap;
use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use geoquiz_rs::{Country, DIFFICULTY_LEVELS, Dataset, Game, Guess, find_matches};
use serde_json::json;

/// How many recent guesses stay visible after each submission.
const VISIBLE_HISTORY: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "geoquiz-rs", about = "Guess which country a city is in", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    /// Directory containing countries.json and the cities/ shards.
    #[arg(long, global = true, default_value = "data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the guessing game interactively.
    Play {
        /// Difficulty level; 0 is population-proportional, higher levels
        /// surface smaller countries and cities more often.
        #[arg(short, long, default_value_t = 0)]
        difficulty: u8,
        /// Seed the random generator for a reproducible session.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the autocomplete matcher against a query.
    Match {
        /// Country name, code or domain fragment.
        query: String,
    },
    /// Draw questions repeatedly and print per-country frequencies.
    Sample {
        /// Number of questions to draw.
        #[arg(short = 'n', long, default_value_t = 1000)]
        draws: usize,
        #[arg(short, long, default_value_t = 0)]
        difficulty: u8,
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let dataset = Dataset::load(&cli.data)?;
    match cli.command {
        Command::Play { difficulty, seed } => handle_play(dataset, difficulty, seed),
        Command::Match { query } => handle_match(dataset, &query, cli.json),
        Command::Sample {
            draws,
            difficulty,
            seed,
        } => handle_sample(dataset, draws, difficulty, seed, cli.json),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn new_game(dataset: Dataset, difficulty: u8, seed: Option<u64>) -> Result<Game, Box<dyn Error>> {
    let game = match seed {
        Some(seed) => Game::seeded(dataset, difficulty, seed)?,
        None => Game::new(dataset, difficulty)?,
    };
    Ok(game)
}

fn handle_play(dataset: Dataset, difficulty: u8, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut game = new_game(dataset, difficulty, seed)?;
    if atty::is(Stream::Stdin) {
        println!("Type a country name, code or domain. Digits 1-9 pick a listed option.");
        println!(
            ":d <level> sets difficulty (0-{}), :s skips, :h shows history, :q quits.",
            DIFFICULTY_LEVELS - 1
        );
    }

    // Codes behind the currently displayed hotkeys; stale digits are no-ops.
    let mut pending: Vec<String> = Vec::new();
    println!();
    println!("Which country is {} in?", game.question().city);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => continue,
            ":q" => break,
            ":s" => {
                game.skip()?;
                pending.clear();
                println!("Which country is {} in?", game.question().city);
                continue;
            }
            ":h" => {
                for line in recent_history_lines(&game) {
                    println!("{line}");
                }
                continue;
            }
            _ => {}
        }
        if let Some(rest) = input.strip_prefix(":d") {
            match rest.trim().parse::<u8>() {
                Ok(level) if game.set_difficulty(level).is_ok() => {
                    println!("Difficulty set to {level}.");
                }
                _ => println!("Difficulty must be 0-{}.", DIFFICULTY_LEVELS - 1),
            }
            continue;
        }
        if let Ok(ordinal) = input.parse::<usize>() {
            if (1..=pending.len()).contains(&ordinal) {
                let code = pending[ordinal - 1].clone();
                submit(&mut game, &code)?;
                pending.clear();
            }
            continue;
        }

        let matches = find_matches(game.dataset(), input);
        match matches.len() {
            0 => println!("Nothing found."),
            1 => {
                let code = matches[0].code.clone();
                submit(&mut game, &code)?;
                pending.clear();
            }
            _ => {
                pending = matches.iter().map(|country| country.code.clone()).collect();
                for (index, country) in matches.iter().enumerate() {
                    println!(
                        "  [{}] {:<8} {}",
                        index + 1,
                        country.domain,
                        country.names.join(", ")
                    );
                }
            }
        }
    }
    Ok(())
}

fn submit(game: &mut Game, code: &str) -> Result<(), Box<dyn Error>> {
    game.submit_guess(code)?;
    for line in recent_history_lines(game) {
        println!("{line}");
    }
    println!();
    println!("Which country is {} in?", game.question().city);
    Ok(())
}

/// The last [`VISIBLE_HISTORY`] guesses as display lines, newest first.
fn recent_history_lines(game: &Game) -> Vec<String> {
    game.history().take(VISIBLE_HISTORY).map(format_guess).collect()
}

fn format_guess(guess: &Guess) -> String {
    let answers = guess
        .answers
        .iter()
        .map(|answer| answer.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ");
    if guess.correct {
        format!("✅ {}: {answers}", guess.city)
    } else {
        format!("❌ {}: {} (it is in {answers})", guess.city, guess.guessed.name)
    }
}

fn handle_match(dataset: Dataset, query: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let matches = find_matches(&dataset, query);
    if as_json {
        let payload = json!({
            "query": query,
            "results": matches,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_match_table(query, &matches);
    }
    Ok(())
}

fn print_match_table(query: &str, rows: &[&Country]) {
    if rows.is_empty() {
        println!("No countries matched \"{query}\".");
        return;
    }
    println!("Matches for \"{query}\":");
    println!("{:<4}  {:<8}  {}", "KEY", "DOMAIN", "NAMES");
    for (index, country) in rows.iter().enumerate() {
        println!(
            "{:<4}  {:<8}  {}",
            index + 1,
            country.domain,
            country.names.join(", ")
        );
    }
}

fn handle_sample(
    dataset: Dataset,
    draws: usize,
    difficulty: u8,
    seed: Option<u64>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut game = new_game(dataset, difficulty, seed)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for _ in 0..draws {
        *counts.entry(game.question().drawn_code.clone()).or_default() += 1;
        game.skip()?;
    }

    let mut rows: Vec<(String, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if as_json {
        let payload = json!({
            "draws": draws,
            "difficulty": difficulty,
            "counts": rows.iter().map(|(code, count)| {
                json!({ "code": code, "count": count })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{draws} draws at difficulty {difficulty}:");
    println!("{:<6}  {:>7}  {:>6}  {}", "CODE", "COUNT", "SHARE", "NAME");
    for (code, count) in &rows {
        let share = *count as f64 / draws as f64 * 100.0;
        let name = game
            .dataset()
            .country(code)
            .map(Country::name)
            .unwrap_or("<unknown>");
        println!("{code:<6}  {count:>7}  {share:>5.1}%  {name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_rs::CountryRef;
    use std::collections::HashMap;

    fn test_game() -> Game {
        let mut shards = HashMap::new();
        shards.insert("us".to_owned(), vec![("New York".to_owned(), 8_000_000u64)]);
        shards.insert("fr".to_owned(), vec![("Paris".to_owned(), 2_000_000)]);
        let dataset = Dataset::from_parts(
            vec![
                Country {
                    code: "us".to_owned(),
                    domain: ".us".to_owned(),
                    names: vec!["United States".to_owned()],
                },
                Country {
                    code: "fr".to_owned(),
                    domain: ".fr".to_owned(),
                    names: vec!["France".to_owned()],
                },
            ],
            shards,
        )
        .unwrap();
        Game::seeded(dataset, 0, 17).unwrap()
    }

    #[test]
    fn guess_feedback_shows_the_recent_history_block() {
        let mut game = test_game();
        for round in 0..7 {
            let code = if round % 2 == 0 { "us" } else { "fr" };
            game.submit_guess(code).unwrap();
        }
        let lines = recent_history_lines(&game);
        assert_eq!(lines.len(), VISIBLE_HISTORY);
        let newest = game.history().next().unwrap();
        assert!(lines[0].contains(&newest.city));
        assert!(lines[0].starts_with(if newest.correct { "✅" } else { "❌" }));
    }

    #[test]
    fn history_block_is_short_before_five_guesses() {
        let mut game = test_game();
        game.submit_guess("fr").unwrap();
        assert_eq!(recent_history_lines(&game).len(), 1);
    }

    #[test]
    fn wrong_guess_line_names_both_countries() {
        let guess = Guess {
            city: "New York".to_owned(),
            answers: vec![CountryRef {
                code: "us".to_owned(),
                name: "United States".to_owned(),
            }],
            drawn_code: "us".to_owned(),
            guessed: CountryRef {
                code: "fr".to_owned(),
                name: "France".to_owned(),
            },
            correct: false,
        };
        let line = format_guess(&guess);
        assert!(line.starts_with("❌"));
        assert!(line.contains("France"));
        assert!(line.contains("United States"));
    }
}
