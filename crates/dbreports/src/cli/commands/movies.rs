use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use super::{
    EXIT_CHOICE, MENU_PROMPT, UNKNOWN_COMMAND, parse_int, report_command_outcome,
};
use crate::cli::console::Console;
use crate::config::RuntimePaths;
use crate::models::{MovieDetails, Mutation};
use crate::movies;
use crate::sqlite::Store;
use crate::utils::format::{thousands, trailing_list, usd};

const MAX_LISTED_MOVIES: usize = 100;
const MOVIE_NOT_FOUND: &str = "No movie matching that ID was found in the database.";
const NOTHING_WRITTEN: &str = "No changes were written to the database.";
const INVALID_RATING: &str = "Invalid rating. Please enter a value between 0 and 10 (inclusive).";

#[derive(Debug, Clone, Args)]
pub struct MoviesArgs {
    /// Database file; prompted for when omitted
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

/// Everything a movie command needs. Owns the connection for the lifetime
/// of the session; dropping it closes the database.
#[derive(Debug)]
pub struct MovieContext {
    pub store: Store,
}

pub fn run(args: &MoviesArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let stdin = std::io::stdin();
    let mut console = Console::new(stdin.lock(), std::io::stdout());
    run_session(&mut console, args.db.as_deref(), runtime_paths)
}

pub fn run_session<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    db: Option<&Path>,
    runtime_paths: &RuntimePaths,
) -> Result<()> {
    console.line("Movie Database App")?;
    console.blank_line()?;
    console.line("This application allows you to analyze various")?;
    console.line("aspects of the MovieLens database.")?;
    console.blank_line()?;

    let db_path = match db {
        Some(path) => path.to_path_buf(),
        None => match console.prompt("Enter the name of the database you would like to use: ")? {
            Some(answer) => PathBuf::from(answer.trim()),
            None => return Ok(()),
        },
    };
    let db_path = runtime_paths.resolve(&db_path)?;

    let store = match Store::open(&db_path) {
        Ok(store) => store,
        Err(error) => {
            console.line(format!("Failed to connect to the database: {error}"))?;
            return Err(error.into());
        }
    };
    console.blank_line()?;
    console.line("Successfully connected to the database!")?;
    console.blank_line()?;

    let context = MovieContext { store };
    run_menu(&context, console)
}

pub fn run_menu<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    loop {
        print_menu(console)?;
        let Some(choice) = console.prompt(MENU_PROMPT)? else {
            break;
        };
        console.blank_line()?;

        let outcome = match choice.trim() {
            EXIT_CHOICE => {
                console.line("Exiting program.")?;
                break;
            }
            "1" => print_stats(context, console),
            "2" => find_movies(context, console),
            "3" => movie_details(context, console),
            "4" => top_movies(context, console),
            "5" => add_review(context, console),
            "6" => set_tagline(context, console),
            _ => console.line(UNKNOWN_COMMAND),
        };
        report_command_outcome(console, outcome)?;
        console.blank_line()?;
    }
    Ok(())
}

fn print_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<()> {
    console.line("Select a menu option: ")?;
    console.line("  1. Print general statistics about the database")?;
    console.line("  2. Find movies matching a pattern for the name")?;
    console.line("  3. Find details of a movie by movie ID")?;
    console.line("  4. Top N movies by average rating, with a minimum number of reviews")?;
    console.line("  5. Add a new review for a movie")?;
    console.line("  6. Set the tagline of a movie")?;
    console.line("or x to exit the program.")
}

fn print_stats<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let num_movies = movies::num_movies(&context.store)?;
    let num_reviews = movies::num_reviews(&context.store)?;

    console.line("General Statistics:")?;
    console.line(format!(" Number of Movies: {}", thousands(num_movies)))?;
    console.line(format!(" Number of Reviews: {}", thousands(num_reviews)))
}

fn find_movies<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(pattern) =
        console.prompt("Enter the name of the movie to find (wildcards _ and % allowed): ")?
    else {
        return Ok(());
    };
    let found = movies::get_movies(&context.store, &pattern)?;

    console.blank_line()?;
    console.line(format!("Number of Movies Found: {}", found.len()))?;
    if found.len() > MAX_LISTED_MOVIES {
        console.blank_line()?;
        return console.line(
            "There are too many movies to display (more than 100). Please narrow your search and try again.",
        );
    }
    if !found.is_empty() {
        console.blank_line()?;
        for movie in &found {
            console.line(format!(
                "{} : {} ({})",
                movie.id, movie.title, movie.release_year
            ))?;
        }
    }
    Ok(())
}

fn movie_details<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(raw_id) = console.prompt("Enter a movie ID: ")? else {
        return Ok(());
    };
    console.blank_line()?;
    let Some(movie_id) = parse_int(&raw_id) else {
        return console.line(MOVIE_NOT_FOUND);
    };

    match movies::get_movie_details(&context.store, movie_id)? {
        Some(details) => print_details(console, &details),
        None => console.line(MOVIE_NOT_FOUND),
    }
}

fn print_details<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    details: &MovieDetails,
) -> Result<()> {
    console.line(format!("{} : {}", details.id, details.title))?;
    console.line(format!("  Release date: {}", details.release_date))?;
    console.line(format!("  Runtime: {} (minutes)", details.runtime))?;
    console.line(format!(
        "  Original language: {}",
        details.original_language
    ))?;
    console.line(format!("  Budget: {} (USD)", usd(details.budget)))?;
    console.line(format!("  Revenue: {} (USD)", usd(details.revenue)))?;
    console.line(format!("  Number of reviews: {}", details.num_reviews))?;
    console.line(format!(
        "  Average rating: {:.2} (0-10)",
        details.avg_rating
    ))?;
    console.line(format!("  Genres: {}", trailing_list(&details.genres)))?;
    console.line(format!(
        "  Production companies: {}",
        trailing_list(&details.production_companies)
    ))?;
    console.line(format!("  Tagline: {}", details.tagline))
}

fn top_movies<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(raw_n) = console.prompt("Enter a value for N: ")? else {
        return Ok(());
    };
    let Some(n) = parse_int(&raw_n).filter(|n| *n > 0) else {
        return console.line("Please enter a positive value for N.");
    };

    let Some(raw_min) = console.prompt("Enter a value for the minimum number of reviews: ")? else {
        return Ok(());
    };
    let Some(min_reviews) = parse_int(&raw_min).filter(|min| *min > 0) else {
        return console.line("Please enter a positive value for the minimum number of reviews.");
    };
    console.blank_line()?;

    let ranked = movies::get_top_n_movies(&context.store, n, min_reviews)?;
    if ranked.is_empty() {
        return console.line("No movies were found that fit the criteria.");
    }
    for movie in &ranked {
        console.line(format!(
            "{} : {} ({}), Average rating = {:.2} ({} reviews)",
            movie.id, movie.title, movie.release_year, movie.avg_rating, movie.num_reviews
        ))?;
    }
    Ok(())
}

fn add_review<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(raw_rating) = console.prompt("Enter a value for the new rating (0-10): ")? else {
        return Ok(());
    };
    let Some(rating) = parse_int(&raw_rating).filter(|rating| (0..=10).contains(rating)) else {
        return console.line(INVALID_RATING);
    };

    let Some(movie_id) = prompt_movie_id(console)? else {
        return Ok(());
    };

    let outcome = movies::add_review(&context.store, movie_id, rating)?;
    report_mutation(
        console,
        outcome,
        "Rating was successfully inserted into the database.",
    )
}

fn set_tagline<R: BufRead, W: Write>(
    context: &MovieContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(tagline) = console.prompt("Enter a tagline: ")? else {
        return Ok(());
    };
    let Some(movie_id) = prompt_movie_id(console)? else {
        return Ok(());
    };

    let outcome = movies::set_tagline(&context.store, movie_id, &tagline)?;
    report_mutation(
        console,
        outcome,
        "Tagline was successfully set in the database.",
    )
}

fn report_mutation<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    outcome: Mutation,
    success: &str,
) -> Result<()> {
    match outcome {
        Mutation::Applied | Mutation::Unchanged => console.line(success),
        Mutation::MovieNotFound => console.line(MOVIE_NOT_FOUND),
        Mutation::NotApplied => console.line(NOTHING_WRITTEN),
    }
}

// Prints the not-found message itself for non-numeric ids, so `None`
// always means the command is finished.
fn prompt_movie_id<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Option<i64>> {
    let Some(raw_id) = console.prompt("Enter a movie ID: ")? else {
        return Ok(None);
    };
    match parse_int(&raw_id) {
        Some(movie_id) => {
            console.blank_line()?;
            Ok(Some(movie_id))
        }
        None => {
            console.line(MOVIE_NOT_FOUND)?;
            Ok(None)
        }
    }
}
