mod support;

use std::path::Path;

use dbreports::cli::commands::movies::{MovieContext, run_menu, run_session};
use dbreports::cli::console::Console;
use dbreports::config::resolve_runtime_paths;
use dbreports::movies;
use support::{movies_db, movies_store, transcript, unique_temp_dir};

const MOVIES_MENU: &[&str] = &[
    "Select a menu option: ",
    "  1. Print general statistics about the database",
    "  2. Find movies matching a pattern for the name",
    "  3. Find details of a movie by movie ID",
    "  4. Top N movies by average rating, with a minimum number of reviews",
    "  5. Add a new review for a movie",
    "  6. Set the tagline of a movie",
    "or x to exit the program.",
];

fn run_script(context: &MovieContext, script: &str) -> String {
    let mut console = Console::new(script.as_bytes(), Vec::new());
    run_menu(context, &mut console).expect("menu session should finish");
    transcript(console.into_output(), MOVIES_MENU)
}

#[test]
fn details_transcript() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-details"),
    };

    insta::assert_snapshot!(run_script(&context, "3\n1\nx\n"), @r"
Your choice -->
Enter a movie ID:
1 : The Matrix
  Release date: 1999-03-30
  Runtime: 136 (minutes)
  Original language: en
  Budget: $63,000,000 (USD)
  Revenue: $463,517,383 (USD)
  Number of reviews: 3
  Average rating: 9.00 (0-10)
  Genres: Action, Science Fiction,
  Production companies: Village Roadshow Pictures, Warner Bros.,
  Tagline: Welcome to the Real World.

Your choice -->
Exiting program.
");
}

#[test]
fn stats_and_search_transcript() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-search"),
    };

    insta::assert_snapshot!(run_script(&context, "1\n2\n%Matrix%\nx\n"), @r"
Your choice -->
General Statistics:
 Number of Movies: 5
 Number of Reviews: 9

Your choice -->
Enter the name of the movie to find (wildcards _ and % allowed):
Number of Movies Found: 2

1 : The Matrix (1999)
2 : The Matrix Reloaded (2003)

Your choice -->
Exiting program.
");
}

#[test]
fn more_than_a_hundred_matches_are_counted_but_not_listed() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-too-many"),
    };
    for index in 0..101 {
        context
            .store
            .execute(
                "INSERT INTO Movies (Movie_ID, Title, Release_Date) VALUES (?1, ?2, '2020-01-01')",
                rusqlite::params![100 + index, format!("Sequel {index}")],
            )
            .expect("insert should run");
    }

    let output = run_script(&context, "2\nSequel%\nx\n");
    assert!(
        output.contains(
            "Number of Movies Found: 101\n\nThere are too many movies to display (more than 100). Please narrow your search and try again."
        ),
        "unexpected transcript:\n{output}"
    );
    assert!(!output.contains(" : Sequel"));

    let output = run_script(&context, "2\nSequel 10_\nx\n");
    assert!(output.contains("Number of Movies Found: 1\n\n200 : Sequel 100 (2020)"));
}

#[test]
fn top_movies_lists_ratings_with_two_decimals() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-top"),
    };

    let output = run_script(&context, "4\n2\n2\nx\n");
    assert!(
        output.contains("1 : The Matrix (1999), Average rating = 9.00 (3 reviews)"),
        "unexpected transcript:\n{output}"
    );
    assert!(output.contains("3 : Toy Story (1995), Average rating = 9.00 (3 reviews)"));
    assert!(!output.contains("Reloaded"));

    let output = run_script(&context, "4\n0\nx\n");
    assert!(output.contains("Please enter a positive value for N."));

    let output = run_script(&context, "4\n3\n-1\nx\n");
    assert!(output.contains("Please enter a positive value for the minimum number of reviews."));

    let output = run_script(&context, "4\n3\n50\nx\n");
    assert!(output.contains("No movies were found that fit the criteria."));
}

#[test]
fn add_review_validates_rating_before_writing() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-review"),
    };

    let output = run_script(&context, "5\n11\nx\n");
    assert!(output.contains(
        "Invalid rating. Please enter a value between 0 and 10 (inclusive)."
    ));
    assert_eq!(movies::num_reviews(&context.store).expect("count should run"), 9);

    let output = run_script(&context, "5\n7\n999\nx\n");
    assert!(output.contains("No movie matching that ID was found in the database."));
    assert_eq!(movies::num_reviews(&context.store).expect("count should run"), 9);

    let output = run_script(&context, "5\n7\n4\nx\n");
    assert!(output.contains("Rating was successfully inserted into the database."));
    assert_eq!(movies::num_reviews(&context.store).expect("count should run"), 10);
}

#[test]
fn empty_tagline_removes_the_existing_one() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-tagline"),
    };

    let output = run_script(&context, "6\n\n1\n3\n1\nx\n");
    assert!(output.contains("Tagline was successfully set in the database."));
    assert!(
        output.lines().any(|line| line == "  Tagline:"),
        "unexpected transcript:\n{output}"
    );
}

#[test]
fn unknown_ids_and_commands_keep_the_loop_running() {
    let context = MovieContext {
        store: movies_store("dbreports-movies-menu-unknown"),
    };

    insta::assert_snapshot!(run_script(&context, "3\nabc\n9\n3\n999\n"), @r"
Your choice -->
Enter a movie ID:
No movie matching that ID was found in the database.

Your choice -->
Error, unknown command, try again...

Your choice -->
Enter a movie ID:
No movie matching that ID was found in the database.

Your choice -->
");
}

#[test]
fn store_errors_are_reported_without_ending_the_session() {
    let store = dbreports::sqlite::Store::open_in_memory().expect("in-memory sqlite should open");
    let context = MovieContext { store };

    let output = run_script(&context, "1\nx\n");
    assert!(
        output.contains("Error: fetch_one failed: no such table: Movies"),
        "unexpected transcript:\n{output}"
    );
    assert!(output.ends_with("Exiting program."));
}

#[test]
fn session_connects_to_prompted_database() {
    let db = movies_db("dbreports-movies-session");
    let cwd = db.parent().expect("fixture lives in a directory");
    let runtime_paths = resolve_runtime_paths(Path::new("/home/tester"), cwd, None)
        .expect("paths should resolve");

    let mut console = Console::new("movies.db\nx\n".as_bytes(), Vec::new());
    run_session(&mut console, None, &runtime_paths).expect("session should finish");
    let output = transcript(console.into_output(), MOVIES_MENU);

    assert!(output.starts_with("Movie Database App\n"));
    assert!(output.contains(
        "Enter the name of the database you would like to use:\nSuccessfully connected to the database!"
    ));
    assert!(output.ends_with("Exiting program."));
}

#[test]
fn session_reports_unopenable_database() {
    let cwd = unique_temp_dir("dbreports-movies-missing");
    let runtime_paths = resolve_runtime_paths(Path::new("/home/tester"), &cwd, None)
        .expect("paths should resolve");

    let mut console = Console::new("".as_bytes(), Vec::new());
    run_session(&mut console, Some(Path::new("absent.db")), &runtime_paths)
        .expect_err("missing database must fail");
    let output = transcript(console.into_output(), MOVIES_MENU);

    assert!(
        output.contains("Failed to connect to the database: failed to open database"),
        "unexpected transcript:\n{output}"
    );
}
