use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{EXIT_CHOICE, MENU_PROMPT, UNKNOWN_COMMAND, parse_int, report_command_outcome};
use crate::chart::{
    Background, Chart, ChartReceipt, ChartSink, DisabledChartSink, Extent, JsonChartSink, Point,
    Series, SeriesStyle,
};
use crate::cli::console::Console;
use crate::config::{DEFAULT_MAP_IMAGE, DEFAULT_TRAFFIC_DB, RuntimePaths};
use crate::models::{Camera, CameraKind, DailyViolations, IntersectionTally};
use crate::sqlite::Store;
use crate::traffic;
use crate::utils::format::{coordinate, percent, thousands, thousands_or_zero};
use crate::utils::time::{days_of_year, format_iso_date};

/// Longitude/latitude bounds of the city map image.
pub const CITY_MAP_EXTENT: Extent = Extent {
    x_min: -87.9277,
    x_max: -87.5569,
    y_min: 41.7012,
    y_max: 42.0868,
};

const EDGE_DATES: usize = 5;
const CAMERA_NOT_FOUND: &str = "No cameras matching that ID were found in the database.";
const PLOT_PROMPT: &str = "Plot? (y/n) ";

#[derive(Debug, Clone, Args)]
pub struct TrafficArgs {
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TRAFFIC_DB)]
    pub db: PathBuf,

    /// Background image for the street map chart
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MAP_IMAGE)]
    pub map_image: PathBuf,

    /// Report charts as unavailable instead of writing chart documents
    #[arg(long, default_value_t = false)]
    pub no_charts: bool,
}

/// Store handle plus the presentation sinks the traffic commands draw on.
pub struct TrafficContext {
    pub store: Store,
    pub charts: Box<dyn ChartSink>,
    pub map_image: PathBuf,
}

pub fn run(args: &TrafficArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let stdin = std::io::stdin();
    let mut console = Console::new(stdin.lock(), std::io::stdout());

    let db_path = runtime_paths.resolve(&args.db)?;
    let store = match Store::open(&db_path) {
        Ok(store) => store,
        Err(error) => {
            console.line(format!("Failed to connect to the database: {error}"))?;
            return Err(error.into());
        }
    };
    let charts: Box<dyn ChartSink> = if args.no_charts {
        Box::new(DisabledChartSink)
    } else {
        Box::new(JsonChartSink::new(runtime_paths.out_dir.clone()))
    };
    let mut context = TrafficContext {
        store,
        charts,
        map_image: runtime_paths.resolve(&args.map_image)?,
    };

    run_session(&mut context, &mut console)
}

pub fn run_session<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    console.line("Chicago Traffic Camera Analysis")?;
    console.blank_line()?;
    console.line("This application allows you to analyze various")?;
    console.line("aspects of the Chicago traffic camera database.")?;
    console.blank_line()?;

    let overview = print_overview(context, console);
    report_command_outcome(console, overview)?;
    console.blank_line()?;

    loop {
        print_menu(console)?;
        let Some(choice) = console.prompt(MENU_PROMPT)? else {
            break;
        };
        if choice == EXIT_CHOICE {
            console.line("Exiting program.")?;
            break;
        }

        let command: Option<CommandFn<R, W>> = match choice.as_str() {
            "1" => Some(find_intersections),
            "2" => Some(cameras_at_intersection),
            "3" => Some(violations_on_date),
            "4" => Some(cameras_per_intersection),
            "5" => Some(violations_per_intersection),
            "6" => Some(violations_by_year),
            "7" => Some(violations_by_month),
            "8" => Some(compare_by_day),
            "9" => Some(cameras_on_street),
            _ => None,
        };
        match command {
            Some(command) => {
                console.blank_line()?;
                let outcome = command(context, console);
                report_command_outcome(console, outcome)?;
            }
            None => console.line(UNKNOWN_COMMAND)?,
        }
        console.blank_line()?;
    }
    Ok(())
}

type CommandFn<R, W> = fn(&mut TrafficContext, &mut Console<R, W>) -> Result<()>;

fn print_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<()> {
    console.line("Select a menu option: ")?;
    console.line("  1. Find an intersection by name")?;
    console.line("  2. Find all cameras at an intersection")?;
    console.line("  3. Percentage of violations for a specific date")?;
    console.line("  4. Number of cameras at each intersection")?;
    console.line("  5. Number of violations at each intersection, given a year")?;
    console.line("  6. Number of violations by year, given a camera ID")?;
    console.line("  7. Number of violations by month, given a camera ID and year")?;
    console.line("  8. Compare the number of red light and speed violations, given a year")?;
    console.line("  9. Find cameras located on a street")?;
    console.line("or x to exit the program.")
}

fn print_overview<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let overview = traffic::overview(&context.store)?;
    let first = overview.first_violation_date.as_deref().unwrap_or("----");
    let last = overview.last_violation_date.as_deref().unwrap_or("----");

    console.line("General Statistics:")?;
    console.line(format!(
        "  Number of Red Light Cameras: {}",
        thousands(overview.red_cameras)
    ))?;
    console.line(format!(
        "  Number of Speed Cameras: {}",
        thousands(overview.speed_cameras)
    ))?;
    console.line(format!(
        "  Number of Red Light Camera Violation Entries: {}",
        thousands(overview.red_violation_entries)
    ))?;
    console.line(format!(
        "  Number of Speed Camera Violation Entries: {}",
        thousands(overview.speed_violation_entries)
    ))?;
    console.line(format!("  Range of Dates in the Database: {first} - {last}"))?;
    console.line(format!(
        "  Total Number of Red Light Camera Violations: {}",
        thousands_or_zero(overview.red_violations_total)
    ))?;
    console.line(format!(
        "  Total Number of Speed Camera Violations: {}",
        thousands_or_zero(overview.speed_violations_total)
    ))
}

fn find_intersections<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(pattern) = console
        .prompt("Enter the name of the intersection to find (wildcards _ and % allowed): ")?
    else {
        return Ok(());
    };

    let intersections = traffic::find_intersections(&context.store, &pattern)?;
    if intersections.is_empty() {
        return console.line("No intersections matching that name were found.");
    }
    for intersection in &intersections {
        console.line(format!("{} : {}", intersection.id, intersection.name))?;
    }
    Ok(())
}

fn cameras_at_intersection<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    console.line("Enter the name of the intersection (no wildcards allowed): ")?;
    let Some(name) = console.prompt("")? else {
        return Ok(());
    };

    let (red, speed) = match traffic::cameras_at_intersection(&context.store, &name)? {
        Some(found) => (found.red, found.speed),
        None => (Vec::new(), Vec::new()),
    };

    if red.is_empty() {
        console.line("No red light cameras found at that intersection.")?;
    } else {
        console.line("Red Light Cameras:")?;
        for camera in &red {
            console.line(format!("   {} : {}", camera.id, camera.address))?;
        }
    }
    console.blank_line()?;

    if speed.is_empty() {
        console.line("No speed cameras found at that intersection.")
    } else {
        console.line("Speed Cameras:")?;
        for camera in &speed {
            console.line(format!("   {} : {}", camera.id, camera.address))?;
        }
        Ok(())
    }
}

fn violations_on_date<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(date) = console.prompt(
        "Enter the date that you would like to look at (format should be YYYY-MM-DD): ",
    )?
    else {
        return Ok(());
    };

    let split = traffic::violations_on_date(&context.store, &date)?;
    if split.total() == 0 {
        return console.line("No violations on record for that date.");
    }
    console.line(format!(
        "Number of Red Light Violations: {} ({})",
        thousands(split.red),
        percent(split.red_percent())
    ))?;
    console.line(format!(
        "Number of Speed Violations: {} ({})",
        thousands(split.speed),
        percent(split.speed_percent())
    ))?;
    console.line(format!(
        "Total Number of Violations: {}",
        thousands(split.total())
    ))
}

fn cameras_per_intersection<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    for (index, kind) in CameraKind::ALL.into_iter().enumerate() {
        if index > 0 {
            console.blank_line()?;
        }
        let tally = traffic::cameras_per_intersection(&context.store, kind)?;
        console.line(format!(
            "Number of {} Cameras at Each Intersection",
            kind.label()
        ))?;
        // Nothing to measure against without any cameras of this kind.
        if tally.total <= 0 {
            continue;
        }
        for row in &tally.rows {
            console.line(format!(
                "  {} ({}) : {} ({})",
                row.intersection_name,
                row.intersection_id,
                row.count,
                percent(tally.percent(row.count))
            ))?;
        }
    }
    Ok(())
}

fn violations_per_intersection<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(year) = console.prompt("Enter the year that you would like to analyze: ")? else {
        return Ok(());
    };
    console.blank_line()?;

    let red = traffic::violations_per_intersection(&context.store, CameraKind::Red, &year)?;
    print_year_tally(console, CameraKind::Red, &year, &red)?;
    console.blank_line()?;

    let speed = traffic::violations_per_intersection(&context.store, CameraKind::Speed, &year)?;
    print_year_tally(console, CameraKind::Speed, &year, &speed)
}

fn print_year_tally<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    kind: CameraKind,
    year: &str,
    tally: &IntersectionTally,
) -> Result<()> {
    console.line(format!(
        "Number of {} Violations at Each Intersection for {year}",
        kind.label()
    ))?;
    if tally.rows.is_empty() {
        return console.line(format!(
            "No {} violations on record for that year.",
            kind.label().to_lowercase()
        ));
    }
    for row in &tally.rows {
        console.line(format!(
            "  {} ({}) : {} ({})",
            row.intersection_name,
            row.intersection_id,
            thousands(row.count),
            percent(tally.percent(row.count))
        ))?;
    }
    console.line(format!(
        "Total {} Violations in {year} : {}",
        kind.label(),
        thousands(tally.total)
    ))
}

fn violations_by_year<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some((camera_id, kinds)) = prompt_camera(context, console)? else {
        return Ok(());
    };

    let yearly = traffic::yearly_violations(&context.store, camera_id, &kinds)?;
    console.line(format!("Yearly Violations for Camera {camera_id}"))?;
    for (year, count) in &yearly {
        console.line(format!("{year} : {}", thousands(*count)))?;
    }
    console.blank_line()?;

    if !console.confirm(PLOT_PROMPT)? {
        return Ok(());
    }
    let Some(chart) = yearly_chart(camera_id, &yearly) else {
        return Ok(());
    };
    emit_chart(context, console, &chart)
}

fn violations_by_month<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some((camera_id, kinds)) = prompt_camera(context, console)? else {
        return Ok(());
    };
    let Some(year) = console.prompt("Enter a year: ")? else {
        return Ok(());
    };

    let monthly = traffic::monthly_violations(&context.store, camera_id, &kinds, &year)?;
    console.line(format!("Monthly Violations for Camera {camera_id} in {year}"))?;
    for month in 1..=12u8 {
        if let Some(count) = monthly.get(&month) {
            console.line(format!("{month:02}/{year} : {}", thousands(*count)))?;
        }
    }
    console.blank_line()?;

    if !console.confirm(PLOT_PROMPT)? {
        return Ok(());
    }
    let chart = monthly_chart(camera_id, &year, &monthly);
    emit_chart(context, console, &chart)
}

fn compare_by_day<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(year) = console.prompt("Enter a year: ")? else {
        return Ok(());
    };

    let daily = traffic::daily_violations(&context.store, &year)?;
    let dates: Vec<&String> = daily.keys().collect();
    for kind in CameraKind::ALL {
        console.line(format!("{} Violations:", kind.label()))?;
        for index in edge_indices(dates.len()) {
            let date = dates[index];
            console.line(format!("{date} {}", daily[date].count(kind)))?;
        }
    }
    console.blank_line()?;

    if !console.confirm(PLOT_PROMPT)? {
        return Ok(());
    }
    // A year that is not a number has no calendar to plot against.
    let Some(year_number) = parse_int(&year).and_then(|year| i32::try_from(year).ok()) else {
        return Ok(());
    };
    let Some(chart) = daily_chart(year_number, &daily) else {
        return Ok(());
    };
    emit_chart(context, console, &chart)
}

fn cameras_on_street<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
) -> Result<()> {
    let Some(street) = console.prompt("Enter a street name: ")? else {
        return Ok(());
    };

    let found = traffic::cameras_on_street(&context.store, &street)?;
    if found.is_empty() {
        return console.line("There are no cameras located on that street.");
    }

    console.blank_line()?;
    console.line(format!("List of Cameras Located on Street: {street}"))?;
    for (kind, cameras) in [
        (CameraKind::Red, &found.red),
        (CameraKind::Speed, &found.speed),
    ] {
        console.line(format!("  {} Cameras:", kind.label()))?;
        for camera in cameras {
            console.line(format!(
                "     {} : {} ({}, {})",
                camera.id,
                camera.address,
                coordinate(camera.latitude),
                coordinate(camera.longitude)
            ))?;
        }
    }
    console.blank_line()?;

    if !console.confirm(PLOT_PROMPT)? {
        return Ok(());
    }
    if !context.map_image.is_file() {
        let file_name = context
            .map_image
            .file_name()
            .unwrap_or(context.map_image.as_os_str())
            .to_string_lossy()
            .into_owned();
        return console.line(format!(
            "Error: cannot find '{file_name}' file for plotting the map."
        ));
    }
    let chart = street_chart(
        &street,
        context.map_image.display().to_string(),
        &found.red,
        &found.speed,
    );
    emit_chart(context, console, &chart)
}

/// Reads a camera id and looks up which kinds of camera carry it. Prints
/// the not-found message itself, so `None` always ends the command.
fn prompt_camera<R: BufRead, W: Write>(
    context: &TrafficContext,
    console: &mut Console<R, W>,
) -> Result<Option<(i64, Vec<CameraKind>)>> {
    let Some(raw_id) = console.prompt("Enter a camera ID: ")? else {
        return Ok(None);
    };
    let Some(camera_id) = parse_int(&raw_id) else {
        console.line(CAMERA_NOT_FOUND)?;
        return Ok(None);
    };
    let kinds = traffic::camera_kinds(&context.store, camera_id)?;
    if kinds.is_empty() {
        console.line(CAMERA_NOT_FOUND)?;
        return Ok(None);
    }
    Ok(Some((camera_id, kinds)))
}

fn emit_chart<R: BufRead, W: Write>(
    context: &mut TrafficContext,
    console: &mut Console<R, W>,
    chart: &Chart,
) -> Result<()> {
    match context.charts.render(chart) {
        Ok(ChartReceipt::Saved(path)) => console.line(format!("Chart saved to {}", path.display())),
        Ok(ChartReceipt::Unavailable(reason)) => {
            console.line(format!("Charting is unavailable: {reason}"))
        }
        Err(error) => {
            tracing::warn!(title = %chart.title, error = %format!("{error:#}"), "chart render failed");
            console.line(format!("Error: failed to render chart: {error:#}"))
        }
    }
}

/// Indices of the first and last few entries of a sorted list, each index
/// at most once.
fn edge_indices(len: usize) -> impl Iterator<Item = usize> {
    let head = 0..len.min(EDGE_DATES);
    let tail = len.saturating_sub(EDGE_DATES).max(EDGE_DATES).min(len)..len;
    head.chain(tail)
}

/// Line chart of yearly totals; years inside the observed span that have no
/// violations are plotted as zero.
pub fn yearly_chart(camera_id: i64, yearly: &BTreeMap<i32, i64>) -> Option<Chart> {
    let first = *yearly.keys().next()?;
    let last = *yearly.keys().next_back()?;
    let points: Vec<Point> = (first..=last)
        .map(|year| Point {
            x: f64::from(year),
            y: yearly.get(&year).copied().unwrap_or(0) as f64,
        })
        .collect();
    let ticks = points.iter().map(|point| point.x).collect();

    Some(
        Chart::new(
            format!("Yearly Violations for Camera {camera_id}"),
            "Year",
            "Number of Violations",
        )
        .with_series(Series::new("blue", SeriesStyle::LineWithMarkers, points))
        .with_x_ticks(ticks),
    )
}

/// Line chart over the populated months only.
pub fn monthly_chart(camera_id: i64, year: &str, monthly: &BTreeMap<u8, i64>) -> Chart {
    let points: Vec<Point> = monthly
        .iter()
        .map(|(month, count)| Point {
            x: f64::from(*month),
            y: *count as f64,
        })
        .collect();
    let ticks = points.iter().map(|point| point.x).collect();

    Chart::new(
        format!("Monthly Violations for Camera {camera_id} ({year})"),
        "Month",
        "Number of Violations",
    )
    .with_series(Series::new("blue", SeriesStyle::Line, points))
    .with_x_ticks(ticks)
}

/// Red light and speed totals for every day of `year`, day 1 being
/// January 1; days without entries are zero.
pub fn daily_chart(year: i32, daily: &BTreeMap<String, DailyViolations>) -> Option<Chart> {
    let days = days_of_year(year).ok()?;
    let mut red = Vec::with_capacity(days.len());
    let mut speed = Vec::with_capacity(days.len());
    for (index, day) in days.iter().enumerate() {
        let counts = daily
            .get(&format_iso_date(*day))
            .copied()
            .unwrap_or_default();
        let x = (index + 1) as f64;
        red.push(Point {
            x,
            y: counts.red as f64,
        });
        speed.push(Point {
            x,
            y: counts.speed as f64,
        });
    }

    Some(
        Chart::new(
            format!("Violations Each Day of {year}"),
            "Day",
            "Number of Violations",
        )
        .with_series(Series::new("red", SeriesStyle::Line, red).labeled("Red Light"))
        .with_series(Series::new("orange", SeriesStyle::Line, speed).labeled("Speed")),
    )
}

/// Cameras placed on the city map, each kind joined west to east and every
/// point labeled with its camera id.
pub fn street_chart(street: &str, image_path: String, red: &[Camera], speed: &[Camera]) -> Chart {
    let mut chart = Chart::new(format!("Cameras on Street: {street}"), "Longitude", "Latitude")
        .with_background(Background {
            image_path,
            extent: CITY_MAP_EXTENT,
        });

    for (cameras, color) in [(red, "red"), (speed, "orange")] {
        let mut ordered: Vec<&Camera> = cameras.iter().collect();
        ordered.sort_by(|left, right| left.longitude.total_cmp(&right.longitude));
        let points: Vec<Point> = ordered
            .iter()
            .map(|camera| Point {
                x: camera.longitude,
                y: camera.latitude,
            })
            .collect();
        for (camera, point) in ordered.iter().zip(&points) {
            chart.annotate(camera.id.to_string(), *point);
        }
        chart = chart
            .with_series(Series::new(color, SeriesStyle::Line, points.clone()))
            .with_series(Series::new(color, SeriesStyle::Scatter, points));
    }
    chart
}
