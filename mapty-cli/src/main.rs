//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, stdout, Write};

use mapty_lib::{
    AppController, AppService, BufferedView, Coords, FormInput, HeadlessMap, ListEntry,
    Workout, WorkoutKind, WorkoutType,
};

type CliController = AppController<BufferedView, HeadlessMap>;

fn main() -> Result<()> {
    let cli_args = cli::parse_args();

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    init_logging(cli_args.verbose, cli_args.quiet);

    let service =
        AppService::initialize(cli_args.db).context("Failed to initialize application service")?;

    if let cli::Commands::Paths = cli_args.command {
        println!("Config file: {}", service.get_config_path().display());
        println!("Database:    {}", service.get_db_path().display());
        return Ok(());
    }

    // No screen here: a headless map that is never initialized, so every
    // map call is a no-op, and a view that only buffers.
    let mut controller = service
        .build_controller(BufferedView::new(), HeadlessMap::default())
        .context("Failed to open workout storage")?;
    controller.load_persisted();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } | cli::Commands::Paths => {
            unreachable!("handled before the controller is built");
        }
        cli::Commands::Add {
            type_,
            lat,
            lng,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let input = match WorkoutType::from(type_) {
                WorkoutType::Running => {
                    let Some(cadence) = cadence else {
                        bail!("--cadence is required for running workouts");
                    };
                    FormInput::running(&distance, &duration, &cadence)
                }
                WorkoutType::Cycling => {
                    let Some(elevation) = elevation else {
                        bail!("--elevation is required for cycling workouts");
                    };
                    FormInput::cycling(&distance, &duration, &elevation)
                }
            };
            let workout = add_workout(&mut controller, Coords::new(lat, lng), &input)?;
            println!(
                "Logged {} {} (ID: {})",
                workout.icon(),
                workout.description(),
                workout.id()
            );
        }
        cli::Commands::List { sort } => {
            if sort == cli::SortCli::Distance {
                controller.toggle_sort();
            }
            let workouts = controller.display_order();
            if workouts.is_empty() {
                println!("No workouts logged yet.");
            } else {
                print_workout_table(&workouts, Color::Cyan);
            }
        }
        cli::Commands::Show { id } => match controller.workout(&id) {
            Some(workout) => print_workout_details(workout),
            None => bail!("Workout '{}' not found.", id),
        },
        cli::Commands::Delete { id } => {
            let Some(removed) = controller.edit_workout(&id) else {
                bail!("Error deleting workout: no workout with ID '{}'.", id);
            };
            // Closing the reopened form leaves the workout deleted.
            controller.cancel_form();
            println!("Deleted {} (ID: {}).", removed.description(), removed.id());
        }
        cli::Commands::Reset { yes } => {
            let count = controller.workouts().len();
            if count == 0 {
                println!("Nothing to reset.");
                return Ok(());
            }
            if !yes && !confirm(&format!("Delete all {count} workout(s)?"))? {
                println!("Reset cancelled.");
                return Ok(());
            }
            controller.reset();
            println!("Deleted {count} workout(s).");
        }
        cli::Commands::Export { csv } => {
            if csv {
                write_workouts_csv(controller.workouts())?;
            } else {
                let json = serde_json::to_string_pretty(controller.workouts())
                    .context("Failed to serialize workouts")?;
                println!("{json}");
            }
        }
    }

    Ok(())
}

/// Goes through the same path as a map click followed by a form submit.
fn add_workout(controller: &mut CliController, at: Coords, input: &FormInput) -> Result<Workout> {
    controller.show_form(at);
    let result = controller.submit_form(input);
    let alerts = controller.view_mut().take_alerts();
    match result {
        Ok(workout) => Ok(workout),
        Err(e) => match alerts.last() {
            Some(alert) => bail!("{alert} ({e})"),
            None => bail!("Error adding workout: {e}"),
        },
    }
}

/// Default level shows warnings only; each `-v` raises it, each `-q` lowers it.
/// `RUST_LOG` overrides everything.
fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        3..=i16::MAX => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("warn,mapty={level},mapty_lib={level}"))
    });

    let show_src = matches!(level, "debug" | "trace");

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prints workouts in a formatted table, in the order given.
fn print_workout_table(workouts: &[&Workout], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Distance (km)").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Pace / Speed").fg(header_color),
            Cell::new("Cadence / Elev.").fg(header_color),
            Cell::new("Location").fg(header_color),
        ]);

    for workout in workouts {
        let entry = ListEntry::from(*workout);
        // Rows 2 and 3 are the variant-specific ones.
        let detail = |index: usize| {
            entry
                .details
                .get(index)
                .map(|row| format!("{} {}", row.value, row.unit))
                .unwrap_or_default()
        };
        let coords = workout.coords();
        table.add_row(vec![
            Cell::new(workout.id()),
            Cell::new(
                workout
                    .created_at()
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            Cell::new(format!("{} {}", workout.icon(), workout.workout_type())),
            Cell::new(workout.distance_km()),
            Cell::new(workout.duration_min()),
            Cell::new(detail(2)),
            Cell::new(detail(3)),
            Cell::new(format!("{:.4}, {:.4}", coords.lat, coords.lng)),
        ]);
    }
    println!("{table}");
}

fn print_workout_details(workout: &Workout) {
    let entry = ListEntry::from(workout);
    let coords = workout.coords();
    println!("{}", entry.title);
    println!("  ID:       {}", workout.id());
    println!(
        "  Created:  {}",
        workout.created_at().with_timezone(&Local).to_rfc2822()
    );
    println!("  Location: {}, {}", coords.lat, coords.lng);
    for row in &entry.details {
        println!("  {} {} {}", row.icon, row.value, row.unit);
    }
}

fn write_workouts_csv(workouts: &[Workout]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "Id",
        "Created_Local",
        "Type",
        "Latitude",
        "Longitude",
        "Distance_km",
        "Duration_min",
        "Cadence_spm",
        "Pace_min_per_km",
        "Elevation_gain_m",
        "Speed_km_per_h",
        "Description",
    ])?;

    for workout in workouts {
        let (cadence, pace, elevation, speed) = match *workout.kind() {
            WorkoutKind::Running {
                cadence_spm,
                pace_min_per_km,
            } => (
                cadence_spm.to_string(),
                format!("{pace_min_per_km:.2}"),
                String::new(),
                String::new(),
            ),
            WorkoutKind::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (
                String::new(),
                String::new(),
                elevation_gain_m.to_string(),
                format!("{speed_km_per_h:.2}"),
            ),
        };
        let coords = workout.coords();
        writer.write_record([
            workout.id().to_string(),
            workout.created_at().with_timezone(&Local).to_rfc3339(),
            workout.workout_type().to_string(),
            coords.lat.to_string(),
            coords.lng.to_string(),
            workout.distance_km().to_string(),
            workout.duration_min().to_string(),
            cadence,
            pace,
            elevation,
            speed,
            workout.description().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

impl From<cli::WorkoutTypeCli> for WorkoutType {
    fn from(value: cli::WorkoutTypeCli) -> Self {
        match value {
            cli::WorkoutTypeCli::Running => Self::Running,
            cli::WorkoutTypeCli::Cycling => Self::Cycling,
        }
    }
}
