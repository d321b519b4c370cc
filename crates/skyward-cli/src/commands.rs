//! CLI command implementations.

use std::sync::Arc;

use skyward_bench::metrics::FlightMetrics;
use skyward_bench::runner::BatchRunner;
use skyward_bench::scenarios::ScenarioKind;
use skyward_rocket::{presets, Rocket};
use skyward_sim::{BranchOutcome, FlightData, FlightDataSnapshot, FlightDataType, Simulation, SimulationOptions};
use skyward_telemetry::{EventBus, TelemetryListener, TracingSink};
use tracing::{debug, warn};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Channels written by `simulate --csv`.
const CSV_CHANNELS: [FlightDataType; 14] = [
    FlightDataType::Time,
    FlightDataType::Altitude,
    FlightDataType::VelocityZ,
    FlightDataType::VelocityTotal,
    FlightDataType::AccelerationTotal,
    FlightDataType::LateralDistance,
    FlightDataType::Thrust,
    FlightDataType::Mass,
    FlightDataType::CgLocation,
    FlightDataType::CpLocation,
    FlightDataType::Stability,
    FlightDataType::AngleOfAttack,
    FlightDataType::Mach,
    FlightDataType::TimeStep,
];

fn load_rocket(source: &str) -> Result<Rocket, Box<dyn std::error::Error>> {
    if let Some(rocket) = presets::by_name(source) {
        debug!(preset = source, "using preset rocket");
        return Ok(rocket);
    }
    if source.ends_with(".toml") {
        debug!(path = source, "loading rocket file");
        let text = std::fs::read_to_string(source)?;
        return Ok(Rocket::from_toml_str(&text)?);
    }
    Err(format!("Unknown rocket: '{source}'. Available presets: {}", presets::NAMES.join(", ")).into())
}

fn load_options(path: Option<&str>) -> Result<SimulationOptions, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SimulationOptions::from_toml_str(&std::fs::read_to_string(path)?)?),
        None => Ok(SimulationOptions::default()),
    }
}

fn print_summary(data: &FlightData) {
    println!("Apogee:          {:.2} m at {:.2} s", data.max_altitude(), data.time_to_apogee());
    println!("Max velocity:    {:.2} m/s", data.max_velocity());
    println!("Max accel:       {:.2} m/s²", data.max_acceleration());
    println!("Deploy velocity: {:.2} m/s", data.deployment_velocity());
    println!("Ground hit:      {:.2} m/s", data.ground_hit_velocity());
    println!("Flight time:     {:.2} s", data.flight_time());
    println!();

    for (branch, outcome) in data.branches().iter().zip(data.outcomes()) {
        let outcome = match outcome {
            BranchOutcome::Completed => "completed".to_string(),
            BranchOutcome::Aborted(cause) => format!("aborted: {cause}"),
            BranchOutcome::Failed(e) => format!("failed: {e}"),
        };
        println!("Branch '{}' ({} samples, {outcome})", branch.name(), branch.len());
        for event in branch.events() {
            println!("  {:>8.3} s  {}", event.time, event.kind);
        }
    }

    if !data.warnings().is_empty() {
        println!();
        println!("Warnings:");
        for warning in data.warnings().iter() {
            println!("  - {warning}");
        }
    }
}

/// Simulate a rocket and print a flight summary.
pub fn simulate(
    rocket_source: &str,
    options_path: Option<&str>,
    snapshot_path: Option<&str>,
    csv_path: Option<&str>,
    telemetry: bool,
) -> CommandResult {
    println!("Skyward Simulation");
    println!("──────────────────");

    let rocket = load_rocket(rocket_source)?;
    let options = load_options(options_path)?;
    println!("Rocket:  {} ({} stages)", rocket.name, rocket.stage_count());
    println!("Options: dt={} s, wind {} m/s", options.time_step, options.wind_average);
    println!();

    let rocket_name = rocket.name.clone();
    let mut simulation = Simulation::from_options(Arc::new(rocket), &options)?;

    let mut bus = EventBus::new();
    if telemetry {
        bus.add_sink(Box::new(TracingSink::new()));
        simulation.add_listener(Arc::new(TelemetryListener::new(bus.sender())));
    }

    let result = simulation.simulate();
    bus.finalize();
    if let Err(e) = &result {
        warn!(error = %e, "simulation failed, reporting partial data");
    }

    let data = simulation.flight_data().cloned().unwrap_or_default();
    print_summary(&data);

    if let Some(path) = csv_path {
        let csv: Vec<String> = data.branches().iter().map(|b| b.to_csv(&CSV_CHANNELS)).collect();
        std::fs::write(path, csv.join("\n"))?;
        println!();
        println!("CSV written to: {path}");
    }
    if let Some(path) = snapshot_path {
        FlightDataSnapshot::new(rocket_name, options, data).save(path)?;
        println!("Snapshot written to: {path}");
    }

    result?;
    Ok(())
}

/// Run benchmark scenarios.
pub fn benchmark(scenario_name: &str, seeds: u64, output_path: Option<&str>) -> CommandResult {
    println!("Skyward Benchmark Suite");
    println!("═══════════════════════");
    println!();

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        let kind = ScenarioKind::from_name(scenario_name).ok_or_else(|| {
            let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
            format!("Unknown scenario: '{scenario_name}'. Available: {}, all", available.join(", "))
        })?;
        vec![kind]
    };
    let seeds: Vec<u64> = (0..seeds.max(1)).collect();

    let metrics = BatchRunner::run_many(&kinds, &seeds).map_err(|e| format!("Benchmark failed: {e}"))?;
    for m in &metrics {
        println!(
            "{:<14} seed {:<3} apogee {:>8.2} m  flight {:>7.2} s  branches {}  wall {:>7.2} ms",
            m.scenario,
            m.seed,
            m.apogee,
            m.flight_time,
            m.branches,
            m.wall_time * 1000.0
        );
    }
    println!();

    let csv = FlightMetrics::to_csv(&metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }
    Ok(())
}

/// Inspect a results snapshot.
pub fn inspect(path: &str) -> CommandResult {
    println!("Skyward Snapshot Inspector");
    println!("──────────────────────────");
    println!();

    let snapshot = FlightDataSnapshot::load(path).map_err(|e| format!("Failed to read snapshot: {e}"))?;
    println!("Rocket:    {}", snapshot.rocket);
    println!("Time step: {} s", snapshot.options.time_step);
    println!("Seed:      {}", snapshot.options.random_seed);
    println!("Branches:  {}", snapshot.data.branch_count());
    println!();
    print_summary(&snapshot.data);
    Ok(())
}

/// Validate a rocket or an options file.
pub fn validate(path: &str) -> CommandResult {
    println!("Skyward Validator");
    println!("─────────────────");
    println!();

    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    if table.contains_key("stages") {
        println!("Validating rocket: {path}");
        let rocket = Rocket::from_toml_str(&content)?;
        println!("✅ Rocket '{}' is valid ({} stages).", rocket.name, rocket.stage_count());
    } else {
        println!("Validating options: {path}");
        SimulationOptions::from_toml_str(&content)?;
        println!("✅ Options are valid.");
    }
    Ok(())
}
