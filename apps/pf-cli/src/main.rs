use clap::{Parser, Subcommand};
use pf_app::{AppResult, RunReport, project_service, run_service, sweep};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "PistonFlow CLI - control design for a spring-mass-piston-tank plant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and plant parameters
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Design the gains and simulate a scenario
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Run a scenario once per state-feedback poles gain, in parallel
    Sweep {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Poles gains to try
        #[arg(long = "poles-gain", required = true, num_args = 1..)]
        poles_gain: Vec<f64>,
        /// Print the sweep points as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr so JSON output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            json,
        } => cmd_run(&scenario_path, json),
        Commands::Sweep {
            scenario_path,
            poles_gain,
            json,
        } => cmd_sweep(&scenario_path, &poles_gain, json),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    project_service::validate_scenario(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    Ok(())
}

fn cmd_run(scenario_path: &Path, json: bool) -> AppResult<()> {
    info!(path = %scenario_path.display(), "run requested");
    let report = run_service::run_scenario_file(scenario_path)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn cmd_sweep(scenario_path: &Path, gains: &[f64], json: bool) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    info!(path = %scenario_path.display(), runs = gains.len(), "sweep requested");
    let points = sweep::sweep_poles_gain(&scenario, gains)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("Poles gain sweep for '{}':", scenario.name);
    println!(
        "  {:>12}  {:>14}  {:>14}  {:>14}",
        "poles_gain", "position [m]", "speed [m/s]", "height [m]"
    );
    for point in &points {
        match (&point.final_values, &point.error) {
            (Some(v), _) => {
                let note = point
                    .diverged_at
                    .map(|t| format!("  (diverged at t = {t:.3} s)"))
                    .unwrap_or_default();
                println!(
                    "  {:>12.4}  {:>14.6}  {:>14.6}  {:>14.6}{}",
                    point.poles_gain, v.mass_position, v.mass_speed, v.tank_height, note
                );
            }
            (None, Some(e)) => println!("  {:>12.4}  failed: {}", point.poles_gain, e),
            (None, None) => println!("  {:>12.4}  no result", point.poles_gain),
        }
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Scenario: {}", report.scenario);
    println!("Control law: {}", report.law);

    let flag = |v: Option<bool>| match v {
        Some(true) => "yes",
        Some(false) => "NO",
        None => "not checked",
    };
    println!("Controllable: {}", flag(report.diagnostics.controllable));
    println!("Observable:   {}", flag(report.diagnostics.observable));
    if report.diagnostics.observable_from_position.is_some() {
        println!(
            "Observable from mass position: {}",
            flag(report.diagnostics.observable_from_position)
        );
    }

    if let Some(k) = &report.gains.k {
        println!("K = {}", format_row(k));
    }
    if let Some(n) = report.gains.n {
        println!("N = {n:.6e}");
    }
    if let Some(l) = &report.gains.l {
        println!("L = {}", format_row(l));
    }
    for map in &report.pole_maps {
        println!(
            "Poles for {}: {} -> {}",
            map.gain,
            format_poles(&map.original),
            format_poles(&map.placed)
        );
    }

    let v = &report.final_values;
    println!("Final values at t = {:.3} s:", v.t);
    println!("  mass position: {:.6} m", v.mass_position);
    println!("  mass speed:    {:.6} m/s", v.mass_speed);
    println!("  tank height:   {:.6} m", v.tank_height);
    println!("  input flow:    {:.6e}", v.input_flow);
    if let Some(d) = &report.divergence {
        println!("⚠ Simulation diverged at sample {} (t = {:.3} s)", d.sample, d.t);
    }
}

fn format_row(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6e}")).collect();
    format!("[{}]", parts.join(", "))
}

fn format_poles(poles: &[[f64; 2]]) -> String {
    let parts: Vec<String> = poles
        .iter()
        .map(|[re, im]| format!("{re:.4}{im:+.4}j"))
        .collect();
    format!("[{}]", parts.join(", "))
}
