// traffic_controller_main.rs
use intersection_controller::config::SimulationConfig;
use intersection_controller::error::SimulationError;
use intersection_controller::simulation::run_from_config;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    // Optional JSON config as the only argument; defaults otherwise.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(source) => {
                let err = SimulationError::Config { path, source };
                eprintln!("{}", err);
                process::exit(err.exit_code());
            }
        },
        None => SimulationConfig::default(),
    };

    match run_from_config(&config).await {
        Ok(report) => log::info!(
            "{} vehicles passed in {} phases ({} interrupted)",
            report.controller.vehicles_passed(),
            report.controller.phases.len(),
            report.controller.interruptions()
        ),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(e.exit_code());
        }
    }
}
