// event_generator_main.rs
use intersection_controller::constants::EVENT_FILE;
use intersection_controller::generator::{generate_events, write_events, TrafficPattern};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process;
use std::str::FromStr;

const USAGE: &str = "Usage: event_generator_main [output] [events] [seed]";

/// A missing argument is `None`; one that is present must parse.
fn parse_arg<T: FromStr>(arg: Option<String>, name: &str) -> Result<Option<T>, String> {
    arg.map(|value| {
        value
            .parse()
            .map_err(|_| format!("Invalid {} '{}'", name, value))
    })
    .transpose()
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| EVENT_FILE.to_string());
    let parsed = parse_arg::<usize>(args.next(), "event count")
        .and_then(|events| Ok((events.unwrap_or(20), parse_arg::<u64>(args.next(), "seed")?)));
    let (events, seed) = match parsed {
        Ok(parsed) => parsed,
        Err(message) => {
            log::warn!("{}", message);
            eprintln!("{}\n{}", message, USAGE);
            process::exit(2);
        }
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let pattern = TrafficPattern {
        events,
        ..TrafficPattern::default()
    };
    let generated = generate_events(&mut rng, &pattern);

    if let Err(e) = write_events(&output, &generated) {
        eprintln!("Error writing {}: {}", output, e);
        process::exit(1);
    }
    println!("Wrote {} events to {}", generated.len(), output);
}
