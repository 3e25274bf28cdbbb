use std::process;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use sketchbook::{
    config::SketchConfig,
    player::{
        simulate::{Script, Simulator},
        Player,
    },
    sketches::SketchKind,
    types::TerminalContract,
};

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const LIST_USAGE: &str = "sketchbook list";
const PLAY_USAGE: &str = "sketchbook play <sketch>";
const SIMULATE_USAGE: &str = "sketchbook simulate <sketch> [seconds] [--still]";

/// Terminal size assumed by headless runs.
const SIMULATE_CONTRACT: TerminalContract = TerminalContract {
    width: 80,
    height: 30,
};
const DEFAULT_SIMULATE_SECONDS: f64 = 30.0;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("list") => {
            list();
            Ok(())
        }
        Some("play") => {
            let name = args.next().context(PLAY_USAGE)?;
            play(&name)
        }
        Some("simulate") => {
            let name = args.next().context(SIMULATE_USAGE)?;
            let mut seconds = DEFAULT_SIMULATE_SECONDS;
            let mut still = false;
            for arg in args {
                match arg.as_str() {
                    "--still" => still = true,
                    value => {
                        seconds = value
                            .parse()
                            .with_context(|| format!("Invalid duration `{value}`"))?;
                    }
                }
            }
            simulate(&name, seconds, still)
        }
        _ => bail!(
            "Sketchbook: numeral sketches in the terminal\n\nUsage:\n  {LIST_USAGE}\n  {PLAY_USAGE}\n  {SIMULATE_USAGE}"
        ),
    }
}

fn parse_kind(name: &str) -> Result<SketchKind> {
    name.parse::<SketchKind>()
        .with_context(|| format!("Cannot run sketch `{name}`"))
}

fn list() {
    for kind in SketchKind::ALL {
        println!("{:<6} {}", kind.name(), kind.description());
    }
}

fn play(name: &str) -> Result<()> {
    let kind = parse_kind(name)?;
    let config = SketchConfig::load();
    Player::new(kind, config).play()
}

fn simulate(name: &str, seconds: f64, still: bool) -> Result<()> {
    let kind = parse_kind(name)?;
    if !(seconds.is_finite() && seconds > 0.0) {
        bail!("Duration must be a positive number of seconds, got {seconds}");
    }
    let config = SketchConfig::load();
    let dt = config.frame_interval();
    let mut simulator = Simulator::new(kind, &config, SIMULATE_CONTRACT, dt);
    if still {
        simulator = simulator.with_script(Script::new());
    }
    let report = simulator.run(seconds);

    for row in &report.snapshot {
        println!("{}", row.trim_end());
    }
    print!("{report}");
    Ok(())
}
