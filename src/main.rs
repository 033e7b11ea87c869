//! # Infernal Path Command Line
//!
//! Generates the path map for a round, walks the hero along it, and prints the
//! result as text or JSON.

use clap::Parser;
use infernal_path::{GameSession, HeroStep, MapConfig, PathResult};
use log::{info, warn};

/// Command line arguments for the map generator.
#[derive(Parser, Debug)]
#[command(name = "infernal-path")]
#[command(about = "Generate and walk the layered path map of a dungeon keeper round")]
#[command(version)]
struct Args {
    /// Random seed for map generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Round to generate (controls the number of layers)
    #[arg(short, long, default_value_t = infernal_path::config::FIRST_ROUND)]
    round: u32,

    /// Days to let the hero walk after the map is generated
    #[arg(short, long, default_value_t = infernal_path::config::DEFAULT_DAYS_PER_ROUND)]
    days: u32,

    /// JSON file with generation settings
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Print the committed map as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> PathResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Infernal Path v{}", infernal_path::VERSION);

    let config = match &args.config {
        Some(path) => MapConfig::from_json_file(path)?,
        None => MapConfig::default(),
    };
    let seed = args.seed.unwrap_or(infernal_path::config::DEFAULT_SEED);
    info!("Generating map for round {} with seed {}", args.round, seed);

    let mut session = GameSession::new(config, seed)?;
    if args.round != session.round() {
        session.start_round(args.round)?;
    }
    if session.used_fallback() {
        warn!("Round {} is using the fallback chain", session.round());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.map().graph())?);
        return Ok(());
    }

    print_map(&session);
    walk_hero(&mut session, args.days);
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }
}

fn print_map(session: &GameSession) {
    let graph = session.map().graph();
    println!(
        "Round {}: {} layers, {} nodes, {} links",
        session.round(),
        graph.layer_count(),
        graph.nodes.len(),
        graph.links.len()
    );

    for layer in 0..graph.layer_count() {
        let column: Vec<String> = graph
            .layer(layer)
            .into_iter()
            .filter_map(|id| graph.node(id))
            .map(|node| {
                let targets: Vec<String> = graph
                    .successors(node.id)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                format!("{} {:?} y={} -> [{}]", node.id, node.kind, node.y, targets.join(", "))
            })
            .collect();
        println!("  layer {layer}: {}", column.join(" | "));
    }
}

fn walk_hero(session: &mut GameSession, days: u32) {
    for _ in 0..days {
        match session.advance_day() {
            HeroStep::Moved(id) => println!("Day {}: hero moves to {id}", session.day()),
            HeroStep::ReachedCastle(id) => {
                println!("Day {}: hero reaches the castle at {id}", session.day());
                break;
            }
            HeroStep::AlreadyAtCastle => break,
            HeroStep::Stuck => {
                warn!("Hero has nowhere to go on day {}", session.day());
                break;
            }
        }
    }
}
