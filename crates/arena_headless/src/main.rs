//! Headless arena combat runner.
//!
//! Resolves encounters from the command line, without graphics.
//! Designed for balance sweeps, CI determinism checks and AI agents.
//!
//! # Usage
//!
//! ```bash
//! # Resolve one scenario and print the combat log
//! cargo run -p arena_headless -- run --scenario assets/scenarios/goblin_ambush.ron
//!
//! # Run a batch balance test
//! cargo run -p arena_headless -- batch --scenario assets/scenarios/goblin_ambush.ron --count 1000 --output results/batch.json
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --seed 12345 --runs 5
//!
//! # Check template data
//! cargo run -p arena_headless -- validate
//!
//! # Play side A over JSON lines
//! cargo run -p arena_headless -- play
//! ```
//!
//! # Protocol
//!
//! `play` reads JSON commands on stdin and writes JSON responses on stdout.
//! Logs always go to stderr. See the protocol module for the format.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arena_core::combatant::Side;
use arena_core::config::RuleSet;
use arena_core::data::TemplateLibrary;
use arena_core::rng::SeededRandom;
use arena_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    render::CombatLog,
    runner::{PlaySession, SessionConfig},
    scenario::Scenario,
    template_loader::{default_data_dir, load_directory, load_rules, load_templates},
};

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless turn-based combat runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory holding `templates/` and `rules.ron`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Rule constants file (defaults to `<data-dir>/rules.ron`)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlayerSide {
    A,
    B,
}

impl From<PlayerSide> for Side {
    fn from(side: PlayerSide) -> Self {
        match side {
            PlayerSide::A => Self::A,
            PlayerSide::B => Self::B,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single encounter with AI on both sides
    Run {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed (defaults to the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON instead of a combat log
        #[arg(long)]
        json: bool,

        /// Save the binary report to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Run a batch of encounters for balance testing
    Batch {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of encounters to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output JSON file for results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Load every template file and report problems
    Validate,

    /// Play one side over JSON lines on stdin/stdout
    Play {
        /// Scenario file to load (defaults to the built-in duel)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed (defaults to the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Side controlled over stdin
        #[arg(long, value_enum, default_value = "a")]
        side: PlayerSide,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for output)
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let data_dir = resolve_data_dir(cli.data_dir);
    let rules_path = cli.rules.unwrap_or_else(|| data_dir.join("rules.ron"));

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            json,
            save,
        }) => {
            let (library, rules) = load_context(&data_dir, &rules_path);
            cmd_run(&library, &rules, scenario, seed, json, save);
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            seed,
            output,
        }) => {
            let (library, rules) = load_context(&data_dir, &rules_path);
            cmd_batch(&library, &rules, scenario, count, parallel, seed, output);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            let (library, rules) = load_context(&data_dir, &rules_path);
            cmd_verify(&library, &rules, scenario, seed, runs);
        }
        Some(Commands::Validate) => cmd_validate(&data_dir, &rules_path),
        Some(Commands::Play {
            scenario,
            seed,
            side,
        }) => {
            let (library, rules) = load_context(&data_dir, &rules_path);
            cmd_play(&library, &rules, scenario, seed, side.into());
        }
        None => {
            // Default: play the built-in duel
            let (library, rules) = load_context(&data_dir, &rules_path);
            cmd_play(&library, &rules, None, None, Side::A);
        }
    }
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.or_else(default_data_dir).unwrap_or_else(|| {
        eprintln!("No data directory found; pass --data-dir or set ARENA_DATA_DIR");
        std::process::exit(1);
    })
}

fn load_context(data_dir: &Path, rules_path: &Path) -> (TemplateLibrary, RuleSet) {
    let library = load_templates(&data_dir.join("templates")).unwrap_or_else(|e| {
        eprintln!("Failed to load templates: {e}");
        std::process::exit(1);
    });
    let rules = load_rules(rules_path).unwrap_or_else(|e| {
        eprintln!("Failed to load rules: {e}");
        std::process::exit(1);
    });
    (library, rules)
}

fn load_scenario(path: Option<PathBuf>) -> Scenario {
    let Some(path) = path else {
        return Scenario::duel();
    };
    Scenario::load(&path).unwrap_or_else(|e| {
        eprintln!("Failed to load scenario {}: {e}", path.display());
        std::process::exit(1);
    })
}

/// Resolve one encounter and print it
fn cmd_run(
    library: &TemplateLibrary,
    rules: &RuleSet,
    scenario: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
    save: Option<PathBuf>,
) {
    let scenario = load_scenario(scenario);
    let seed = seed.unwrap_or(scenario.seed);
    tracing::info!("Running '{}' with seed {}", scenario.name, seed);

    let mut encounter = scenario
        .build(library, rules, SeededRandom::new(seed))
        .unwrap_or_else(|e| {
            eprintln!("Failed to build encounter: {e}");
            std::process::exit(1);
        });
    let log = CombatLog::new(encounter.roster());
    let report = encounter
        .run(&mut arena_core::ai::AiController)
        .unwrap_or_else(|e| {
            eprintln!("Encounter failed: {e}");
            std::process::exit(1);
        });

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", log.render(&report));
    }

    if let Some(path) = save {
        if let Err(e) = report.save(&path) {
            eprintln!("Failed to save report: {e}");
            std::process::exit(1);
        }
        tracing::info!("Report saved to {}", path.display());
    }
}

/// Run batch of encounters for balance testing
fn cmd_batch(
    library: &TemplateLibrary,
    rules: &RuleSet,
    scenario: Option<PathBuf>,
    count: u32,
    parallel: u32,
    seed: u64,
    output: Option<PathBuf>,
) {
    let config = BatchConfig::new(load_scenario(scenario), count)
        .with_seed(seed)
        .with_parallel(parallel);
    let results = run_batch(config, library, rules);
    let summary = &results.summary;

    println!("Encounters: {}", summary.total);
    println!(
        "Side A: {} wins ({:.1}%)",
        summary.wins_a,
        summary.win_rate_a * 100.0
    );
    println!(
        "Side B: {} wins ({:.1}%)",
        summary.wins_b,
        summary.win_rate_b * 100.0
    );
    println!("Draws:  {}", summary.draws);
    println!(
        "Rounds: avg {:.1}, min {}, max {}",
        summary.avg_rounds, summary.min_rounds, summary.max_rounds
    );
    if !summary.skill_uses.is_empty() {
        println!("Skill uses:");
        for (skill, uses) in &summary.skill_uses {
            println!("  {skill:<20} {uses}");
        }
    }
    if !results.errors.is_empty() {
        eprintln!("{} encounters failed", results.errors.len());
    }

    if let Some(path) = output {
        if let Err(e) = results.save(&path) {
            eprintln!("Failed to save results: {e}");
            std::process::exit(1);
        }
        tracing::info!("Results saved to {}", path.display());
    }

    if !results.errors.is_empty() {
        std::process::exit(1);
    }
}

/// Verify determinism
fn cmd_verify(
    library: &TemplateLibrary,
    rules: &RuleSet,
    scenario: Option<PathBuf>,
    seed: u64,
    runs: u32,
) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, library, rules, seed, runs) {
        Ok(true) => eprintln!("PASS: All {runs} runs produced identical reports"),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Encounter failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Load every template file and report problems
fn cmd_validate(data_dir: &Path, rules_path: &Path) {
    let mut ok = true;

    match load_directory(&data_dir.join("templates")) {
        Ok(summary) => {
            println!(
                "{} files, {} skills, {} combatants",
                summary.loaded.len(),
                summary.library.skill_count(),
                summary.library.combatant_count()
            );
            for failure in &summary.failed {
                println!("FAIL {}: {}", failure.path.display(), failure.message);
                ok = false;
            }
            if let Err(e) = summary.library.check_references() {
                println!("FAIL references: {e}");
                ok = false;
            }
        }
        Err(e) => {
            println!("FAIL templates: {e}");
            ok = false;
        }
    }

    match load_rules(rules_path) {
        Ok(_) => println!("rules: ok"),
        Err(e) => {
            println!("FAIL rules: {e}");
            ok = false;
        }
    }

    if !ok {
        std::process::exit(1);
    }
}

/// Play one side over stdin/stdout
fn cmd_play(
    library: &TemplateLibrary,
    rules: &RuleSet,
    scenario: Option<PathBuf>,
    seed: Option<u64>,
    side: Side,
) {
    let scenario = load_scenario(scenario);
    let seed = seed.unwrap_or(scenario.seed);
    let encounter = scenario
        .build(library, rules, SeededRandom::new(seed))
        .unwrap_or_else(|e| {
            eprintln!("Failed to build encounter: {e}");
            std::process::exit(1);
        });

    let mut session = PlaySession::new(
        encounter,
        SessionConfig {
            scenario: scenario.name.clone(),
            seed,
            player_side: side,
        },
    );
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = session.run(&mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("Session failed: {e}");
        std::process::exit(1);
    }
}
