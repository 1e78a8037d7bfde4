use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing::Level;

use crate::career::career_table;
use crate::display::{
    band_table, batch_table, event_line, exit_style, hand_line, money, print_error,
    print_section, print_success, signed_money, strategy_line, summary_table, tier_table,
};
use crate::ensemble::{run_ensemble, run_session_batch};
use crate::error::SimResult;
use crate::profile::Profile;
use crate::rng::SeededDraw;
use crate::session::run_session_traced;
use crate::state::SessionPlan;
use crate::tiers::{tier_for_bankroll, TierMode};

#[derive(Parser)]
#[command(
    name = "stratsim",
    version = "1.0.0",
    about = "Baccarat and roulette strategy simulator: sessions, careers, and Monte Carlo bands."
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of independent sessions at one bankroll
    Session {
        /// Stored profile to use (default strategy if omitted)
        #[arg(short, long)]
        profile: Option<String>,
        /// Starting bankroll for every session
        #[arg(short, long, default_value_t = 2000.0)]
        bankroll: f64,
        /// Number of sessions
        #[arg(short, long, default_value_t = 1000)]
        runs: usize,
        /// Base seed (random if omitted)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the hand-by-hand trace of one session instead
        #[arg(long)]
        trace: bool,
    },
    /// Run an ensemble of careers and print percentile bands
    Career {
        #[arg(short, long)]
        profile: Option<String>,
        /// Override the profile's starting bankroll
        #[arg(short, long)]
        bankroll: Option<f64>,
        #[arg(short, long, default_value_t = 500)]
        runs: usize,
        #[arg(short, long)]
        seed: Option<u64>,
        /// Override the profile's career length
        #[arg(short, long)]
        years: Option<u32>,
        /// Print the event log of the first trajectory
        #[arg(long)]
        events: bool,
    },
    /// Show the bankroll tier table
    Tiers {
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Manage stored profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Write a default profile
    Init {
        name: String,
        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },
    /// Print a stored profile as JSON
    Show { name: String },
    /// List stored profiles
    List,
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

pub fn run_with_args(args: Vec<String>) -> SimResult<()> {
    let cli = Cli::parse_from(args);
    dispatch(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed when called more than once in-process.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(cli: Cli) -> SimResult<()> {
    init_logging(cli.verbose);
    match cli.command {
        Commands::Session {
            profile,
            bankroll,
            runs,
            seed,
            trace,
        } => {
            if trace {
                cmd_session_trace(profile, bankroll, seed)
            } else {
                cmd_session(profile, bankroll, runs, seed)
            }
        }
        Commands::Career {
            profile,
            bankroll,
            runs,
            seed,
            years,
            events,
        } => cmd_career(profile, bankroll, runs, seed, years, events),
        Commands::Tiers { profile } => cmd_tiers(profile),
        Commands::Profile { action } => match action {
            ProfileAction::Init { name, force } => cmd_profile_init(name, force),
            ProfileAction::Show { name } => cmd_profile_show(name),
            ProfileAction::List => cmd_profile_list(),
        },
    }
}

fn load_profile(name: Option<String>) -> SimResult<Profile> {
    match name {
        Some(name) => Profile::load(&name),
        None => Ok(Profile::default()),
    }
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

// ---------------------------------------------------------------------------
// session
// ---------------------------------------------------------------------------

fn cmd_session(profile: Option<String>, bankroll: f64, runs: usize, seed: Option<u64>) -> SimResult<()> {
    let profile = load_profile(profile)?;
    let table = career_table(&profile.career)?;
    let tier = tier_for_bankroll(bankroll, &table, None, TierMode::Reactive)?;
    let seed = seed_or_random(seed);

    println!("\n  {}", strategy_line(&profile.strategy));
    println!(
        "  {} bankroll {}  {}  seed {}",
        runs.to_string().bold(),
        money(bankroll),
        tier,
        seed
    );

    let batch = run_session_batch(&profile.strategy, tier, bankroll, runs, seed)?;
    print_section("Sessions", &batch_table(&batch));
    Ok(())
}

fn cmd_session_trace(profile: Option<String>, bankroll: f64, seed: Option<u64>) -> SimResult<()> {
    let profile = load_profile(profile)?;
    let table = career_table(&profile.career)?;
    let tier = tier_for_bankroll(bankroll, &table, None, TierMode::Reactive)?;
    let mut source = match seed {
        Some(seed) => SeededDraw::new(seed),
        None => SeededDraw::from_entropy(),
    };

    println!("\n  {}", strategy_line(&profile.strategy));
    println!("  {}\n", tier);
    let summary = run_session_traced(
        &profile.strategy,
        tier,
        bankroll,
        SessionPlan::Standard,
        &mut source,
        |h| println!("{}", hand_line(h)),
    )?;

    println!(
        "\n  {}  {}  after {} hands, volume {}",
        exit_style(summary.exit),
        signed_money(summary.pnl),
        summary.hands_played,
        money(summary.volume)
    );
    if summary.segment_pnl.len() > 1 {
        let shoes: Vec<String> = summary.segment_pnl.iter().map(|&p| signed_money(p)).collect();
        println!("  shoes: {}", shoes.join("  "));
    }
    if summary.iron_gate_trips > 0 {
        println!(
            "  iron gate tripped {} times, {} virtual hands",
            summary.iron_gate_trips, summary.virtual_hands
        );
    }
    if summary.ties.bets_placed > 0 {
        println!(
            "  tie bets {} for {}",
            summary.ties.bets_placed,
            signed_money(summary.ties.bet_pnl)
        );
    }
    if summary.spice.placed > 0 {
        println!(
            "  side bets {} ({} hits) for {}",
            summary.spice.placed,
            summary.spice.hits,
            signed_money(summary.spice.pnl)
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// career
// ---------------------------------------------------------------------------

fn cmd_career(
    profile: Option<String>,
    bankroll: Option<f64>,
    runs: usize,
    seed: Option<u64>,
    years: Option<u32>,
    events: bool,
) -> SimResult<()> {
    let profile = load_profile(profile)?;
    let mut config = profile.career;
    if let Some(b) = bankroll {
        config.start_bankroll = b;
    }
    if let Some(y) = years {
        config.years = y;
    }
    let seed = seed_or_random(seed);

    println!(
        "\n  {} careers of {} years from {}  seed {}",
        runs.to_string().bold(),
        config.years,
        money(config.start_bankroll),
        seed
    );
    for leg in &config.legs {
        println!("  {}", strategy_line(&leg.overrides));
    }

    let ensemble = run_ensemble(&config, runs, seed)?;
    print_section("Bankroll by year", &band_table(ensemble.yearly_bands()));
    print_section("Summary", &summary_table(&ensemble.summary));

    if events {
        if let Some(first) = ensemble.trajectories.first() {
            let lines: Vec<String> = first.events.iter().map(event_line).collect();
            if lines.is_empty() {
                print_section("Events (run 1)", "  none");
            } else {
                print_section("Events (run 1)", &lines.join("\n"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// tiers / profile
// ---------------------------------------------------------------------------

fn cmd_tiers(profile: Option<String>) -> SimResult<()> {
    let profile = load_profile(profile)?;
    let table = career_table(&profile.career)?;
    print_section("Tiers", &tier_table(table.tiers()));
    Ok(())
}

fn cmd_profile_init(name: String, force: bool) -> SimResult<()> {
    if !force && Profile::list()?.contains(&name) {
        print_error(&format!("profile '{}' exists, use --force to overwrite", name));
        return Ok(());
    }
    let profile = Profile {
        name,
        ..Default::default()
    };
    let path = profile.save()?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}

fn cmd_profile_show(name: String) -> SimResult<()> {
    let profile = Profile::load(&name)?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn cmd_profile_list() -> SimResult<()> {
    let names = Profile::list()?;
    if names.is_empty() {
        println!("  {}", "no profiles stored".dimmed());
    }
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}
