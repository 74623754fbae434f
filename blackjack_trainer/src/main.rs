use blackjack_trainer::prelude::*;
use blackjack_trainer::write::write_table;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{warn, Level};

/// Terminal blackjack trainer with running counts and live win/push estimates.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of decks in the shoe
    #[arg(long, default_value_t = 5)]
    decks: usize,

    /// Chips the player starts with
    #[arg(long, default_value_t = 1000)]
    chips: u32,

    /// Monte-Carlo trials per estimate
    #[arg(long)]
    trials: Option<u32>,

    /// Fix the random seed for reproducible shoes and estimates
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl From<&Args> for TrainerConfig {
    fn from(args: &Args) -> Self {
        let mut builder = TrainerConfig::new();
        builder.num_decks(args.decks).starting_chips(args.chips);
        if let Some(trials) = args.trials {
            builder.num_trials(trials);
        }
        if let Some(seed) = args.seed {
            builder.seed(seed);
        }
        builder.build()
    }
}

const HELP: &str = "commands: bet <n>, hit, stand, deck (reshuffle), new (new game), quit";

fn main() -> io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let mut session = GameSession::new(TrainerConfig::from(&args));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", HELP)?;
    write_table(&mut out, &session.snapshot())?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let result = match words.next() {
            Some("bet") => {
                let amount = words.next().unwrap_or("");
                parse_bet(amount).and_then(|amount| session.confirm_bet(amount))
            }
            Some("hit") => session.hit(),
            Some("stand") => session.stand(),
            Some("deck") => {
                session.reset_deck();
                Ok(())
            }
            Some("new") => {
                session.start_game();
                Ok(())
            }
            Some("quit") | Some("exit") => break,
            Some(_) => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            None => continue,
        };

        if let Err(e) = result {
            if !e.is_user_error() {
                warn!("{}", e);
            }
            writeln!(out, "{}", e)?;
            continue;
        }
        write_table(&mut out, &session.snapshot())?;
    }
    Ok(())
}
