use actix_web::{web, App, HttpServer};
use blackjack_trainer::api;
use blackjack_trainer::prelude::*;
use clap::Parser;
use std::sync::Mutex;
use tracing::{info, Level};

/// JSON HTTP server for the blackjack trainer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    address: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Number of decks in the shoe
    #[arg(long, default_value_t = 5)]
    decks: usize,

    /// Chips the player starts with
    #[arg(long, default_value_t = 1000)]
    chips: u32,

    /// Monte-Carlo trials per estimate
    #[arg(long)]
    trials: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    // Estimates run off the request path, clients pick them up with GET /table.
    let mut builder = TrainerConfig::new();
    builder
        .num_decks(args.decks)
        .starting_chips(args.chips)
        .estimate_mode(EstimateMode::Background);
    if let Some(trials) = args.trials {
        builder.num_trials(trials);
    }
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }

    let app_session: web::Data<Mutex<GameSession>> =
        web::Data::new(Mutex::new(GameSession::new(builder.build())));

    info!("listening at {}:{}", args.address, args.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_session.clone())
            .configure(api::configure)
    })
    .bind((args.address.as_str(), args.port))?
    .run()
    .await
}
