//! roomdial — scripted end-to-end demo of the tuning engine.
//!
//! Selects the seed artists given on the command line, then replays a short
//! tuning session (wheel ticks, a drag, a landing) and prints the station
//! window and room list the engine settles on.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use room_feed::orchestrator::RoomOrchestrator;
use room_feed::{Artist, ArtistPools, AudioScrobblerClient};
use tuner_core::cache::FeedEngine;
use tuner_core::config::Config;
use tuner_core::dial::{DialAction, DialController, DialEvent};
use tuner_core::feed::{frequency_points, FeedGenerator};
use tuner_core::params::{Axis, ParameterState};
use tuner_core::timer::IdleTimer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = dirs::data_dir()
        .map(|p| p.join("roomdial"))
        .unwrap_or_else(|| std::env::temp_dir().join("roomdial"));
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("roomdial.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();
    eprintln!("roomdial log: {}", log_path.display());

    tracing::info!("roomdial starting…");

    let config = Config::load().unwrap_or_default();
    let api_key = std::env::var("ROOMDIAL_API_KEY").unwrap_or_else(|_| config.api.api_key.clone());

    let seed_names: Vec<String> = std::env::args().skip(1).collect();
    if seed_names.is_empty() {
        eprintln!("usage: roomdial <seed artist> [<seed artist> ...]");
        std::process::exit(2);
    }
    let seeds: Vec<Artist> = seed_names.iter().map(|n| Artist::named(n)).collect();

    // ── Station feed engine ──────────────────────────────────────────────────
    let mut rng = StdRng::from_entropy();
    let mut feed = FeedEngine::new(
        FeedGenerator::new(StdRng::from_entropy(), config.feed.window_size),
        IdleTimer::new(config.engine.feed_idle()),
    );
    feed.set_band_frequencies(frequency_points(
        Axis::Similarity,
        config.feed.frequency_count,
        config.feed.min_separation,
        &mut rng,
    ));

    // ── Room orchestrator ────────────────────────────────────────────────────
    let client = AudioScrobblerClient::new(config.api.base_url.clone(), api_key);
    let pools = ArtistPools::new(
        client,
        Duration::from_millis(config.api.throttle_min_ms),
        Duration::from_millis(config.api.throttle_max_ms),
        config.api.random_pool_size,
    );
    let mut orchestrator = RoomOrchestrator::new(
        pools,
        StdRng::from_entropy(),
        config.engine.room_debounce(),
        config.feed.window_size,
    );

    println!("loading artist pools for {:?}…", seed_names);
    orchestrator.select_artists(seeds).await;
    if let Some(err) = orchestrator.error() {
        eprintln!("warning: {}", err);
    }

    // ── Scripted tuning session ──────────────────────────────────────────────
    let mut dial = DialController::new((160.0, 160.0), Axis::Volume.min(), Axis::Volume.max(), 1600);
    let mut params = ParameterState::default();
    let now = Instant::now();

    let script = [
        DialEvent::Click,
        DialEvent::Wheel { delta_y: -1.0 },
        DialEvent::Wheel { delta_y: -1.0 },
        DialEvent::Press { x: 220.0, y: 160.0 },
        DialEvent::Move { x: 220.0, y: 200.0 },
        DialEvent::Release,
        DialEvent::Click, // land
    ];
    let mut landed = None;
    for (i, event) in script.iter().enumerate() {
        let at = now + Duration::from_millis(i as u64 * 120);
        for action in dial.handle_event(*event) {
            match action {
                DialAction::ValueChanged(v) => {
                    params.set_value(Axis::Volume, v);
                    feed.set_params(params, None, at);
                    orchestrator.handle_volume_change(v, None, false, at);
                }
                DialAction::Committed(v) => {
                    landed = Some(v);
                    params.set_value(Axis::Volume, v);
                    feed.set_params(params, landed, at);
                    orchestrator.handle_volume_change(v, None, true, at);
                }
                DialAction::ArmedChanged(armed) => {
                    tracing::debug!("dial armed: {}", armed);
                }
            }
        }
    }

    // Let both debounce windows elapse.
    let settle = now + Duration::from_secs(3);
    if let Some(window) = feed.poll(settle) {
        println!("\nstations near volume {}:", params.volume);
        for st in window.iter() {
            println!(
                "  {:<14} vol={:<5} sim={:<5} {} listening",
                st.name, st.volume, st.similarity, st.listeners
            );
        }
    }
    orchestrator.poll(settle);

    println!("\nrooms:");
    for room in orchestrator.rooms() {
        let marker = if room.is_target_room { "*" } else { " " };
        let artists: Vec<&str> = room.artists.iter().map(|a| a.name.as_str()).collect();
        println!(
            " {} {:<16} vol={:<5} sim={:<5} [{}]",
            marker,
            room.name,
            room.volume,
            room.similarity,
            artists.join(", ")
        );
    }

    Ok(())
}
