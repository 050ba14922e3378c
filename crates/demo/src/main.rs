use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use tickline::{Link, LinkParams, LogSink, SharedClock, SystemClock};
use tickline_client::{Client, ClientConfig};
use tickline_server::{Server, ServerConfig};

#[derive(Parser)]
#[command(name = "tickline-demo")]
#[command(about = "Runs a server and simulated clients over jittery in-process links")]
struct Args {
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    #[arg(long, default_value_t = 1, help = "How many players move in a circle")]
    circling: usize,

    #[arg(long, default_value_t = 32.0, help = "Average one-way delay in ms")]
    avg_delay: f64,

    #[arg(long, default_value_t = 5.0, help = "Delay spread in ms")]
    spread: f64,

    #[arg(short, long, default_value_t = 10.0, help = "Run time in seconds")]
    seconds: f64,

    #[arg(short, long, default_value_t = tickline::DEFAULT_SERVER_TICK_RATE)]
    tick_rate: u32,

    #[arg(long, default_value_t = tickline::DEFAULT_CLIENT_UPDATE_RATE)]
    client_rate: u32,

    #[arg(long, default_value_t = 60)]
    render_rate: u32,

    #[arg(long, default_value_t = 4, help = "Initial buffer offset in ticks")]
    buffer_offset: u64,

    #[arg(long, help = "Seed for link delays and spawn positions")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let clock: SharedClock = Rc::new(SystemClock::new());
    let params = LinkParams::new(args.avg_delay, args.spread);

    let server_config = ServerConfig {
        tick_rate: args.tick_rate,
        client_update_rate: args.client_rate,
        initial_buffer_offset: args.buffer_offset,
        ..Default::default()
    };
    let client_config = ClientConfig {
        update_rate: args.client_rate,
        render_rate: args.render_rate,
        ..Default::default()
    };

    let diagnostics = Box::new(LogSink);
    let mut server = match args.seed {
        Some(seed) => Server::seeded(server_config, clock.clone(), diagnostics, seed),
        None => Server::new(server_config, clock.clone(), diagnostics),
    };

    let mut clients = Vec::with_capacity(args.players);
    for n in 0..args.players {
        let link = match args.seed {
            Some(seed) => Link::seeded(params, clock.clone(), seed.wrapping_add(n as u64 * 2)),
            None => Link::new(params, clock.clone()),
        };
        let (client_end, server_end) = link.into_parts();

        server
            .attach_player_link(server_end)
            .context("failed to attach player")?;

        let mut client = Client::new(client_config.clone(), client_end, clock.clone());
        if n < args.circling {
            client.start_circling();
        }
        clients.push(client);
    }

    log::info!(
        "{} players over a {} ms ± {} ms link for {:.1} s",
        args.players,
        params.avg_delay_ms,
        params.spread_ms,
        args.seconds
    );

    server.start();

    let run_for = Duration::from_secs_f64(args.seconds.max(0.0));
    let started = Instant::now();
    while started.elapsed() < run_for {
        server.update().context("server update failed")?;
        for client in &mut clients {
            client.update().context("client update failed")?;
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    for client in &mut clients {
        client.shutdown();
    }
    server.shutdown();

    for player in &server.game_state().players {
        let status = server.buffer_status(&player.player_id);
        log::info!(
            "{} ({}) at ({:.1}, {:.1}) {:?}",
            player.player_id,
            player.color.as_str(),
            player.position.x,
            player.position.y,
            status.map(|s| s.stats)
        );
    }
    log::info!("ran {} ticks", server.tick_id());

    Ok(())
}
