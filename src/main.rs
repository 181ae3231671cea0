//! CLI for subfan
//!
//! Subcommands:
//! - `serve`: run a WebSocket publisher; each stdin line `<topic> <payload>` is published
//! - `listen`: connect a subscriber and print every message it accepts

use std::sync::{Arc, Mutex, PoisonError};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use subfan::config::{Settings, load_config};
use subfan::socket::{PubSocket, SubSocket};
use subfan::transport::websocket::{connect_subscriber, start_websocket_server};
use subfan::utils::logging;

#[derive(Parser)]
#[command(name = "subfan")]
enum Command {
    /// Run a WebSocket publisher fed from stdin
    Serve {
        /// Address to bind (default: server.host:server.port from the config)
        #[arg(long)]
        bind: Option<String>,
        /// Deliver to subscribers whose subscriptions do not match
        #[arg(long)]
        invert: bool,
    },
    /// Subscribe to a publisher and print what arrives
    Listen {
        #[arg(long, default_value = "ws://127.0.0.1:5556")]
        url: String,
        /// Topic prefix to subscribe to; repeatable. None subscribes to nothing.
        #[arg(long = "topic")]
        topics: Vec<String>,
        #[arg(long)]
        invert: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&config.log.level);

    let result = match Command::parse() {
        Command::Serve { bind, invert } => run_serve(config, bind, invert).await,
        Command::Listen {
            url,
            topics,
            invert,
        } => run_listen(config, &url, topics, invert).await,
    };
    if let Err(e) = result {
        error!("subfan failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_serve(
    config: Settings,
    bind: Option<String>,
    invert: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = bind.unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));
    let mut socket = PubSocket::new(&config.socket);
    if invert {
        socket.set_invert_matching(true);
    }
    let publisher = Arc::new(Mutex::new(socket));

    let mut server = tokio::spawn({
        let publisher = publisher.clone();
        let send_capacity = config.socket.send_capacity;
        async move { start_websocket_server(&addr, publisher, send_capacity).await }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed, shutting down");
                    break;
                };
                let (topic, payload) = line.split_once(' ').unwrap_or((line.as_str(), ""));
                let report = publisher
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .publish(topic.to_owned(), payload.to_owned());
                debug!(topic, matched = report.matched, delivered = report.delivered, dropped = report.dropped, "published");
            }
            result = &mut server => {
                error!("WebSocket server exited unexpectedly.");
                result??;
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        }
    }

    server.abort();
    Ok(())
}

async fn run_listen(
    config: Settings,
    url: &str,
    topics: Vec<String>,
    invert: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut subscriber = SubSocket::new(&config.socket);
    subscriber.set_invert_matching(invert || config.socket.invert_matching);
    for topic in topics {
        subscriber.subscribe(topic);
    }
    connect_subscriber(url, &mut subscriber).await?;

    loop {
        tokio::select! {
            msg = subscriber.recv() => {
                let Some(msg) = msg else {
                    info!("publisher gone, exiting");
                    break;
                };
                println!(
                    "{} {}",
                    String::from_utf8_lossy(&msg.topic),
                    String::from_utf8_lossy(&msg.payload)
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        }
    }
    Ok(())
}
