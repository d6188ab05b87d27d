//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;
mod http;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{App, Arg};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use frrmon_collector::vtysh::Vtysh;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_ansi(config.file.fmt.colors);
        match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        }
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(config.stdout.fmt.colors);
        match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        }
    });

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("frrmon=info".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stdout)
        .init();
}

fn signal_listener() -> mpsc::Receiver<()> {
    let (signal_tx, signal_rx) = mpsc::channel(1);

    tokio::task::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).unwrap();
        let mut sigterm = signal(SignalKind::terminate()).unwrap();

        tokio::select! {
            _ = sigint.recv() => {
                info!("received SIGINT");
                let _ = signal_tx.send(()).await;
            },
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                let _ = signal_tx.send(()).await;
            }
        }
    });

    signal_rx
}

async fn run(config: Config) {
    // Spawn signal listener.
    let mut signal_rx = signal_listener();

    let state = Arc::new(http::AppState {
        vtysh: Vtysh::new(
            PathBuf::from(&config.vtysh.path),
            config.vtysh.sudo,
            Duration::from_secs(config.vtysh.timeout),
        ),
        protocols: config.collectors.clone(),
        sink_capacity: config.sink_capacity,
    });

    // Serve the telemetry endpoint.
    let listener =
        match tokio::net::TcpListener::bind(&config.listen_address).await {
            Ok(listener) => listener,
            Err(error) => {
                error!(%error, address = %config.listen_address,
                    "failed to bind listen address");
                return;
            }
        };
    info!(address = %config.listen_address, path = %config.telemetry_path,
        "serving telemetry");

    let router = http::router(&config, state);
    let server = axum::serve(listener, router).with_graceful_shutdown(
        async move {
            signal_rx.recv().await;
        },
    );
    if let Err(error) = server.await {
        error!(%error, "HTTP server failed");
    }
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("FRR telemetry exporter")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    // Initialize tracing.
    init_tracing(&config.logging);

    // We're ready to go!
    info!("starting up");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime")
        .block_on(async {
            run(config).await;
        });

    info!("exiting");
}
