// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Figrelay CLI entrypoint.
//!
//! Binds the relay on `127.0.0.1:<port>` (default 3055) and serves the agent SSE surface at
//! `/sse` + `/messages` and the plugin WebSocket at `/plugin`.

use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use figrelay::bridge::BridgeServer;
use figrelay::config::{Config, DEFAULT_PORT, PORT_ENV, TOKEN_ENV};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--port <port>] [--figma-token <token>]\n\nServes the agent SSE endpoint at `http://127.0.0.1:<port>/sse` and the plugin WebSocket\nat `ws://127.0.0.1:<port>/plugin` (default port {DEFAULT_PORT}).\n\n--port falls back to the {PORT_ENV} environment variable, --figma-token to {TOKEN_ENV}.\nWithout a token, `figma.getFile` is refused; everything else still works."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    port: Option<u16>,
    figma_token: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            "--figma-token" => {
                if options.figma_token.is_some() {
                    return Err(());
                }
                let token = args.next().ok_or(())?;
                options.figma_token = Some(token);
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "figrelay".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("figrelay=info")),
            )
            .init();

        let config = Config::resolve(options.port, options.figma_token)?;
        if config.figma_token.is_none() {
            info!("no Figma access token configured; figma.getFile will be refused");
        }

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let server = Arc::new(BridgeServer::new(&config));
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
            info!(addr = %listener.local_addr()?, "figrelay listening");

            let sessions = Arc::clone(server.sessions());
            axum::serve(listener, Arc::clone(&server).router())
                .with_graceful_shutdown(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("shutdown signal received; closing sessions");
                        sessions.clear();
                    }
                })
                .await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("figrelay: {err}");
        std::process::exit(1);
    }
}
