//! devproxy: local development server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http::server ──▶ routing::DevServerRouter  │
//!                             │                        │                      │
//!                             │        ┌───────────────┼───────────────┐      │
//!                             │        ▼               ▼               ▼      │
//!                             │    Rewrite          Forward       Passthrough │
//!                             │  (ServeDir under  (upstream      (static root │
//!                             │   alias target)    client)         or 404)    │
//!     Client Response         │        │               │               │      │
//!     ◀───────────────────────┼────────┴───────────────┴───────────────┘      │
//!                             │                                               │
//!                             │  config · lifecycle · observability           │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use devproxy::config::loader::process_env;
use devproxy::http::DevServer;
use devproxy::lifecycle::{signals, startup, Shutdown, StartupOptions};
use devproxy::observability::{init_logging, metrics, LogFormat};
use devproxy::DevServerRouter;

#[derive(Parser, Debug)]
#[command(name = "devproxy", version, about = "Alias and proxy layer for a local dev server")]
struct Args {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<i64>,

    /// Directory served for requests no rule matches.
    #[arg(long)]
    static_root: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Validate the configuration, print the rule tables and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_format);

    tracing::info!("devproxy v{} starting", env!("CARGO_PKG_VERSION"));

    let options = StartupOptions {
        config_path: args.config,
        port: args.port,
        static_root: args.static_root,
    };
    let config = match startup::build_config(&options, &process_env) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration rejected");
            return Err(e.into());
        }
    };

    tracing::info!(
        listen = %config.listen_addr(),
        aliases = config.aliases.len(),
        proxy_rules = config.proxy_rules.len(),
        static_root = ?config.static_root,
        "Configuration loaded"
    );

    if args.check {
        print_tables(&DevServerRouter::new(&config));
        return Ok(());
    }

    if let Some(addr) = config.observability.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint");
            return Err(e.into());
        }
    }

    let listener = startup::bind(&config).await?;
    let server = DevServer::new(config)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_tables(router: &DevServerRouter) {
    println!("aliases:");
    for (prefix, rule) in router.aliases().iter() {
        println!("  {} -> {}", prefix, rule.replacement.display());
    }
    println!("proxy rules:");
    for (prefix, rule) in router.proxies().iter() {
        println!(
            "  {} -> {} (change_origin: {})",
            prefix, rule.upstream_origin, rule.change_origin
        );
    }
}
