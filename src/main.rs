//! iplogd: run the address-logging service until interrupted
//!
//! Usage: iplogd [BIND_ADDR]
//!
//! Examples:
//!   iplogd                    # binds to 127.0.0.1:8080
//!   iplogd localhost          # binds to 127.0.0.1:8080
//!   iplogd 127.0.0.1:8099     # binds to 127.0.0.1:8099
//!   iplogd 0.0.0.0:8080       # binds to 0.0.0.0:8080
//!
//! Service logs go to the configured log file (`iplog.log` by default);
//! the retained address set is snapshotted to `ipdata.txt` on shutdown.

use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::Path;

use iplog_rs::{IpServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8080
/// - "localhost:8099" -> 127.0.0.1:8099
/// - "10.0.0.1" -> 10.0.0.1:8080
/// - "10.0.0.1:8099" -> 10.0.0.1:8099
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8080;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: iplogd [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 127.0.0.1:8080)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  iplogd                     # binds to 127.0.0.1:8080");
    eprintln!("  iplogd localhost           # binds to 127.0.0.1:8080");
    eprintln!("  iplogd 127.0.0.1:8099     # binds to 127.0.0.1:8099");
    eprintln!("  iplogd 0.0.0.0:8080       # binds to 0.0.0.0:8080");
}

/// Route `tracing` output to the configured log file.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so it
/// must live until the process exits.
fn init_logging(log_file: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file.file_name().unwrap_or_else(|| OsStr::new("iplog.log"));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let config = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => ServerConfig::with_addr(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };

    let _guard = init_logging(&config.log_file);

    println!("iplogd starting on {}", config.bind_addr);
    println!("Log file:  {}", config.log_file.display());
    println!("Data file: {}", config.data_file.display());
    println!("Press Ctrl+C to stop");

    let server = match IpServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutting down...");
    };

    if let Err(e) = server.run_until(shutdown).await {
        tracing::error!(error = %e, "server error");
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
