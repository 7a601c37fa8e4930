// One-shot CLI: decrypt a W-MBus telegram and print the meter report on stdout.
// Usage:
//   wmbus-decoder <AES-128 key HEX> <W-MBus telegram HEX>
// Diagnostics (and RUST_LOG-controlled logs) go to stderr; exit status is 1 on any failure.
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use wmbus_decoder::pipeline::{parse_args, usage, Pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("wmbus-decoder");

    let (key_hex, telegram_hex) = match parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(pair) => pair,
        Err(_) => {
            eprintln!("{}", usage(program));
            return ExitCode::from(1);
        }
    };

    match Pipeline::default().decode_telegram(key_hex, telegram_hex) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
