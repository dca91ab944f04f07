use std::io::Write;

use arbor_chess::uci::uci_top::run_stdio_loop;

fn main() -> std::io::Result<()> {
    // stdout carries the UCI protocol, so log lines go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    log::info!("arbor_chess {} ready", env!("CARGO_PKG_VERSION"));
    run_stdio_loop()
}
