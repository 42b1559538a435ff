use chrono::Local;
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// `RUST_LOG` wins over the configured default level
pub fn init_logger(default_level: &str) {
    Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let time = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let level_color = match record.level() {
                Level::Error => "\x1b[31m\x1b[1m", // red
                Level::Warn => "\x1b[33m\x1b[1m",  // yellow
                Level::Info => "\x1b[32m\x1b[1m",  // green
                Level::Debug => "\x1b[36m\x1b[1m", // cyan
                Level::Trace => "\x1b[90m\x1b[1m", // grey
            };
            writeln!(
                buf,
                "{} {}{:<5}\x1b[0m [{}] {}",
                time,
                level_color,
                record.level(),
                record.module_path().unwrap_or("wandhub"),
                record.args(),
            )
        })
        .init();
}
