use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Timestamped `<ts>: <LEVEL>: <msg>` lines at `level`; unknown levels fall
/// back to info.
pub fn start_log(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let mut builder = Builder::new();
    builder
        .format(|buf, record| writeln!(buf, "{}: {}: {}", buf.timestamp(), record.level(), record.args()))
        .filter_level(filter)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("rumqttc", LevelFilter::Warn)
        .init();
}
