use engine_logging::{engine_info, initialize, LogDestination};
use log::LevelFilter;
use tempfile::TempDir;

#[test]
fn file_destination_writes_log_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("clarifi.log");

    initialize(LogDestination::File, LevelFilter::Info, &path);
    engine_info!("session started");
    log::logger().flush();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("session started"));
}
