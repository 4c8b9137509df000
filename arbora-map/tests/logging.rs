// arbora-map/tests/logging.rs
// 日志初始化: 全局 subscriber 只能安装一次

use arbora_map::logger::init_logger;

#[test]
fn test_logger_installs_once_and_writes_to_dir() {
    let dir = tempfile::tempdir().unwrap();

    assert!(init_logger(Some("debug"), Some(dir.path())));
    tracing::info!(zone_id = 7, "Zone created");

    // second install is refused, not a panic
    assert!(!init_logger(Some("info"), None));

    let written = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("arbora-map"));
    assert!(written);
}
