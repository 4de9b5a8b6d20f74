use anvil::config::Config;

#[test]
fn test_default_port() {
    let cfg = Config::default();
    assert_eq!(cfg.server.port, 42069);
}

#[test]
fn test_yaml_overrides_port() {
    let cfg = Config::from_yaml("server:\n  port: 8080\n").unwrap();
    assert_eq!(cfg.server.port, 8080);
}

#[test]
fn test_missing_sections_fall_back_to_defaults() {
    let cfg = Config::from_yaml("server: {}\n").unwrap();
    assert_eq!(cfg.server.port, 42069);
}

#[test]
fn test_malformed_yaml_is_an_error() {
    assert!(Config::from_yaml("server:\n  port: not-a-port\n").is_err());
}

#[test]
fn test_from_file_and_env_lookup() {
    let path = std::env::temp_dir().join("anvil-test-config.yaml");
    std::fs::write(&path, "server:\n  port: 9000\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.server.port, 9000);

    // load() honors ANVIL_CONFIG, then falls back to defaults without it
    unsafe {
        std::env::set_var("ANVIL_CONFIG", &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.port, 9000);

    unsafe {
        std::env::remove_var("ANVIL_CONFIG");
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.port, cfg2.server.port);
}
