use leadshunter::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("LEADSHUNTER_PROFILE");
        env::remove_var("LEADSHUNTER_API_BIND_ADDR");
        env::remove_var("LEADSHUNTER_LOG_LEVEL");
        env::remove_var("LEADSHUNTER_DATABASE_URL");
        env::remove_var("LEADSHUNTER_SESSION_HEARTBEAT_INTERVAL_SECONDS");
        env::remove_var("LEADSHUNTER_BILLING_USER_PRICE");
        env::remove_var("LEADSHUNTER_ASSISTANT_API_KEY");
        env::remove_var("LEADSHUNTER_CORS_ALLOWED_ORIGINS");
        env::remove_var("GEMINI_API_KEY");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = loader(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.session.heartbeat_interval_seconds, 15);
    assert_eq!(cfg.billing.cycle_days, 30);
    assert_eq!(cfg.billing.base_price, 50.0);
    assert_eq!(cfg.billing.user_price, 25.0);
    assert_eq!(cfg.assistant.api_key, None);
    assert!(cfg.cors_allowed_origins.is_empty());
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "LEADSHUNTER_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "LEADSHUNTER_API_BIND_ADDR=192.168.0.10:5000\nLEADSHUNTER_BILLING_USER_PRICE=30\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "LEADSHUNTER_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "LEADSHUNTER_PROFILE=test\nLEADSHUNTER_API_BIND_ADDR=127.0.0.1:4000\nUNRELATED_KEY=ignored\n",
    );

    let cfg = loader(&temp_dir)
        .load()
        .expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.billing.user_price, 30.0);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "LEADSHUNTER_API_BIND_ADDR=127.0.0.1:3000\nLEADSHUNTER_ASSISTANT_API_KEY=from-file\n",
    );

    unsafe {
        env::set_var("LEADSHUNTER_API_BIND_ADDR", "0.0.0.0:9090");
        env::set_var("LEADSHUNTER_ASSISTANT_API_KEY", "from-env");
    }

    let cfg = loader(&temp_dir).load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert_eq!(cfg.assistant.api_key.as_deref(), Some("from-env"));

    clear_env();
}

#[test]
fn bare_gemini_key_is_used_when_prefixed_key_is_absent() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("GEMINI_API_KEY", "  bare-key  ");
    }

    let cfg = loader(&temp_dir).load().expect("config loads");
    assert_eq!(cfg.assistant.api_key.as_deref(), Some("bare-key"));

    clear_env();
}

#[test]
fn cors_origins_are_split_and_trimmed() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "LEADSHUNTER_CORS_ALLOWED_ORIGINS=\"http://localhost:5173, https://app.leadshunter.com,,\"\n",
    );

    let cfg = loader(&temp_dir).load().expect("config loads");
    assert_eq!(
        cfg.cors_allowed_origins,
        vec!["http://localhost:5173", "https://app.leadshunter.com"]
    );

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("LEADSHUNTER_API_BIND_ADDR", "not-an-addr");
    }
    let err = loader(&temp_dir)
        .load()
        .expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn out_of_range_heartbeat_interval_is_rejected() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("LEADSHUNTER_SESSION_HEARTBEAT_INTERVAL_SECONDS", "0");
    }
    let err = loader(&temp_dir)
        .load()
        .expect_err("zero heartbeat interval should fail");
    assert!(matches!(
        err,
        ConfigError::InvalidHeartbeatInterval { value: 0 }
    ));

    clear_env();
}
