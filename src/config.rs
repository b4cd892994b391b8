use std::env;
use std::path::{Path, PathBuf};

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_FILE: &str = "roster.json";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@local";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin123!";
/// Password given to users created without one.
pub const DEFAULT_INITIAL_PASSWORD: &str = "Init123!";
pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;
pub const SESSION_COOKIE: &str = "session_id";
pub const SESSION_MAX_AGE_DAYS: i64 = 14;
pub const MAX_USERNAME_LEN: usize = 32;
pub const MAX_EMAIL_LEN: usize = 255;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_data_file() -> PathBuf {
    match env::var("ROSTER_DATA_FILE") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
        _ => PathBuf::from(DEFAULT_DATA_FILE),
    }
}

pub fn get_public_base_url() -> String {
    sanitize_base_url(&env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()))
}

/// Prefix for links and assets in rendered pages. Empty keeps them
/// root-relative.
pub fn sanitize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
