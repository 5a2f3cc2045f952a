use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help and the current configuration instead.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only variables that can never hold secrets
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "GSP_HOST",
        "GSP_PORT",
        "GSP_DATABASE_URL",
        "GSP_DB_MAX_CONNECTIONS",
        "GSP_PAYMENT_API_URL",
        "GSP_PAYMENT_TIMEOUT_SECS",
        "GSP_CATALOG_TIMEOUT_MS",
        "GSP_ENABLE_UNSIGNED_WEBHOOK",
        "GSP_WEBHOOK_HMAC_CHECKS",
        "GSP_USE_X_FORWARDED_FOR",
        "GSP_USE_FORWARDED",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(v) => v,
            Err(VarError::NotPresent) => "(not set)".to_string(),
            Err(VarError::NotUnicode(_)) => "(invalid unicode)".to_string(),
        };
        println!("{name:30}: {val}");
    });
}
