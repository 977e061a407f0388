use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // Any argument at all gets you the help text
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
    // API keys and the JWT secret stay off this list
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "SOCKIFY_HOST",
        "SOCKIFY_PORT",
        "SOCKIFY_DATABASE_URL",
        "SOCKIFY_WEB_CLIENT_URL",
        "SOCKIFY_CURRENCY",
        "SOCKIFY_CHECKOUT_SESSION_TTL",
        "SOCKIFY_DISABLE_AUTH",
        "SOCKIFY_DEV_ADMIN_ID",
        "SOCKIFY_STRIPE_API_URL",
        "SOCKIFY_SENDGRID_API_URL",
        "SOCKIFY_EMAIL_SENDER_ADDRESS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = env_value(name);
        println!("  {name:<35} {val:<15}");
    })
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
