use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use roster::config::{self, DEFAULT_HOST, DEFAULT_PORT};
use roster::error::AdminError;
use roster::models::{AppState, Store};
use roster::routes::build_router;
use roster::services::{
    add_role, create_user, delete_user, grant_role, load_store, persist_store, reset_password,
    revoke_role,
};

#[derive(Parser)]
#[command(
    name = "roster",
    author,
    version,
    about = "Roster user administration panel",
    long_about = r#"Roster serves a small admin panel for local user accounts and roles.

Users, roles and the login history live in a JSON data file (roster.json by
default, or ROSTER_DATA_FILE). The same file can be managed offline with the
`users` and `roles` commands.

Examples:
  1) Run the panel:
      roster serve --host 127.0.0.1 --port 5000
  2) Create or repair the data file:
      roster seed
  3) Manage accounts:
      roster users add alice alice@example.com --password 'S3cret!'
      roster users grant alice admin
"#,
    after_help = "Use `roster <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Path to the JSON data file (overrides ROSTER_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Create the data file, or restore the default roles and administrator
    Seed,
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        sub: UserCommands,
    },
    /// Manage roles
    Roles {
        #[command(subcommand)]
        sub: RoleCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    #[command(about = "List users", long_about = "Show every user with their email, roles and last sign-in.")]
    List,
    #[command(about = "Add a user", long_about = "Create a user with the default `user` role. Without --password the initial password is Init123!.")]
    Add {
        username: String,
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    #[command(about = "Grant a role to a user")]
    Grant { username: String, role: String },
    #[command(about = "Revoke a role from a user", long_about = "Remove a role from a user. The last administrator cannot lose the admin role.")]
    Revoke { username: String, role: String },
    #[command(about = "Reset a user's password")]
    ResetPassword { username: String, password: String },
    #[command(about = "Delete a user", long_about = "Delete a user and their login history. The last administrator cannot be deleted.")]
    Delete { username: String },
}

#[derive(Subcommand)]
enum RoleCommands {
    #[command(about = "List roles")]
    List,
    #[command(about = "Add a role")]
    Add {
        name: String,
        #[arg(long)]
        desc: Option<String>,
    },
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!(%err, "{}", context);
    eprintln!("{}: {}", context.red(), err);
    process::exit(1);
}

fn resolve_data_file(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(config::get_data_file)
}

fn open_store(path: &Path) -> Store {
    load_store(path).unwrap_or_else(|e| fail("Failed to load data file", e))
}

fn user_id(store: &Store, username: &str) -> u64 {
    match store.user_by_name(username.trim()) {
        Some(u) => u.id,
        None => fail("User not found", username),
    }
}

/// Applies one change to the data file and prints `done` on success.
fn apply<T>(path: &Path, done: &str, op: impl FnOnce(&mut Store) -> Result<T, AdminError>) {
    let mut store = open_store(path);
    if let Err(e) = op(&mut store) {
        fail("Operation failed", e);
    }
    if let Err(e) = persist_store(path, &store) {
        fail("Failed to persist data file", e);
    }
    println!("{}", done.green());
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn print_users(store: &Store) {
    if store.users.is_empty() {
        println!("(empty list)");
        return;
    }
    let mut table = new_table();
    table.set_header(vec!["id", "username", "email", "roles", "active", "last login"]);
    for u in store.users.values() {
        table.add_row(vec![
            u.id.to_string(),
            u.username.clone(),
            u.email.clone(),
            u.roles_text(),
            u.is_active.to_string(),
            u.last_login_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("\n{table}\n");
}

fn print_roles(store: &Store) {
    let mut table = new_table();
    table.set_header(vec!["name", "description", "users"]);
    for r in &store.roles {
        table.add_row(vec![
            r.name.clone(),
            r.desc.clone().unwrap_or_default(),
            store.count_with_role(&r.name).to_string(),
        ]);
    }
    println!("\n{table}\n");
}

async fn start_server(mut state: AppState, host: &str, port: u16, stylesheet: Option<String>) {
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!("Loaded custom stylesheet from {}", path);
            }
            Err(e) => fail(&format!("Failed to read custom stylesheet at {}", path), e),
        }
    }

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => fail("Invalid host/port format", e),
    };
    let app = build_router(state);
    tracing::info!(%addr, "Starting roster server");
    println!(
        "{} {}",
        "Web server running on".green(),
        format!("http://{}", addr).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, service).await {
                fail("Server error", e);
            }
        }
        Err(e) => {
            eprintln!(
                "{}",
                "Please stop any process using this port, or start the server with a different --port value."
                    .yellow()
            );
            fail(&format!("Failed to bind to {}", addr), e);
        }
    }
}

#[tokio::main]
pub async fn run() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }
    config::load_env_file(cli.env_file.as_deref());
    let data_file = resolve_data_file(cli.data_file);

    // No command: serve with defaults.
    let command = cli.command.unwrap_or(Commands::Serve {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
        stylesheet: None,
    });

    match command {
        Commands::Serve {
            host,
            port,
            stylesheet,
        } => {
            let store = open_store(&data_file);
            let state = AppState::new(store, data_file, config::get_public_base_url());
            start_server(state, &host, port, stylesheet).await;
        }
        Commands::Seed => {
            let store = open_store(&data_file);
            println!(
                "{} {} ({} users, {} roles)",
                "Data file ready:".green(),
                data_file.display(),
                store.users.len(),
                store.roles.len()
            );
        }
        Commands::Users { sub } => match sub {
            UserCommands::List => print_users(&open_store(&data_file)),
            UserCommands::Add {
                username,
                email,
                password,
            } => apply(&data_file, &format!("User '{}' added", username.trim()), |store| {
                create_user(store, &username, &email, password.as_deref().unwrap_or(""))
            }),
            UserCommands::Grant { username, role } => {
                apply(&data_file, &format!("Granted {} to '{}'", role, username), |store| {
                    let id = user_id(store, &username);
                    grant_role(store, id, role.trim())
                })
            }
            UserCommands::Revoke { username, role } => {
                apply(&data_file, &format!("Revoked {} from '{}'", role, username), |store| {
                    let id = user_id(store, &username);
                    revoke_role(store, None, id, role.trim())
                })
            }
            UserCommands::ResetPassword { username, password } => {
                apply(&data_file, &format!("Password for '{}' updated", username), |store| {
                    let id = user_id(store, &username);
                    reset_password(store, id, &password)
                })
            }
            UserCommands::Delete { username } => {
                apply(&data_file, &format!("User '{}' deleted", username), |store| {
                    let id = user_id(store, &username);
                    delete_user(store, None, id)
                })
            }
        },
        Commands::Roles { sub } => match sub {
            RoleCommands::List => print_roles(&open_store(&data_file)),
            RoleCommands::Add { name, desc } => {
                apply(&data_file, &format!("Role '{}' added", name.trim()), |store| {
                    add_role(store, &name, desc.as_deref())
                })
            }
        },
    }
}
