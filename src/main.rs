use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

mod auth;
mod config;
mod error;
mod middleware;
mod observability;
mod policy;
mod routes;

#[cfg(test)]
mod tests;

use auth::{Authenticator, StaticTokenAuthenticator};
use config::{AppConfig, ConfigError};
use error::ApiError;
use policy::PolicyStore;

/// Shared application state.
///
/// Everything in here is immutable after startup; handlers and middleware
/// only ever read it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub policy: Arc<PolicyStore>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let policy = PolicyStore::from_config(&config)?;
        let authenticator = StaticTokenAuthenticator::from_config(&config.auth);

        Ok(Self {
            config: Arc::new(config),
            policy: Arc::new(policy),
            authenticator: Arc::new(authenticator),
        })
    }
}

/// Build the application router with the full request pipeline.
///
/// Layer order matters and is fixed: the body limit and trace layers wrap
/// everything, CORS resolution runs next so preflights are answered before
/// any credential check, then authentication, then the role guard, then
/// the handler. Routes are registered with their full paths so the prefix
/// matchers in the policy layer see the same path the client sent.
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let base = config.server.api_base_path.as_str();

    // Guard runs after auth: route layers execute in reverse order of
    // addition, so the auth layer is added last.
    let protected = Router::new()
        .route(&format!("{base}/user/profile"), get(routes::user::profile))
        .route(&format!("{base}/user/info"), get(routes::user::info))
        .route(
            &format!("{base}/admin/dashboard"),
            get(routes::admin::dashboard),
        )
        .route(&format!("{base}/admin/users"), get(routes::admin::users))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::access_guard_middleware,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(protected)
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cors_middleware,
        ));

    app.layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("Resource not found")
}

/// CLI arguments for the role-gated API service.
#[derive(Parser, Debug)]
#[command(version, about = "Role-gated API service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./rolegate.toml if it exists,
    /// otherwise built-in defaults are used)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Write a commented default configuration file
    Init {
        /// Path to create the config file (defaults to ./rolegate.toml)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Default configuration for zero-config startup.
fn default_config_toml() -> &'static str {
    r#"# Role-gated API service configuration

[server]
host = "127.0.0.1"
port = 8080
api_base_path = "/api/v1"

[logging]
level = "info"
format = "pretty"

# Bearer tokens. Each key is the token value; environment variables can be
# interpolated with ${VAR_NAME}.
#
# [auth.tokens."${DEV_USER_TOKEN}"]
# username = "alice"
# roles = ["USER"]
#
# [auth.tokens."${DEV_ADMIN_TOKEN}"]
# username = "bob"
# roles = ["USER", "ADMIN"]

# CORS profiles and path bindings. When this section is omitted, a
# permissive "default" profile covers "/" and a "strict" profile covers
# the admin prefix. Bindings resolve by longest matching prefix and a
# binding for "/" must always exist.
#
# [cors.profiles.default]
# allowed_origins = ["http://localhost:3000", "http://localhost:4200"]
# allowed_methods = ["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"]
# allowed_headers = ["*"]
# exposed_headers = ["Authorization", "Content-Type", "X-Total-Count"]
# allow_credentials = true
# max_age_secs = 3600
#
# [[cors.bindings]]
# prefix = "/"
# profile = "default"

# Role rules, matched by longest prefix. Mode "any" grants access when the
# caller holds at least one listed role; "all" requires every role.
#
# [[access.rules]]
# prefix = "/api/v1/user"
# roles = ["USER", "ADMIN"]
# mode = "any"
#
# [[access.rules]]
# prefix = "/api/v1/admin"
# roles = ["ADMIN"]
# mode = "all"
"#
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => {
            run_init(output, force);
        }
        Some(Command::Serve) | None => {
            run_server(args.config.as_deref()).await;
        }
    }
}

/// Write a default configuration file.
fn run_init(output: Option<String>, force: bool) {
    let output_path = output.unwrap_or_else(|| "rolegate.toml".to_string());

    if Path::new(&output_path).exists() && !force {
        eprintln!("Config file already exists: {output_path}\nUse --force to overwrite.");
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, default_config_toml()) {
        eprintln!("Failed to write config file: {e}");
        std::process::exit(1);
    }

    println!("Created config file: {output_path}");
    println!();
    println!("To start the server, run:");
    println!("  rolegate serve --config {output_path}");
}

/// Resolve and load the configuration.
///
/// An explicitly passed path must exist; otherwise `./rolegate.toml` is
/// used when present, and built-in defaults when not.
fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    match config_path {
        Some(path) => AppConfig::from_file(path),
        None => {
            let default_path = Path::new("rolegate.toml");
            if default_path.exists() {
                AppConfig::from_file(default_path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

async fn run_server(config_path: Option<&str>) {
    // Config or policy errors are fatal: refuse to start rather than run
    // with ambiguous policy.
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    observability::init_tracing(&config.logging);

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if state.config.auth.tokens.is_empty() {
        tracing::warn!("No tokens configured; every authenticated route will return 401");
    }

    tracing::info!(
        cors_profiles = state.policy.profile_count(),
        access_rules = state.policy.access_rule_count(),
        tokens = state.config.auth.tokens.len(),
        "Policy store loaded"
    );

    let config = state.config.clone();
    let app = build_app(config.as_ref(), state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
