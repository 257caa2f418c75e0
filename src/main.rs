//! Mock server route admin entry point.

use std::io::{BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mock_route_admin::client::{HttpRouteApi, KeyStore, RouteApi};
use mock_route_admin::config::Config;
use mock_route_admin::controller::{AdminController, Navigation};
use mock_route_admin::form::RouteForm;
use mock_route_admin::metrics;
use mock_route_admin::model::BatchOperation;
use mock_route_admin::render::{text, views};
use mock_route_admin::shell;
use mock_route_admin::state::{NoticeLevel, Tab};
use mock_route_admin::web::{create_router, AppState};

/// Admin client for mock server routes.
#[derive(Parser, Debug)]
#[command(name = "route-admin")]
#[command(about = "List, create, edit, toggle and delete mock server routes")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Route fields shared by `create` and `edit`.
#[derive(clap::Args, Debug, Default)]
struct RouteFields {
    /// Request path, e.g. /api/users.
    #[arg(long)]
    path: Option<String>,

    /// Comma separated HTTP methods.
    #[arg(long, value_delimiter = ',')]
    methods: Option<Vec<String>>,

    /// Response status code.
    #[arg(long)]
    status: Option<String>,

    /// Response delay in seconds.
    #[arg(long)]
    delay: Option<String>,

    /// Free-form description.
    #[arg(long)]
    description: Option<String>,

    /// Response headers as a JSON object.
    #[arg(long)]
    headers: Option<String>,

    /// Response body as JSON.
    #[arg(long, conflicts_with = "response_file")]
    response: Option<String>,

    /// Read the response body from a file.
    #[arg(long)]
    response_file: Option<PathBuf>,

    /// Mark the route active or inactive.
    #[arg(long)]
    active: Option<bool>,
}

impl RouteFields {
    /// Overwrite the fields of `form` that were given on the command line.
    fn apply_to(self, form: &mut RouteForm) -> anyhow::Result<()> {
        if let Some(path) = self.path {
            form.path = path;
        }
        if let Some(methods) = self.methods {
            form.methods = methods;
        }
        if let Some(status) = self.status {
            form.status_code = status;
        }
        if let Some(delay) = self.delay {
            form.delay = delay;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(headers) = self.headers {
            form.headers = headers;
        }
        if let Some(response) = self.response {
            form.response = response;
        }
        if let Some(file) = self.response_file {
            form.response = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", file.display(), e))?;
        }
        if let Some(active) = self.active {
            form.is_active = active;
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List routes.
    List {
        /// Page to show.
        #[arg(long, default_value = "1")]
        page: u32,

        /// Routes per page (10, 25, 50 or 100).
        #[arg(long)]
        per_page: Option<u32>,

        /// Only show active routes.
        #[arg(long)]
        active_only: bool,

        /// Filter by path or description.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show every field of one route.
    Get {
        id: u64,
    },

    /// Create a route.
    Create {
        #[command(flatten)]
        fields: RouteFields,
    },

    /// Edit a route. Only the given fields change.
    Edit {
        id: u64,

        #[command(flatten)]
        fields: RouteFields,
    },

    /// Flip a route between active and inactive.
    Toggle {
        id: u64,
    },

    /// Delete a route.
    Delete {
        id: u64,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Activate, deactivate or delete several routes at once.
    Batch {
        operation: BatchOperation,

        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<u64>,
    },

    /// Show backend health.
    Health,

    /// Save the API key used for all requests.
    SetKey {
        key: String,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Interactive panel on the terminal.
    Shell,

    /// Serve the web panel.
    Serve {
        /// HTTP port; defaults to ROUTE_ADMIN_PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("mock_route_admin=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Only the web panel exposes metrics; install its recorder before
    // descriptions are registered.
    let prometheus = match args.command {
        Command::Serve { .. } => Some(PrometheusBuilder::new().install_recorder()?),
        _ => None,
    };
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Command::CheckConfig => cmd_check_config(),
        Command::List {
            page,
            per_page,
            active_only,
            search,
        } => cmd_list(page, per_page, active_only, search).await,
        Command::Get { id } => cmd_get(id).await,
        Command::Create { fields } => cmd_create(fields).await,
        Command::Edit { id, fields } => cmd_edit(id, fields).await,
        Command::Toggle { id } => cmd_toggle(id).await,
        Command::Delete { id, yes } => cmd_delete(id, yes).await,
        Command::Batch { operation, ids } => cmd_batch(operation, ids).await,
        Command::Health => cmd_health().await,
        Command::SetKey { key } => cmd_set_key(&key),
        Command::Shell => cmd_shell().await,
        Command::Serve { port } => cmd_serve(port, prometheus).await,
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }
    Ok(config)
}

/// Controller over the live backend using the saved API key.
fn build_controller(config: &Config) -> anyhow::Result<AdminController<HttpRouteApi>> {
    let store = KeyStore::new(&config.key_file);
    let key = store.load_or_default()?;
    let api = HttpRouteApi::new(config, key)?;
    Ok(AdminController::new(api, config).with_key_store(store))
}

/// Print and clear notices; errors go to stderr.
fn print_notices<A: RouteApi>(controller: &mut AdminController<A>) {
    for notice in controller.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
}

/// Print notices, then pass `result` through.
fn finish<A: RouteApi, T, E>(
    controller: &mut AdminController<A>,
    result: Result<T, E>,
) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    print_notices(controller);
    Ok(result?)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ROUTE ADMIN - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Check key file
    print!("Reading API key... ");
    let store = KeyStore::new(&config.key_file);
    match store.load() {
        Ok(Some(_)) => println!("OK (saved in {})", store.path().display()),
        Ok(None) => println!("OK (default key)"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("API key file unreadable"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Base URL: {}", config.base_url);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Key File: {}", config.key_file.display());
    println!("  Per Page: {}", config.per_page);
    println!("  Search Debounce: {}ms", config.debounce_ms);
    println!("  Notice Lifetime: {}ms", config.notice_ms);
    println!("  Locale: {}", config.locale);
    println!("  Web Panel Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// List one page of routes.
async fn cmd_list(
    page: u32,
    per_page: Option<u32>,
    active_only: bool,
    search: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let result = controller
        .navigate(Navigation {
            page: None,
            per_page,
            active_only: Some(active_only),
            search,
        })
        .await;
    finish(&mut controller, result)?;

    let result = controller.goto_page(page).await;
    finish(&mut controller, result)?;

    let locale = controller.locale();
    println!("{}", text::to_text(&views::route_list(controller.list(), locale)));
    println!();
    println!("{}", text::to_text(&views::pagination(controller.pages(), locale)));
    Ok(())
}

/// Show one route in full.
async fn cmd_get(id: u64) -> anyhow::Result<()> {
    let config = load_config()?;
    let controller = build_controller(&config)?;

    let route = controller.api().get_route(id).await?;
    println!("{}", text::to_text(&views::route_detail(&route, controller.locale())));
    Ok(())
}

/// Create a route from command line fields.
async fn cmd_create(fields: RouteFields) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let mut form = RouteForm::blank();
    fields.apply_to(&mut form)?;

    let result = controller.create_route(form).await;
    let route = finish(&mut controller, result)?;
    println!("#{} {} {}", route.id, route.methods_label(), route.path);
    Ok(())
}

/// Edit a route; unspecified fields keep their stored values.
async fn cmd_edit(id: u64, fields: RouteFields) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let result = controller.begin_edit(id).await.map(RouteForm::clone);
    let mut form = finish(&mut controller, result)?;
    fields.apply_to(&mut form)?;

    let result = controller.submit_edit(form).await;
    let route = finish(&mut controller, result)?;
    println!("#{} {} {}", route.id, route.methods_label(), route.path);
    Ok(())
}

/// Flip activation of a route.
async fn cmd_toggle(id: u64) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let result = controller.toggle_route(id).await;
    finish(&mut controller, result)?;
    Ok(())
}

/// Delete a route after confirmation.
async fn cmd_delete(id: u64, yes: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let token = controller.request_delete(id);
    if !yes && !confirm(&format!("Delete route #{}? [y/N] ", id))? {
        controller.cancel_delete(token);
        println!("Cancelled");
        return Ok(());
    }

    let result = controller.confirm_delete(token).await;
    finish(&mut controller, result)?;
    Ok(())
}

/// Ask a yes/no question on the terminal.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Apply a bulk operation.
async fn cmd_batch(operation: BatchOperation, ids: Vec<u64>) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    let result = controller.batch(operation, ids).await;
    let message = finish(&mut controller, result)?;
    if !message.is_empty() {
        println!("{}", message);
    }
    Ok(())
}

/// Show backend health.
async fn cmd_health() -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    println!("======================================================================");
    println!("ROUTE ADMIN - HEALTH");
    println!("======================================================================");

    let result = controller.open_tab(Tab::Health).await;
    finish(&mut controller, result)?;
    println!(
        "{}",
        text::to_text(&views::health_panel(controller.health(), controller.locale()))
    );
    println!("======================================================================");
    Ok(())
}

/// Persist a new API key.
fn cmd_set_key(key: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let store = KeyStore::new(&config.key_file);
    store.save(key.trim())?;
    println!("API key saved to {}", store.path().display());
    Ok(())
}

/// Run the interactive shell on stdin/stdout.
async fn cmd_shell() -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    println!("Connected to {} (type `help` for commands)", config.base_url);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    shell::run(&mut controller, input, &mut output).await?;
    Ok(())
}

/// Serve the web panel.
async fn cmd_serve(port: Option<u16>, prometheus: Option<PrometheusHandle>) -> anyhow::Result<()> {
    let config = load_config()?;
    let mut controller = build_controller(&config)?;

    info!("Configuration loaded successfully");
    info!("Backend: {}", config.base_url);

    // First page is ready before the first request arrives.
    if let Err(e) = controller.load_routes().await {
        error!("Initial route load failed: {}", e);
    }
    let _ = controller.notices(Instant::now());

    let mut app_state = AppState::new(controller);
    if let Some(handle) = prometheus {
        app_state = app_state.with_metrics(handle);
    }
    let router = create_router(app_state);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.port)));
    let listener = TcpListener::bind(addr).await?;
    info!("Web panel listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web panel stopped");
    Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
