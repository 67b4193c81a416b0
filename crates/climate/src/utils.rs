use clap::Parser;
use climate_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_API_PORT, DEFAULT_DATABASE_PATH,
    DEFAULT_MAX_CONNECTIONS,
};
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Hawaii Climate API - read-only precipitation and temperature queries"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $CLIMATE_API_CONFIG, ./climate.toml,
    /// $XDG_CONFIG_HOME/hawaii-climate/climate.toml, /etc/hawaii-climate/climate.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "CLIMATE_API_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "CLIMATE_API_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CLIMATE_API_PORT")]
    pub port: Option<String>,

    /// Public URL used for links on the index page
    #[arg(short, long, env = "CLIMATE_API_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// SQLite file holding the measurement and station tables
    #[arg(long, env = "CLIMATE_API_DATABASE")]
    #[serde(alias = "database_path")]
    pub database: Option<String>,

    /// Size of the read-only connection pool
    #[arg(long, env = "CLIMATE_API_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Fill every unset field from `file`; values already present win.
    pub fn merge(self, file: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file.level),
            domain: self.domain.or(file.domain),
            port: self.port.or(file.port),
            remote_url: self.remote_url.or(file.remote_url),
            database: self.database.or(file.database),
            max_connections: self.max_connections.or(file.max_connections),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("CLIMATE_API_CONFIG", "climate.toml")
    };

    // the logger is not up yet, so a bad file is reported on stderr
    let file_config: Cli = load_config(&source).unwrap_or_else(|e| {
        eprintln!("ignoring config file {}: {:#}", source, e);
        Cli::default()
    });

    // CLI args override file config (env vars are handled by clap)
    cli_args.merge(file_config)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
