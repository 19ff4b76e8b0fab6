use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock};
use storage::repository::{NewCourseRecord, Storage};
use storage::rest::RestStoreConfig;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

struct Args {
    db_url: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults for ui:");
    eprintln!("  --db sqlite:academy.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_DB_URL                    local SQLite url");
    eprintln!("  ACADEMY_STORE_URL / _STORE_KEY    hosted store, overrides --db");
    eprintln!("  RUST_LOG                          log filter");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ACADEMY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://academy.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: launching UI when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if matches!(cmd, Command::Ui | Command::Seed) && !argv.is_empty() && !argv[0].starts_with("--")
    {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // A hosted store wins over local SQLite when its env vars are set.
    // SQLite open + migrate stays in the binary glue so services stay pure.
    let storage = match RestStoreConfig::from_env() {
        Some(config) => {
            tracing::info!(base_url = %config.base_url, "using hosted course store");
            Storage::rest(config)
        }
        None => {
            prepare_sqlite_file(&parsed.db_url)?;
            tracing::info!(url = %parsed.db_url, "using local sqlite store");
            Storage::sqlite(&parsed.db_url).await?
        }
    };

    match cmd {
        Command::Ui => {
            let services = AppServices::from_storage(&storage, Clock::default_clock());
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            // Dioxus/tao can default to an always-on-top window in some dev
            // setups. Explicitly disable it.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Loop Academy")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => seed_catalog(&storage).await,
    }
}

/// Publishes a handful of demo courses so a fresh database has something to
/// browse. Skips stores that already hold courses.
async fn seed_catalog(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let existing = storage.courses.list_courses(Some(1)).await?;
    if !existing.is_empty() {
        eprintln!("seed: catalog already has courses, nothing to do.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    let sample = |file: &str| format!("https://storage.googleapis.com/gtv-videos-bucket/sample/{file}");
    let poster = |file: &str| format!("https://storage.googleapis.com/gtv-videos-bucket/sample/images/{file}");

    let records = [
        NewCourseRecord {
            title: "Rust Fundamentals".into(),
            description: Some("Ownership, borrowing, and the toolchain from zero.".into()),
            instructor: Some("Maya Patel".into()),
            thumbnail_url: Some(poster("BigBuckBunny.jpg")),
            video_url: sample("BigBuckBunny.mp4"),
            rating: 4.8,
            created_at: now - chrono::Duration::days(1),
        },
        NewCourseRecord {
            title: "Async Programming in Practice".into(),
            description: Some("Futures, executors, and backpressure without the mystery.".into()),
            instructor: Some("Jon Alvarez".into()),
            thumbnail_url: Some(poster("ElephantsDream.jpg")),
            video_url: sample("ElephantsDream.mp4"),
            rating: 4.6,
            created_at: now - chrono::Duration::days(3),
        },
        NewCourseRecord {
            title: "Data Structures Deep Dive".into(),
            description: Some("Trees, maps, and the trade-offs behind each one.".into()),
            instructor: None,
            thumbnail_url: None,
            video_url: sample("Sintel.mp4"),
            rating: 4.2,
            created_at: now - chrono::Duration::days(6),
        },
        NewCourseRecord {
            title: "Web APIs from Scratch".into(),
            description: Some("Design, version, and document an HTTP API people enjoy.".into()),
            instructor: Some("Sofia Ruiz".into()),
            thumbnail_url: Some(poster("ForBiggerBlazes.jpg")),
            video_url: sample("ForBiggerBlazes.mp4"),
            rating: 3.9,
            created_at: now - chrono::Duration::days(10),
        },
        NewCourseRecord {
            title: "Testing Without Tears".into(),
            description: Some("Fast suites, useful failures, and tests you trust.".into()),
            instructor: Some("Kim Nakamura".into()),
            thumbnail_url: None,
            video_url: sample("ForBiggerEscapes.mp4"),
            rating: 4.4,
            created_at: now - chrono::Duration::days(14),
        },
        NewCourseRecord {
            title: "Shipping Desktop Apps".into(),
            description: Some("Package, sign, and update apps across platforms.".into()),
            instructor: Some("Lee Morgan".into()),
            thumbnail_url: Some(poster("TearsOfSteel.jpg")),
            video_url: sample("TearsOfSteel.mp4"),
            rating: 4.7,
            created_at: now - chrono::Duration::days(21),
        },
    ];

    let count = records.len();
    for record in records {
        storage.courses.insert_course(record).await?;
    }
    eprintln!("seed: published {count} demo courses.");
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
