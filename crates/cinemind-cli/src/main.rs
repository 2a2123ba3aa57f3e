use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cinemind_core::{
    export_recommendations, load_settings, RecommendationEngine, Settings, API_KEY_ENV,
};
use cinemind_schema::{DurationPreference, Movie, UserPreferences, GENRES, MOODS};

#[derive(Parser)]
#[command(name = "cinemind", version, about = "AI movie recommendations in your terminal")]
struct Cli {
    #[arg(
        long,
        default_value = "~/.cinemind",
        help = "Config root directory (contains config/ and logs/)"
    )]
    config_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Interactive terminal UI")]
    Tui,
    #[command(about = "One-shot recommendation search")]
    Recommend {
        #[arg(long, value_parser = parse_mood, help = "Current mood (e.g. Tense, Relaxing)")]
        mood: Option<String>,
        #[arg(long = "genre", value_parser = parse_genre, help = "Favorite genre, repeatable")]
        genres: Vec<String>,
        #[arg(long, default_value = "", help = "Recently watched / additional context")]
        recently_watched: String,
        #[arg(long, default_value = "any", value_parser = parse_duration)]
        duration: DurationPreference,
        #[arg(long, help = "Print the raw JSON batch instead of cards")]
        json: bool,
        #[arg(long, help = "Also write the export file")]
        export: bool,
    },
    #[command(about = "Check config and credential without calling the API")]
    Validate,
}

fn parse_duration(s: &str) -> Result<DurationPreference, String> {
    s.parse()
}

fn parse_mood(s: &str) -> Result<String, String> {
    MOODS
        .iter()
        .find(|m| m.eq_ignore_ascii_case(s))
        .map(|m| m.to_string())
        .ok_or_else(|| format!("unknown mood '{s}' (choose from: {})", MOODS.join(", ")))
}

fn parse_genre(s: &str) -> Result<String, String> {
    GENRES
        .iter()
        .find(|g| g.eq_ignore_ascii_case(s))
        .map(|g| g.to_string())
        .ok_or_else(|| format!("unknown genre '{s}' (choose from: {})", GENRES.join(", ")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Expand ~ to home directory
    if cli.config_root.starts_with("~") {
        if let Some(home) = std::env::var_os("HOME") {
            cli.config_root = PathBuf::from(home).join(
                cli.config_root
                    .strip_prefix("~")
                    .unwrap_or(&cli.config_root),
            );
        }
    }

    let log_dir = cli.config_root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "cinemind.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // The stderr layer would bleed into the alternate screen in TUI mode.
    let stderr_layer = (!matches!(cli.command, Some(Commands::Tui)))
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let settings = load_settings(&cli.config_root)?;

    match command {
        Commands::Tui => {
            let export_dir = settings.export_dir();
            let engine = RecommendationEngine::from_settings(&settings);
            cinemind_tui::run_tui(engine, export_dir).await?;
        }
        Commands::Recommend {
            mood,
            genres,
            recently_watched,
            duration,
            json,
            export,
        } => {
            let prefs = UserPreferences {
                mood,
                favorite_genres: genres,
                recently_watched,
                duration_preference: duration,
            };
            run_recommend(&settings, &prefs, json, export).await?;
        }
        Commands::Validate => {
            println!(
                "Config valid. model={} temperature={} recommendations={} credential={}",
                settings.model,
                settings.temperature,
                settings.recommendation_count,
                if settings.api_key.is_empty() {
                    format!("missing (set {API_KEY_ENV})")
                } else {
                    "present".to_string()
                }
            );
        }
    }

    Ok(())
}

async fn run_recommend(
    settings: &Settings,
    prefs: &UserPreferences,
    json: bool,
    export: bool,
) -> Result<()> {
    let engine = RecommendationEngine::from_settings(settings);

    let response = match engine.get_recommendations(prefs).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "recommendation request failed");
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    };

    if response.recommendations.is_empty() {
        println!("No movies found tailored to this specific combination.");
        println!("Try broadening your criteria.");
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response.recommendations)?
        );
    } else {
        for movie in &response.recommendations {
            print_card(movie);
        }
        println!("{} results found", response.recommendations.len());
    }

    if export {
        if let Some(path) = export_recommendations(&response.recommendations, &settings.export_dir())? {
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

fn print_card(movie: &Movie) {
    println!("{} ({})", movie.title, movie.year);
    println!(
        "  ★ {}  {}% Match  {}",
        movie.rating,
        movie.match_score,
        movie.genre.join(", ")
    );
    if !movie.director.is_empty() {
        println!("  Directed by {}", movie.director);
    }
    if !movie.cast.is_empty() {
        println!("  Starring {}", movie.cast.join(", "));
    }
    println!("  {}", movie.reasoning);
    println!("  {}", movie.plot_summary);
    println!();
}
