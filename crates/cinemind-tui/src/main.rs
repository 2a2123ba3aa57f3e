use anyhow::Result;
use cinemind_core::{default_config_root, load_settings, RecommendationEngine};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_settings(&default_config_root())?;
    let export_dir = settings.export_dir();
    let engine = RecommendationEngine::from_settings(&settings);
    cinemind_tui::run_tui(engine, export_dir).await
}
