use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use cinemind_schema::Movie;

/// Write the current movie list as pretty-printed JSON to
/// `cinemind-recommendations-<YYYY-MM-DD>.json` under `dir`. An empty list
/// is a no-op and returns `Ok(None)`.
pub fn export_recommendations(movies: &[Movie], dir: &Path) -> Result<Option<PathBuf>> {
    if movies.is_empty() {
        return Ok(None);
    }

    let file_name = format!(
        "cinemind-recommendations-{}.json",
        Utc::now().format("%Y-%m-%d")
    );
    let path = dir.join(file_name);

    let payload =
        serde_json::to_string_pretty(movies).context("serialize recommendations for export")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("create export directory {}", dir.display()))?;
    fs::write(&path, payload).with_context(|| format!("write export file {}", path.display()))?;

    tracing::info!(path = %path.display(), count = movies.len(), "exported recommendations");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Vec<Movie> {
        vec![
            Movie {
                id: "movie-1-0".into(),
                title: "Primer".into(),
                year: 2004,
                director: "Shane Carruth".into(),
                genre: vec!["Sci-Fi".into()],
                rating: "6.8/10".into(),
                match_score: 91,
                reasoning: "Dense, tense time travel.".into(),
                plot_summary: "Two engineers stumble onto something impossible.".into(),
                cast: vec!["Shane Carruth".into(), "David Sullivan".into()],
            },
            Movie {
                id: "movie-1-1".into(),
                title: "Arrival".into(),
                year: 2016,
                director: "Denis Villeneuve".into(),
                genre: vec!["Sci-Fi".into(), "Drama".into()],
                rating: "7.9/10".into(),
                match_score: 96,
                reasoning: "Cerebral first contact.".into(),
                plot_summary: "A linguist decodes an alien language.".into(),
                cast: vec!["Amy Adams".into()],
            },
        ]
    }

    #[test]
    fn empty_list_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_recommendations(&[], dir.path()).unwrap();
        assert!(result.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn export_round_trips_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let movies = movies();
        let path = export_recommendations(&movies, dir.path())
            .unwrap()
            .expect("a file should be written");

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cinemind-recommendations-"));
        assert!(name.ends_with(".json"));

        let raw = fs::read_to_string(&path).unwrap();
        // Pretty-printed with 2-space indentation.
        assert!(raw.contains("\n  {"));
        let parsed: Vec<Movie> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, movies);
    }

    #[test]
    fn export_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("2026");
        let path = export_recommendations(&movies(), &nested).unwrap().unwrap();
        assert!(path.exists());
    }
}
