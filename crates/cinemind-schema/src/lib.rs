use serde::{Deserialize, Serialize};

/// Moods the preference form offers. The prompt falls back to "Any" when
/// none is picked.
pub const MOODS: &[&str] = &[
    "Inspiring",
    "Dark",
    "Funny",
    "Tense",
    "Relaxing",
    "Mind-bending",
    "Romantic",
];

/// Genres the preference form offers. Order is presentation order only.
pub const GENRES: &[&str] = &[
    "Action",
    "Sci-Fi",
    "Drama",
    "Comedy",
    "Thriller",
    "Horror",
    "Romance",
    "Mystery",
    "Documentary",
    "Fantasy",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DurationPreference {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

impl DurationPreference {
    /// Lowercase token used in prompts and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationPreference::Any => "any",
            DurationPreference::Short => "short",
            DurationPreference::Medium => "medium",
            DurationPreference::Long => "long",
        }
    }

    /// Human label shown in pickers.
    pub fn label(&self) -> &'static str {
        match self {
            DurationPreference::Any => "Any Length",
            DurationPreference::Short => "Short (< 90 mins)",
            DurationPreference::Medium => "Standard (90-120 mins)",
            DurationPreference::Long => "Epic (> 120 mins)",
        }
    }

    pub fn all() -> &'static [DurationPreference] {
        &[
            DurationPreference::Any,
            DurationPreference::Short,
            DurationPreference::Medium,
            DurationPreference::Long,
        ]
    }
}

impl std::str::FromStr for DurationPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(DurationPreference::Any),
            "short" => Ok(DurationPreference::Short),
            "medium" => Ok(DurationPreference::Medium),
            "long" => Ok(DurationPreference::Long),
            other => Err(format!(
                "unknown duration preference '{other}' (expected any|short|medium|long)"
            )),
        }
    }
}

/// Taste profile captured by the preference form. Immutable once submitted;
/// every field may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub favorite_genres: Vec<String>,
    #[serde(default)]
    pub recently_watched: String,
    #[serde(default)]
    pub duration_preference: DurationPreference,
}

/// One recommended movie. Built only from a parsed provider response and
/// never mutated afterwards; the whole list is replaced on the next search.
///
/// Wire format is camelCase JSON. `id` is stamped locally after parsing and
/// `director` is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub director: String,
    pub genre: Vec<String>,
    pub rating: String,
    pub match_score: u8,
    pub reasoning: String,
    pub plot_summary: String,
    pub cast: Vec<String>,
}

/// The provider's reply shape. Transient: lives for one request cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub recommendations: Vec<Movie>,
}

/// Deterministic placeholder-art seed: title length plus release year, so a
/// given movie always maps to the same image.
pub fn poster_seed(title: &str, year: i32) -> i64 {
    title.chars().count() as i64 + year as i64
}

pub fn card_poster_url(movie: &Movie) -> String {
    format!(
        "https://picsum.photos/seed/{}/400/600",
        poster_seed(&movie.title, movie.year)
    )
}

pub fn detail_poster_url(movie: &Movie) -> String {
    format!(
        "https://picsum.photos/seed/{}/800/450",
        poster_seed(&movie.title, movie.year)
    )
}
