use cinemind_schema::UserPreferences;

/// Persona sent with every recommendation request.
pub const SYSTEM_INSTRUCTION: &str = "You are CineMind, an advanced AI film expert. \
You prefer hidden gems and critically acclaimed masterpieces over generic blockbusters \
unless specifically requested.";

/// Render the user profile into the recommendation prompt. Empty fields fall
/// back to "Any" / "Varied" / "None specified" so the model always sees a
/// complete profile.
pub fn build_prompt(prefs: &UserPreferences, count: usize) -> String {
    let mood = prefs
        .mood
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("Any");
    let genres = if prefs.favorite_genres.is_empty() {
        "Varied".to_string()
    } else {
        prefs.favorite_genres.join(", ")
    };
    let recently_watched = if prefs.recently_watched.is_empty() {
        "None specified"
    } else {
        prefs.recently_watched.as_str()
    };

    format!(
        "Act as a sophisticated film critic and recommendation engine.\n\
        Analyze the user's profile deep down to the nuance of their mood and taste.\n\
        \n\
        User Profile:\n\
        - Current Mood: {mood}\n\
        - Favorite Genres: {genres}\n\
        - Recently Watched/Liked: {recently_watched}\n\
        - Duration Preference: {duration}\n\
        \n\
        Task:\n\
        Generate a curated list of {count} movie recommendations.\n\
        - Ensure diversity in era and style if the preferences allow.\n\
        - The 'reasoning' must strictly connect the movie's themes to the user's mood \
        and specific 'Recently Watched' input.\n\
        - 'matchScore' should be high (>90) for perfect fits and lower for 'wildcard' suggestions.",
        duration = prefs.duration_preference.as_str(),
    )
}

/// Declarative reply shape imposed on the provider: an object holding a
/// `recommendations` array of movie objects. Kept as a plain JSON value so
/// it stays independent of any SDK schema API.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "recommendations": {
                "type": "ARRAY",
                "items": movie_schema()
            }
        }
    })
}

fn movie_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "year": { "type": "INTEGER" },
            "director": { "type": "STRING" },
            "genre": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "rating": { "type": "STRING", "description": "IMDb style rating, e.g. 8.5/10" },
            "matchScore": {
                "type": "INTEGER",
                "description": "A confidence score from 0 to 100 based on user preferences"
            },
            "reasoning": {
                "type": "STRING",
                "description": "Why this movie fits the user's specific request"
            },
            "plotSummary": { "type": "STRING", "description": "A concise 2-sentence plot summary" },
            "cast": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Top 3 main actors"
            }
        },
        "required": ["title", "year", "genre", "rating", "matchScore", "reasoning", "plotSummary", "cast"]
    })
}
