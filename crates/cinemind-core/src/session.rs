use cinemind_schema::{Movie, RecommendationResponse};

use crate::engine::RecommendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No search has run yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last search returned at least one movie.
    Ready,
    /// The last search completed with zero movies.
    Empty,
    /// The last search failed; only the fixed user message is exposed.
    Failed,
}

/// Owner of the current search cycle: the phase plus the one movie list,
/// replaced atomically when a search resolves. Card selection and overlays
/// live in the UI and never touch this state.
#[derive(Debug)]
pub struct SearchSession {
    phase: SearchPhase,
    movies: Vec<Movie>,
    error: Option<&'static str>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
            movies: Vec::new(),
            error: None,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    pub fn has_searched(&self) -> bool {
        self.phase != SearchPhase::Idle
    }

    /// Start a new search from any phase. Previous results and errors are
    /// cleared before the request goes out.
    pub fn begin(&mut self) {
        self.phase = SearchPhase::Loading;
        self.movies.clear();
        self.error = None;
    }

    /// Resolve the in-flight search. Outcomes that arrive when no search is
    /// loading are stale and dropped.
    pub fn finish(&mut self, outcome: Result<RecommendationResponse, RecommendError>) {
        if self.phase != SearchPhase::Loading {
            tracing::debug!("dropping search outcome received outside Loading");
            return;
        }
        match outcome {
            Ok(response) if response.recommendations.is_empty() => {
                self.phase = SearchPhase::Empty;
                self.movies.clear();
            }
            Ok(response) => {
                self.phase = SearchPhase::Ready;
                self.movies = response.recommendations;
            }
            Err(err) => {
                tracing::error!(error = %err, "search failed");
                self.phase = SearchPhase::Failed;
                self.movies.clear();
                self.error = Some(err.user_message());
            }
        }
    }
}
