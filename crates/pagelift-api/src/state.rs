//! Shared application state.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use governor::{Quota, RateLimiter};
use rand::Rng;
use uuid::Uuid;

use pagelift_connect::{
    Ga4DataClient, GoogleOAuthClient, LinkedInClient, SearchConsoleClient, WordPressClient,
};
use pagelift_core::defaults::{LEAD_CAPTURE_RATE_PER_MINUTE, OAUTH_STATE_TTL_SECS};
use pagelift_db::Database;

use crate::config::ApiConfig;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build the public lead-capture rate limiter.
pub fn lead_capture_limiter() -> Arc<GlobalRateLimiter> {
    let per_minute =
        NonZeroU32::new(LEAD_CAPTURE_RATE_PER_MINUTE).expect("rate constant is nonzero");
    Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// In-process store of pending OAuth CSRF states.
///
/// Entries expire after ten minutes; expired entries are swept on every
/// insert so the map stays bounded by recent activity.
#[derive(Clone, Default)]
pub struct OAuthStateStore {
    entries: Arc<Mutex<HashMap<String, (Uuid, Instant)>>>,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new random state for a user and return it.
    pub fn issue(&self, user_id: Uuid) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        let state = hex::encode(bytes);

        let mut entries = self.entries.lock().expect("oauth state lock poisoned");
        let ttl = Duration::from_secs(OAUTH_STATE_TTL_SECS);
        entries.retain(|_, (_, created)| created.elapsed() < ttl);
        entries.insert(state.clone(), (user_id, Instant::now()));
        state
    }

    /// Consume a state, returning the user it was issued for. A state can
    /// only be taken once, and expired states are rejected.
    pub fn take(&self, state: &str) -> Option<Uuid> {
        let mut entries = self.entries.lock().expect("oauth state lock poisoned");
        let (user_id, created) = entries.remove(state)?;
        if created.elapsed() >= Duration::from_secs(OAUTH_STATE_TTL_SECS) {
            return None;
        }
        Some(user_id)
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<ApiConfig>,
    /// Google OAuth client (None when the integration is unconfigured).
    pub google: Option<Arc<GoogleOAuthClient>>,
    pub search_console: Arc<SearchConsoleClient>,
    pub ga4: Arc<Ga4DataClient>,
    /// LinkedIn client (None when the integration is unconfigured).
    pub linkedin: Option<Arc<LinkedInClient>>,
    /// WordPress cross-publishing client (None when unconfigured).
    pub wordpress: Option<Arc<WordPressClient>>,
    /// Pending OAuth CSRF states for the LinkedIn connect flow.
    pub oauth_states: OAuthStateStore,
    /// Public lead-capture rate limiter (None disables rate limiting).
    pub lead_limiter: Option<Arc<GlobalRateLimiter>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_state_single_use() {
        let store = OAuthStateStore::new();
        let user = Uuid::new_v4();
        let state = store.issue(user);

        assert_eq!(store.take(&state), Some(user));
        assert_eq!(store.take(&state), None, "state is single-use");
    }

    #[test]
    fn test_oauth_state_unknown_rejected() {
        let store = OAuthStateStore::new();
        assert_eq!(store.take("deadbeef"), None);
    }

    #[test]
    fn test_oauth_states_are_unique_and_hex() {
        let store = OAuthStateStore::new();
        let a = store.issue(Uuid::new_v4());
        let b = store.issue(Uuid::new_v4());
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
