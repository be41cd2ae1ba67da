//! Project-wide constants.

use std::time::Duration;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default model asked for search queries when `TELEX_AI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";

/// Google Custom Search JSON API endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results requested per search query (the API maximum).
pub const SEARCH_RESULTS_PER_QUERY: u8 = 10;

/// Pause after each successful search to stay under provider rate limits.
pub const DEFAULT_SEARCH_PAUSE: Duration = Duration::from_secs(1);

/// Upper bound on a single query-generation round trip.
pub const PLANNER_TIMEOUT: Duration = Duration::from_secs(35);

/// Upper bound on a single search request.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single webhook delivery.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the caller credential to the model gateway.
pub const AGENT_API_KEY_HEADER: &str = "X-AGENT-API-KEY";

/// Header selecting the model on the gateway.
pub const MODEL_HEADER: &str = "X-MODEL";

/// Header carrying the caller credential on webhook deliveries.
pub const WEBHOOK_API_KEY_HEADER: &str = "X-TELEX-API-KEY";

/// Status text attached to a freshly submitted task.
pub const SUBMITTED_MESSAGE: &str = "In progress";

/// Shown to callers when query generation fails.
pub const PLANNER_FAILURE_MESSAGE: &str = "Could not understand the AI model's response.";

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// How long shutdown waits for queued jobs before aborting workers.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
