pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use rate_limit::{enforce_rate_limit, RateGuard, RateLimiter, RateLimits};
pub use response::{ApiResponse, ApiResult};
