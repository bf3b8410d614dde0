pub mod analytics;
pub mod quota;
pub mod rate_limit;
pub mod window;

pub use analytics::{VisitCounter, VisitStats};
pub use quota::QuotaReport;
pub use rate_limit::{LocalRateLimiter, MemoryStorage, Storage, UsageRecord};
pub use window::SlidingWindow;
