pub mod analytics;
pub mod health;
pub mod rate_limit;
pub mod search;
