pub mod client;
pub mod types;

pub use client::{GithubClient, SearchOptions, SortField, SortOrder};
pub use types::{
    RateLimitInfo, RateLimitResources, RateLimitResponse, Repository, RepositoryOwner,
    SearchResponse,
};
