// Provider implementations backing RepositorySource
pub mod github;

pub use github::GitHubProvider;
