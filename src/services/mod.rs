pub mod cache_store;
pub mod catalog_fetcher;
pub mod catalog_loader;
pub mod classifier;

pub use cache_store::CacheStore;
pub use catalog_fetcher::CatalogFetcher;
pub use catalog_loader::CatalogLoader;
pub use classifier::{classify, Outcome};
