pub mod cache;
pub mod course;
pub mod semester;
pub mod session;

pub use cache::CacheSnapshot;
pub use course::{Catalog, CatalogEntry, CourseCategory};
pub use semester::Semester;
pub use session::{Credential, TokenSet};
