// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod session;
pub mod store;
pub mod uploads;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use session::{SessionManager, SessionError, SessionClaims, IssuedSession};
pub use store::{UserStore, PlanStore, StoreError};
pub use uploads::{UploadStore, UploadError, ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};
