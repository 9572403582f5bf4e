//! SurrealDB repository implementations.

mod grant;
mod grouped_object;

pub use grant::SurrealGrantRepository;
pub use grouped_object::SurrealGroupedObjectRepository;
