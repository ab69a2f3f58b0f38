pub mod middleware;

pub use middleware::{RequireAuth, UserIdFromToken};
