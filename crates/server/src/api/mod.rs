pub mod catalog;
pub mod downloads;
pub mod handlers;
pub mod middleware;
pub mod queue;
pub mod results;
pub mod routes;

pub use routes::create_router;
