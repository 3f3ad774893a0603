pub mod handlers;
pub mod routes;
pub mod scheduler;

pub use routes::create_router;
