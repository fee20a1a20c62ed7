pub mod contact_service;
pub mod handlers;
pub mod logs;
pub mod middleware;
pub mod orders;
pub mod routes;
pub mod settings;

pub use routes::create_router;
