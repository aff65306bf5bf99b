pub mod controls;
pub mod scheduler;
pub mod score_client;
pub mod session;
pub mod terminal;
