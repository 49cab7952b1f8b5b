pub mod health;
pub mod problem;
pub mod router;
pub mod state;
