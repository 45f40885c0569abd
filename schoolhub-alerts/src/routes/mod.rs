pub mod alerts;
pub mod health;
