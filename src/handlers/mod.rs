pub mod health;
pub mod message;
pub mod telegram;
