pub mod blocks;
pub mod chat;
pub mod gateway;
pub mod health;
pub mod matches;
pub mod pagination;
pub mod swipes;
