pub mod auth;
pub mod conversation;
pub mod events;
pub mod matching;
pub mod message;
pub mod pagination;
pub mod swipe;
pub mod user;
