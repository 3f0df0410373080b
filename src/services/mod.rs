pub mod block_service;
pub mod conversation_service;
pub mod gateway;
pub mod health_service;
pub mod hub;
pub mod identity_service;
pub mod match_service;
pub mod message_service;
pub mod presence;
pub mod swipe_service;
