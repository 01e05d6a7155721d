pub mod auth;
pub mod emoticons;
pub mod error;
pub mod files;
pub mod messages;
pub mod middleware;
pub mod room_data;
pub mod rooms;
