pub mod ai;
pub mod commands;
pub mod conversation;
pub mod dispatcher;
pub mod fallback;
pub mod google;
pub mod messaging;
pub mod timeparse;
