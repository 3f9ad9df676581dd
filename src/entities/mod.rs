pub mod event;
pub mod event_image;
pub mod event_video;
pub mod session;
pub mod user;
