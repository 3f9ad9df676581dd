pub mod event;
pub mod upload;
