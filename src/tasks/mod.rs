pub mod app;
pub mod comm;
