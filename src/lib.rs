pub mod advice;
pub mod app;
pub mod config;
pub mod dishes;
pub mod meals;
pub mod nutrients;
pub mod state;
pub mod views;
