//! Sample application wired with Dirk DI
//!
//! A root component provides the name service, the main screen gets a child
//! component per session with its formatter and view model.

pub mod app;
pub mod errors;
pub mod main_screen;
pub mod splash;
