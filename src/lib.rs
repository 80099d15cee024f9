pub mod app;
pub mod config;
pub mod effects;
pub mod error;
pub mod event;
pub mod fetch;
pub mod manifest;
pub mod model;
pub mod player;
pub mod queue;
pub mod reconcile;
pub mod studio;
pub mod track;
pub mod ui;
