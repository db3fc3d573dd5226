//! Back-office console library exports.

pub mod clients;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod keys;
pub mod logging;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod screen;
pub mod state;
pub mod theme;
pub mod views;
pub mod widgets;
