//! Keg tracker terminal UI library
//!
//! Grid, board and stats views over the keg tracker API. The board's
//! drag-and-drop becomes a keyboard gesture: pick a keg up, carry it across
//! the station columns and drop it.

pub mod app;
pub mod data;
pub mod events;
pub mod ui;
