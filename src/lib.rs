//! Flappy Live Server Library
//!
//! A real-time "flappy bird" simulation server: every connected client gets
//! its own world, advanced at a fixed 60 Hz tick by a dedicated task, fed by
//! asynchronous input events and observed once per tick by its display.

pub mod config;
pub mod game;
pub mod live;
pub mod metrics;
pub mod util;
