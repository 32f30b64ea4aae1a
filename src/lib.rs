//! Book information service.
//!
//! Modules live under [`modules`]; [`bootstrap`] wires settings, the database
//! pool, migrations and the HTTP server around them.

pub mod bootstrap;
pub mod modules;
