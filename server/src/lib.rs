pub extern crate actix_web;

pub mod connection;
mod registry;
pub mod relay;
