#![no_std]

pub mod app;
pub(crate) mod drivers;
