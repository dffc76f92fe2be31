//! Route handlers

pub mod users;
