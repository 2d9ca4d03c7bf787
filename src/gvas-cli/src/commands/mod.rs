//! Command handlers for the gvas CLI

pub mod configure;
pub mod convert;
