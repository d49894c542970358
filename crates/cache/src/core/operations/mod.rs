//! Cache operations module

mod get;
mod misc;
mod put;
mod remove;

// Operations are implemented directly on the Cache type
