//! Bookshelf application library
//!
//! The books resource, the seed, and the process bootstrap shared by the
//! server binary and the CLI.

pub mod app;
pub mod modules;
pub mod seed;

pub use app::serve;
pub use modules::books::models::{Book, BookFields, BookId};
