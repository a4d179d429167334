/**
 * file: lib.rs
 * desc: Code shared by the novsim pipeline steps: the transcript index table, errors and helpers.
 */
pub mod error;
pub mod index;
pub mod util;

pub use error::{Result, SimError};
