//! Typed records of a flashcard collection export and the loader producing
//! them.

pub use self::{error::*, record::*, timing::*};

mod error;
pub mod loader;
mod record;
mod timing;
mod tsv;
