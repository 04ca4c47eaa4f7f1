pub mod classifier;
pub mod etl;
pub mod labels;
pub mod loader;
pub mod metrics;
pub mod normalizer;
pub mod npy;
pub mod sparse;
pub mod splitter;
pub mod table_io;
pub mod temporal;
pub mod vectorizer;

pub use crate::domain::model::{Label, Partition, Record, Table};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
