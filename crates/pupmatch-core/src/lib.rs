//! Client-side models and rendering for the PupMatch adoption site.

pub mod adoption;
pub mod age;
pub mod catalog;
pub mod context;
pub mod editor;
pub mod error;
pub mod export;
pub mod images;
pub mod mirror;
pub mod model;
pub mod render;
pub mod resolver;
pub mod storage;

pub use context::{AppContext, Notice};
pub use error::{CoreError, Result};
pub use model::{AdoptionFields, AdoptionRecord, Attributes, Dog, NewDog, ParentRecord, Parents};
pub use storage::{FileStore, MemoryStore, SharedStore};
