//! Folio core: portfolio project records with split key-value persistence,
//! Excalidraw scene ingestion and rendering, and a single-operator session
//! gate.

pub mod config;
pub mod diagram;
pub mod error;
pub mod model;
pub mod repository;
pub mod session;
pub mod storage;

pub use error::{FolioError, ParseError, Result};
pub use repository::ProjectRepository;
pub use session::SessionGate;
