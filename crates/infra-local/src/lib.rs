// Resume Match Infrastructure - Local Adapters
// Implements: SessionStore; document loading and export writing for the CLI

pub mod documents;
pub mod export_writer;
pub mod paths;
pub mod session_store;

pub use documents::load_document;
pub use export_writer::ExportWriter;
pub use session_store::FileSessionStore;
