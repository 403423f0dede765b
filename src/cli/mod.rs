pub mod history;
pub mod ingest;
pub mod report;
pub mod setup;
pub mod ui;
