// Git backup/sync: engine, worker bridge, message translation, orchestrator.

pub mod engine;
pub mod service;
pub mod translate;
pub mod worker;
