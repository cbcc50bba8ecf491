pub mod crc;
pub mod manifest;
pub mod pattern;
pub mod report;
pub mod resolve;
pub mod results_log;
pub mod verify;
