pub mod peaks;
pub mod statistics;
