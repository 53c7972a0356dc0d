pub mod calculator;
pub mod config;
pub mod grading;
pub mod output;
pub mod records;
pub mod sheet;
