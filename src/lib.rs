pub mod action;
pub mod config;
pub mod error;
pub mod executor;
pub mod parse;
pub mod report;
pub mod run;
pub mod select;
pub mod traverse;
pub mod visitor;
pub mod wasm;
