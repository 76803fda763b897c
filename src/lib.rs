pub mod anchor;
pub mod clone;
pub mod command;
pub mod fileformat;
pub mod runtime;
pub mod umi;
