pub mod check;
pub mod config;
pub mod history;
pub mod info;
pub mod run;
