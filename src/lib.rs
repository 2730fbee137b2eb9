pub mod cipher;
pub mod config;
pub mod consts;
pub mod error;
pub mod optimizer;
pub mod scorer;
pub mod sweep;
pub mod util;
// cmd and reports belong to the binary (main.rs).
