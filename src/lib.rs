pub mod api;
pub mod codec;
pub mod config;
pub mod consts;
pub mod core_types;
pub mod corpus;
pub mod error;
pub mod layers;
pub mod optimizer;
pub mod scorer;
// cmd and reports are binary modules (see main.rs).
