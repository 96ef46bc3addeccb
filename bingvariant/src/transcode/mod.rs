pub mod cbor;
pub mod toml;
pub mod yaml;
