//! ctfd-config: Server configuration resolution for CTFd
//!
//! This crate reads the INI configuration file, lets environment variables
//! fill in options left empty, coerces the raw strings into typed values and
//! derives the database and cache connection settings.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use ctfd_config::{resolve_config, ResolveOptions, Store};
//!
//! let ini = r#"
//! [server]
//! SECRET_KEY = change-me
//! DATABASE_HOST =
//! REDIS_HOST = cache
//!
//! [extra]
//! MY_CUSTOM_OPTION = hello
//! "#;
//!
//! let store = Store::from_ini_str(ini).unwrap();
//! let env: HashMap<String, String> = [("DATABASE_HOST".to_string(), "db".to_string())].into();
//!
//! let config = resolve_config(&store, &env, &ResolveOptions::default()).unwrap();
//! assert_eq!(config.database_url(), "mysql+pymysql://ctfd@db/ctfd");
//! assert_eq!(config.cache_redis_url(), Some("redis://cache:6379/0"));
//! assert_eq!(config.extra("MY_CUSTOM_OPTION").unwrap().as_str(), Some("hello"));
//! ```

pub mod coerce;
pub mod env;
pub mod error;
pub mod interpolation;
pub mod proxy;
pub mod schema;
pub mod secret;
pub mod store;
pub mod value;

mod config;

pub use config::{resolve_config, Cache, ResolveOptions, ServerConfig, BUILTIN_KEYS};
pub use env::{Environment, ProcessEnv};
pub use error::{Error, ErrorKind, Result};
pub use proxy::TrustedProxies;
pub use schema::Schema;
pub use secret::{SecretKey, SecretProvisioner};
pub use store::Store;
pub use value::{Value, ValueType};
