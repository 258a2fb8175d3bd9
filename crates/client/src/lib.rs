#![forbid(unsafe_code)]

//! Async shell around the candidate list coordinator: configuration, the
//! GraphQL gateway, the list session actor and small persistence helpers.

pub mod config;
pub mod debounce;
pub mod detail;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod url_state;

pub use config::{Config, ConfigError, GraphQlConfig, ListConfig};
pub use debounce::Debouncer;
pub use detail::load_detail;
pub use gateway::{CandidateGateway, GatewayError, GraphQlGateway, InMemoryGateway};
pub use session::{ListSession, SessionError, SessionOptions};
pub use storage::{SafeStorage, PAGE_SIZE_KEY};
pub use url_state::{set_search_params, ListLocation};
