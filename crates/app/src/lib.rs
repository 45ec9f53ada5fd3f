//! ElanCart application shell: catalog fetching and caching, file-backed state, the timed
//! payment gateway, configuration and logging.

pub mod catalog;
pub mod config;
pub mod context;
pub mod observability;
pub mod payment;
pub mod storage;
