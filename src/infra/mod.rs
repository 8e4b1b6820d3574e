pub mod http_client;
pub mod object_store;

pub use http_client::ReqwestFetcher;
pub use object_store::{FsObjectStore, HttpObjectStore};
