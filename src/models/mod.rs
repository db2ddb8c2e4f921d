//! Data models exchanged with the course backend.
//!
//! Field names follow the backend's JSON so records pass through unchanged.

mod account;
pub mod de;
mod course;
mod email;
mod inscription;
mod page;
mod payment;
mod site;
mod turno;
mod workshop;

pub use account::*;
pub use course::*;
pub use email::*;
pub use inscription::*;
pub use page::*;
pub use payment::*;
pub use site::*;
pub use turno::*;
pub use workshop::*;
