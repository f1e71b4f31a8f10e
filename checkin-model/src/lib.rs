//! Shared data model for the reading check-in service.
#![allow(missing_docs)]

pub mod ids;
pub mod question;
pub mod response;

pub use ids::{ChatId, UserId};
pub use question::Question;
pub use response::{NewResponse, Response, ResponseStats, UserProfile};
