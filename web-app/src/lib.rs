//! HTTP front end for the comment classifier.
//!
//! | Route             | Handler               |
//! |-------------------|-----------------------|
//! | `GET /`           | static home page      |
//! | `POST /class`     | classify one comment  |
//! | `GET /subreddits` | known community names |

pub mod api;
pub mod server;

pub use api::{AppState, ClassifyRequest, ClassifyResponse};
pub use server::{load_home_page, router, serve};
