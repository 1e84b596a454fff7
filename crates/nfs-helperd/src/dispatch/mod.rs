//! JSONL request dispatch.
//!
//! Each connection carries exactly one request line and receives exactly one
//! response line:
//!
//! ```json
//! {"op":"remove_export","path":"/srv/old","request_id":"42"}
//! {"ok":false,"error":"Export not found: /srv/old","code":"NOT_FOUND","request_id":"42"}
//! ```
//!
//! [`RequestDispatcher`] decodes the line into a typed `Request` and hands
//! it to the router; `DispatchError::code` maps any failure onto the wire
//! error codes.

mod dispatcher;
mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use self::dispatcher::RequestDispatcher;
pub use self::handler::DispatchConnectionHandler;
pub use self::router::RequestRouter;
