//! Behavioural coverage for the client runtime.

mod support;
