//! Behavioural suites for the helper daemon.

mod socket_behaviour;
mod support;
