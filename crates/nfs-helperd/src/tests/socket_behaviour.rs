//! Behavioural tests for the helper socket listener.

use std::cell::RefCell;
use std::fs;
use std::os::unix::net::UnixListener;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::tests::support::{RecordingRunner, TestConfigLoader, exchange, start_helper};
use crate::transport::ListenerHandle;

type StepResult = Result<(), String>;

struct ListenerWorld {
    loader: TestConfigLoader,
    listener: Option<ListenerHandle>,
    reply: Option<String>,
}

impl ListenerWorld {
    fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            listener: None,
            reply: None,
        }
    }

    fn start(&mut self) -> StepResult {
        let runner = Arc::new(RecordingRunner::succeeding());
        self.listener = Some(start_helper(&self.loader, runner)?);
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> StepResult {
        self.reply = Some(exchange(&self.loader.socket_path(), payload)?);
        Ok(())
    }

    fn reply(&self) -> &str {
        self.reply.as_deref().expect("a reply should be recorded")
    }
}

impl Drop for ListenerWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.shutdown();
            let _ = handle.join();
        }
    }
}

#[fixture]
fn world() -> RefCell<ListenerWorld> {
    RefCell::new(ListenerWorld::new())
}

#[given("a stale socket left behind at the socket path")]
fn given_stale_socket(world: &RefCell<ListenerWorld>) -> StepResult {
    let state = world.borrow();
    fs::create_dir_all(state.loader.run_dir()).map_err(|error| error.to_string())?;
    let stale = UnixListener::bind(state.loader.socket_path()).map_err(|error| error.to_string())?;
    drop(stale);
    if state.loader.socket_path().exists() {
        Ok(())
    } else {
        Err("stale socket file should remain after the listener closes".to_owned())
    }
}

#[given("a running listener")]
fn given_running_listener(world: &RefCell<ListenerWorld>) -> StepResult {
    world.borrow_mut().start()
}

#[when("the listener starts")]
fn when_listener_starts(world: &RefCell<ListenerWorld>) -> StepResult {
    world.borrow_mut().start()
}

#[when("a client sends two request lines on one connection")]
fn when_two_lines(world: &RefCell<ListenerWorld>) -> StepResult {
    world
        .borrow_mut()
        .send(b"{\"op\":\"list_exports\"}\n{\"op\":\"frobnicate\"}\n")
}

#[when("a client closes the connection after a partial request")]
fn when_partial_request(world: &RefCell<ListenerWorld>) -> StepResult {
    world.borrow_mut().send(b"{\"op\":\"list_exp")
}

#[when("the listener shuts down")]
fn when_listener_shuts_down(world: &RefCell<ListenerWorld>) -> StepResult {
    let handle = world
        .borrow_mut()
        .listener
        .take()
        .ok_or_else(|| "listener not running".to_owned())?;
    handle.shutdown();
    handle.join().map_err(|error| error.to_string())
}

#[then("the listener answers a list_exports request")]
fn then_answers_list(world: &RefCell<ListenerWorld>) -> StepResult {
    world.borrow_mut().send(b"{\"op\":\"list_exports\"}\n")?;
    assert_eq!(
        world.borrow().reply(),
        "{\"ok\":true,\"result\":[],\"request_id\":\"\"}\n"
    );
    Ok(())
}

#[then("exactly one response line is received")]
fn then_one_line(world: &RefCell<ListenerWorld>) {
    let state = world.borrow();
    let lines: Vec<&str> = state.reply().lines().collect();
    assert_eq!(lines, ["{\"ok\":true,\"result\":[],\"request_id\":\"\"}"]);
}

#[then("no response is received")]
fn then_no_response(world: &RefCell<ListenerWorld>) {
    assert_eq!(world.borrow().reply(), "");
}

#[then("the socket path no longer exists")]
fn then_socket_removed(world: &RefCell<ListenerWorld>) {
    assert!(!world.borrow().loader.socket_path().exists());
}

#[scenario(path = "tests/features/socket_listener.feature")]
fn socket_listener(#[from(world)] world: RefCell<ListenerWorld>) {
    drop(world);
}
