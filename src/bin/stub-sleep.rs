//! Reads a request from stdin; sleeps only when `sleep` is set.

use echo_fault_stub::stub::{config::StubConfig, process::run_process};

fn main() {
    run_process(StubConfig::sleep_variant())
}
