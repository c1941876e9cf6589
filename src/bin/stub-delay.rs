//! Reads a request from stdin; always sleeps for `delay` and aborts on `exception`.

use echo_fault_stub::stub::{config::StubConfig, process::run_process};

fn main() {
    run_process(StubConfig::delay_variant())
}
