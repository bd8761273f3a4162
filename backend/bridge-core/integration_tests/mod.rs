// Integration test target: full-stack tests against an in-process
// WebSocket control server (see ws_tests/helpers.rs).

mod ws_tests;
