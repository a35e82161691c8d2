/// Integration test target: engine operations over a real SQLite store
mod engine_flow;
