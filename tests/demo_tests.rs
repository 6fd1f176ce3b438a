use cppsim::output::BufferSink;
use cppsim::{run_with_config, RunConfig};
use std::fs;
use std::path::Path;

fn run_demo(name: &str, config: &RunConfig) -> (i32, Vec<String>) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
    let source = fs::read_to_string(path).expect("Failed to read demo file");

    let mut sink = BufferSink::new();
    let status = run_with_config(&source, config, &mut sink).expect("Execution failed");
    (status, sink.lines())
}

#[test]
fn test_tour_release() {
    let (status, lines) = run_demo("tour.cpp", &RunConfig::new());
    assert_eq!(status, 0);
    assert_eq!(
        lines,
        vec![
            "squares: 1 4 9 16",
            "clicks = 5",
            "55,7",
            "ababab",
            "ratio 3.5",
            "release build",
        ]
    );
}

#[test]
fn test_tour_debug() {
    let (_, lines) = run_demo("tour.cpp", &RunConfig::new().with_macros(["DEBUG"]));
    assert_eq!(lines.last().map(String::as_str), Some("debug build"));
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_tour_step_budget() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tour.cpp");
    let source = fs::read_to_string(path).expect("Failed to read demo file");
    let config = RunConfig::new().with_max_steps(20);

    let mut sink = BufferSink::new();
    let err = run_with_config(&source, &config, &mut sink).unwrap_err();
    assert_eq!(err.kind(), cppsim::ErrorKind::Cancelled);
    assert!(sink.contents().starts_with("squares:"));
}
