use packet_viz::config::Config;
use packet_viz::headless::run_headless;

#[tokio::test(start_paused = true)]
async fn test_headless_prints_one_json_line_per_frame() {
    let mut config = Config::default();
    config.animation.continuous_motion = false;
    let mut out: Vec<u8> = Vec::new();

    run_headless(&config, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 10);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["phase"], "running");
    assert_eq!(first["current_step_index"], 0);
    assert_eq!(first["marker"]["kind"], "at_node");

    let last: serde_json::Value = serde_json::from_str(lines[9]).unwrap();
    assert_eq!(last["phase"], "completed");
    assert_eq!(last["security_check_count"], 3);
    assert_eq!(last["hop_count"], 5);
    assert_eq!(last["packet_marker_glyph"], "🔒");
}

#[tokio::test(start_paused = true)]
async fn test_headless_includes_transit_frames() {
    let config = Config::default();
    let mut out: Vec<u8> = Vec::new();

    run_headless(&config, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    let transit = text.lines().filter(|l| l.contains("\"in_transit\"")).count();
    assert_eq!(transit, 50);
}
