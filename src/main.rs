//! Headless dashboard driver
//!
//! Follows the feed, drives the viewport engine and logs what would be drawn.
//! Reads commands from stdin: `live`, `scrub <hours>`, `resize <w> <h>`,
//! `ack <minutes>`.
//!
//! Run with: cargo run --features cli --bin glucose-cli

#[cfg(not(target_arch = "wasm32"))]
use glucose_vis::core::{Millis, HOUR_MS, MINUTE_MS};

/// Virtual container size until a `resize` command says otherwise
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SIZE: (f32, f32) = (1024.0, 600.0);

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Live,
    /// Look at the window ending this long before the latest sample
    Scrub(Millis),
    Resize(f32, f32),
    /// Silence the current alarm
    Ack(Millis),
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let cmd = match (parts.next()?, parts.next(), parts.next()) {
        ("live", None, None) => Command::Live,
        ("scrub", Some(hours), None) => {
            let hours: f64 = hours.parse().ok()?;
            Command::Scrub((hours * HOUR_MS as f64) as Millis)
        }
        ("resize", Some(w), Some(h)) => Command::Resize(w.parse().ok()?, h.parse().ok()?),
        ("ack", Some(minutes), None) => Command::Ack(minutes.parse::<Millis>().ok()? * MINUTE_MS),
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(cmd)
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use glucose_vis::config::DashboardConfig;
    use glucose_vis::core::{
        clock_label, parse_feed, AlarmState, Engine, EngineEvent, FeedMessage, SeriesTag,
        SILENCE_OPTIONS_MIN,
    };
    use glucose_vis::time::now_millis;
    use glucose_vis::websocket_native::NativeWsClient;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tracing::{debug, info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glucose_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = DashboardConfig::from_env();
    let mut client = NativeWsClient::connect(&config.ws_url);

    let mut engine = Engine::new(&config, now_millis());
    engine.handle(EngineEvent::Resize { width: DEFAULT_SIZE.0, height: DEFAULT_SIZE.1 }, now_millis());

    let mut alarm = AlarmState::new();
    let mut watchers = 0u32;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut tick = tokio::time::interval(std::time::Duration::from_millis(250));
    let mut stats_interval = tokio::time::interval(std::time::Duration::from_secs(30));

    info!("Waiting for feed data...");

    loop {
        tokio::select! {
            msg = client.rx.recv() => {
                let Some(text) = msg else {
                    warn!("Feed client stopped");
                    break;
                };
                let now = now_millis();
                match parse_feed(&text) {
                    Some(FeedMessage::Batch(batch)) => engine.handle(EngineEvent::DataArrived(batch), now),
                    Some(FeedMessage::Now(t)) => engine.handle(EngineEvent::Now(t), now),
                    Some(FeedMessage::Alarm(kind)) => {
                        alarm.raise(kind);
                        info!(options = ?SILENCE_OPTIONS_MIN, "Silence with `ack <minutes>`");
                    }
                    Some(FeedMessage::ClearAlarm) => {
                        alarm.clear();
                    }
                    Some(FeedMessage::Clients(n)) => {
                        watchers = n;
                        debug!(watchers, "Watcher count");
                    }
                    None => {}
                }
            }
            line = stdin.next_line(), if stdin_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!("stdin closed, commands disabled");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        stdin_open = false;
                        continue;
                    }
                };
                let now = now_millis();
                match parse_command(&line) {
                    Some(Command::Live) => engine.handle(EngineEvent::RevertToLive, now),
                    Some(Command::Scrub(back)) => {
                        let Ok((_, max)) = engine.store().data_range() else {
                            warn!("No data to scrub through yet");
                            continue;
                        };
                        let end = max - back;
                        engine.push(EngineEvent::BrushStart, now);
                        engine.push(EngineEvent::BrushMove { start: end - config.focus_span_ms, end }, now);
                        engine.push(EngineEvent::BrushEnd, now);
                        engine.process(now);
                    }
                    Some(Command::Resize(width, height)) => {
                        engine.handle(EngineEvent::Resize { width, height }, now);
                    }
                    Some(Command::Ack(silence)) => {
                        if !alarm.is_active() {
                            info!("No alarm to silence");
                            continue;
                        }
                        if !client.send(alarm.acknowledge(silence)) {
                            warn!("Feed client gone, ack not sent");
                        }
                    }
                    None => warn!(line = %line, "Unknown command"),
                }
            }
            _ = tick.tick() => {
                engine.process(now_millis());
                if let Some(frame) = engine.take_frame() {
                    let raw = frame.focus_points.iter().filter(|p| p.tag == SeriesTag::Raw).count();
                    info!(
                        mode = ?frame.mode,
                        from = %clock_label(frame.brush.window.start),
                        to = %clock_label(frame.brush.window.end),
                        points = frame.focus_points.len(),
                        raw,
                        treatments = frame.treatments.len(),
                        transition_ms = frame.transition_ms,
                        "frame"
                    );
                }
            }
            _ = stats_interval.tick() => {
                info!(
                    clock = %clock_label(engine.server_now()),
                    bg = ?engine.store().latest_raw().map(|s| s.value),
                    watchers,
                    alarm = alarm.is_active(),
                    revert_due = ?engine.revert_due(),
                    feed = client.state().label(),
                    "status"
                );
            }
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("live"), Some(Command::Live));
        assert_eq!(parse_command("scrub 1.5"), Some(Command::Scrub(90 * MINUTE_MS)));
        assert_eq!(parse_command("resize 800 600"), Some(Command::Resize(800.0, 600.0)));
        assert_eq!(parse_command("ack 30"), Some(Command::Ack(30 * MINUTE_MS)));
    }

    #[test]
    fn test_reject_malformed_commands() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("scrub"), None);
        assert_eq!(parse_command("resize 800"), None);
        assert_eq!(parse_command("live now"), None);
        assert_eq!(parse_command("ack soon"), None);
    }
}
