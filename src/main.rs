//! Chaos Dig entry point
//!
//! On the web the page constructs `WebGame` from the wasm module and drives
//! it itself. Natively this runs a headless offline round and logs what
//! happens, which is handy for tuning chaos timers.

#[cfg(target_arch = "wasm32")]
fn main() {
    // The cdylib exports `WebGame`; nothing to start here
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use chaos_dig::consts::TICK_MS;
    use chaos_dig::config::GameConfig;
    use chaos_dig::sim::ResourceState;
    use chaos_dig::{Game, SessionHistory};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let secs: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(60);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    let chat_control = args.next().is_some_and(|a| a == "chat");

    let config = GameConfig {
        chat_control,
        ..GameConfig::default()
    };
    log::info!(
        "Headless run: {} s, seed {}, {} mode",
        secs,
        seed,
        if chat_control { "chat" } else { "chaos" }
    );

    let mut game = Game::new(seed, 800.0, 600.0, config, ResourceState::default(), SessionHistory::new());
    let frames = (secs as f64 * 1000.0 / TICK_MS) as u64;
    for frame in 0..frames {
        game.advance_frame(TICK_MS);
        for toast in game.drain_toasts() {
            log::info!("[{:>6.1}s] {}", game.state.elapsed_ms / 1000.0, toast);
        }
        for notification in game.drain_notifications() {
            log::info!("[{:>6.1}s] {:?}", game.state.elapsed_ms / 1000.0, notification);
        }
        if frame % 600 == 0 {
            let r = &game.state.resources;
            log::debug!("depth {} score {} money {}", r.depth, r.score, r.money);
        }
    }

    let r = &game.state.resources;
    log::info!(
        "Done: depth {}, score {}, money {}, {} bodies alive",
        r.depth,
        r.score,
        r.money,
        game.state.bodies.len()
    );
}
