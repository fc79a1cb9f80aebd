use anyhow::Context;
use lime_harling::{Config, Memory, USAGE, handle_input, update_and_render};

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(start))]
fn main() {
    #[cfg(target_arch = "wasm32")]
    let config = {
        harling::platform::wasm::init_logger(log::LevelFilter::Info);
        Config::default()
    };

    #[cfg(not(target_arch = "wasm32"))]
    let config = {
        use clap::Parser;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_micros()
            .init();
        Config::parse()
    };

    if let Err(err) = run(config) {
        log::error!("{err:#}");
        #[cfg(not(target_arch = "wasm32"))]
        std::process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    log::info!("starting {} with {:?}", env!("CARGO_PKG_NAME"), config);
    let app = harling::App::new(Memory::new(config.render), config.window());

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(frames) = config.headless {
        let mut backend = harling::Headless::idle(frames);
        app.run_with(&mut backend, handle_input, update_and_render)
            .context("headless run failed")?;
        log::info!("rendered {} frames", backend.presented());
        return Ok(());
    }

    for line in USAGE {
        #[cfg(target_arch = "wasm32")]
        log::info!("{line}");
        #[cfg(not(target_arch = "wasm32"))]
        println!("{line}");
    }

    app.run(handle_input, update_and_render)
        .context("animation stopped")?;
    log::info!("animation finished");
    Ok(())
}
