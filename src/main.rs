use eframe::egui;
use env_logger::{Builder, Env, Target};
use humidity_visualizer::{HumidityClient, HumidityError, VisualizerApp, VisualizerConfig};
use log::info;

fn main() -> Result<(), HumidityError> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let config = VisualizerConfig::default();
    let client = HumidityClient::from_config(&config)?;

    // Refresh cycles run on this runtime, off the UI thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("humidity-refresh")
        .enable_all()
        .build()
        .map_err(HumidityError::Runtime)?;
    let runtime_handle = runtime.handle().clone();

    info!("Polling {}", client.url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&config.window_title)
            .with_inner_size([1024.0, 720.0]),
        ..Default::default()
    };
    let interval = config.refresh_interval;

    eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(VisualizerApp::start(
                cc,
                &runtime_handle,
                client,
                interval,
            )))
        }),
    )?;

    runtime.shutdown_background();
    Ok(())
}
