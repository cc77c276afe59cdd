mod bootstrap;

use anyhow::Result;
use pmo_core::settings::Settings;
use pmo_runtime::report;
use pmo_runtime::store::DataStore;
use pmo_runtime::summary;
use pmo_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("PMO Analytics v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = bootstrap::resolve_data_dir(settings.data_dir.as_deref());
    tracing::info!(
        "View: {}, Theme: {}, Data dir: {}",
        settings.view,
        settings.theme,
        data_dir.display()
    );

    // One snapshot per run; every front end below reads from it.
    let store = DataStore::load(&data_dir);

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting interactive dashboard...");
            let app = App::new(&settings.theme, store);

            // The TUI loop exits on 'q' / Ctrl+C inside the dashboard. We also
            // listen for Ctrl+C at the OS level so that signals received while
            // the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run() => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; leaving dashboard");
                }
            }
        }

        "report" => {
            tracing::info!("Generating static report...");
            let html = report::render_report(&store);
            std::fs::write(&settings.output, html)?;
            println!("Report written to {}", settings.output.display());
        }

        "summary" => {
            print!("{}", summary::render_summary(&store));
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
