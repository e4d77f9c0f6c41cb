mod app;
mod form;
mod handler;
mod icons;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use replywise_core::Config;

use crate::app::App;
use crate::tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::log_dir().and_then(|dir| logging::init(&dir));

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "could not load config, using defaults");
            let mut config = Config::new();
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
    };

    match Config::write_template() {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "wrote default config"),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "could not write default config"),
    }

    let mut app = App::new(&config).await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_generation().await;
    }

    Ok(())
}
