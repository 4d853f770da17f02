use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, time::Duration};

use geowx::app::{run_app, App, Fetcher};
use geowx::cli::Args;
use geowx::config::Config;
use geowx::logger::{default_log_path, init_logger};
use geowx::shell::{create_app, HostDocument};

const HOST_SELECTOR: &str = "#app";

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logger(args.log_level.map(Into::into), &log_path)?;

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    if let Some(units) = args.units {
        config.units = units;
    }
    if let Some(refresh) = args.refresh {
        config.refresh_secs = refresh;
    }
    config.validate()?;
    if args.save {
        config.save_to(&config_path)?;
    }
    config.apply_env();

    let fetcher = Fetcher::new(&config, args.ip)?;
    let root = App::new(
        config.units,
        Duration::from_secs(config.refresh_secs),
        move || fetcher.fetch(),
    );

    let document = HostDocument::terminal(&config.host_id);
    let mut mounted = match create_app(root).mount(document, HOST_SELECTOR) {
        Ok(mounted) => mounted,
        Err(err) => {
            log::error!("{err}");
            return Err(err.into());
        }
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut mounted);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err}");
        println!("{:?}", err)
    }

    Ok(())
}
