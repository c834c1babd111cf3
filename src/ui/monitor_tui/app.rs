use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::config::MonitorConfig;
use crate::core::net_monitor::{
    BandwidthSensor, IcmpProbe, LogSink, RenderFeed, Scheduler, SysinfoCounters,
};

use super::event_handler::MonitorEvent;
use super::render::render_ui;

/// Redraw cadence of the dashboard, independent of the sampling interval
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Monitor application state
pub struct MonitorApp {
    pub config: MonitorConfig,
    pub feed: RenderFeed,
    pub should_quit: bool,
    pub show_help: bool,
}

impl MonitorApp {
    fn new(config: MonitorConfig, feed: RenderFeed) -> Self {
        Self {
            config,
            feed,
            should_quit: false,
            show_help: false,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::None => {}
        }
    }
}

/// Run the monitor TUI application
pub fn run_monitor_app(config: MonitorConfig) -> Result<()> {
    config.validate().context("Invalid monitor configuration")?;
    let target = config
        .resolve_host()
        .context("Failed to resolve target host")?;

    let probe = Box::new(IcmpProbe::new(target, config.probe_timeout()));
    let counters = SysinfoCounters::new(config.interface.clone());
    let bandwidth = BandwidthSensor::new(Box::new(counters));

    // Alerts reach the banner through the published snapshot; the log sink
    // keeps the alternate screen clean.
    let mut scheduler = Scheduler::new(config.clone(), probe, bandwidth, Box::new(LogSink));
    scheduler
        .start()
        .context("Failed to start sampling scheduler")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = MonitorApp::new(config, scheduler.feed());
    let result = run_event_loop(&mut terminal, &mut app);

    scheduler.stop();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut MonitorApp,
) -> Result<()> {
    let mut last_draw = Instant::now();

    loop {
        terminal.draw(|frame| render_ui(frame, app))?;
        last_draw = Instant::now();

        // Poll for input until the next scheduled redraw
        while !app.should_quit {
            let timeout = REDRAW_INTERVAL
                .checked_sub(last_draw.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if event::poll(timeout).context("Event poll failed")? {
                if let Event::Key(key) = event::read().context("Event read failed")? {
                    if key.kind == KeyEventKind::Press {
                        let monitor_event = match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
                            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
                            _ => MonitorEvent::None,
                        };
                        app.handle_event(monitor_event);
                    }
                }
                break;
            }

            if last_draw.elapsed() >= REDRAW_INTERVAL {
                break;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
