use std::io;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use reqwest::blocking::Client;

use crate::config::Config;
use crate::error::FetchError;
use crate::geolocation::UserGeolocation;
use crate::http::{self, Endpoint};
use crate::shell::{Action, Component, Mounted, STATUS_ELEMENT_ID};
use crate::units::{direction::degree_to_compass, Units};
use crate::weather::{Rain, Weather};

const MISSING: &str = "--";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of one fetch round.
#[derive(Debug)]
pub struct Snapshot {
    pub geolocation: Result<UserGeolocation, FetchError>,
    /// `None` when the geolocation lookup failed and weather was not asked for.
    pub weather: Option<Result<Weather, FetchError>>,
    pub fetched_at: DateTime<Local>,
}

/// Looks up the caller's location, then the weather there.
pub struct Fetcher {
    client: Client,
    geolocation: Endpoint,
    weather: Endpoint,
    ip: Option<String>,
    units: Units,
}

impl Fetcher {
    pub fn new(config: &Config, ip: Option<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client: http::client()?,
            geolocation: config.geolocation.endpoint(),
            weather: config.weather.endpoint(),
            ip,
            units: config.units,
        })
    }

    pub fn fetch(&self) -> Snapshot {
        self.fetch_with(|| {
            UserGeolocation::lookup(&self.client, &self.geolocation, self.ip.as_deref())
        })
    }

    /// Run one round with `locate` standing in for the geolocation lookup.
    fn fetch_with(
        &self,
        locate: impl FnOnce() -> Result<UserGeolocation, FetchError>,
    ) -> Snapshot {
        let geolocation = locate();
        let weather = match &geolocation {
            Ok(geo) => Some(
                geo.coordinates()
                    .map_err(FetchError::from)
                    .and_then(|at| Weather::current(&self.client, &self.weather, at, self.units)),
            ),
            Err(e) => {
                log::warn!("geolocation lookup failed: {e}");
                None
            }
        };
        if let Some(Err(e)) = &weather {
            log::warn!("weather lookup failed: {e}");
        }
        Snapshot {
            geolocation,
            weather,
            fetched_at: Local::now(),
        }
    }
}

/// The composition root. Nothing is fetched until the first `tick`.
pub struct App {
    snapshot: Option<Snapshot>,
    units: Units,
    refresh: Duration,
    last_fetch: Option<Instant>,
    fetch: Box<dyn Fn() -> Snapshot>,
}

impl App {
    pub fn new(units: Units, refresh: Duration, fetch: impl Fn() -> Snapshot + 'static) -> Self {
        Self {
            snapshot: None,
            units,
            refresh,
            last_fetch: None,
            fetch: Box::new(fetch),
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn refetch(&mut self) {
        log::debug!("refetching");
        self.snapshot = Some((self.fetch)());
        self.last_fetch = Some(Instant::now());
    }
}

impl Component for App {
    fn render(&self, f: &mut Frame, area: Rect) {
        match &self.snapshot {
            Some(snapshot) => ui(f, area, snapshot, self.units),
            None => pending(f, area),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => {
                self.refetch();
                Action::Continue
            }
            _ => Action::Continue,
        }
    }

    fn tick(&mut self) {
        if self
            .last_fetch
            .map_or(true, |at| at.elapsed() >= self.refresh)
        {
            self.refetch();
        }
    }
}

pub fn run_app<B: Backend, R: Component>(
    terminal: &mut Terminal<B>,
    mounted: &mut Mounted<R>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            mounted.draw(f);
            draw_status(f, mounted);
        })?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && mounted.root_mut().handle_key(key) == Action::Quit
                {
                    return Ok(());
                }
            }
        }

        mounted.root_mut().tick();
    }
}

fn draw_status<R: Component>(f: &mut Frame, mounted: &Mounted<R>) {
    let Some(area) = mounted.document().area_of(STATUS_ELEMENT_ID, f.area()) else {
        return;
    };
    let hints = Line::from(vec![
        Span::styled(" q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh"),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn failure(title: &str, err: &FetchError) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(Color::Red),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(panel(title))
}

fn value_row(label: &str, value: String) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!(" {label}")),
        Cell::from(value).style(Style::default().fg(Color::Green)),
    ])
}

pub fn fmt_temp(units: Units, temp: f64) -> String {
    let (alt, alt_label) = units.alternate_temperature(temp);
    format!("{temp:.1} {} ({alt:.1} {alt_label})", units.temperature_label())
}

pub fn fmt_wind(units: Units, speed: f64, deg: f64, gust: f64) -> String {
    let label = units.speed_label();
    let compass = degree_to_compass(deg);
    match units.alternate_speed(speed) {
        Some((alt, alt_label)) => {
            format!("{speed:.1} {label} {compass} ({alt:.1} {alt_label}), gusts {gust:.1}")
        }
        None => format!("{speed:.1} {label} {compass}, gusts {gust:.1}"),
    }
}

pub fn fmt_rain(rain: Option<&Rain>) -> String {
    let windows: Vec<String> = rain
        .map(|r| {
            [(r.one_hour, "1h"), (r.three_hour, "3h")]
                .into_iter()
                .filter_map(|(mm, window)| mm.map(|mm| format!("{mm:.2} mm/{window}")))
                .collect()
        })
        .unwrap_or_default();
    if windows.is_empty() {
        MISSING.to_string()
    } else {
        windows.join(", ")
    }
}

fn or_missing(text: &str) -> String {
    if text.trim().is_empty() {
        MISSING.to_string()
    } else {
        text.to_string()
    }
}

fn display_headline<'a>(snapshot: &'a Snapshot) -> Paragraph<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded);

    let first = match &snapshot.geolocation {
        Ok(geo) => Line::from(vec![
            Span::raw(" "),
            Span::styled(geo.ip.clone(), Style::default().fg(Color::Blue)),
            Span::raw(" : "),
            Span::styled(
                geo.place(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Err(err) => Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(Color::Red),
        )),
    };

    let observed = snapshot
        .weather
        .as_ref()
        .and_then(|w| w.as_ref().ok())
        .and_then(Weather::observed_at)
        .map(|at| at.format("%d-%m-%Y %H:%M").to_string())
        .unwrap_or_else(|| MISSING.to_string());

    Paragraph::new(vec![
        first,
        Line::from(format!(
            " observed {observed}, fetched {}",
            snapshot.fetched_at.format("%H:%M:%S")
        )),
    ])
    .block(block)
}

fn display_current_conditions(weather: &Weather, units: Units) -> Table<'_> {
    let m = &weather.main;
    let time = |at: Option<DateTime<chrono::FixedOffset>>| {
        at.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| MISSING.to_string())
    };
    let rows = vec![
        Row::new(vec![Cell::from("")]),
        value_row("Temperature", fmt_temp(units, m.temp)),
        value_row("Feels like", fmt_temp(units, m.feels_like)),
        value_row(
            "Low / High",
            format!(
                "{:.1} / {:.1} {}",
                m.temp_min,
                m.temp_max,
                units.temperature_label()
            ),
        ),
        value_row("Humidity", format!("{:.0}%", m.humidity)),
        value_row(
            "Pressure",
            format!("{:.0} hPa (ground {:.0})", m.pressure, m.grnd_level),
        ),
        value_row(
            "Wind",
            fmt_wind(units, weather.wind.speed, weather.wind.deg, weather.wind.gust),
        ),
        value_row("Clouds", format!("{:.0}%", weather.clouds.all)),
        value_row("Rain", fmt_rain(weather.rain.as_ref())),
        value_row("Visibility", format!("{} m", weather.visibility)),
        value_row(
            "Sun",
            format!("{} - {}", time(weather.sunrise()), time(weather.sunset())),
        ),
    ];

    Table::new(rows, [Constraint::Length(13), Constraint::Min(10)])
        .block(panel("Current Conditions"))
}

fn display_conditions(weather: &Weather) -> List<'_> {
    let mut items = vec![];
    if weather.weather.is_empty() {
        items.push(ListItem::new(format!("\n  {MISSING}")));
    }
    for condition in &weather.weather {
        items.push(ListItem::new(vec![
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    condition.main.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::raw(format!(" {:13}", "Description")),
                Span::styled(
                    condition.description.clone(),
                    Style::default().fg(Color::Green),
                ),
            ]),
        ]));
    }
    List::new(items).block(panel("Conditions"))
}

fn display_location(geo: &UserGeolocation) -> Table<'_> {
    let coords = match geo.coordinates() {
        Ok(c) => format!("{:.4}, {:.4}", c.latitude, c.longitude),
        Err(_) => format!("{}, {}", or_missing(&geo.latitude), or_missing(&geo.longitude)),
    };
    let tz = &geo.time_zone;
    let rows = vec![
        Row::new(vec![Cell::from("")]),
        value_row("Coordinates", coords),
        value_row("District", or_missing(&geo.district)),
        value_row("Postal code", or_missing(&geo.zipcode)),
        value_row(
            "Country",
            format!("{} ({})", or_missing(&geo.country_name_official), geo.country_code3),
        ),
        value_row("Capital", or_missing(&geo.country_capital)),
        value_row(
            "Continent",
            format!("{} ({})", or_missing(&geo.continent_name), geo.continent_code),
        ),
        value_row("EU member", if geo.is_eu { "yes" } else { "no" }.to_string()),
        value_row("Calling code", or_missing(&geo.calling_code)),
        value_row("TLD", or_missing(&geo.country_tld)),
        value_row("Languages", or_missing(&geo.languages)),
        value_row(
            "Currency",
            format!(
                "{} {} ({})",
                geo.currency.symbol, geo.currency.code, geo.currency.name
            ),
        ),
        value_row(
            "Time zone",
            format!(
                "{} UTC{:+} {}",
                tz.name,
                tz.offset_with_dst,
                if tz.is_dst { "(DST)" } else { "" }
            ),
        ),
        value_row(
            "Local time",
            tz.local_time()
                .map(|t| t.format("%d-%m-%Y %H:%M").to_string())
                .unwrap_or_else(|| or_missing(&tz.current_time)),
        ),
        value_row("ISP", or_missing(&geo.isp)),
        value_row("Organization", or_missing(&geo.organization)),
        value_row("Connection", or_missing(&geo.connection_type)),
    ];

    Table::new(rows, [Constraint::Length(14), Constraint::Min(10)])
        .block(panel("Location"))
}

fn pending(f: &mut Frame, area: Rect) {
    let area = Layout::default()
        .margin(1)
        .constraints([Constraint::Min(0)])
        .split(area)[0];
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(" fetching location and weather..."),
    ])
    .block(panel("geowx"));
    f.render_widget(text, area);
}

fn ui(f: &mut Frame, area: Rect, snapshot: &Snapshot, units: Units) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    f.render_widget(display_headline(snapshot), vert_layout[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vert_layout[1]);

    let lchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    match &snapshot.weather {
        Some(Ok(weather)) => {
            f.render_widget(display_current_conditions(weather, units), lchunks[0]);
            f.render_widget(display_conditions(weather), lchunks[1]);
        }
        Some(Err(err)) => {
            f.render_widget(failure("Current Conditions", err), lchunks[0]);
            f.render_widget(
                List::new([ListItem::new(format!("\n  {MISSING}"))]).block(panel("Conditions")),
                lchunks[1],
            );
        }
        None => {
            let waiting = Paragraph::new(format!("\n  {MISSING}"));
            f.render_widget(waiting.clone().block(panel("Current Conditions")), lchunks[0]);
            f.render_widget(waiting.block(panel("Conditions")), lchunks[1]);
        }
    }

    match &snapshot.geolocation {
        Ok(geo) => f.render_widget(display_location(geo), chunks[1]),
        Err(err) => f.render_widget(failure("Location", err), chunks[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::tests::SAMPLE as GEO_SAMPLE;
    use crate::shell::{create_app, HostDocument};
    use crate::weather::tests::SAMPLE as WEATHER_SAMPLE;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::cell::Cell as CountCell;
    use std::rc::Rc;

    fn full_snapshot() -> Snapshot {
        Snapshot {
            geolocation: Ok(UserGeolocation::decode(GEO_SAMPLE).unwrap()),
            weather: Some(Ok(Weather::decode(WEATHER_SAMPLE).unwrap())),
            fetched_at: Local::now(),
        }
    }

    fn screen(app: App, width: u16, height: u16) -> String {
        let mounted = create_app(app)
            .mount(HostDocument::terminal("app"), "#app")
            .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                mounted.draw(f);
                draw_status(f, &mounted);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn counting(calls: &Rc<CountCell<u32>>) -> impl Fn() -> Snapshot + 'static {
        let counter = calls.clone();
        move || {
            counter.set(counter.get() + 1);
            full_snapshot()
        }
    }

    #[test]
    fn test_render_full_snapshot() {
        let mut app = App::new(Units::Metric, Duration::from_secs(600), full_snapshot);
        app.tick();
        let text = screen(app, 140, 40);
        assert!(text.contains("8.8.8.8"));
        assert!(text.contains("New York, New York, United States"));
        assert!(text.contains("Current Conditions"));
        assert!(text.contains("light rain"));
        assert!(text.contains("broken clouds"));
        assert!(text.contains("Google LLC"));
        assert!(text.contains("01-06-2024 12:00"));
        assert!(text.contains("refresh"));
    }

    #[test]
    fn test_render_before_first_fetch() {
        let app = App::new(Units::Metric, Duration::from_secs(600), full_snapshot);
        assert!(app.snapshot().is_none());
        let text = screen(app, 80, 20);
        assert!(text.contains("fetching location and weather"));
    }

    #[test]
    fn test_render_geolocation_failure() {
        let mut app = App::new(Units::Metric, Duration::from_secs(600), || Snapshot {
            geolocation: Err(FetchError::MissingApiKey("geolocation")),
            weather: None,
            fetched_at: Local::now(),
        });
        app.refetch();
        let text = screen(app, 120, 30);
        assert!(text.contains("no API key configured for geolocation"));
        assert!(text.contains(MISSING));
    }

    #[test]
    fn test_mount_failure_does_not_fetch() {
        let calls = Rc::new(CountCell::new(0));
        let app = App::new(Units::Metric, Duration::ZERO, counting(&calls));
        let err = create_app(app)
            .mount(HostDocument::terminal("main"), "#app")
            .err()
            .unwrap();
        assert!(matches!(err, crate::error::MountError::HostElementMissing(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_keys() {
        let calls = Rc::new(CountCell::new(0));
        let mut app = App::new(Units::Metric, Duration::from_secs(600), counting(&calls));
        assert_eq!(calls.get(), 0);
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::Continue);
        assert_eq!(calls.get(), 1);
        assert_eq!(app.handle_key(key(KeyCode::Char('x'))), Action::Continue);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_tick_fetches_first_then_after_interval() {
        let calls = Rc::new(CountCell::new(0));
        let mut app = App::new(Units::Metric, Duration::ZERO, counting(&calls));
        app.tick();
        app.tick();
        assert_eq!(calls.get(), 2);

        let calls = Rc::new(CountCell::new(0));
        let mut app = App::new(Units::Metric, Duration::from_secs(3600), counting(&calls));
        app.tick();
        app.tick();
        assert_eq!(calls.get(), 1);
        assert!(app.snapshot().unwrap().geolocation.is_ok());
    }

    #[test]
    fn test_fetch_without_keys_skips_weather() {
        let fetcher = Fetcher::new(&Config::default(), None).unwrap();
        let snapshot = fetcher.fetch();
        assert!(matches!(
            snapshot.geolocation,
            Err(FetchError::MissingApiKey("geolocation"))
        ));
        assert!(snapshot.weather.is_none());
    }

    #[test]
    fn test_fetch_with_bad_coordinates() {
        let fetcher = Fetcher::new(&Config::default(), None).unwrap();
        let snapshot = fetcher.fetch_with(|| {
            let mut geo = UserGeolocation::decode(GEO_SAMPLE).unwrap();
            geo.latitude = "north".into();
            Ok(geo)
        });
        assert!(snapshot.geolocation.is_ok());
        assert!(matches!(
            snapshot.weather,
            Some(Err(FetchError::Coordinates(_)))
        ));
    }

    #[test]
    fn test_fetch_asks_for_weather_after_location() {
        let fetcher = Fetcher::new(&Config::default(), None).unwrap();
        let snapshot =
            fetcher.fetch_with(|| Ok(UserGeolocation::decode(GEO_SAMPLE).unwrap()));
        assert!(matches!(
            snapshot.weather,
            Some(Err(FetchError::MissingApiKey("weather")))
        ));
    }

    #[test]
    fn test_fmt_helpers() {
        assert_eq!(fmt_temp(Units::Metric, 100.0), "100.0 C (212.0 F)");
        assert_eq!(
            fmt_wind(Units::Imperial, 10.0, 90.0, 15.0),
            "10.0 mph E, gusts 15.0"
        );
        assert_eq!(
            fmt_wind(Units::Metric, 10.0, 180.0, 12.0),
            "10.0 m/s S (36.0 km/h), gusts 12.0"
        );
        assert_eq!(fmt_rain(None), MISSING);
        assert_eq!(fmt_rain(Some(&Rain::default())), MISSING);
        let rain = Rain {
            one_hour: Some(0.39),
            three_hour: Some(1.2),
        };
        assert_eq!(fmt_rain(Some(&rain)), "0.39 mm/1h, 1.20 mm/3h");
    }
}
