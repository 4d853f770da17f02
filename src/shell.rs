//! Application shell: one composition root, mounted once onto a named
//! region of the terminal host document.

use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::error::MountError;

/// Id of the host element the binary mounts into.
pub const APP_ELEMENT_ID: &str = "app";
pub const STATUS_ELEMENT_ID: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A unit of UI the shell can host.
pub trait Component {
    fn render(&self, frame: &mut Frame, area: Rect);

    fn handle_key(&mut self, key: KeyEvent) -> Action;

    /// Called once per event-loop turn.
    fn tick(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostElement {
    pub id: String,
    pub constraint: Constraint,
}

impl HostElement {
    pub fn new(id: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            id: id.into(),
            constraint,
        }
    }
}

/// Named regions of the screen, stacked top to bottom.
#[derive(Debug, Clone, Default)]
pub struct HostDocument {
    elements: Vec<HostElement>,
    mounted: Option<usize>,
}

impl HostDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Application element `app_id` over a one-line status bar.
    pub fn terminal(app_id: &str) -> Self {
        Self::new()
            .with_element(HostElement::new(app_id, Constraint::Min(0)))
            .with_element(HostElement::new(STATUS_ELEMENT_ID, Constraint::Length(1)))
    }

    pub fn with_element(mut self, element: HostElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Id of the element an application is mounted on, if any.
    pub fn mounted_on(&self) -> Option<&str> {
        self.mounted.map(|i| self.elements[i].id.as_str())
    }

    pub fn layout(&self, area: Rect) -> Vec<(&str, Rect)> {
        let rects = Layout::default()
            .direction(Direction::Vertical)
            .constraints(self.elements.iter().map(|e| e.constraint))
            .split(area);
        self.elements
            .iter()
            .map(|e| e.id.as_str())
            .zip(rects.iter().copied())
            .collect()
    }

    pub fn area_of(&self, id: &str, area: Rect) -> Option<Rect> {
        self.layout(area)
            .into_iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, r)| r)
    }
}

/// An application instance that has not been attached yet.
pub struct AppShell<R> {
    root: R,
}

pub fn create_app<R: Component>(root: R) -> AppShell<R> {
    AppShell { root }
}

fn parse_selector(selector: &str) -> Result<&str, MountError> {
    match selector.strip_prefix('#') {
        Some(id) if !id.is_empty() && !id.contains(char::is_whitespace) => Ok(id),
        _ => Err(MountError::InvalidSelector(selector.to_string())),
    }
}

impl<R: Component> AppShell<R> {
    /// Attach to the element named by `selector` (`#<id>`).
    pub fn mount(self, mut document: HostDocument, selector: &str) -> Result<Mounted<R>, MountError> {
        let id = parse_selector(selector)?;
        if let Some(existing) = document.mounted_on() {
            return Err(MountError::AlreadyMounted(existing.to_string()));
        }
        let index = document
            .find(id)
            .ok_or_else(|| MountError::HostElementMissing(id.to_string()))?;
        document.mounted = Some(index);
        log::info!("mounted application on #{id}");
        Ok(Mounted {
            root: self.root,
            document,
            index,
        })
    }
}

pub struct Mounted<R> {
    root: R,
    document: HostDocument,
    index: usize,
}

impl<R: Component> Mounted<R> {
    pub fn host_id(&self) -> &str {
        &self.document.elements[self.index].id
    }

    pub fn document(&self) -> &HostDocument {
        &self.document
    }

    pub fn root_mut(&mut self) -> &mut R {
        &mut self.root
    }

    pub fn host_area(&self, area: Rect) -> Rect {
        self.document.area_of(self.host_id(), area).unwrap_or(area)
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = self.host_area(frame.area());
        self.root.render(frame, area);
    }
}
