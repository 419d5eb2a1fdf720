//! # Page-Aware Layout Engine
//!
//! The engine owns every coordinate in the document. Callers never track y
//! positions themselves; they ask the engine for room and draw where it says.
//!
//! ## How placement works
//!
//! 1. `begin_document` opens the first page and draws the header chrome.
//! 2. Before drawing an atomic block, the caller calls `reserve(height)`.
//!    If the block would cross the bottom floor, the engine opens a new page,
//!    redraws the header chrome, and hands back the new content start.
//! 3. The caller draws inside `[y, y + height]` and calls `advance`.
//! 4. `finish` stamps "page N of M" footers now that M is known, and seals
//!    the document.
//!
//! Checking space *before* drawing means a block is never half-drawn and then
//! undone. Nothing is ever split, so nothing needs rolling back.

pub mod page_break;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{Edges, PageConfig};
use crate::error::RenderingFault;
use crate::font::FontSpec;
use crate::style::Color;
use crate::text::TextLayout;
use page_break::{decide_break, fits_on_empty_page, BreakDecision};

/// What to actually draw. Coordinates are points from the page's top-left
/// corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
        /// Corner radius; 0 for a sharp rectangle.
        radius: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: FontSpec,
        color: Color,
    },
}

/// The extent of a reserved atomic block, recorded for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Block {
    pub top: f64,
    pub height: f64,
    /// The lowest y the block was allowed to reach.
    pub limit: f64,
}

impl Block {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A stamped footer: 1-based page index and the document's total page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageNumber {
    pub index: usize,
    pub total: usize,
}

/// One fixed-size page and everything drawn on it.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    /// The cursor position right after the header chrome.
    pub content_top: f64,
    pub commands: Vec<DrawCommand>,
    pub blocks: Vec<Block>,
    pub footer: Option<PageNumber>,
}

impl Page {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content_top: 0.0,
            commands: Vec::new(),
            blocks: Vec::new(),
            footer: None,
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// All text strings on the page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Rect { .. } => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// A finished, sealed document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text string in the document with its 0-based page index.
    pub fn texts(&self) -> impl Iterator<Item = (usize, &str)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| page.texts().map(move |t| (i, t)))
    }
}

/// Persistent page decoration supplied by the report.
pub trait PageChrome {
    /// Draw the header on a fresh page. Returns the y where content may begin.
    fn draw_header(&self, page: &mut Page, text: &TextLayout) -> f64;

    /// Draw the footer. Only called once the total page count is known.
    fn draw_footer(&self, page: &mut Page, number: PageNumber, text: &TextLayout);
}

/// Lifecycle of one document build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Empty,
    HeaderDrawn,
    ContentAccumulating,
    PageBreaking,
    Finishing,
    Sealed,
}

/// Page dimensions and margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

impl PageGeometry {
    pub fn from_config(config: &PageConfig) -> Self {
        let (width, height) = config.size.dimensions();
        Self {
            width,
            height,
            margin: config.margin,
        }
    }

    pub fn content_left(&self) -> f64 {
        self.margin.left
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin.horizontal()
    }
}

/// Where a reserved block goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub y: f64,
    /// A new page was opened to make room.
    pub page_break: bool,
}

/// The main layout engine.
pub struct LayoutEngine {
    geometry: PageGeometry,
    chrome: Box<dyn PageChrome>,
    text: TextLayout,
    pages: Vec<Page>,
    cursor: f64,
    state: EngineState,
}

impl LayoutEngine {
    pub fn new(config: &PageConfig, chrome: Box<dyn PageChrome>) -> Self {
        Self {
            geometry: PageGeometry::from_config(config),
            chrome,
            text: TextLayout::default(),
            pages: Vec::new(),
            cursor: 0.0,
            state: EngineState::Empty,
        }
    }

    /// Open the first page and draw its header. Returns the content start.
    pub fn begin_document(&mut self) -> Result<f64, RenderingFault> {
        match self.state {
            EngineState::Empty => {}
            EngineState::Sealed => return Err(RenderingFault::Sealed),
            _ => return Ok(self.cursor),
        }
        self.open_page();
        self.state = EngineState::HeaderDrawn;
        Ok(self.cursor)
    }

    fn open_page(&mut self) {
        let mut page = Page::new(self.geometry.width, self.geometry.height);
        let header_bottom = self.chrome.draw_header(&mut page, &self.text);
        page.content_top = header_bottom + self.geometry.margin.top;
        self.cursor = page.content_top;
        self.pages.push(page);
        debug!(page = self.pages.len(), content_top = self.cursor, "opened page");
    }

    fn check_writable(&self) -> Result<(), RenderingFault> {
        match self.state {
            EngineState::Empty => Err(RenderingFault::NotStarted),
            EngineState::Finishing | EngineState::Sealed => Err(RenderingFault::Sealed),
            _ => Ok(()),
        }
    }

    /// Reserve room for an atomic block above an explicit bottom floor.
    ///
    /// This is the only place a page break can happen.
    pub fn place(&mut self, height_needed: f64, margin_floor: f64) -> Result<Placement, RenderingFault> {
        self.check_writable()?;

        let limit = self.geometry.height - margin_floor;
        let content_top = self.current_page()?.content_top;
        if !fits_on_empty_page(height_needed, content_top, limit) {
            return Err(RenderingFault::BlockTooTall {
                needed: height_needed,
                usable: limit - content_top,
            });
        }

        let page_break = match decide_break(self.cursor, height_needed, limit) {
            BreakDecision::Place => false,
            BreakDecision::MoveToNextPage => {
                self.state = EngineState::PageBreaking;
                debug!(
                    from_page = self.pages.len(),
                    cursor = self.cursor,
                    height_needed,
                    limit,
                    "page break"
                );
                self.open_page();
                true
            }
        };
        self.state = EngineState::ContentAccumulating;

        let top = self.cursor;
        self.current_page_mut()?.blocks.push(Block {
            top,
            height: height_needed,
            limit,
        });
        trace!(top, height_needed, "reserved block");

        Ok(Placement { y: top, page_break })
    }

    /// [`place`](Self::place) returning only the y to draw at.
    pub fn reserve_with_floor(&mut self, height_needed: f64, margin_floor: f64) -> Result<f64, RenderingFault> {
        self.place(height_needed, margin_floor).map(|p| p.y)
    }

    /// Reserve above the default bottom floor.
    pub fn reserve(&mut self, height_needed: f64) -> Result<f64, RenderingFault> {
        self.reserve_with_floor(height_needed, self.default_floor())
    }

    /// Whether a block would fit on the current page. Read-only: breaking is
    /// still left to [`place`](Self::place).
    pub fn fits(&self, height_needed: f64, margin_floor: f64) -> bool {
        decide_break(self.cursor, height_needed, self.geometry.height - margin_floor) == BreakDecision::Place
    }

    /// Whether a block could be placed at all, on a fresh page above `margin_floor`.
    pub fn fits_on_empty_page(&self, height_needed: f64, margin_floor: f64) -> bool {
        self.pages.last().is_some_and(|page| {
            fits_on_empty_page(height_needed, page.content_top, self.geometry.height - margin_floor)
        })
    }

    /// Move the cursor down after a block is drawn. Never breaks a page.
    pub fn advance(&mut self, amount: f64) {
        self.cursor += amount;
    }

    pub fn draw(&mut self, command: DrawCommand) -> Result<(), RenderingFault> {
        self.check_writable()?;
        self.current_page_mut()?.push(command);
        Ok(())
    }

    /// Stamp footers on every page and seal the document.
    pub fn finish(&mut self) -> Result<Document, RenderingFault> {
        self.check_writable()?;
        self.state = EngineState::Finishing;

        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            let number = PageNumber { index: i + 1, total };
            self.chrome.draw_footer(page, number, &self.text);
            page.footer = Some(number);
        }

        self.state = EngineState::Sealed;
        debug!(pages = total, "document sealed");
        Ok(Document {
            pages: std::mem::take(&mut self.pages),
        })
    }

    fn current_page(&self) -> Result<&Page, RenderingFault> {
        self.pages.last().ok_or(RenderingFault::NotStarted)
    }

    fn current_page_mut(&mut self) -> Result<&mut Page, RenderingFault> {
        self.pages.last_mut().ok_or(RenderingFault::NotStarted)
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn default_floor(&self) -> f64 {
        self.geometry.margin.bottom
    }

    pub fn text(&self) -> &TextLayout {
        &self.text
    }
}
