//! Page manifest: the registration surface.
//!
//! A page is an ordered list of blocks, stacked top to bottom. Each block
//! declares what it does on first view. Bad per-block configuration never
//! fails the page; the block just renders without its effect.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animator::CounterTarget;
use crate::bars::BarSpec;
use crate::dispatcher::TargetKind;
use crate::visibility::{ElementId, Rect};

/// Vertical space between blocks, in CSS pixels.
pub const BLOCK_GAP: f64 = 24.0;
/// Page width used for layout. Visibility only depends on vertical overlap.
pub const PAGE_WIDTH: f64 = 1200.0;

fn default_page_template() -> &'static str {
    include_str!("../default_page.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarDef {
    pub label: String,
    pub width: f64,
}

/// Block kinds as written in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// Static text; never tracked.
    Text { text: String },
    /// Fades in on first view.
    Reveal { text: String },
    Counter {
        label: String,
        /// Number literal; its canonical form sets the display precision.
        target: String,
        #[serde(default)]
        suffix: Option<String>,
    },
    BarGroup {
        #[serde(default)]
        title: Option<String>,
        bars: Vec<BarDef>,
    },
    /// Container of the live metrics feed.
    Live {
        #[serde(default)]
        title: Option<String>,
        /// Output slot names exposed by this section.
        #[serde(default)]
        slots: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Optional anchor name.
    #[serde(default)]
    pub id: Option<String>,
    /// Height in CSS pixels.
    pub height: f64,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageManifest {
    pub title: String,
    #[serde(default, rename = "block")]
    pub blocks: Vec<Block>,
}

impl PageManifest {
    /// The stock LatticePress landing page.
    ///
    /// # Errors
    /// Returns an error if the embedded manifest fails to parse.
    pub fn builtin() -> Result<Self> {
        Self::parse(default_page_template()).context("Failed to parse built-in page")
    }

    /// # Errors
    /// Returns an error if `contents` is not a valid manifest.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page from {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse page {}", path.display()))
    }

    /// Loads `path` if given, otherwise the built-in page.
    ///
    /// # Errors
    /// Returns an error if the selected manifest cannot be loaded.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::builtin(),
        }
    }

    /// Stacks blocks vertically and resolves their effects.
    pub fn layout(&self) -> PageLayout {
        let mut elements = Vec::with_capacity(self.blocks.len());
        let mut y = 0.0;
        for (index, block) in self.blocks.iter().enumerate() {
            let height = if block.height.is_finite() {
                block.height.max(0.0)
            } else {
                0.0
            };
            let id = ElementId(index);
            elements.push(LaidOutElement {
                id,
                rect: Rect::new(0.0, y, PAGE_WIDTH, height),
                block: block.clone(),
                role: resolve_role(id, &block.kind),
            });
            y += height + BLOCK_GAP;
        }
        let height = (y - BLOCK_GAP).max(0.0);
        PageLayout {
            title: self.title.clone(),
            elements,
            height,
        }
    }
}

/// What the engine does with a laid-out element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRole {
    /// Nothing to trigger (static text or inert configuration).
    Static,
    Animated(TargetKind),
    Live { slots: Vec<String> },
}

fn resolve_role(id: ElementId, kind: &BlockKind) -> ElementRole {
    match kind {
        BlockKind::Text { .. } => ElementRole::Static,
        BlockKind::Reveal { .. } => ElementRole::Animated(TargetKind::Reveal),
        BlockKind::Counter { target, .. } => match CounterTarget::parse(target) {
            Some(counter) => ElementRole::Animated(TargetKind::Counter(counter)),
            None => {
                debug!(element = %id, target = %target, "counter inert: target is not a number");
                ElementRole::Static
            }
        },
        BlockKind::BarGroup { bars, .. } => {
            let specs: Vec<BarSpec> = bars
                .iter()
                .filter(|bar| {
                    let ok = bar.width.is_finite();
                    if !ok {
                        debug!(element = %id, label = %bar.label, "bar inert: width is not finite");
                    }
                    ok
                })
                .enumerate()
                .map(|(index, bar)| BarSpec {
                    index,
                    width_percent: bar.width.clamp(0.0, 100.0),
                })
                .collect();
            if specs.is_empty() {
                debug!(element = %id, "bar group inert: no usable bars");
                ElementRole::Static
            } else {
                ElementRole::Animated(TargetKind::BarGroup(specs))
            }
        }
        BlockKind::Live { slots, .. } => ElementRole::Live {
            slots: slots.clone(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct LaidOutElement {
    pub id: ElementId,
    pub rect: Rect,
    pub block: Block,
    pub role: ElementRole,
}

/// A manifest with every block placed on the page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub title: String,
    pub elements: Vec<LaidOutElement>,
    /// Total document height in CSS pixels.
    pub height: f64,
}

impl PageLayout {
    pub fn element(&self, id: ElementId) -> Option<&LaidOutElement> {
        self.elements.get(id.0)
    }

    pub fn rect_of(&self, id: ElementId) -> Option<Rect> {
        self.element(id).map(|e| e.rect)
    }

    /// The first live block, if any.
    pub fn live_element(&self) -> Option<&LaidOutElement> {
        self.elements
            .iter()
            .find(|e| matches!(e.role, ElementRole::Live { .. }))
    }

    /// Largest valid scroll offset for a viewport of `viewport_height`.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.height - viewport_height).max(0.0)
    }
}
