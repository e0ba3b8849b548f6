use serde::{Deserialize, Serialize};

use crate::bench::MONOCHROMATOR_CHANGES;

use super::{Panel, ReferenceLine};

/// Which table of the outer drawing loop is being laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Other,
}

impl Pass {
    pub fn of(index: usize) -> Pass {
        if index == 0 {
            Pass::First
        } else {
            Pass::Other
        }
    }
}

/// Decorations added once per table pass.
///
/// On a shared panel decorations would pile up, so implementations only act
/// on the first pass there; separate panels each get their own.
pub trait PassStrategy {
    fn decorate(&self, panel: &mut Panel, pass: Pass, shared_panel: bool);
}

fn wanted(pass: Pass, shared_panel: bool) -> bool {
    !shared_panel || pass == Pass::First
}

/// Draws the monochromator filter-change lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangesStrategy {
    pub enabled: bool,
}

impl ChangesStrategy {
    pub fn new(enabled: bool) -> Self {
        ChangesStrategy { enabled }
    }
}

impl PassStrategy for ChangesStrategy {
    fn decorate(&self, panel: &mut Panel, pass: Pass, shared_panel: bool) {
        if !self.enabled || !wanted(pass, shared_panel) {
            return;
        }
        panel
            .reference_lines
            .extend(MONOCHROMATOR_CHANGES.iter().map(|c| ReferenceLine {
                x: c.wavelength,
                label: c.label.to_string(),
                style: c.style,
            }));
        panel.show_legend = true;
    }
}

/// Text placed inside a panel, positioned in axes fractions (0..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Filter changes plus a text box in every decorated panel.
#[derive(Debug, Clone)]
pub struct BoxStrategy {
    pub changes: ChangesStrategy,
    pub text_box: TextBox,
}

impl BoxStrategy {
    pub fn new(changes: bool, text_box: TextBox) -> Self {
        BoxStrategy {
            changes: ChangesStrategy::new(changes),
            text_box,
        }
    }
}

impl PassStrategy for BoxStrategy {
    fn decorate(&self, panel: &mut Panel, pass: Pass, shared_panel: bool) {
        self.changes.decorate(panel, pass, shared_panel);
        if wanted(pass, shared_panel) {
            panel.text_boxes.push(self.text_box.clone());
        }
    }
}
