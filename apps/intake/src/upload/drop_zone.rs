use tracing::debug;

use super::SelectedFile;

/// Where a drag event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// The drop zone itself.
    DropZone,
    /// Anywhere else on the page.
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop(Vec<SelectedFile>),
}

/// What the host must do with the event, plus the resulting zone state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub highlighted: bool,
    /// First dropped file, only for a drop on the zone carrying at least one file.
    pub dropped: Option<SelectedFile>,
}

/// Highlight state of the drop target.
///
/// Every drag event is swallowed wherever it lands so the browser never navigates to a
/// dropped file. Only events on the zone change the highlight.
#[derive(Debug, Default)]
pub struct DropZone {
    highlighted: bool,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn handle(&mut self, target: EventTarget, event: DragEvent) -> DragResponse {
        let mut dropped = None;

        if target == EventTarget::DropZone {
            match event {
                DragEvent::Enter | DragEvent::Over => {
                    debug!("Drag enter/over detected");
                    self.highlighted = true;
                }
                DragEvent::Leave => {
                    debug!("Drag leave detected");
                    self.highlighted = false;
                }
                DragEvent::Drop(files) => {
                    debug!("Drop detected with {} file(s)", files.len());
                    self.highlighted = false;
                    dropped = files.into_iter().next();
                }
            }
        }

        DragResponse {
            prevent_default: true,
            stop_propagation: true,
            highlighted: self.highlighted,
            dropped,
        }
    }
}
