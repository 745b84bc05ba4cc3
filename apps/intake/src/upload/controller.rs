use tracing::{debug, info};

use super::drop_zone::{DragEvent, DragResponse, DropZone, EventTarget};
use super::slot::{FileSlot, Origin, TransferSupport};
use super::{FileInfo, SelectedFile};

/// Input ids the intake page renders. The backend reads `utility_bill` first.
pub const DEFAULT_INPUT_IDS: &[&str] = &["utility_bill", "utility_bill_desktop"];

/// Side effects the host has to perform after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEffect {
    /// Open the platform file chooser.
    OpenChooser,
}

/// Owns the file slot and drop zone and keeps the file-info line current.
#[derive(Debug)]
pub struct UploadController {
    slot: FileSlot,
    zone: DropZone,
    info: Option<FileInfo>,
}

impl UploadController {
    pub fn new(support: TransferSupport) -> Self {
        Self::with_inputs(support, DEFAULT_INPUT_IDS.iter().copied())
    }

    pub fn with_inputs<I, S>(support: TransferSupport, input_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slot: FileSlot::new(support, input_ids),
            zone: DropZone::new(),
            info: None,
        }
    }

    /// Manual selection through the file chooser.
    pub fn select(&mut self, file: SelectedFile) -> &FileInfo {
        self.accept(file, Origin::Chooser)
    }

    /// Routes a drag event; a drop on the zone with files replaces the selection.
    pub fn drag(&mut self, target: EventTarget, event: DragEvent) -> DragResponse {
        let response = self.zone.handle(target, event);
        if let Some(file) = response.dropped.clone() {
            info!("Processing dropped file: {}", file.name);
            self.accept(file, Origin::Drop);
        }
        response
    }

    pub fn click(&self) -> UploadEffect {
        UploadEffect::OpenChooser
    }

    pub fn slot(&self) -> &FileSlot {
        &self.slot
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.slot.file()
    }

    /// The last rendered info line, `None` before the first selection.
    pub fn info(&self) -> Option<&FileInfo> {
        self.info.as_ref()
    }

    pub fn is_highlighted(&self) -> bool {
        self.zone.is_highlighted()
    }

    fn accept(&mut self, file: SelectedFile, origin: Origin) -> &FileInfo {
        debug!(
            "Updating file info for: {} ext={} size={}",
            file.name, file.extension, file.byte_size
        );
        let info = FileInfo::for_file(&file);
        self.slot.replace(file, origin);
        self.info.insert(info)
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(TransferSupport::default())
    }
}
