use super::{validate_file, SelectedFile};
use crate::errors::ValidationError;

/// Whether a dropped file can be installed as the native value of a file input.
///
/// Hosts decide this once up front; nothing downstream branches on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferSupport {
    #[default]
    Native,
    /// Inputs cannot hold a dropped file; they display a reference to it instead.
    Fallback,
}

impl TransferSupport {
    pub fn detect(can_assign_input_files: bool) -> Self {
        if can_assign_input_files {
            TransferSupport::Native
        } else {
            TransferSupport::Fallback
        }
    }
}

/// What a single file input shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Empty,
    /// The input holds the file as its own value.
    Native { name: String },
    /// The input is empty at the platform level but mirrors a dropped file.
    DroppedReference { name: String },
}

/// One rendered file input (desktop, mobile, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputView {
    pub id: String,
    pub value: InputValue,
}

/// How the current file arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Chooser,
    Drop,
}

/// The one logical selected file. All input views are derived from it, so duplicate
/// inputs can never disagree and the request always reads the slot.
#[derive(Debug)]
pub struct FileSlot {
    current: Option<(SelectedFile, Origin)>,
    support: TransferSupport,
    views: Vec<InputView>,
}

impl FileSlot {
    pub fn new<I, S>(support: TransferSupport, view_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let views = view_ids
            .into_iter()
            .map(|id| InputView {
                id: id.into(),
                value: InputValue::Empty,
            })
            .collect();
        Self {
            current: None,
            support,
            views,
        }
    }

    pub fn support(&self) -> TransferSupport {
        self.support
    }

    /// Replaces the selection and resynchronizes every view.
    pub fn replace(&mut self, file: SelectedFile, origin: Origin) {
        self.current = Some((file, origin));
        self.sync_views();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.sync_views();
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.current.as_ref().map(|(file, _)| file)
    }

    pub fn views(&self) -> &[InputView] {
        &self.views
    }

    /// The file to attach to the request, if one is selected and passes validation.
    pub fn accepted(&self) -> Result<&SelectedFile, ValidationError> {
        let file = self.file().ok_or(ValidationError::MissingFile)?;
        validate_file(file)?;
        Ok(file)
    }

    fn sync_views(&mut self) {
        let value = match &self.current {
            None => InputValue::Empty,
            Some((file, Origin::Drop)) if self.support == TransferSupport::Fallback => {
                InputValue::DroppedReference {
                    name: file.name.clone(),
                }
            }
            Some((file, _)) => InputValue::Native {
                name: file.name.clone(),
            },
        };
        for view in &mut self.views {
            view.value = value.clone();
        }
    }
}
