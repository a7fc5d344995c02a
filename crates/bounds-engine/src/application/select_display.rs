//! Display selection: picks which monitor's work area the cursor is confined to.

use std::fmt;

use bounds_core::{BoundsRegion, ScreenRect};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prefix Windows puts in front of monitor device names (`\\.\DISPLAY1`).
const WINDOWS_DEVICE_PREFIX: &str = r"\\.\";

/// Error type for display enumeration and selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    /// The requested display index does not exist.
    #[error("display index {index} is out of range ({count} displays)")]
    InvalidRegionIndex {
        /// The index that was requested.
        index: usize,
        /// How many displays were known at the time.
        count: usize,
    },

    /// The OS reported no displays at all.
    #[error("no displays found")]
    NoDisplays,

    /// The platform API call failed.
    #[error("platform API error while enumerating displays: {0}")]
    Platform(String),
}

/// One connected display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Device name without the Windows `\\.\` prefix, e.g. `DISPLAY1`.
    pub name: String,
    /// `true` for the OS primary display.
    pub is_primary: bool,
    /// Work area (excludes taskbars and docks), top-left origin.
    pub work_area: ScreenRect,
}

impl DisplayInfo {
    /// Creates a `DisplayInfo`, stripping a leading `\\.\` from `name`.
    pub fn new(name: impl Into<String>, is_primary: bool, work_area: ScreenRect) -> Self {
        let name = name.into();
        let name = match name.strip_prefix(WINDOWS_DEVICE_PREFIX) {
            Some(stripped) => stripped.to_string(),
            None => name,
        };
        Self {
            name,
            is_primary,
            work_area,
        }
    }

    /// The confinement region for this display's work area.
    pub fn region(&self) -> BoundsRegion {
        BoundsRegion::from_work_area(self.work_area)
    }
}

impl fmt::Display for DisplayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.is_primary {
            f.write_str(" [Primary]")?;
        }
        Ok(())
    }
}

/// Source of the current display list.
///
/// Implemented per OS in `infrastructure::screen_info`.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayEnumerator: Send + Sync {
    /// Returns every connected display in OS order.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Platform`] if the OS API call fails.
    fn enumerate(&self) -> Result<Vec<DisplayInfo>, DisplayError>;
}

/// The known displays and which one is selected.
pub struct DisplaySelection {
    enumerator: Box<dyn DisplayEnumerator>,
    displays: Vec<DisplayInfo>,
    selected: usize,
}

impl DisplaySelection {
    /// Enumerates displays and selects the primary one.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::NoDisplays`] if the list is empty, or the
    /// enumerator's error.
    pub fn new(enumerator: Box<dyn DisplayEnumerator>) -> Result<Self, DisplayError> {
        let mut selection = Self {
            enumerator,
            displays: Vec::new(),
            selected: 0,
        };
        selection.refresh()?;
        selection.selected = selection.primary_index();
        Ok(selection)
    }

    /// Re-enumerates displays.  The selection is kept if still in range,
    /// otherwise it moves to the primary display.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::NoDisplays`] if the list is empty, or the
    /// enumerator's error.  The previous list is kept on error.
    pub fn refresh(&mut self) -> Result<(), DisplayError> {
        let displays = self.enumerator.enumerate()?;
        if displays.is_empty() {
            return Err(DisplayError::NoDisplays);
        }
        debug!("enumerated {} display(s)", displays.len());
        self.displays = displays;
        if self.selected >= self.displays.len() {
            self.selected = self.primary_index();
        }
        Ok(())
    }

    /// Index of the primary display, or 0 if none is flagged primary.
    pub fn primary_index(&self) -> usize {
        self.displays.iter().position(|d| d.is_primary).unwrap_or(0)
    }

    /// All known displays.
    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    /// Index of the selected display.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected display.
    pub fn selected(&self) -> &DisplayInfo {
        // `displays` is never empty once constructed and `selected` is kept in range.
        &self.displays[self.selected]
    }

    /// Looks up a display by index.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::InvalidRegionIndex`] if `index` is out of range.
    pub fn get(&self, index: usize) -> Result<&DisplayInfo, DisplayError> {
        self.displays
            .get(index)
            .ok_or(DisplayError::InvalidRegionIndex {
                index,
                count: self.displays.len(),
            })
    }

    /// Selects display `index` and returns the index actually selected.
    ///
    /// An out-of-range index logs a warning, re-enumerates the displays, and
    /// falls back to the primary display.
    ///
    /// # Errors
    ///
    /// Only fails if the fallback re-enumeration fails.
    pub fn select(&mut self, index: usize) -> Result<usize, DisplayError> {
        if let Err(e) = self.get(index) {
            warn!("{e}; re-enumerating and falling back to the primary display");
            self.refresh()?;
            self.selected = self.primary_index();
        } else {
            self.selected = index;
        }
        info!("confining to display {} ({})", self.selected, self.selected());
        Ok(self.selected)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
