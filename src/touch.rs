//! Touch-suppression latch
//!
//! While a control reports being physically touched, outbound display sync
//! is silenced so host-driven changes do not fight the user's hand. The
//! latch is level-triggered by the control's touch signal; releasing it
//! requests a resync so the display catches up.

/// Per-control touch latch.
#[derive(Debug, Default)]
pub struct TouchLatch {
    touched: bool,
}

impl TouchLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the control as touched. Returns true on the transition from
    /// untouched to touched.
    pub fn press(&mut self) -> bool {
        let was = self.touched;
        self.touched = true;
        !was
    }

    /// Mark the control as released. Returns true on the transition from
    /// touched to untouched, the moment a resync should be issued.
    pub fn release(&mut self) -> bool {
        let was = self.touched;
        self.touched = false;
        was
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }
}
