/// Tray icon states corresponding to application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to record or play.
    Idle,
    /// Capturing mouse and keyboard input.
    Recording,
    /// Replaying a macro.
    Playing,
}
