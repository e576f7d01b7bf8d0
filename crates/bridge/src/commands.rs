use crate::Route;
use tokio::sync::oneshot;

/// A command from the script timeline.
///
/// Commands from one script timeline arrive in the order they were sent.
/// Nothing orders them against native gesture events.
#[derive(Debug)]
pub enum ScriptCommand {
    /// Ask for exclusive rights to the next stack mutation; the grant comes back on `reply`.
    Reserve { reply: oneshot::Sender<bool> },
    /// Apply a previously reserved navigation, ending at index `top`.
    Commit { top: usize },
    /// Give up a reservation without committing.
    Cancel,
    /// Replace the routes the navigator may present.
    SetRoutes { routes: Vec<Route> },
}

impl ScriptCommand {
    /// Short name used in log lines.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reserve { .. } => "reserve",
            Self::Commit { .. } => "commit",
            Self::Cancel => "cancel",
            Self::SetRoutes { .. } => "setRoutes",
        }
    }
}
