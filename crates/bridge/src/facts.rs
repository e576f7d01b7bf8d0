use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Which driver caused a committed stack change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactOrigin {
    /// A platform gesture (for example, an interactive back swipe).
    Native,
    /// A reserved navigation committed by the script environment.
    Script,
}

/// Why an outstanding reservation was released without a commit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseReason {
    /// The script cancelled its own reservation.
    Cancelled,
    /// The reservation outlived the configured timeout.
    Expired,
    /// The navigator view was torn down.
    TornDown,
}

/// Something that already happened on the native side.
///
/// Facts are not requests: the script environment reconciles its own model
/// against them and never answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NavigationFact {
    /// The committed stack now ends at `top` and holds `depth` routes.
    #[serde(rename_all = "camelCase")]
    TopChanged {
        top: usize,
        depth: usize,
        origin: FactOrigin,
    },
    /// A native gesture was refused and visually reverted.
    #[serde(rename_all = "camelCase")]
    NativeChangeRejected { proposed_top: usize },
    /// The platform could not apply a committed top; the navigator is idle again.
    ///
    /// `top` and `depth` describe the committed stack the platform was left showing,
    /// which may differ from the stack before the commit when it was partly applied.
    #[serde(rename_all = "camelCase")]
    ApplyFailed {
        requested_top: usize,
        top: Option<usize>,
        depth: usize,
        reason: String,
    },
    /// A reservation ended without a commit.
    ReservationReleased { reason: ReleaseReason },
}

impl NavigationFact {
    /// Event name the script side listens for.
    #[inline]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::TopChanged { .. } => "navigationTopChanged",
            Self::NativeChangeRejected { .. } => "navigationNativeChangeRejected",
            Self::ApplyFailed { .. } => "navigationApplyFailed",
            Self::ReservationReleased { .. } => "navigationReservationReleased",
        }
    }

    /// JSON payload handed to the script environment.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Display for NavigationFact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopChanged { top, depth, origin } => {
                write!(f, "top changed to {top} (depth {depth}, {origin:?})")
            }
            Self::NativeChangeRejected { proposed_top } => {
                write!(f, "native change to {proposed_top} rejected")
            }
            Self::ApplyFailed {
                requested_top,
                top,
                depth,
                reason,
            } => write!(
                f,
                "failed to apply top {requested_top}: {reason} (left at {top:?}, depth {depth})"
            ),
            Self::ReservationReleased { reason } => {
                write!(f, "reservation released ({reason:?})")
            }
        }
    }
}
