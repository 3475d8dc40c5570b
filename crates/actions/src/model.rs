//! Domain vocabulary shared across the workspace.
//!
//! These types mirror the backend's wire shapes (snake_case JSON) and are
//! the source of truth for what an automation can react to and do.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ItemType
// ---------------------------------------------------------------------------

/// The kind of platform item a trigger is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ItemType {
    Event,
    Class,
    Application,
    Membership,
    Raffle,
    Donation,
    Product,
    Vendor,
    Blog,
    Newsletter,
    Page,
    /// Backend value this build does not know about.  Never matches a
    /// requested type, so such triggers simply never resolve.
    Other,
}

impl From<String> for ItemType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Event => "event",
            Self::Class => "class",
            Self::Application => "application",
            Self::Membership => "membership",
            Self::Raffle => "raffle",
            Self::Donation => "donation",
            Self::Product => "product",
            Self::Vendor => "vendor",
            Self::Blog => "blog",
            Self::Newsletter => "newsletter",
            Self::Page => "page",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(Self::Event),
            "class" => Ok(Self::Class),
            "application" => Ok(Self::Application),
            "membership" => Ok(Self::Membership),
            "raffle" => Ok(Self::Raffle),
            "donation" => Ok(Self::Donation),
            "product" => Ok(Self::Product),
            "vendor" => Ok(Self::Vendor),
            "blog" => Ok(Self::Blog),
            "newsletter" => Ok(Self::Newsletter),
            "page" => Ok(Self::Page),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// EventName
// ---------------------------------------------------------------------------

/// The page/item event a trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EventName {
    View,
    AddToCart,
    Purchase,
    Submit,
    Approve,
    Reject,
    Register,
    Cancel,
    Review,
    Share,
    /// Backend value this build does not know about.
    Other,
}

impl From<String> for EventName {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::View => "view",
            Self::AddToCart => "add_to_cart",
            Self::Purchase => "purchase",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Register => "register",
            Self::Cancel => "cancel",
            Self::Review => "review",
            Self::Share => "share",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EventName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "add_to_cart" => Ok(Self::AddToCart),
            "purchase" => Ok(Self::Purchase),
            "submit" => Ok(Self::Submit),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "register" => Ok(Self::Register),
            "cancel" => Ok(Self::Cancel),
            "review" => Ok(Self::Review),
            "share" => Ok(Self::Share),
            other => Err(format!("unknown event name: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Severity of an in-app message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A button rendered on a modal effect, carried verbatim from the backend
/// (after placeholder substitution of `text`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalButton {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A single effect descriptor attached to an activity.
///
/// Any `{{item.<field>}}` placeholder in the textual fields is resolved
/// against the triggering item's data at execution time.  Tags this build
/// does not know deserialize to [`Action::Unknown`] and produce no effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    InAppMessage {
        #[serde(default)]
        title: Option<String>,
        message: String,
        #[serde(default)]
        severity: Option<Severity>,
        #[serde(default)]
        duration_ms: Option<u64>,
    },
    ShowModal {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        buttons: Vec<ModalButton>,
    },
    ShowForm {
        form_config: serde_json::Value,
        #[serde(default)]
        title: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl Action {
    /// The wire tag of this action, used for the execution audit trail.
    /// `None` for unknown actions, which are never counted as executed.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::InAppMessage { .. } => Some("in_app_message"),
            Self::ShowModal { .. } => Some("show_modal"),
            Self::ShowForm { .. } => Some("show_form"),
            Self::Unknown => None,
        }
    }
}
