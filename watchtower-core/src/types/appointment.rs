use std::fmt;
use std::ops::Deref;

use uuid::Uuid;

/// Opaque identifier of a caller-supplied obligation. Unique per obligation;
/// the engine never inspects its contents, it is only a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Create an identifier from a caller-supplied string.
    pub fn new(id: impl Into<String>) -> Self {
        AppointmentId(id.into())
    }

    /// Create a new random identifier.
    pub fn random() -> Self {
        AppointmentId(Uuid::new_v4().to_string())
    }
}

impl Deref for AppointmentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AppointmentId {
    fn from(id: &str) -> Self {
        AppointmentId(id.to_owned())
    }
}

impl From<String> for AppointmentId {
    fn from(id: String) -> Self {
        AppointmentId(id)
    }
}
