use serde::{Deserialize, Serialize};

/// One connected peer, keyed by its server-assigned connection id.
///
/// Positions are stored exactly as the server sent them; values outside the
/// surface bounds are legal and simply draw clipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Entity {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}
