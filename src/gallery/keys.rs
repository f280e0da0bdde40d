/// A key press as reported by the host, reduced to what the lightbox binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    /// A single printable character (`+`, `=`, `-`, `0`, ...).
    Char(char),
    /// Any other named key (e.g. `"Tab"`, `"F11"`).
    Other(String),
}

impl Key {
    /// Parse a browser-style key name (`KeyboardEvent.key`).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(other.to_owned()),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "keys_test.rs"]
mod tests;
