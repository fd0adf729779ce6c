use jssa_ir::InstrId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Syntax outside the lowered subset.
    #[error("unsupported syntax: {kind}")]
    Unsupported { kind: String },

    /// `break`/`continue` with no matching enclosing loop.
    #[error("`{statement}` outside of a matching loop{}", label_suffix(.label))]
    UnresolvedJump {
        statement: &'static str,
        label: Option<String>,
    },

    /// A phi was reserved but nothing flowed into it.
    #[error("phi {phi} has no contributions")]
    UnresolvedPhi { phi: InstrId },
}

impl BuildError {
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        Self::Unsupported { kind: kind.into() }
    }
}

fn label_suffix(label: &Option<String>) -> String {
    match label {
        Some(label) => format!(" labeled `{label}`"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
