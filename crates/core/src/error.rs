#![forbid(unsafe_code)]

use crate::ids::NodeId;

pub type StoreFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
pub enum TreeError {
    /// A structural field (left/right/parent) was addressed through an
    /// ordinary attribute write.
    StructuralViolation {
        field: String,
    },
    /// The move target lies inside the subtree being moved.
    IllegalMove {
        node: NodeId,
        target: NodeId,
    },
    InvalidPosition(String),
    UnpersistedNode(NodeId),
    ScopeMismatch {
        node: NodeId,
        target: NodeId,
    },
    /// A scope key was supplied to a tree configured as a single forest.
    ScopeNotConfigured,
    Store(StoreFailure),
}

impl TreeError {
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::StructuralViolation { .. } => "STRUCTURAL_VIOLATION",
            Self::IllegalMove { .. } => "ILLEGAL_MOVE",
            Self::InvalidPosition(_) => "INVALID_POSITION",
            Self::UnpersistedNode(_) => "UNPERSISTED_NODE",
            Self::ScopeMismatch { .. } => "SCOPE_MISMATCH",
            Self::ScopeNotConfigured => "SCOPE_NOT_CONFIGURED",
            Self::Store(_) => "STORE_FAILURE",
        }
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StructuralViolation { field } => {
                write!(f, "structural field '{field}' is managed by the tree")
            }
            Self::IllegalMove { node, target } => write!(
                f,
                "impossible move: target {target} lies inside the subtree of {node}"
            ),
            Self::InvalidPosition(raw) => write!(
                f,
                "position must be left, right or child ('{raw}' received)"
            ),
            Self::UnpersistedNode(id) => write!(f, "node {id} is not persisted"),
            Self::ScopeMismatch { node, target } => write!(
                f,
                "node {node} and target {target} belong to different forests"
            ),
            Self::ScopeNotConfigured => write!(f, "tree has no scope column configured"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
