//! Typed view of an outgoing request's arguments.
//!
//! libwayland passes arguments as an untyped union array whose layout is only
//! known from the message signature. The guard decodes the two signatures it
//! tracks into [`Argument`] values and reads them back through accessors that
//! fail with [`ArgumentError`] instead of reinterpreting the wrong member.

use std::fmt;

use thiserror::Error;

/// Wire kind of a single argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Signed 32-bit integer (`i`).
    Int,
    /// Unsigned 32-bit integer (`u`).
    Uint,
    /// Object reference (`o`).
    Object,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Object => "object",
        })
    }
}

/// Address of an object carried in an argument slot. Never dereferenced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectRef(pub usize);

impl ObjectRef {
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// One decoded argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Int(i32),
    Uint(u32),
    Object(ObjectRef),
}

impl Argument {
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Int(_) => ArgKind::Int,
            Self::Uint(_) => ArgKind::Uint,
            Self::Object(_) => ArgKind::Object,
        }
    }
}

/// Failure to read an argument as the requested kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("argument {index} is missing (request carries {len})")]
    Missing { index: usize, len: usize },
    #[error("argument {index} is {found}, expected {expected}")]
    WrongKind {
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },
}

/// Decoded argument list of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    #[must_use]
    pub fn new(values: Vec<Argument>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Argument] {
        &self.values
    }

    /// Argument at `index`, whatever its kind.
    pub fn get(&self, index: usize) -> Result<Argument, ArgumentError> {
        self.values
            .get(index)
            .copied()
            .ok_or(ArgumentError::Missing {
                index,
                len: self.values.len(),
            })
    }

    pub fn int(&self, index: usize) -> Result<i32, ArgumentError> {
        match self.get(index)? {
            Argument::Int(v) => Ok(v),
            other => Err(wrong_kind(index, ArgKind::Int, other)),
        }
    }

    pub fn uint(&self, index: usize) -> Result<u32, ArgumentError> {
        match self.get(index)? {
            Argument::Uint(v) => Ok(v),
            other => Err(wrong_kind(index, ArgKind::Uint, other)),
        }
    }

    pub fn object(&self, index: usize) -> Result<ObjectRef, ArgumentError> {
        match self.get(index)? {
            Argument::Object(v) => Ok(v),
            other => Err(wrong_kind(index, ArgKind::Object, other)),
        }
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(values: Vec<Argument>) -> Self {
        Self::new(values)
    }
}

fn wrong_kind(index: usize, expected: ArgKind, found: Argument) -> ArgumentError {
    ArgumentError::WrongKind {
        index,
        expected,
        found: found.kind(),
    }
}
