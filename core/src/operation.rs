use std::fmt;

/// The verb selected by a request.
///
/// Matching is exact and case-sensitive. Anything else, including a missing
/// operation, is kept as `Unknown` so the original text can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Unknown(Option<String>),
}

impl Operation {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("create") => Operation::Create,
            Some("read") => Operation::Read,
            Some("update") => Operation::Update,
            Some("delete") => Operation::Delete,
            other => Operation::Unknown(other.map(str::to_string)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Unknown(Some(raw)) => raw,
            Operation::Unknown(None) => "null",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
