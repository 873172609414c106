use ::core::fmt::Display;
use ::std::{
    borrow::{Borrow, Cow},
    fmt,
};

use ::anyhow::anyhow;
use ::serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};

use crate::error::{Result, RucalcError};

/// Caller supplied identifier of an expression.
/// Ordering is lexicographic, which is the order expressions are listed in.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Serialize, Hash)]
#[serde(transparent)]
pub struct ExpressionId {
    id: Cow<'static, str>,
}

impl ExpressionId {
    pub fn new(id: Cow<'static, str>) -> Result<Self> {
        if id.is_empty() {
            Err(RucalcError::invalid_argument(anyhow!(
                "Expression id cannot be empty."
            )))
        } else {
            Ok(Self { id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl<'de> Deserialize<'de> for ExpressionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(ExpressionIdVisitor)
    }
}

struct ExpressionIdVisitor;

impl Visitor<'_> for ExpressionIdVisitor {
    type Value = ExpressionId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-empty string representing an ExpressionId")
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        ExpressionId::try_from(value.to_owned()).map_err(de::Error::custom)
    }
}

impl Display for ExpressionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Lets maps keyed by [ExpressionId] be queried with a plain `&str`.
impl Borrow<str> for ExpressionId {
    fn borrow(&self) -> &str {
        &self.id
    }
}

impl TryFrom<String> for ExpressionId {
    type Error = RucalcError;
    fn try_from(id: String) -> Result<Self> {
        Self::new(Cow::Owned(id))
    }
}

impl TryFrom<&'static str> for ExpressionId {
    type Error = RucalcError;
    fn try_from(id: &'static str) -> Result<Self> {
        Self::new(Cow::Borrowed(id))
    }
}
