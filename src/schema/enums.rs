//! Enum descriptors

use crate::error::SchemaError;

/// Static description of an enum type: an ordered list of named numbers.
///
/// The first declared value is the implicit default of any enum field of
/// this type that has no explicit default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    values: Vec<(String, i32)>,
}

impl EnumDescriptor {
    /// Validates and freezes an enum declaration.
    ///
    /// # Errors
    ///
    /// Fails with [`SchemaError::InvalidEnum`] if there are no values, or if
    /// a name or number is declared twice.
    pub fn describe<N, I>(name: impl Into<String>, values: I) -> Result<Self, SchemaError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, i32)>,
    {
        let name = name.into();
        let mut out: Vec<(String, i32)> = Vec::new();
        for (value_name, number) in values {
            let value_name = value_name.into();
            if out.iter().any(|(n, _)| *n == value_name) {
                return Err(SchemaError::InvalidEnum {
                    name,
                    reason: format!("value name `{value_name}` is declared more than once"),
                });
            }
            if let Some((other, _)) = out.iter().find(|(_, num)| *num == number) {
                return Err(SchemaError::InvalidEnum {
                    reason: format!("number {number} is shared by `{other}` and `{value_name}`"),
                    name,
                });
            }
            out.push((value_name, number));
        }
        if out.is_empty() {
            return Err(SchemaError::InvalidEnum {
                name,
                reason: "no values declared".into(),
            });
        }
        Ok(Self { name, values: out })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared values, in declaration order
    #[must_use]
    pub fn values(&self) -> &[(String, i32)] {
        &self.values
    }

    /// Number of the first declared value
    #[must_use]
    pub fn default_number(&self) -> i32 {
        self.values.first().map_or(0, |(_, number)| *number)
    }

    #[must_use]
    pub fn contains(&self, number: i32) -> bool {
        self.values.iter().any(|(_, num)| *num == number)
    }

    #[must_use]
    pub fn value_name(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, num)| *num == number)
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn number(&self, value_name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(name, _)| name == value_name)
            .map(|(_, num)| *num)
    }
}
