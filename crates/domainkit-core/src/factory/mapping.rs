use crate::{
    error::DomainError,
    factory::{FactoryError, MappingIssue},
    registry::TypeRegistry,
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};
use std::{collections::BTreeMap, fmt};

///
/// ClassMappingConfig
///
/// Serialized form of a class mapping as loaded from configuration.
/// A source repeated in the input is rejected, never last-wins.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClassMappingConfig {
    #[serde(deserialize_with = "unique_entries")]
    pub class_mapping: BTreeMap<String, String>,
}

fn unique_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueEntries;

    impl<'de> Visitor<'de> for UniqueEntries {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of source paths to target paths")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = BTreeMap::new();
            while let Some((from, to)) = map.next_entry::<String, String>()? {
                if entries.contains_key(&from) {
                    return Err(de::Error::custom(format!(
                        "class mapping source '{from}': {}",
                        MappingIssue::Duplicate
                    )));
                }
                entries.insert(from, to);
            }

            Ok(entries)
        }
    }

    deserializer.deserialize_map(UniqueEntries)
}

///
/// ClassMapping
///
/// Redirects abstract (or alias) paths to the concrete path actually built.
/// Immutable once validated.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassMapping {
    entries: BTreeMap<String, String>,
}

impl ClassMapping {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build and validate a mapping.
    ///
    /// Every target must be a registered concrete type. When the source is
    /// itself registered, the target must be assignable to it. A source may
    /// appear only once.
    pub fn new<I, K, V>(registry: &TypeRegistry, entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut mapping = BTreeMap::new();

        for (from, to) in entries {
            let (from, to) = (from.into(), to.into());
            let issue = Self::check(registry, &from, &to, mapping.contains_key(&from));

            if let Some(issue) = issue {
                return Err(FactoryError::InvalidMapping { from, to, issue }.into());
            }
            mapping.insert(from, to);
        }

        Ok(Self { entries: mapping })
    }

    pub fn from_config(
        registry: &TypeRegistry,
        config: ClassMappingConfig,
    ) -> Result<Self, DomainError> {
        Self::new(registry, config.class_mapping)
    }

    fn check(registry: &TypeRegistry, from: &str, to: &str, seen: bool) -> Option<MappingIssue> {
        if seen {
            return Some(MappingIssue::Duplicate);
        }

        let Some(target) = registry.try_get(to) else {
            return Some(MappingIssue::UnknownTarget);
        };
        if target.is_abstract() {
            return Some(MappingIssue::AbstractTarget);
        }
        if registry.contains(from) && !registry.is_assignable(to, from) {
            return Some(MappingIssue::NotAssignable);
        }

        None
    }

    /// Mapped path for `path`, or `path` itself when unmapped.
    #[must_use]
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.entries.get(path).map_or(path, String::as_str)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }
}
