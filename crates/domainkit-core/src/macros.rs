/// Declare a typed identifier object.
///
/// `domain_id!(pub UserId, "app::UserId", Text)` declares a newtype over
/// [`Identifier`](crate::types::Identifier) that the registry can register
/// with `register_identifier` and the factory can build from a scalar.
/// The backing is `Int` or `Text`.
#[macro_export]
macro_rules! domain_id {
    ($(#[$meta:meta])* $vis:vis $name:ident, $path:literal, $backing:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name($crate::types::Identifier);

        impl $name {
            /// Identifier from loosely-typed input; `Null` yields an empty one.
            pub fn new(
                value: impl Into<$crate::value::Value>,
            ) -> Result<Self, $crate::error::DomainError> {
                $crate::types::Identifier::from_value(
                    $path,
                    $crate::types::IdBacking::$backing,
                    &value.into(),
                )
                .map(Self)
            }

            #[must_use]
            pub const fn empty() -> Self {
                Self($crate::types::Identifier::empty($path))
            }

            #[must_use]
            pub const fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl $crate::traits::Path for $name {
            const PATH: &'static str = $path;
        }

        impl $crate::traits::DomainObject for $name {
            fn type_path(&self) -> &'static str {
                $path
            }

            fn field(&self, name: &str) -> Option<$crate::value::Value> {
                (name == $crate::factory::SCALAR_KEY).then(|| self.0.to_value())
            }

            fn as_identifier(&self) -> Option<&$crate::types::Identifier> {
                Some(&self.0)
            }
        }

        impl $crate::traits::Construct for $name {
            fn parameters() -> Vec<$crate::model::Param> {
                vec![$crate::model::Param::nullable(
                    $crate::factory::SCALAR_KEY,
                    $crate::model::DeclaredType::Mixed,
                )]
            }

            fn construct(
                args: &mut $crate::factory::Arguments,
            ) -> Result<Self, $crate::error::DomainError> {
                let value = args.take_value()?;

                $crate::types::Identifier::from_value(
                    $path,
                    $crate::types::IdBacking::$backing,
                    &value,
                )
                .map(Self)
            }
        }

        impl $crate::traits::DomainId for $name {
            const BACKING: $crate::types::IdBacking = $crate::types::IdBacking::$backing;

            fn from_identifier(identifier: $crate::types::Identifier) -> Self {
                Self(identifier)
            }

            fn identifier(&self) -> &$crate::types::Identifier {
                &self.0
            }
        }

        impl $crate::traits::FieldValue for $name {
            fn to_value(&self) -> $crate::value::Value {
                $crate::value::Value::Identifier(self.0.clone())
            }

            fn from_value(value: &$crate::value::Value) -> Option<Self> {
                if let $crate::value::Value::Object(instance) = value
                    && let Some(id) = instance.downcast_ref::<Self>()
                {
                    return Some(id.clone());
                }

                $crate::types::Identifier::from_value(
                    $path,
                    $crate::types::IdBacking::$backing,
                    value,
                )
                .ok()
                .map(Self)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl From<$name> for $crate::value::Value {
            fn from(id: $name) -> Self {
                Self::Identifier(id.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}
