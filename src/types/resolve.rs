// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;

use super::*;

/// A typed operation that can be instantiated for every [`NativeType`].
///
/// Implementors carry their arguments as fields; [`DataTypeKind::visit`] and
/// [`TypeResolver::resolve`] call [`visit`](TypeVisitor::visit) with the
/// concrete type matching a column's type.
pub trait TypeVisitor {
    type Output;

    fn visit<T: NativeType>(self) -> Self::Output;
}

impl DataTypeKind {
    /// Run `visitor` instantiated for the native type of this kind.
    pub fn visit<V: TypeVisitor>(self, visitor: V) -> V::Output {
        match self {
            Self::Int32 => visitor.visit::<i32>(),
            Self::Int64 => visitor.visit::<i64>(),
            Self::Float32 => visitor.visit::<F32>(),
            Self::Float64 => visitor.visit::<F64>(),
            Self::String => visitor.visit::<String>(),
        }
    }
}

/// Maps textual type tags of a schema to column types.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    tags: HashMap<String, DataTypeKind>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        let mut resolver = Self::empty();
        for kind in [
            DataTypeKind::Int32,
            DataTypeKind::Int64,
            DataTypeKind::Float32,
            DataTypeKind::Float64,
            DataTypeKind::String,
        ] {
            resolver.register(kind.to_string(), kind);
        }
        resolver
    }
}

impl TypeResolver {
    /// A resolver knowing the tags `int`, `long`, `float`, `double` and `string`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver without any tag.
    pub fn empty() -> Self {
        TypeResolver {
            tags: HashMap::new(),
        }
    }

    /// Register `tag` as an alias of `kind`. An existing tag is overwritten.
    pub fn register(&mut self, tag: impl Into<String>, kind: DataTypeKind) {
        self.tags.insert(tag.into(), kind);
    }

    /// Look up the column type of `tag`.
    pub fn kind_of(&self, tag: &str) -> Result<DataTypeKind, ConvertError> {
        self.tags
            .get(tag)
            .copied()
            .ok_or_else(|| ConvertError::UnknownType(tag.into()))
    }

    /// Run `visitor` instantiated for the native type `tag` stands for.
    pub fn resolve<V: TypeVisitor>(&self, tag: &str, visitor: V) -> Result<V::Output, ConvertError> {
        Ok(self.kind_of(tag)?.visit(visitor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KindOf;

    impl TypeVisitor for KindOf {
        type Output = DataTypeKind;

        fn visit<T: NativeType>(self) -> DataTypeKind {
            T::KIND
        }
    }

    struct Parse<'a>(&'a DataValue);

    impl TypeVisitor for Parse<'_> {
        type Output = Result<DataValue, ConvertError>;

        fn visit<T: NativeType>(self) -> Self::Output {
            Ok(self.0.cast::<T>()?.into())
        }
    }

    #[test]
    fn test_default_tags() {
        let resolver = TypeResolver::new();
        for (tag, kind) in [
            ("int", DataTypeKind::Int32),
            ("long", DataTypeKind::Int64),
            ("float", DataTypeKind::Float32),
            ("double", DataTypeKind::Float64),
            ("string", DataTypeKind::String),
        ] {
            assert_eq!(resolver.kind_of(tag), Ok(kind));
            assert_eq!(resolver.resolve(tag, KindOf), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_tag() {
        let resolver = TypeResolver::new();
        assert_eq!(
            resolver.kind_of("varchar"),
            Err(ConvertError::UnknownType("varchar".into()))
        );
        assert!(TypeResolver::empty().kind_of("int").is_err());
    }

    #[test]
    fn test_register_alias() {
        let mut resolver = TypeResolver::new();
        resolver.register("varchar", DataTypeKind::String);
        assert_eq!(resolver.resolve("varchar", KindOf), Ok(DataTypeKind::String));
    }

    #[test]
    fn test_resolve_cast() {
        let resolver = TypeResolver::new();
        let value = DataValue::from(5);
        assert_eq!(
            resolver.resolve("long", Parse(&value)),
            Ok(Ok(DataValue::Int64(5)))
        );
        assert!(resolver.resolve("string", Parse(&value)).unwrap().is_err());
    }
}
