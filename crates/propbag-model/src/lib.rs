//! Typed property containers.
//!
//! Business objects are described as ordered bags of typed, named property
//! values with an optional parent container. Values are read through the
//! resolution engine in [`resolve`], which applies stored values, parent
//! fallback, calculation and defaults according to [`SearchOptions`].

pub mod cache;
pub mod container;
pub mod error;
pub mod logging;
pub mod property;
pub mod property_value;
pub mod resolve;
pub mod schema;
pub mod search;
pub mod value;

pub use cache::PropertyCache;
pub use container::{MutablePropertyContainer, PropertyContainer, PropertySource};
pub use error::{BoxError, ModelError, Result};
pub use property::{AnyProperty, Nullability, Property, PropertyBuilder, PropertyId};
pub use property_value::{PropertyValue, ValueSource};
pub use resolve::{MAX_PARENT_DEPTH, PropertySourceExt, resolve, resolve_by_name};
pub use schema::PropertySet;
pub use search::{PropertyComparer, SearchOptions};
pub use value::{PropertyType, TypeTag, Value, ValueType, display_value};
