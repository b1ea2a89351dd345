//! JSON value extraction helpers.
//!
//! Handle records carry a polymorphic `data.value`, so they are read as
//! untyped JSON. These accessors keep that code free of
//! `.get().and_then()` chains.

use serde_json::Value;

/// Extension trait for JSON value extraction
pub trait JsonExt {
    /// Get a string value, returning None if key missing or not a string
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Get an i64 value, returning None if key missing or not an integer
    fn get_i64(&self, key: &str) -> Option<i64>;

    /// Get an array value, returning None if key missing or not an array
    fn get_array(&self, key: &str) -> Option<&Vec<Value>>;

    /// Follow a `/`-separated path of object keys.
    fn get_path(&self, path: &str) -> Option<&Value>;
}

impl JsonExt for Value {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(|v| v.as_array())
    }

    fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('/').try_fold(self, |v, key| v.get(key))
    }
}
