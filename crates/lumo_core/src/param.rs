//! Typed key/value parameter bags attached to every scene directive.
//!
//! A `ParamSet` deserializes straight from JSON objects: integers, reals,
//! booleans, strings and flat arrays of numbers. Accessors coerce the stored
//! value to the requested type and fall back to a caller default when the
//! key is absent.

use std::collections::BTreeMap;

use lumo_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

/// One parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Real(f32),
    Text(String),
    Ints(Vec<i64>),
    Reals(Vec<f32>),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Real(_) => "real",
            ParamValue::Text(_) => "string",
            ParamValue::Ints(_) => "int array",
            ParamValue::Reals(_) => "real array",
        }
    }

    /// Numeric contents as floats, for any numeric shape.
    fn as_floats(&self) -> Option<Vec<f32>> {
        match self {
            ParamValue::Int(i) => Some(vec![*i as f32]),
            ParamValue::Real(r) => Some(vec![*r]),
            ParamValue::Ints(v) => Some(v.iter().map(|&i| i as f32).collect()),
            ParamValue::Reals(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Real(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v as f32)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        ParamValue::Reals(v.to_array().to_vec())
    }
}

impl From<Vec<f32>> for ParamValue {
    fn from(v: Vec<f32>) -> Self {
        ParamValue::Reals(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Reals(v.into_iter().map(|x| x as f32).collect())
    }
}

impl From<Vec<i32>> for ParamValue {
    fn from(v: Vec<i32>) -> Self {
        ParamValue::Ints(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<Vec3>> for ParamValue {
    fn from(v: Vec<Vec3>) -> Self {
        ParamValue::Reals(v.iter().flat_map(|p| p.to_array()).collect())
    }
}

/// Named parameters of one directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet {
    params: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.params.insert(name.to_string(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn mismatch<T>(&self, name: &str, wanted: &str, default: T) -> T {
        if let Some(value) = self.params.get(name) {
            log::warn!(
                "Parameter \"{}\" is a {}, expected {}; using default",
                name,
                value.kind(),
                wanted
            );
        }
        default
    }

    pub fn get_one_float(&self, name: &str, default: f32) -> f32 {
        match self.params.get(name) {
            Some(ParamValue::Real(r)) => *r,
            Some(ParamValue::Int(i)) => *i as f32,
            Some(ParamValue::Reals(v)) if v.len() == 1 => v[0],
            _ => self.mismatch(name, "real", default),
        }
    }

    pub fn get_one_int(&self, name: &str, default: i32) -> i32 {
        match self.params.get(name) {
            Some(ParamValue::Int(i)) => *i as i32,
            Some(ParamValue::Ints(v)) if v.len() == 1 => v[0] as i32,
            _ => self.mismatch(name, "int", default),
        }
    }

    /// Booleans also accept the strings "true" and "false".
    pub fn get_one_bool(&self, name: &str, default: bool) -> bool {
        match self.params.get(name) {
            Some(ParamValue::Bool(b)) => *b,
            Some(ParamValue::Text(s)) if s == "true" => true,
            Some(ParamValue::Text(s)) if s == "false" => false,
            _ => self.mismatch(name, "bool", default),
        }
    }

    pub fn get_one_string(&self, name: &str, default: &str) -> String {
        match self.params.get(name) {
            Some(ParamValue::Text(s)) => s.clone(),
            _ => self.mismatch(name, "string", default.to_string()),
        }
    }

    pub fn get_one_vec3(&self, name: &str, default: Vec3) -> Vec3 {
        match self.params.get(name).and_then(ParamValue::as_floats) {
            Some(v) if v.len() == 3 => Vec3::new(v[0], v[1], v[2]),
            _ => self.mismatch(name, "3-component vector", default),
        }
    }

    /// Colors written as integers are 0-255 and get rescaled to [0, 1].
    pub fn get_one_color(&self, name: &str, default: Color) -> Color {
        match self.params.get(name) {
            Some(ParamValue::Ints(v)) if v.len() == 3 => {
                Color::new(v[0] as f32, v[1] as f32, v[2] as f32) / 255.0
            }
            Some(ParamValue::Reals(v)) if v.len() == 3 => Color::new(v[0], v[1], v[2]),
            _ => self.mismatch(name, "color", default),
        }
    }

    /// Numeric array; `None` when absent or not numeric.
    pub fn get_float_array(&self, name: &str) -> Option<Vec<f32>> {
        self.params.get(name).and_then(ParamValue::as_floats)
    }

    pub fn get_int_array(&self, name: &str) -> Option<Vec<i64>> {
        match self.params.get(name)? {
            ParamValue::Ints(v) => Some(v.clone()),
            ParamValue::Int(i) => Some(vec![*i]),
            _ => self.mismatch(name, "int array", None),
        }
    }

    /// Flat numeric array regrouped as points. Trailing components that do not
    /// make a full triple are dropped with a warning.
    pub fn get_point3_array(&self, name: &str) -> Option<Vec<Vec3>> {
        let flat = self.get_float_array(name)?;
        if flat.len() % 3 != 0 {
            log::warn!(
                "Parameter \"{}\" has {} values, not a multiple of 3",
                name,
                flat.len()
            );
        }
        Some(
            flat.chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect(),
        )
    }
}
