use std::collections::BTreeMap;

/// One node of the context tree accumulated from command output.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Scalar(String),
    Sequence(Vec<ContextValue>),
    Mapping(BTreeMap<String, ContextValue>),
}

/// Nested key-value data extracted over the run, resolved against by the
/// template placeholders of later pages. Patches merge deep; there is no
/// deletion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context(BTreeMap<String, ContextValue>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(mapping: BTreeMap<String, ContextValue>) -> Self {
        Self(mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge `patch` into this context. Mappings merge key by key;
    /// any other collision is won by the patch. Sibling keys survive.
    pub fn merge(&mut self, patch: Context) {
        for (key, incoming) in patch.0 {
            match self.0.get_mut(&key) {
                Some(existing) => merge_value(existing, incoming),
                None => {
                    self.0.insert(key, incoming);
                }
            }
        }
    }

    /// Walk a dotted path down to a scalar. Numeric segments index into
    /// sequences. Any missing segment, or a walk that ends on a non-scalar,
    /// yields `None`.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut value = self.0.get(first)?;
        for segment in segments {
            value = match value {
                ContextValue::Mapping(mapping) => mapping.get(segment)?,
                ContextValue::Sequence(sequence) => {
                    sequence.get(segment.parse::<usize>().ok()?)?
                }
                ContextValue::Scalar(_) => return None,
            };
        }
        match value {
            ContextValue::Scalar(scalar) => Some(scalar.as_str()),
            _ => None,
        }
    }
}

fn merge_value(existing: &mut ContextValue, incoming: ContextValue) {
    match (existing, incoming) {
        (ContextValue::Mapping(existing), ContextValue::Mapping(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (existing, incoming) => *existing = incoming,
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Scalar(String::new()),
            serde_json::Value::Bool(flag) => Self::Scalar(flag.to_string()),
            serde_json::Value::Number(number) => Self::Scalar(number.to_string()),
            serde_json::Value::String(text) => Self::Scalar(text),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Context {
    /// Non-object values become the empty context; patches are mappings by
    /// construction.
    fn from(value: serde_json::Value) -> Self {
        match ContextValue::from(value) {
            ContextValue::Mapping(mapping) => Self(mapping),
            _ => Self::default(),
        }
    }
}
