// Tri-state field updates: omitted, explicit null, or a new value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::normalize::non_empty;

/// A partial-update field.
///
/// Input structs declare these as `#[serde(default, skip_serializing_if = "Patch::is_omitted")]`
/// so an absent key deserializes to [`Patch::Omitted`] and an explicit `null` to [`Patch::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key absent: keep the prior value.
    Omitted,
    /// Key present with `null`: clear the value.
    Null,
    /// Key present with a value: overwrite.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Omitted
    }
}

impl<T> Patch<T> {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }

    /// Write this patch into an optional slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Omitted => {}
            Self::Null => *slot = None,
            Self::Value(value) => *slot = Some(value),
        }
    }
}

impl Patch<String> {
    /// `Value("")` becomes `Null`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Value(text) => match non_empty(Some(text)) {
                Some(text) => Self::Value(text),
                None => Self::Null,
            },
            other => other,
        }
    }

    /// Normalize and write into an optional text slot.
    pub fn apply_text(self, slot: &mut Option<String>) {
        self.normalized().apply_to(slot);
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Omitted | Self::Null => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::Patch;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_omitted")]
        comment: Patch<String>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Probe = serde_json::from_value(json!({})).expect("absent should decode");
        let null: Probe = serde_json::from_value(json!({ "comment": null })).expect("null");
        let value: Probe = serde_json::from_value(json!({ "comment": "late" })).expect("value");

        assert_eq!(absent.comment, Patch::Omitted);
        assert_eq!(null.comment, Patch::Null);
        assert_eq!(value.comment, Patch::Value("late".to_string()));
    }

    #[test]
    fn omitted_is_skipped_when_serializing() {
        let encoded = serde_json::to_value(Probe { comment: Patch::Omitted }).expect("encode");
        assert_eq!(encoded, json!({}));
        let encoded = serde_json::to_value(Probe { comment: Patch::Null }).expect("encode");
        assert_eq!(encoded, json!({ "comment": null }));
    }

    #[test]
    fn apply_text_clears_on_empty_string() {
        let mut slot = Some("old".to_string());
        Patch::Value(String::new()).apply_text(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn omitted_leaves_slot_untouched() {
        let mut slot = Some("old".to_string());
        Patch::<String>::Omitted.apply_text(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));

        Patch::Value("new".to_string()).apply_text(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));

        Patch::<String>::Null.apply_text(&mut slot);
        assert_eq!(slot, None);
    }
}
