//! Ordered list values.
//!
//! Text form: elements joined by `|`. Inside an element `&` is written
//! `&amp`, `|` is written `&pipe`, and an empty element is written `&empty`.
//! The empty list is the empty string. A leading `li@` is accepted on parse,
//! and written when the first element itself starts with `li@`.

use crate::{ObjectError, ObjectTag, Value, ValueKind, World};

const PREFIX: &str = "li@";
const EMPTY_ELEMENT: &str = "&empty";

/// Ordered sequence of element texts.
///
/// Objects are stored by their identity text and converted back on demand
/// with [`ListTag::filter`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListTag {
    items: Vec<String>,
}

impl ListTag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.items.push(text.into());
    }

    /// Append an object by its identity text
    pub fn add_object<T: ObjectTag>(&mut self, object: &T) {
        self.items.push(object.identify());
    }

    /// Build a list from typed objects
    pub fn from_objects<'a, T, I>(objects: I) -> Self
    where
        T: ObjectTag + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut list = Self::new();
        for object in objects {
            list.add_object(object);
        }
        list
    }

    /// Parse the list text form. Never fails: any text is a list of elements.
    pub fn parse(text: &str) -> Self {
        let body = strip_prefix_ignore_case(text, PREFIX).unwrap_or(text);
        if body.is_empty() {
            return Self::new();
        }
        Self {
            items: body.split('|').map(unescape).collect(),
        }
    }

    /// Convert every element into `T`. The first failure fails the whole
    /// list; no partial result is returned.
    pub fn filter<T: ObjectTag>(&self, world: &dyn World) -> Result<Vec<T>, ObjectError> {
        self.items
            .iter()
            .map(|item| T::value_of(item, world))
            .collect()
    }
}

impl ObjectTag for ListTag {
    const KIND: ValueKind = ValueKind::List;

    fn identify(&self) -> String {
        let body = self
            .items
            .iter()
            .map(|item| escape(item))
            .collect::<Vec<_>>()
            .join("|");
        if strip_prefix_ignore_case(&body, PREFIX).is_some() {
            format!("{PREFIX}{body}")
        } else {
            body
        }
    }

    fn value_of(text: &str, _world: &dyn World) -> Result<Self, ObjectError> {
        Ok(Self::parse(text))
    }

    fn into_value(self) -> Value {
        Value::List(self)
    }

    fn from_value(value: &Value, _world: &dyn World) -> Result<Self, ObjectError> {
        Ok(match value {
            Value::List(list) => list.clone(),
            other => Self::parse(&other.identify()),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for ListTag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn escape(item: &str) -> String {
    if item.is_empty() {
        return EMPTY_ELEMENT.to_string();
    }
    item.replace('&', "&amp").replace('|', "&pipe")
}

fn unescape(raw: &str) -> String {
    if raw == EMPTY_ELEMENT {
        return String::new();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(after) = tail.strip_prefix("amp") {
            out.push('&');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("pipe") {
            out.push('|');
            rest = after;
        } else {
            out.push('&');
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockWorld;
    use crate::{ItemRef, ItemStack};

    #[test]
    fn test_parse_plain_pipe_list() {
        let list = ListTag::parse("diamond|diamond");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some("diamond"));
        assert_eq!(list.get(1), Some("diamond"));
    }

    #[test]
    fn test_empty_text_is_empty_list() {
        assert!(ListTag::parse("").is_empty());
        assert!(ListTag::parse("li@").is_empty());
        assert_eq!(ListTag::new().identify(), "");
    }

    #[test]
    fn test_escaping_round_trips() {
        let list = ListTag::from_iter(["a|b", "", "x&y", "&pipe", "&empty"]);
        let text = list.identify();
        assert_eq!(text, "a&pipeb|&empty|x&ampy|&amppipe|&ampempty");
        assert_eq!(ListTag::parse(&text), list);
    }

    #[test]
    fn test_single_empty_element_is_not_the_empty_list() {
        let list = ListTag::from_iter([""]);
        assert_eq!(ListTag::parse(&list.identify()), list);
    }

    #[test]
    fn test_first_element_with_list_prefix_round_trips() {
        let list = ListTag::from_iter(["li@x", "y"]);
        assert_eq!(list.identify(), "li@li@x|y");
        assert_eq!(ListTag::parse(&list.identify()), list);

        let shouting = ListTag::from_iter(["LI@"]);
        assert_eq!(ListTag::parse(&shouting.identify()), shouting);

        let later = ListTag::from_iter(["y", "li@x"]);
        assert_eq!(later.identify(), "y|li@x");
        assert_eq!(ListTag::parse(&later.identify()), later);
    }

    #[test]
    fn test_filter_is_atomic() {
        let world = MockWorld::new();

        let good = ListTag::parse("diamond|i@stone[quantity=4]");
        let items: Vec<ItemRef> = good.filter(&world).unwrap();
        assert_eq!(items[1].stack(), &ItemStack::new("stone", 4));

        let bad = ListTag::parse("diamond|not_a_material|stone");
        let err = bad.filter::<ItemRef>(&world).unwrap_err();
        assert_eq!(err, ObjectError::UnknownMaterial("not_a_material".into()));
    }

    #[test]
    fn test_objects_are_stored_by_identity() {
        let stacks = [ItemStack::new("diamond", 1), ItemStack::new("stone", 2)];
        let refs: Vec<ItemRef> = stacks.iter().cloned().map(ItemRef::new).collect();
        let list = ListTag::from_objects(&refs);
        assert_eq!(list.identify(), "i@diamond|i@stone[quantity=2]");
    }
}
