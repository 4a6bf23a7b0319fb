/// Build an [`Entity`](crate::Entity) with fields in the order written.
///
/// ```
/// use entity_driver::entity;
///
/// let filter = entity! { "companyId" => "c1", "published" => true };
/// assert_eq!(filter.keys().collect::<Vec<_>>(), vec!["companyId", "published"]);
/// ```
#[macro_export]
macro_rules! entity {
    () => {
        $crate::Entity::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut entity = $crate::Entity::new();
        $( entity.insert($key, $value); )+
        entity
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Entity, Value};

    #[test]
    fn test_entity_macro() {
        let built = entity! { "foo" => "bar", "n" => 3, "ok" => false, };
        let expected = Entity::new().with("foo", "bar").with("n", 3).with("ok", false);
        assert_eq!(built, expected);
        assert_eq!(built.get("n"), Some(&Value::Int(3)));
        assert!(entity! {}.is_empty());
    }
}
