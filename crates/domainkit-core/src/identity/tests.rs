use super::*;
use crate::{
    error::ErrorOrigin,
    test_fixtures::{Membership, Order, OrderNo, Point, User, UserId},
    traits::Path,
    types::Instance,
};
use proptest::prelude::*;

fn text(value: &str) -> Value {
    Value::from(value)
}

#[test]
fn single_field_identity_accepts_scalars_and_identifiers() {
    let users = IdentityNormalizer::of::<User>();
    let expected = Identity::new(vec![text("u1")]);

    let from_scalar = users.to_identity(&text("u1")).expect("scalar is well formed");
    assert_eq!(from_scalar, Some(expected.clone()));

    let id = UserId::new("u1").expect("id is valid");
    let from_id = users
        .to_identity(&Value::from(id.clone()))
        .expect("identifier is well formed");
    assert_eq!(from_id, Some(expected.clone()));

    let from_object = users
        .to_identity(&Value::Object(Instance::new(id)))
        .expect("identifier object is well formed");
    assert_eq!(from_object, Some(expected));
}

#[test]
fn integer_input_is_accepted_for_text_identifiers() {
    let users = IdentityNormalizer::of::<User>();

    let identity = users
        .to_identity(&Value::Int(42))
        .expect("integer is well formed")
        .expect("integer reads as text id");
    assert_eq!(identity, Identity::new(vec![text("42")]));
}

#[test]
fn identifier_of_another_kind_is_not_an_identity() {
    let users = IdentityNormalizer::of::<User>();
    let order_no = OrderNo::new(5_i64).expect("order number is valid");

    assert_eq!(
        users
            .to_identity(&Value::from(order_no))
            .expect("wrong kind is not a usage error"),
        None
    );
}

#[test]
fn map_identity_requires_exact_keys() {
    let users = IdentityNormalizer::of::<User>();

    let exact = Value::from(Context::from([("id", "u1")]));
    assert!(users.to_identity(&exact).expect("map is well formed").is_some());

    let extra = Value::from(Context::from([("id", "u1"), ("name", "Ann")]));
    assert_eq!(users.to_identity(&extra).expect("map is well formed"), None);

    let missing = Value::from(Context::new());
    assert_eq!(users.to_identity(&missing).expect("map is well formed"), None);
}

#[test]
fn composite_identity_from_list_and_map() {
    let memberships = IdentityNormalizer::of::<Membership>();
    let expected = Identity::new(vec![text("u1"), text("admins")]);

    let positional = Value::List(vec![text("u1"), text("admins")]);
    assert_eq!(
        memberships
            .to_identity(&positional)
            .expect("list is well formed"),
        Some(expected.clone())
    );

    let named = Value::from(Context::from([("group", "admins"), ("user", "u1")]));
    assert_eq!(
        memberships.to_identity(&named).expect("map is well formed"),
        Some(expected)
    );
}

#[test]
fn positional_identity_with_wrong_arity_is_a_usage_error() {
    let memberships = IdentityNormalizer::of::<Membership>();

    let err = memberships
        .to_identity(&Value::List(vec![text("u1")]))
        .expect_err("one value for two fields must fail");
    assert_eq!(err.class, ErrorClass::InvalidInput);
    assert_eq!(err.origin, ErrorOrigin::Identity);
    assert!(err.message.contains("2 field(s), 1 value(s)"));
}

#[test]
fn scalar_is_not_a_composite_identity() {
    let memberships = IdentityNormalizer::of::<Membership>();

    assert_eq!(
        memberships
            .to_identity(&text("u1"))
            .expect("scalar is not a usage error"),
        None
    );
}

#[test]
fn non_identifier_object_is_not_an_identity() {
    let users = IdentityNormalizer::of::<User>();
    let point = Value::Object(Instance::new(Point { x: 1, y: 2 }));

    assert_eq!(users.to_identity(&point).expect("object is not an error"), None);
}

#[test]
fn partial_identity_leaves_missing_parts_empty() {
    let memberships = IdentityNormalizer::of::<Membership>();

    let from_scalar = memberships
        .to_partial_identity(&text("u1"))
        .expect("scalar fills the first part");
    assert_eq!(from_scalar, Identity::new(vec![text("u1"), Value::Null]));
    assert!(!from_scalar.is_complete());

    let from_map = memberships
        .to_partial_identity(&Value::from(Context::from([("group", "admins"), ("x", "y")])))
        .expect("map parts are optional");
    assert_eq!(from_map, Identity::new(vec![Value::Null, text("admins")]));
}

#[test]
fn empty_values_never_form_a_complete_identity() {
    let users = IdentityNormalizer::of::<User>();

    assert!(users.is_identity(&text("u1")));
    assert!(!users.is_identity(&Value::Null));
    assert!(!users.is_identity(&Value::from(UserId::empty())));
    assert!(!users.is_identity(&text("")));
    assert!(!Identity::default().is_complete());
}

#[test]
fn identity_of_reads_descriptor_fields() {
    let users = IdentityNormalizer::of::<User>();

    let saved = User::new("u1", "Ann");
    assert_eq!(
        users.identity_of(&*saved).expect("user exposes its id"),
        Identity::new(vec![text("u1")])
    );

    let unsaved = User::unsaved("Bob");
    let identity = users.identity_of(&*unsaved).expect("empty id is readable");
    assert_eq!(identity, Identity::new(vec![Value::Null]));
    assert!(!identity.is_complete());
}

#[test]
fn identity_of_missing_field_is_an_invariant_violation() {
    let memberships = IdentityNormalizer::new(Membership::PATH, Membership::IDENTITY);
    let user = User::new("u1", "Ann");

    let err = memberships
        .identity_of(&*user)
        .expect_err("user has no 'user' field");
    assert_eq!(err.class, ErrorClass::InvariantViolation);
}

#[test]
fn matches_compares_canonical_values() {
    let orders = IdentityNormalizer::of::<Order>();
    let order = Order {
        number: OrderNo::new(5_i64).expect("order number is valid"),
        customer: None,
        total: 0.0,
    };

    assert!(orders.matches(&order, &Identity::new(vec![Value::Int(5)])));
    assert!(orders.matches(&order, &Identity::new(vec![Value::Uint(5)])));
    assert!(!orders.matches(&order, &Identity::new(vec![text("5")])));
    assert!(!orders.matches(&order, &Identity::new(vec![Value::Null])));
}

#[test]
fn decode_rebuilds_typed_parts() {
    let identity = Identity::new(vec![text("u1"), Value::Null]);

    let id: UserId = identity
        .decode(User::PATH, 0)
        .expect("text decodes as a user id");
    assert_eq!(id, UserId::new("u1").expect("id is valid"));

    let group: Option<String> = identity
        .decode(Membership::PATH, 1)
        .expect("null decodes as none");
    assert_eq!(group, None);

    let err = identity
        .decode::<i64>(User::PATH, 0)
        .expect_err("text is not an integer");
    assert_eq!(err.class, ErrorClass::InvalidInput);
}

#[test]
fn identity_pairs_with_field_names_and_displays() {
    let identity = Identity::new(vec![text("u1"), Value::Null]);

    assert_eq!(
        identity.to_fields(Membership::IDENTITY),
        Context::from([("user", text("u1")), ("group", Value::Null)])
    );
    assert_eq!(identity.to_string(), "(\"u1\", null)");
}

#[test]
fn values_match_covers_membership_and_nulls() {
    let stored = text("b");

    assert!(values_match(&stored, &Value::List(vec![text("a"), text("b")])));
    assert!(!values_match(&stored, &Value::List(vec![text("a")])));
    assert!(values_match(
        &Value::List(vec![text("a")]),
        &Value::List(vec![text("a")])
    ));

    assert!(values_match(&Value::Null, &Value::Null));
    assert!(values_match(&Value::from(UserId::empty()), &Value::Null));
    assert!(!values_match(&stored, &Value::Null));
}

#[test]
fn values_match_unwraps_identifiers_but_keeps_kinds_apart() {
    let user_id = Value::from(UserId::new("5").expect("id is valid"));
    let order_no = Value::from(OrderNo::new(5_i64).expect("order number is valid"));

    assert!(values_match(&user_id, &text("5")));
    assert!(!values_match(&user_id, &order_no));
    assert!(!values_match(&order_no, &text("5")));
}

#[test]
fn values_match_compares_entities_by_identity() {
    let ann = Value::Object(Instance::from_rc(User::new("u1", "Ann")));
    let placeholder = Value::Object(Instance::from_rc(User::new("u1", "")));

    assert!(values_match(&ann, &placeholder));
    assert!(values_match(&ann, &text("u1")));
    assert!(!values_match(&ann, &text("u2")));

    let membership = Value::Object(Instance::from_rc(Membership::new("u1", "admins", "owner")));
    assert!(values_match(
        &membership,
        &Value::List(vec![text("u1"), text("admins")])
    ));
}

proptest! {
    #[test]
    fn text_identifier_equality_follows_values(a in "[a-z0-9]{1,8}", b in "[a-z0-9]{1,8}") {
        let left = UserId::new(a.as_str()).expect("non-empty text is valid");
        let right = UserId::new(b.as_str()).expect("non-empty text is valid");

        prop_assert_eq!(left == right, a == b);
        prop_assert_eq!(left == right, right == left);
        prop_assert!(left == left.clone());
    }

    #[test]
    fn int_identifier_equality_follows_values(a in any::<i64>(), b in any::<i64>()) {
        let left = OrderNo::new(a).expect("integers are valid");
        let right = OrderNo::new(b).expect("integers are valid");

        prop_assert_eq!(left == right, a == b);
    }

    #[test]
    fn empty_identifier_equals_nothing(a in "[a-z0-9]{1,8}") {
        let empty = UserId::empty();
        let filled = UserId::new(a.as_str()).expect("non-empty text is valid");

        prop_assert!(empty != empty.clone());
        prop_assert!(empty != filled);
        prop_assert!(filled != empty);
    }
}
