use crate::{
    error::DomainError,
    factory::{Arguments, EntityAwareFactory, ObjectFactory},
    identity::Identity,
    model::{DeclaredType, IdentityDescriptor, IdentityField, Param},
    registry::TypeRegistry,
    traits::{Construct, DomainObject, Entity, FieldValue, Path},
    types::Instance,
    value::Value,
};
use std::rc::Rc;

pub const DRAWABLE: &str = "fixtures::Drawable";
pub const SHAPE: &str = "fixtures::Shape";
pub const UNREGISTERED: &str = "fixtures::Unregistered";

crate::domain_id!(pub UserId, "fixtures::UserId", Text);
crate::domain_id!(pub OrderNo, "fixtures::OrderNo", Int);

///
/// Point
///

#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Path for Point {
    const PATH: &'static str = "fixtures::Point";
}

impl DomainObject for Point {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "x" => Some(self.x.to_value()),
            "y" => Some(self.y.to_value()),
            _ => None,
        }
    }
}

impl Construct for Point {
    fn parameters() -> Vec<Param> {
        vec![
            Param::required("x", DeclaredType::Int),
            Param::optional("y", DeclaredType::Int, 0_i64),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            x: args.take()?,
            y: args.take()?,
        })
    }
}

///
/// Settings
/// Every argument is optional.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    pub retries: i64,
    pub label: Option<String>,
}

impl Path for Settings {
    const PATH: &'static str = "fixtures::Settings";
}

impl DomainObject for Settings {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "enabled" => Some(self.enabled.to_value()),
            "retries" => Some(self.retries.to_value()),
            "label" => Some(self.label.to_value()),
            _ => None,
        }
    }
}

impl Construct for Settings {
    fn parameters() -> Vec<Param> {
        vec![
            Param::optional("enabled", DeclaredType::Bool, true),
            Param::optional("retries", DeclaredType::Int, 3_i64),
            Param::nullable("label", DeclaredType::Text),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            enabled: args.take()?,
            retries: args.take()?,
            label: args.take()?,
        })
    }
}

///
/// Address
///

#[derive(Clone, Debug, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Path for Address {
    const PATH: &'static str = "fixtures::Address";
}

impl DomainObject for Address {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "street" => Some(self.street.to_value()),
            "city" => Some(self.city.to_value()),
            _ => None,
        }
    }
}

impl Construct for Address {
    fn parameters() -> Vec<Param> {
        vec![
            Param::required("street", DeclaredType::Text),
            Param::optional("city", DeclaredType::Text, ""),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            street: args.take()?,
            city: args.take()?,
        })
    }
}

///
/// Person
/// Holds a nested value object.
///

#[derive(Clone, Debug)]
pub struct Person {
    pub name: String,
    pub address: Rc<Address>,
}

impl Path for Person {
    const PATH: &'static str = "fixtures::Person";
}

impl DomainObject for Person {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.to_value()),
            "address" => Some(self.address.to_value()),
            _ => None,
        }
    }
}

impl Construct for Person {
    fn parameters() -> Vec<Param> {
        vec![
            Param::required("name", DeclaredType::Text),
            Param::required("address", DeclaredType::Class(Address::PATH)),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            name: args.take()?,
            address: args.take()?,
        })
    }
}

///
/// User
/// Entity keyed by a text identifier.
///

const USER_IDENTITY: &[IdentityField] = &[IdentityField::identifier::<UserId>("id")];

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Rc<Self> {
        Rc::new(Self {
            id: UserId::new(id).expect("fixture id should be valid"),
            name: name.to_string(),
        })
    }

    pub fn unsaved(name: &str) -> Rc<Self> {
        Rc::new(Self {
            id: UserId::empty(),
            name: name.to_string(),
        })
    }
}

impl Path for User {
    const PATH: &'static str = "fixtures::User";
}

impl DomainObject for User {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn identity_descriptor(&self) -> Option<IdentityDescriptor> {
        Some(Self::IDENTITY)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            _ => None,
        }
    }
}

impl Construct for User {
    fn parameters() -> Vec<Param> {
        vec![
            Param::nullable("id", DeclaredType::Class(UserId::PATH)),
            Param::optional("name", DeclaredType::Text, ""),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            id: args.take()?,
            name: args.take()?,
        })
    }
}

impl Entity for User {
    const IDENTITY: IdentityDescriptor = IdentityDescriptor::new(USER_IDENTITY);

    fn reference(identity: &Identity) -> Result<Self, DomainError> {
        Ok(Self {
            id: identity.decode(Self::PATH, 0)?,
            name: String::new(),
        })
    }
}

///
/// Membership
/// Entity with a composite identity (user, group).
///

const MEMBERSHIP_IDENTITY: &[IdentityField] = &[
    IdentityField::identifier::<UserId>("user"),
    IdentityField::scalar("group"),
];

#[derive(Clone, Debug)]
pub struct Membership {
    pub user: UserId,
    pub group: Option<String>,
    pub role: String,
}

impl Membership {
    pub fn new(user: &str, group: &str, role: &str) -> Rc<Self> {
        Rc::new(Self {
            user: UserId::new(user).expect("fixture id should be valid"),
            group: Some(group.to_string()),
            role: role.to_string(),
        })
    }
}

impl Path for Membership {
    const PATH: &'static str = "fixtures::Membership";
}

impl DomainObject for Membership {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn identity_descriptor(&self) -> Option<IdentityDescriptor> {
        Some(Self::IDENTITY)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "user" => Some(self.user.to_value()),
            "group" => Some(self.group.to_value()),
            "role" => Some(self.role.to_value()),
            _ => None,
        }
    }
}

impl Construct for Membership {
    fn parameters() -> Vec<Param> {
        vec![
            Param::nullable("user", DeclaredType::Class(UserId::PATH)),
            Param::required("group", DeclaredType::Text),
            Param::optional("role", DeclaredType::Text, "member"),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            user: args.take()?,
            group: args.take()?,
            role: args.take()?,
        })
    }
}

impl Entity for Membership {
    const IDENTITY: IdentityDescriptor = IdentityDescriptor::new(MEMBERSHIP_IDENTITY);

    fn reference(identity: &Identity) -> Result<Self, DomainError> {
        Ok(Self {
            user: identity.decode(Self::PATH, 0)?,
            group: identity.decode(Self::PATH, 1)?,
            role: String::new(),
        })
    }
}

///
/// Order
/// Entity keyed by an integer identifier, referencing a user.
///

const ORDER_IDENTITY: &[IdentityField] = &[IdentityField::identifier::<OrderNo>("number")];

#[derive(Clone, Debug)]
pub struct Order {
    pub number: OrderNo,
    pub customer: Option<Rc<User>>,
    pub total: f64,
}

impl Path for Order {
    const PATH: &'static str = "fixtures::Order";
}

impl DomainObject for Order {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn identity_descriptor(&self) -> Option<IdentityDescriptor> {
        Some(Self::IDENTITY)
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "number" => Some(self.number.to_value()),
            "customer" => Some(self.customer.to_value()),
            "total" => Some(self.total.to_value()),
            _ => None,
        }
    }
}

impl Construct for Order {
    fn parameters() -> Vec<Param> {
        vec![
            Param::nullable("number", DeclaredType::Class(OrderNo::PATH)),
            Param::nullable("customer", DeclaredType::Class(User::PATH)),
            Param::optional("total", DeclaredType::Float, 0.0),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            number: args.take()?,
            customer: args.take()?,
            total: args.take()?,
        })
    }
}

impl Entity for Order {
    const IDENTITY: IdentityDescriptor = IdentityDescriptor::new(ORDER_IDENTITY);

    fn reference(identity: &Identity) -> Result<Self, DomainError> {
        Ok(Self {
            number: identity.decode(Self::PATH, 0)?,
            customer: None,
            total: 0.0,
        })
    }
}

///
/// Circle
/// Concrete shape with extra named construction methods.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Path for Circle {
    const PATH: &'static str = "fixtures::Circle";
}

impl DomainObject for Circle {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "radius").then(|| self.radius.to_value())
    }
}

impl Construct for Circle {
    const IMPLEMENTS: &'static [&'static str] = &[SHAPE];

    fn parameters() -> Vec<Param> {
        vec![Param::required("radius", DeclaredType::Float)]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            radius: args.take()?,
        })
    }
}

fn scaled_params() -> Vec<Param> {
    vec![
        Param::required("radius", DeclaredType::Float),
        Param::optional("factor", DeclaredType::Float, 1.0),
    ]
}

///
/// Drawing
/// Holds an abstract-typed parameter.
///

#[derive(Clone, Debug)]
pub struct Drawing {
    pub shape: Instance,
}

impl Path for Drawing {
    const PATH: &'static str = "fixtures::Drawing";
}

impl DomainObject for Drawing {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "shape").then(|| self.shape.to_value())
    }
}

impl Construct for Drawing {
    fn parameters() -> Vec<Param> {
        vec![Param::required("shape", DeclaredType::Class(SHAPE))]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            shape: args.take()?,
        })
    }
}

///
/// Secret
/// Registered, but only buildable through a named method.
///

#[derive(Clone, Debug)]
pub struct Secret {
    pub code: String,
}

impl Path for Secret {
    const PATH: &'static str = "fixtures::Secret";
}

impl DomainObject for Secret {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "code").then(|| self.code.to_value())
    }
}

impl Construct for Secret {
    const PUBLIC_CONSTRUCTOR: bool = false;

    fn parameters() -> Vec<Param> {
        vec![Param::required("code", DeclaredType::Text)]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self { code: args.take()? })
    }
}

///
/// Marker
/// No constructor arguments.
///

#[derive(Clone, Debug)]
pub struct Marker;

impl Path for Marker {
    const PATH: &'static str = "fixtures::Marker";
}

impl DomainObject for Marker {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, _: &str) -> Option<Value> {
        None
    }
}

impl Construct for Marker {
    fn construct(_: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self)
    }
}

///
/// Wrapper
/// Declares a class-typed parameter whose class is not registered.
///

#[derive(Clone, Debug)]
pub struct Wrapper {
    pub inner: Value,
}

impl Path for Wrapper {
    const PATH: &'static str = "fixtures::Wrapper";
}

impl DomainObject for Wrapper {
    fn type_path(&self) -> &'static str {
        Self::PATH
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "inner").then(|| self.inner.clone())
    }
}

impl Construct for Wrapper {
    fn parameters() -> Vec<Param> {
        vec![Param::required("inner", DeclaredType::Class(UNREGISTERED))]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DomainError> {
        Ok(Self {
            inner: args.take_value()?,
        })
    }
}

///
/// REGISTRY
///

pub fn test_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();

    registry
        .register_abstract(DRAWABLE, &[])
        .expect("drawable should register");
    registry
        .register_abstract(SHAPE, &[DRAWABLE])
        .expect("shape should register");

    registry.register::<Point>().expect("point should register");
    registry
        .register::<Settings>()
        .expect("settings should register");
    registry
        .register::<Address>()
        .expect("address should register");
    registry.register::<Person>().expect("person should register");
    registry.register::<Circle>().expect("circle should register");
    registry
        .register::<Drawing>()
        .expect("drawing should register");
    registry.register::<Secret>().expect("secret should register");
    registry.register::<Marker>().expect("marker should register");
    registry
        .register::<Wrapper>()
        .expect("wrapper should register");

    registry
        .register_identifier::<UserId>()
        .expect("user id should register");
    registry
        .register_identifier::<OrderNo>()
        .expect("order number should register");

    registry
        .register_entity::<User>()
        .expect("user should register");
    registry
        .register_entity::<Membership>()
        .expect("membership should register");
    registry
        .register_entity::<Order>()
        .expect("order should register");

    registry
        .register_method::<Circle, _>("unit", Vec::new, |_| Ok(Circle { radius: 1.0 }))
        .expect("unit should register");
    registry
        .register_method::<Circle, _>("scaled", scaled_params, |args| {
            let radius: f64 = args.take()?;
            let factor: f64 = args.take()?;
            Ok(Circle {
                radius: radius * factor,
            })
        })
        .expect("scaled should register");
    registry
        .register_method::<Secret, _>(
            "issue",
            || vec![Param::required("code", DeclaredType::Text)],
            |args| Ok(Secret { code: args.take()? }),
        )
        .expect("issue should register");

    registry
}

pub fn test_factory() -> Rc<ObjectFactory> {
    Rc::new(ObjectFactory::new(Rc::new(test_registry())))
}

pub fn test_entity_factory() -> Rc<EntityAwareFactory> {
    Rc::new(EntityAwareFactory::new(test_factory()))
}
