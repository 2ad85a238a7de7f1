//! Sample entities shared by tests and benchmarks.

use chrono::{DateTime, Utc};
use tessera_core::{Condition, CoreResult, Entity, FieldKey, Input, Output, Query};
use url::Url;

/// Field keys of [`Person`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKey {
    /// Random identifier.
    Id,
    /// Given name.
    FirstName,
    /// Family name, nullable.
    LastName,
    /// Height in centimetres.
    Height,
    /// Date of birth.
    DateOfBirth,
    /// Home page.
    HomePage,
    /// Opaque payload, nullable.
    AdditionalData,
}

impl FieldKey for PersonKey {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Height => "height",
            Self::DateOfBirth => "dateOfBirth",
            Self::HomePage => "homePageURL",
            Self::AdditionalData => "additionalData",
        }
    }
}

/// A keyless entity using every scalar kind.
///
/// `Person` declares no primary key, so every save inserts new rows. It
/// declares one index over `(lastName, firstName)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Random identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: Option<String>,
    /// Height in centimetres.
    pub height: f64,
    /// Date of birth.
    pub date_of_birth: DateTime<Utc>,
    /// Home page.
    pub home_page: Url,
    /// Opaque payload.
    pub additional_data: Option<Vec<u8>>,
}

impl Person {
    /// Creates a person with a fresh id and default attributes.
    pub fn new(first_name: &str, last_name: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            height: 172.0,
            date_of_birth: DateTime::<Utc>::default(),
            home_page: Url::parse("https://github.com/").expect("static URL is valid"),
            additional_data: Some(b"Some additional data".to_vec()),
        }
    }

    /// Sets the height.
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }
}

impl Default for Person {
    fn default() -> Self {
        Self::new("John", None)
    }
}

impl Entity for Person {
    const NAME: &'static str = "Person";
    type Key = PersonKey;

    fn fill<'a>(&'a self, input: &mut Input<'a, Self>) {
        input.set_index(&[PersonKey::LastName, PersonKey::FirstName]);

        input.set(PersonKey::Id, &self.id);
        input.set(PersonKey::FirstName, &self.first_name);
        input.set(PersonKey::LastName, &self.last_name);
        input.set(PersonKey::Height, &self.height);
        input.set(PersonKey::DateOfBirth, &self.date_of_birth);
        input.set(PersonKey::HomePage, &self.home_page);
        input.set(PersonKey::AdditionalData, &self.additional_data);
    }

    fn from_row(output: &Output<'_, Self>) -> CoreResult<Self> {
        Ok(Self {
            id: output.get(PersonKey::Id)?,
            first_name: output.get(PersonKey::FirstName)?,
            last_name: output.get(PersonKey::LastName)?,
            height: output.get(PersonKey::Height)?,
            date_of_birth: output.get(PersonKey::DateOfBirth)?,
            home_page: output.get(PersonKey::HomePage)?,
            additional_data: output.get(PersonKey::AdditionalData)?,
        })
    }
}

/// Field keys of [`Owner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    /// Primary key.
    Id,
    /// Display name.
    Name,
}

impl FieldKey for OwnerKey {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

/// A keyed entity that encloses its dogs.
///
/// Saving an owner replaces the stored dogs of that owner with `dogs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Dogs of this owner.
    pub dogs: Vec<Dog>,
}

impl Owner {
    /// Creates an owner with a fresh id and no dogs.
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            dogs: Vec::new(),
        }
    }

    /// Adds a dog owned by this owner.
    pub fn adopt(&mut self, name: &str) -> &mut Dog {
        self.dogs.push(Dog::new(&self.id, name));
        let last = self.dogs.len() - 1;
        &mut self.dogs[last]
    }

    fn dogs_scope(&self) -> Condition<DogKey> {
        Condition::equal(DogKey::OwnerId, self.id.as_str())
    }
}

impl Entity for Owner {
    const NAME: &'static str = "Owner";
    type Key = OwnerKey;

    fn fill<'a>(&'a self, input: &mut Input<'a, Self>) {
        input.set_primary_key(&[OwnerKey::Id]);

        input.set(OwnerKey::Id, &self.id);
        input.set(OwnerKey::Name, &self.name);
        input.enclose(&self.dogs, Some(self.dogs_scope()));
    }

    fn from_row(output: &Output<'_, Self>) -> CoreResult<Self> {
        let mut owner = Self {
            id: output.get(OwnerKey::Id)?,
            name: output.get(OwnerKey::Name)?,
            dogs: Vec::new(),
        };
        owner.dogs = output.fetch(&Query::from(owner.dogs_scope()))?;
        Ok(owner)
    }
}

/// Field keys of [`Dog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DogKey {
    /// Primary key, derived from owner and name.
    Id,
    /// Owner reference.
    OwnerId,
    /// Dog name.
    Name,
    /// Collar text, nullable.
    CollarCaption,
}

impl FieldKey for DogKey {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::OwnerId => "ownerID",
            Self::Name => "name",
            Self::CollarCaption => "collarCaption",
        }
    }
}

/// A keyed entity related to [`Owner`].
///
/// Deleting the owner deletes its dogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dog {
    /// Owner reference.
    pub owner_id: String,
    /// Dog name.
    pub name: String,
    /// Collar text.
    pub collar_caption: Option<String>,
}

impl Dog {
    /// Creates a dog without a collar caption.
    pub fn new(owner_id: &str, name: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            collar_caption: None,
        }
    }

    /// Derived primary key.
    pub fn id(&self) -> String {
        format!("{}_{}", self.owner_id, self.name)
    }
}

impl Entity for Dog {
    const NAME: &'static str = "Dog";
    type Key = DogKey;

    fn fill<'a>(&'a self, input: &mut Input<'a, Self>) {
        input.set_primary_key(&[DogKey::Id]);

        input.set(DogKey::Id, &self.id());
        input.set(DogKey::Name, &self.name);
        input.set(DogKey::CollarCaption, &self.collar_caption);
        input.set_related::<Owner>(DogKey::OwnerId, &self.owner_id, OwnerKey::Id);
    }

    fn from_row(output: &Output<'_, Self>) -> CoreResult<Self> {
        Ok(Self {
            owner_id: output.get(DogKey::OwnerId)?,
            name: output.get(DogKey::Name)?,
            collar_caption: output.get(DogKey::CollarCaption)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dog_id_is_derived() {
        let dog = Dog::new("o1", "Ebony");
        assert_eq!(dog.id(), "o1_Ebony");
    }

    #[test]
    fn adopted_dogs_reference_owner() {
        let mut owner = Owner::new("Ann");
        owner.adopt("Ebony").collar_caption = Some("E".into());
        assert_eq!(owner.dogs.len(), 1);
        assert_eq!(owner.dogs[0].owner_id, owner.id);
        assert_eq!(owner.dogs[0].collar_caption.as_deref(), Some("E"));
    }

    #[test]
    fn person_defaults() {
        let person = Person::default();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, None);
        assert_eq!(person.height, 172.0);
        assert_eq!(person.home_page.as_str(), "https://github.com/");
    }
}
