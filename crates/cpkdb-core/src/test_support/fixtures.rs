use crate::{
    db::registry::EntityRegistry,
    error::InternalError,
    key::CachedKey,
    model::{
        entity::EntityModel,
        field::{EntityFieldKind, EntityFieldModel},
    },
    traits::{EntityKind, FieldValues, Path},
    value::Value,
};

// ─── Models ──────────────────────────────────────────────────────────────────

const COMPANY: &str = "test::Company";
const COMPANY_BRANCH: &str = "test::CompanyBranch";
const MUSICIAN: &str = "test::Musician";
const ALBUM: &str = "test::Album";
const REVIEW: &str = "test::Review";

static COMPANY_FIELDS: [EntityFieldModel; 3] = [
    EntityFieldModel::new(COMPANY, "id", EntityFieldKind::Uint).primary_key(),
    EntityFieldModel::new(COMPANY, "name", EntityFieldKind::Text),
    EntityFieldModel::new(COMPANY, "company_code", EntityFieldKind::Text),
];

pub(crate) static COMPANY_MODEL: EntityModel = EntityModel {
    path: COMPANY,
    entity_name: "company",
    fields: &COMPANY_FIELDS,
};

static COMPANY_BRANCH_FIELDS: [EntityFieldModel; 3] = [
    EntityFieldModel::new(COMPANY_BRANCH, "company", EntityFieldKind::Uint)
        .primary_key()
        .column("company_id")
        .references(COMPANY),
    EntityFieldModel::new(COMPANY_BRANCH, "country_code", EntityFieldKind::Text).primary_key(),
    EntityFieldModel::new(COMPANY_BRANCH, "name", EntityFieldKind::Text),
];

pub(crate) static COMPANY_BRANCH_MODEL: EntityModel = EntityModel {
    path: COMPANY_BRANCH,
    entity_name: "company_branch",
    fields: &COMPANY_BRANCH_FIELDS,
};

static MUSICIAN_FIELDS: [EntityFieldModel; 4] = [
    EntityFieldModel::new(MUSICIAN, "id", EntityFieldKind::Uint).primary_key(),
    EntityFieldModel::new(MUSICIAN, "first_name", EntityFieldKind::Text),
    EntityFieldModel::new(MUSICIAN, "last_name", EntityFieldKind::Text),
    EntityFieldModel::new(MUSICIAN, "albums", EntityFieldKind::Uint).many(ALBUM),
];

pub(crate) static MUSICIAN_MODEL: EntityModel = EntityModel {
    path: MUSICIAN,
    entity_name: "musician",
    fields: &MUSICIAN_FIELDS,
};

static ALBUM_FIELDS: [EntityFieldModel; 6] = [
    EntityFieldModel::new(ALBUM, "artist", EntityFieldKind::Uint)
        .primary_key()
        .column("artist_id")
        .references(MUSICIAN),
    EntityFieldModel::new(ALBUM, "album_no", EntityFieldKind::Uint).primary_key(),
    EntityFieldModel::new(ALBUM, "name", EntityFieldKind::Text),
    EntityFieldModel::new(ALBUM, "num_stars", EntityFieldKind::Uint),
    EntityFieldModel::new(ALBUM, "company", EntityFieldKind::Uint)
        .column("company_id")
        .references(COMPANY),
    EntityFieldModel::new(ALBUM, "reviews", EntityFieldKind::Uint).many(REVIEW),
];

pub(crate) static ALBUM_MODEL: EntityModel = EntityModel {
    path: ALBUM,
    entity_name: "album",
    fields: &ALBUM_FIELDS,
};

// Review points at a composite-keyed entity; only used for path rewriting.
static REVIEW_FIELDS: [EntityFieldModel; 3] = [
    EntityFieldModel::new(REVIEW, "id", EntityFieldKind::Uint).primary_key(),
    EntityFieldModel::new(REVIEW, "album", EntityFieldKind::Text)
        .column("album_key")
        .references(ALBUM),
    EntityFieldModel::new(REVIEW, "stars", EntityFieldKind::Uint),
];

pub(crate) static REVIEW_MODEL: EntityModel = EntityModel {
    path: REVIEW,
    entity_name: "review",
    fields: &REVIEW_FIELDS,
};

/// Registry with every fixture entity registered.
pub(crate) fn registry() -> EntityRegistry {
    let registry = EntityRegistry::new();
    for model in [
        &COMPANY_MODEL,
        &COMPANY_BRANCH_MODEL,
        &MUSICIAN_MODEL,
        &ALBUM_MODEL,
        &REVIEW_MODEL,
    ] {
        registry.register_model(model).expect("register fixture");
    }

    registry
}

// ─── Value helpers ───────────────────────────────────────────────────────────

fn opt_uint(field: &str, value: Value) -> Result<Option<u64>, InternalError> {
    match value {
        Value::Uint(v) => Ok(Some(v)),
        Value::Null => Ok(None),
        other => Err(InternalError::query_invariant(format!(
            "{field}: expected uint, found {other}"
        ))),
    }
}

fn uint(field: &str, value: Value) -> Result<u64, InternalError> {
    opt_uint(field, value)?
        .ok_or_else(|| InternalError::query_invariant(format!("{field}: not nullable")))
}

fn text(field: &str, value: Value) -> Result<String, InternalError> {
    match value {
        Value::Text(v) => Ok(v),
        other => Err(InternalError::query_invariant(format!(
            "{field}: expected text, found {other}"
        ))),
    }
}

fn unknown(field: &str) -> InternalError {
    InternalError::query_invariant(format!("unknown field '{field}'"))
}

// ─── Company ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Company {
    pub id: Option<u64>,
    pub name: String,
    pub company_code: String,
    pub key: CachedKey,
}

impl Path for Company {
    const PATH: &'static str = COMPANY;
}

impl EntityKind for Company {
    const MODEL: &'static EntityModel = &COMPANY_MODEL;
}

impl FieldValues for Company {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "company_code" => Some(self.company_code.clone().into()),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), InternalError> {
        match field {
            "id" => {
                self.id = opt_uint(field, value)?;
                self.key.invalidate();
            }
            "name" => self.name = text(field, value)?,
            "company_code" => self.company_code = text(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn key_cache(&self) -> &CachedKey {
        &self.key
    }

    fn key_cache_mut(&mut self) -> &mut CachedKey {
        &mut self.key
    }
}

// ─── CompanyBranch ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct CompanyBranch {
    pub company: Option<u64>,
    pub country_code: Option<String>,
    pub name: String,
    pub key: CachedKey,
}

impl CompanyBranch {
    pub(crate) fn new(company: u64, country_code: &str, name: &str) -> Self {
        Self {
            company: Some(company),
            country_code: Some(country_code.to_string()),
            name: name.to_string(),
            key: CachedKey::new(),
        }
    }
}

impl Path for CompanyBranch {
    const PATH: &'static str = COMPANY_BRANCH;
}

impl EntityKind for CompanyBranch {
    const MODEL: &'static EntityModel = &COMPANY_BRANCH_MODEL;
}

impl FieldValues for CompanyBranch {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "company" => Some(self.company.into()),
            "country_code" => Some(self.country_code.clone().into()),
            "name" => Some(self.name.clone().into()),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), InternalError> {
        match field {
            "company" => {
                self.company = opt_uint(field, value)?;
                self.key.invalidate();
            }
            "country_code" => {
                self.country_code = match value {
                    Value::Null => None,
                    other => Some(text(field, other)?),
                };
                self.key.invalidate();
            }
            "name" => self.name = text(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn key_cache(&self) -> &CachedKey {
        &self.key
    }

    fn key_cache_mut(&mut self) -> &mut CachedKey {
        &mut self.key
    }
}

// ─── Musician ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Musician {
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub key: CachedKey,
}

impl Musician {
    pub(crate) fn new(id: u64, first_name: &str) -> Self {
        Self {
            id: Some(id),
            first_name: first_name.to_string(),
            ..Self::default()
        }
    }
}

impl Path for Musician {
    const PATH: &'static str = MUSICIAN;
}

impl EntityKind for Musician {
    const MODEL: &'static EntityModel = &MUSICIAN_MODEL;
}

impl FieldValues for Musician {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into()),
            "first_name" => Some(self.first_name.clone().into()),
            "last_name" => Some(self.last_name.clone().into()),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), InternalError> {
        match field {
            "id" => {
                self.id = opt_uint(field, value)?;
                self.key.invalidate();
            }
            "first_name" => self.first_name = text(field, value)?,
            "last_name" => self.last_name = text(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn key_cache(&self) -> &CachedKey {
        &self.key
    }

    fn key_cache_mut(&mut self) -> &mut CachedKey {
        &mut self.key
    }
}

// ─── Album ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Album {
    pub artist: Option<u64>,
    pub album_no: Option<u64>,
    pub name: String,
    pub num_stars: u64,
    pub company: Option<u64>,
    pub key: CachedKey,
}

impl Album {
    pub(crate) fn new(artist: u64, album_no: u64, name: &str) -> Self {
        Self {
            artist: Some(artist),
            album_no: Some(album_no),
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Path for Album {
    const PATH: &'static str = ALBUM;
}

impl EntityKind for Album {
    const MODEL: &'static EntityModel = &ALBUM_MODEL;
}

impl FieldValues for Album {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "artist" => Some(self.artist.into()),
            "album_no" => Some(self.album_no.into()),
            "name" => Some(self.name.clone().into()),
            "num_stars" => Some(self.num_stars.into()),
            "company" => Some(self.company.into()),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), InternalError> {
        match field {
            "artist" => {
                self.artist = opt_uint(field, value)?;
                self.key.invalidate();
            }
            "album_no" => {
                self.album_no = opt_uint(field, value)?;
                self.key.invalidate();
            }
            "name" => self.name = text(field, value)?,
            "num_stars" => self.num_stars = uint(field, value)?,
            "company" => self.company = opt_uint(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn key_cache(&self) -> &CachedKey {
        &self.key
    }

    fn key_cache_mut(&mut self) -> &mut CachedKey {
        &mut self.key
    }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// Marker for predicate tests; rows are never materialized.
pub(crate) struct Review;

impl Path for Review {
    const PATH: &'static str = REVIEW;
}

impl EntityKind for Review {
    const MODEL: &'static EntityModel = &REVIEW_MODEL;
}
