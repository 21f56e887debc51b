use std::str::FromStr;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::ProfileChanges;

/// Self-reported seniority band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Experience {
    #[default]
    #[serde(rename = "Entry Level")]
    EntryLevel,
    #[serde(rename = "1-3 years")]
    OneToThreeYears,
    #[serde(rename = "3-5 years")]
    ThreeToFiveYears,
    #[serde(rename = "5-10 years")]
    FiveToTenYears,
    #[serde(rename = "10+ years")]
    TenPlusYears,
}

impl Experience {
    pub const ALL: [Experience; 5] = [
        Experience::EntryLevel,
        Experience::OneToThreeYears,
        Experience::ThreeToFiveYears,
        Experience::FiveToTenYears,
        Experience::TenPlusYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Experience::EntryLevel => "Entry Level",
            Experience::OneToThreeYears => "1-3 years",
            Experience::ThreeToFiveYears => "3-5 years",
            Experience::FiveToTenYears => "5-10 years",
            Experience::TenPlusYears => "10+ years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownExperience;

impl FromStr for Experience {
    type Err = UnknownExperience;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Experience::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or(UnknownExperience)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub experience: Experience,
}

impl Profile {
    /// Overwrites every field present in `changes`, leaving the rest alone.
    pub fn apply(&mut self, changes: &ProfileChanges) {
        if let Some(v) = &changes.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &changes.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &changes.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &changes.location {
            self.location = v.clone();
        }
        if let Some(v) = &changes.bio {
            self.bio = v.clone();
        }
        if let Some(v) = &changes.skills {
            self.skills = v.clone();
        }
        if let Some(v) = changes.experience {
            self.experience = v;
        }
    }
}

/// User record as seen by the rest of the app.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub profile: Profile,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Data needed to insert a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// Flat `users` row.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub experience: String,
    pub is_active: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownExperience;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            profile: Profile {
                first_name: r.first_name,
                last_name: r.last_name,
                phone: r.phone,
                location: r.location,
                bio: r.bio,
                skills: r.skills,
                experience: r.experience.parse()?,
            },
            is_active: r.is_active,
            last_login: r.last_login,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
