use serde::{Deserialize, Deserializer, Serialize};

use super::{
    model::{Experience, Profile, User},
    validation::{trim_skills, Violations, BIO_MAX, LOCATION_MAX, NAME_MAX},
};
use crate::errors::FieldError;

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Profile section of a registration body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
}

impl NewProfileRequest {
    pub(crate) fn check(self, v: &mut Violations) -> Profile {
        let first_name = v.name(
            "profile.firstName",
            "First name",
            self.first_name.as_deref().unwrap_or_default(),
        );
        let last_name = v.name(
            "profile.lastName",
            "Last name",
            self.last_name.as_deref().unwrap_or_default(),
        );
        let phone = self.phone.and_then(|p| v.phone("profile.phone", &p));
        let location = self
            .location
            .and_then(|l| v.bounded("profile.location", "Location", &l, LOCATION_MAX));
        let bio = self
            .bio
            .and_then(|b| v.bounded("profile.bio", "Bio", &b, BIO_MAX));
        let skills = trim_skills(self.skills.unwrap_or_default());
        let experience = match self.experience {
            None => Experience::default(),
            Some(raw) => raw.parse::<Experience>().unwrap_or_else(|_| {
                v.push("profile.experience", "Invalid experience level");
                Experience::default()
            }),
        };
        Profile {
            first_name,
            last_name,
            phone,
            location,
            bio,
            skills,
            experience,
        }
    }
}

/// Body of `PUT /user/profile`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub profile: ProfilePatch,
}

/// Sparse profile update. Absent keys are left alone, `null` is meaningful.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub skills: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub experience: Option<Option<String>>,
}

/// Validated patch; `Some` means "overwrite this field".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Experience>,
}

impl ProfilePatch {
    /// Checks only the fields that are present.
    pub fn validate(self) -> Result<ProfileChanges, Vec<FieldError>> {
        let mut v = Violations::default();
        let out = ProfileChanges {
            first_name: self
                .first_name
                .map(|n| required_name(&mut v, "profile.firstName", "First name", n)),
            last_name: self
                .last_name
                .map(|n| required_name(&mut v, "profile.lastName", "Last name", n)),
            phone: self
                .phone
                .map(|p| p.and_then(|p| v.phone("profile.phone", &p))),
            location: self.location.map(|l| {
                l.and_then(|l| v.bounded("profile.location", "Location", &l, LOCATION_MAX))
            }),
            bio: self
                .bio
                .map(|b| b.and_then(|b| v.bounded("profile.bio", "Bio", &b, BIO_MAX))),
            skills: self.skills.map(|s| trim_skills(s.unwrap_or_default())),
            experience: match self.experience {
                None => None,
                Some(Some(raw)) => match raw.parse::<Experience>() {
                    Ok(e) => Some(e),
                    Err(_) => {
                        v.push("profile.experience", "Invalid experience level");
                        None
                    }
                },
                Some(None) => {
                    v.push("profile.experience", "Invalid experience level");
                    None
                }
            },
        };

        v.into_result(out)
    }
}

fn required_name(v: &mut Violations, field: &str, label: &str, raw: Option<String>) -> String {
    let value = raw.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() || value.chars().count() > NAME_MAX {
        v.push(
            field,
            format!("{label} must be between 1 and {NAME_MAX} characters"),
        );
    }
    value.to_string()
}

/// `data` payload wrapping a single user.
#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> ProfilePatch {
        serde_json::from_value(value).expect("patch should deserialize")
    }

    #[test]
    fn absent_and_null_are_distinguished() {
        let p = patch(json!({ "bio": null }));
        assert_eq!(p.bio, Some(None));
        assert_eq!(p.location, None);
    }

    #[test]
    fn only_present_fields_become_changes() {
        let changes = patch(json!({ "bio": "  hi  " })).validate().unwrap();
        assert_eq!(
            changes,
            ProfileChanges {
                bio: Some(Some("hi".into())),
                ..Default::default()
            }
        );
    }

    #[test]
    fn null_clears_optional_fields() {
        let changes = patch(json!({ "phone": null, "skills": null, "location": "" }))
            .validate()
            .unwrap();
        assert_eq!(changes.phone, Some(None));
        assert_eq!(changes.skills, Some(vec![]));
        assert_eq!(changes.location, Some(None));
    }

    #[test]
    fn null_on_required_fields_is_rejected() {
        let errors = patch(json!({ "firstName": null, "experience": null }))
            .validate()
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["profile.firstName", "profile.experience"]);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = patch(json!({
            "firstName": "",
            "phone": "not a phone",
            "bio": "x".repeat(501),
            "experience": "Wizard",
        }))
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].message, "First name must be between 1 and 50 characters");
        assert_eq!(errors[3].message, "Invalid experience level");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<UpdateProfileRequest>(json!({
            "profile": { "bio": "hi" },
            "email": "evil@x.com"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));

        let err = serde_json::from_value::<UpdateProfileRequest>(json!({
            "profile": { "password": "hunter22" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn new_profile_defaults_experience() {
        let mut v = Violations::default();
        let profile = NewProfileRequest {
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            ..Default::default()
        }
        .check(&mut v);
        assert!(v.into_result(()).is_ok());
        assert_eq!(profile.experience, Experience::EntryLevel);
        assert!(profile.skills.is_empty());
    }
}
