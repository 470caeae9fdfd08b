use serde::{Deserialize, Serialize};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 100;

// Newsletter signup request body
#[derive(Deserialize, Debug, Clone)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub email: String,
}

// Membership intake request body
#[derive(Deserialize, Debug, Clone)]
pub struct MembershipRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tier: String,
    pub name: Option<String>,
}

/// VIP plans offered on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipTier {
    LocalPass,
    CrewTable,
    BlackoutHost,
}

impl MembershipTier {
    pub const ALL: [MembershipTier; 3] = [Self::LocalPass, Self::CrewTable, Self::BlackoutHost];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::LocalPass => "local-pass",
            Self::CrewTable => "crew-table",
            Self::BlackoutHost => "blackout-host",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.slug() == slug)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// Placeholder response for endpoints that only validate for now
#[derive(Serialize, Debug, Clone)]
pub struct PendingResponse {
    pub message: &'static str,
    pub status: &'static str,
}

impl NewsletterRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        validate_email(&self.email, &mut errors);
        finish(errors)
    }
}

impl MembershipRequest {
    pub fn validate(&self) -> Result<MembershipTier, Vec<FieldError>> {
        let mut errors = Vec::new();
        validate_email(&self.email, &mut errors);

        let tier = MembershipTier::from_slug(self.tier.trim());
        if tier.is_none() {
            let allowed: Vec<&str> = MembershipTier::ALL.iter().map(|t| t.slug()).collect();
            errors.push(FieldError::new(
                "tier",
                format!("Tier must be one of: {}", allowed.join(", ")),
            ));
        }

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                errors.push(FieldError::new("name", "Name cannot be blank"));
            } else if name.chars().count() > MAX_NAME_LEN {
                errors.push(FieldError::new(
                    "name",
                    format!("Name must be at most {MAX_NAME_LEN} characters"),
                ));
            }
        }

        match tier {
            Some(tier) if errors.is_empty() => Ok(tier),
            _ => Err(errors),
        }
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();

    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
        return;
    }
    if email.len() > MAX_EMAIL_LEN {
        errors.push(FieldError::new(
            "email",
            format!("Email must be at most {MAX_EMAIL_LEN} characters"),
        ));
        return;
    }
    if !looks_like_email(email) {
        errors.push(FieldError::new("email", "Email address is invalid"));
    }
}

// Structural check only: one `@`, no whitespace, dotted domain without empty labels.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
