use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::{AppError, StoreError},
    validate::required,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a user after validating the payload and hashing the password.
pub async fn register(users: &dyn UserStore, payload: RegisterRequest) -> Result<User, AppError> {
    const MISSING: &str = "All fields are required";
    let name = required(payload.name, MISSING)?;
    let email = normalize_email(&required(payload.email, MISSING)?);
    // Passwords are taken verbatim; only emptiness is checked.
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation(MISSING))?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(&password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Store(e)
    })?;

    let user = match users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!("email registered concurrently");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and issues a session token.
pub async fn authenticate(
    users: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<(String, User), AppError> {
    const MISSING: &str = "Email and password are required";
    let email = normalize_email(&required(payload.email, MISSING)?);
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation(MISSING))?;

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthorized("User not found"));
    };

    let ok = verify_password(&password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        AppError::Store(e)
    })?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid password"));
    }

    let token = keys.sign(user.id, &user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::Store(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((token, user))
}
