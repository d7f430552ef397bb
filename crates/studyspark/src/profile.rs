use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_NAME_CHARS: usize = 12;
pub const AVATAR_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name must be at most {max} characters, got {len}")]
    NameTooLong { len: usize, max: usize },

    #[error("avatar must be between 0 and {max}, got {0}", max = AVATAR_COUNT - 1)]
    UnknownAvatar(usize),
}

/// Onboarding result: nickname and chosen avatar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub avatar: usize,
}

impl Profile {
    pub fn new(name: &str, avatar: usize) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        // Count characters, not bytes: names are usually Japanese
        let len = name.chars().count();
        if len > MAX_NAME_CHARS {
            return Err(ProfileError::NameTooLong {
                len,
                max: MAX_NAME_CHARS,
            });
        }
        if avatar >= AVATAR_COUNT {
            return Err(ProfileError::UnknownAvatar(avatar));
        }
        Ok(Self {
            name: name.to_string(),
            avatar,
        })
    }
}
