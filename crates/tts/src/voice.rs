use strum::{EnumString, IntoStaticStr};

/// Voice labels accepted by the speech function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Voice {
    #[default]
    EnglishNarrator,
    EnglishMale,
    EnglishFemale,
    EnglishBritish,
    FrenchMale,
    FrenchFemale,
}

impl Voice {
    /// Parse a label, falling back to the narrator for anything unknown
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Provider voice id
    pub const fn provider_id(self) -> &'static str {
        match self {
            Self::EnglishNarrator => "English_expressive_narrator",
            Self::EnglishMale => "Calm_American_Man",
            Self::EnglishFemale => "Warm_American_Woman",
            Self::EnglishBritish => "British_Gentleman",
            Self::FrenchMale => "French_Male",
            Self::FrenchFemale => "French_Female",
        }
    }
}
