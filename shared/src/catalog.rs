//! Book catalog enums

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::status::ParseEnumError;

macro_rules! categories {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of catalog categories
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Category {
            $($variant),+
        }

        impl Category {
            pub const ALL: &'static [Category] = &[$(Category::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Category::$variant => $name),+
                }
            }
        }
    };
}

categories! {
    GeneralFiction => "General Fiction",
    HistoricalFiction => "Historical Fiction",
    MysteryThriller => "Mystery & Thriller",
    ScienceFiction => "Science Fiction",
    Fantasy => "Fantasy",
    Romance => "Romance",
    Horror => "Horror",
    NepaliFolkTales => "Nepali Folk Tales",
    NepaliHistoricalFiction => "Nepali Historical Fiction",
    BiographyMemoir => "Biography & Memoir",
    SelfHelp => "Self-Help",
    History => "History",
    Business => "Business",
    HealthWellness => "Health & Wellness",
    ScienceTechnology => "Science & Technology",
    ReligionSpirituality => "Religion & Spirituality",
    NepaliCultureHeritage => "Nepali Culture & Heritage",
    MountaineeringAdventure => "Mountaineering & Adventure",
    ChildrensBooks => "Children's Books",
    YoungAdult => "Young Adult (YA)",
    Educational => "Educational",
    NepaliChildrensStories => "Nepali Children's Stories",
    Classics => "Classics",
    Poetry => "Poetry",
    GraphicNovels => "Graphic Novels",
    Cookbooks => "Cookbooks",
    ArtPhotography => "Art & Photography",
    NepaliLiterature => "Nepali Literature",
    TravelTourism => "Travel & Tourism",
    Hinduism => "Hinduism",
    Buddhism => "Buddhism",
    Islam => "Islam",
    Christianity => "Christianity",
    OtherReligions => "Other Religions",
    NepaliSpiritualTraditions => "Nepali Spiritual Traditions",
    Textbooks => "Textbooks",
    ReferenceBooks => "Reference Books",
    ResearchEssays => "Research & Essays",
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| ParseEnumError {
                kind: "category",
                value: s.to_string(),
            })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// The other role, used by the admin role toggle
    pub fn toggled(&self) -> Self {
        match self {
            UserRole::User => UserRole::Admin,
            UserRole::Admin => UserRole::User,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
