//! Rating-scale and demographic types
//!
//! The seven bipolar adjective pairs, the 1..=5 scale, and the demographic
//! codes, all serialized as the bare numbers the collecting sheet expects.
//! A draft vector keeps unanswered dimensions as `None`; a snapshot can only
//! be built once every dimension is answered, so an incomplete row cannot be
//! constructed by accident.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// The seven bipolar dimensions, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    ModestLuxury,
    ColorfulMonochrome,
    FeminineMasculine,
    ComplexSimple,
    ClassicModern,
    SoftHard,
    HeavyLight,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::ModestLuxury,
        Dimension::ColorfulMonochrome,
        Dimension::FeminineMasculine,
        Dimension::ComplexSimple,
        Dimension::ClassicModern,
        Dimension::SoftHard,
        Dimension::HeavyLight,
    ];

    /// Wire key used in submission rows and summary counts.
    pub fn as_key(self) -> &'static str {
        match self {
            Dimension::ModestLuxury => "modest_luxury",
            Dimension::ColorfulMonochrome => "colorful_monochrome",
            Dimension::FeminineMasculine => "feminine_masculine",
            Dimension::ComplexSimple => "complex_simple",
            Dimension::ClassicModern => "classic_modern",
            Dimension::SoftHard => "soft_hard",
            Dimension::HeavyLight => "heavy_light",
        }
    }

    /// Anchor adjective shown at rating 1.
    pub fn low_anchor(self) -> &'static str {
        match self {
            Dimension::ModestLuxury => "modest",
            Dimension::ColorfulMonochrome => "colorful",
            Dimension::FeminineMasculine => "feminine",
            Dimension::ComplexSimple => "complex",
            Dimension::ClassicModern => "classic",
            Dimension::SoftHard => "soft",
            Dimension::HeavyLight => "heavy",
        }
    }

    /// Anchor adjective shown at rating 5.
    pub fn high_anchor(self) -> &'static str {
        match self {
            Dimension::ModestLuxury => "luxurious",
            Dimension::ColorfulMonochrome => "monochrome",
            Dimension::FeminineMasculine => "masculine",
            Dimension::ComplexSimple => "simple",
            Dimension::ClassicModern => "modern",
            Dimension::SoftHard => "hard",
            Dimension::HeavyLight => "light",
        }
    }
}

/// One answer on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| format!("rating out of range: {value}"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

/// Editable per-trial answers. `None` marks an unanswered dimension and is
/// never coerced to a midpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingVector {
    pub modest_luxury: Option<Rating>,
    pub colorful_monochrome: Option<Rating>,
    pub feminine_masculine: Option<Rating>,
    pub complex_simple: Option<Rating>,
    pub classic_modern: Option<Rating>,
    pub soft_hard: Option<Rating>,
    pub heavy_light: Option<Rating>,
}

impl RatingVector {
    pub fn get(&self, dimension: Dimension) -> Option<Rating> {
        match dimension {
            Dimension::ModestLuxury => self.modest_luxury,
            Dimension::ColorfulMonochrome => self.colorful_monochrome,
            Dimension::FeminineMasculine => self.feminine_masculine,
            Dimension::ComplexSimple => self.complex_simple,
            Dimension::ClassicModern => self.classic_modern,
            Dimension::SoftHard => self.soft_hard,
            Dimension::HeavyLight => self.heavy_light,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: Rating) {
        let slot = match dimension {
            Dimension::ModestLuxury => &mut self.modest_luxury,
            Dimension::ColorfulMonochrome => &mut self.colorful_monochrome,
            Dimension::FeminineMasculine => &mut self.feminine_masculine,
            Dimension::ComplexSimple => &mut self.complex_simple,
            Dimension::ClassicModern => &mut self.classic_modern,
            Dimension::SoftHard => &mut self.soft_hard,
            Dimension::HeavyLight => &mut self.heavy_light,
        };
        *slot = Some(value);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// First dimension still unanswered, in presentation order.
    pub fn first_unset(&self) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|&d| self.get(d).is_none())
    }

    /// Freeze into a snapshot, or `None` while any dimension is unanswered.
    pub fn complete(&self) -> Option<RatingSnapshot> {
        Some(RatingSnapshot {
            modest_luxury: self.modest_luxury?,
            colorful_monochrome: self.colorful_monochrome?,
            feminine_masculine: self.feminine_masculine?,
            complex_simple: self.complex_simple?,
            classic_modern: self.classic_modern?,
            soft_hard: self.soft_hard?,
            heavy_light: self.heavy_light?,
        })
    }
}

impl From<&RatingSnapshot> for RatingVector {
    fn from(snapshot: &RatingSnapshot) -> Self {
        Self {
            modest_luxury: Some(snapshot.modest_luxury),
            colorful_monochrome: Some(snapshot.colorful_monochrome),
            feminine_masculine: Some(snapshot.feminine_masculine),
            complex_simple: Some(snapshot.complex_simple),
            classic_modern: Some(snapshot.classic_modern),
            soft_hard: Some(snapshot.soft_hard),
            heavy_light: Some(snapshot.heavy_light),
        }
    }
}

/// A fully answered vector, laid out exactly as the submission row carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub modest_luxury: Rating,
    pub colorful_monochrome: Rating,
    pub feminine_masculine: Rating,
    pub complex_simple: Rating,
    pub classic_modern: Rating,
    pub soft_hard: Rating,
    pub heavy_light: Rating,
}

impl RatingSnapshot {
    pub fn get(&self, dimension: Dimension) -> Rating {
        match dimension {
            Dimension::ModestLuxury => self.modest_luxury,
            Dimension::ColorfulMonochrome => self.colorful_monochrome,
            Dimension::FeminineMasculine => self.feminine_masculine,
            Dimension::ComplexSimple => self.complex_simple,
            Dimension::ClassicModern => self.classic_modern,
            Dimension::SoftHard => self.soft_hard,
            Dimension::HeavyLight => self.heavy_light,
        }
    }
}

/// Self-reported gender; code 0 when declined, which is also the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Gender {
    #[default]
    Unspecified,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unspecified, Gender::Male, Gender::Female];

    pub fn code(self) -> u8 {
        match self {
            Gender::Unspecified => 0,
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gender::Unspecified),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Unspecified => "no answer",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Gender::from_code(code).ok_or_else(|| de::Error::custom(format!("invalid gender code: {code}")))
    }
}

/// Age decade bucket, coded 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    UnderTen,
    Teens,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 8] = [
        AgeBucket::UnderTen,
        AgeBucket::Teens,
        AgeBucket::Twenties,
        AgeBucket::Thirties,
        AgeBucket::Forties,
        AgeBucket::Fifties,
        AgeBucket::Sixties,
        AgeBucket::SeventyPlus,
    ];

    pub fn code(self) -> u8 {
        match self {
            AgeBucket::UnderTen => 1,
            AgeBucket::Teens => 2,
            AgeBucket::Twenties => 3,
            AgeBucket::Thirties => 4,
            AgeBucket::Forties => 5,
            AgeBucket::Fifties => 6,
            AgeBucket::Sixties => 7,
            AgeBucket::SeventyPlus => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(AgeBucket::UnderTen),
            2 => Some(AgeBucket::Teens),
            3 => Some(AgeBucket::Twenties),
            4 => Some(AgeBucket::Thirties),
            5 => Some(AgeBucket::Forties),
            6 => Some(AgeBucket::Fifties),
            7 => Some(AgeBucket::Sixties),
            8 => Some(AgeBucket::SeventyPlus),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::UnderTen => "0-9",
            AgeBucket::Teens => "10-19",
            AgeBucket::Twenties => "20-29",
            AgeBucket::Thirties => "30-39",
            AgeBucket::Forties => "40-49",
            AgeBucket::Fifties => "50-59",
            AgeBucket::Sixties => "60-69",
            AgeBucket::SeventyPlus => "70+",
        }
    }
}

impl Serialize for AgeBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for AgeBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        AgeBucket::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("invalid age bucket code: {code}")))
    }
}

/// Demographic answers captured with the first trial of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub gender: Gender,
    pub age_bucket: AgeBucket,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_vector() -> RatingVector {
        let mut vector = RatingVector::default();
        for (i, dimension) in Dimension::ALL.into_iter().enumerate() {
            let value = Rating::new((i as u8) % 5 + 1).expect("in range");
            vector.set(dimension, value);
        }
        vector
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(Rating::new(3).map(Rating::get), Some(3));
    }

    #[test]
    fn empty_vector_is_incomplete() {
        let vector = RatingVector::default();
        assert_eq!(vector.first_unset(), Some(Dimension::ModestLuxury));
        assert!(vector.complete().is_none());
    }

    #[test]
    fn each_missing_dimension_blocks_completion() {
        for dimension in Dimension::ALL {
            let mut vector = RatingVector::default();
            for other in Dimension::ALL {
                if other != dimension {
                    vector.set(other, Rating::new(3).expect("in range"));
                }
            }
            assert_eq!(vector.first_unset(), Some(dimension));
            assert!(vector.complete().is_none());
        }
    }

    #[test]
    fn complete_vector_round_trips_through_snapshot() {
        let vector = full_vector();
        let snapshot = vector.complete().expect("all set");
        let restored = RatingVector::from(&snapshot);
        assert_eq!(restored, vector);
        assert!(restored.first_unset().is_none());
    }

    #[test]
    fn coded_enums_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&Gender::Female).expect("json"), "2");
        assert_eq!(serde_json::to_string(&AgeBucket::Twenties).expect("json"), "3");
        let gender: Gender = serde_json::from_str("0").expect("parse");
        assert_eq!(gender, Gender::Unspecified);
        assert!(serde_json::from_str::<Gender>("7").is_err());
        assert!(serde_json::from_str::<AgeBucket>("0").is_err());
        let bucket: AgeBucket = serde_json::from_str("8").expect("parse");
        assert_eq!(bucket, AgeBucket::SeventyPlus);
    }

    #[test]
    fn dimension_keys_match_row_columns() {
        let keys: Vec<&str> = Dimension::ALL.iter().map(|d| d.as_key()).collect();
        assert_eq!(
            keys,
            [
                "modest_luxury",
                "colorful_monochrome",
                "feminine_masculine",
                "complex_simple",
                "classic_modern",
                "soft_hard",
                "heavy_light",
            ]
        );
    }
}
