//! Result records returned by a backend's unrestricted search.

use serde::{Deserialize, Deserializer, Serialize};

/// Interlinear fields of a form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgtField {
    NarrowPhoneticTranscription,
    PhoneticTranscription,
    Transcription,
    MorphemeBreak,
    MorphemeGloss,
    SyntacticCategoryString,
}

impl IgtField {
    pub const ALL: [IgtField; 6] = [
        IgtField::NarrowPhoneticTranscription,
        IgtField::PhoneticTranscription,
        IgtField::Transcription,
        IgtField::MorphemeBreak,
        IgtField::MorphemeGloss,
        IgtField::SyntacticCategoryString,
    ];

    /// Attribute name as used in records and query leaves.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::NarrowPhoneticTranscription => "narrow_phonetic_transcription",
            Self::PhoneticTranscription => "phonetic_transcription",
            Self::Transcription => "transcription",
            Self::MorphemeBreak => "morpheme_break",
            Self::MorphemeGloss => "morpheme_gloss",
            Self::SyntacticCategoryString => "syntactic_category_string",
        }
    }
}

/// Attribute name of the translations list.
pub const TRANSLATIONS_ATTRIBUTE: &str = "translations";

/// One translation of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub grammaticality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcription: String,
}

/// A form record. Fields the renderer does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub narrow_phonetic_transcription: Option<String>,
    #[serde(default)]
    pub phonetic_transcription: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub morpheme_break: Option<String>,
    #[serde(default)]
    pub morpheme_gloss: Option<String>,
    #[serde(default)]
    pub syntactic_category_string: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Vec<Translation>,
}

impl Form {
    /// The field's text when present and non-empty.
    pub fn field(&self, field: IgtField) -> Option<&str> {
        let value = match field {
            IgtField::NarrowPhoneticTranscription => &self.narrow_phonetic_transcription,
            IgtField::PhoneticTranscription => &self.phonetic_transcription,
            IgtField::Transcription => &self.transcription,
            IgtField::MorphemeBreak => &self.morpheme_break,
            IgtField::MorphemeGloss => &self.morpheme_gloss,
            IgtField::SyntacticCategoryString => &self.syntactic_category_string,
        };
        value.as_deref().filter(|text| !text.is_empty())
    }

    /// Present fields, in display order.
    pub fn present_fields(&self) -> Vec<(IgtField, &str)> {
        IgtField::ALL
            .iter()
            .filter_map(|&field| self.field(field).map(|text| (field, text)))
            .collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
