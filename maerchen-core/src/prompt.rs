//! Prompt construction for story generation.
//!
//! Pure functions from request parameters to the system and user prompts.
//! The grade tier selects the word-count band and the Grundwortschatz
//! excerpt embedded in the user prompt.

use serde::{Deserialize, Serialize};

/// Marker the model is instructed to begin its reply with.
pub const TITLE_MARKER: &str = "TITEL:";

/// Marker the model is instructed to end the story with, on its own line.
pub const END_MARKER: &str = "ENDE";

/// Header that starts the upper-tier section of the word-list source.
pub const UPPER_TIER_HEADER: &str = "### **Grundwortschatz für Jahrgangsstufen 3 und 4**";

/// Target reading-grade band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GradeTier {
    /// Klassenstufen 1 & 2.
    #[serde(rename = "12")]
    #[default]
    Lower,
    /// Klassenstufen 3 & 4.
    #[serde(rename = "34")]
    Upper,
}

impl GradeTier {
    /// Word-count band for a reading time in minutes.
    ///
    /// No clamping happens here; a non-positive length would yield a
    /// degenerate band, the caller validates length upstream.
    pub fn word_band(&self, minutes: u32) -> (u32, u32) {
        match self {
            GradeTier::Lower => (minutes * 60, minutes * 70),
            GradeTier::Upper => (minutes * 80, minutes * 100),
        }
    }

    fn audience(&self) -> &'static str {
        match self {
            GradeTier::Lower => "Kinder der Klassenstufen 1 & 2",
            GradeTier::Upper => "Kinder der Klassenstufen 3 & 4",
        }
    }

    fn difficulty(&self) -> &'static str {
        match self {
            GradeTier::Lower => "sehr einfach mit kurzen Sätzen und einfachen Wörtern",
            GradeTier::Upper => {
                "kindgerecht mit etwas längeren Sätzen und anspruchsvolleren Wörtern"
            }
        }
    }
}

/// Parameters for one story generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    pub thema: String,
    pub personen_tiere: String,
    pub ort: String,
    pub stimmung: String,
    /// Target reading time in minutes.
    pub laenge: u32,
    pub klassenstufe: GradeTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The part of the word-list source covering Klassenstufen 1 & 2.
///
/// Everything before the upper-tier header; the whole source if the header
/// is missing.
pub fn lower_tier_excerpt(source: &str) -> &str {
    match source.find(UPPER_TIER_HEADER) {
        Some(idx) => &source[..idx],
        None => source,
    }
}

/// Build the system and user prompts for a request.
pub fn build_prompt(req: &StoryRequest, grundwortschatz: &str) -> (String, String) {
    let (min_words, max_words) = req.klassenstufe.word_band(req.laenge);

    let excerpt = match req.klassenstufe {
        GradeTier::Lower => lower_tier_excerpt(grundwortschatz),
        GradeTier::Upper => grundwortschatz,
    };

    let stil_instruction = match &req.stil {
        Some(stil) => format!("- Stil/Genre: {stil}\n"),
        None => String::new(),
    };

    let system_prompt = format!(
        "Du bist ein kreativer Geschichtenerzähler für {}.",
        req.klassenstufe.audience()
    );

    let user_prompt = format!(
        "Schreibe eine Geschichte mit folgenden Eigenschaften:\n\
         - Lesezeit: etwa {laenge} Minuten (ca. {min_words}-{max_words} Wörter)\n\
         - Thema: {thema}\n\
         - Personen/Tiere: {personen}\n\
         - Ort: {ort}\n\
         - Stimmung: {stimmung}\n\
         {stil_instruction}- Schwierigkeitsgrad: {difficulty}\n\
         \n\
         WICHTIG: Verwende beim Schreiben häufig Wörter aus dem Grundwortschatz als Leseübung.\n\
         Die Geschichte sollte kindgerecht, spannend und lehrreich sein.\n\
         Schreibe die Geschichte in normalem Text ohne Markdown-Formatierung (keine **fett** markierten Wörter).\n\
         \n\
         Hier ist der Grundwortschatz zur Orientierung:\n\
         {excerpt}\n\
         \n\
         Format:\n\
         Gib die Antwort im folgenden Format zurück:\n\
         {title_marker} [Ein kurzer, ansprechender Titel für die Geschichte]\n\
         \n\
         [Die Geschichte in Absätzen]\n\
         \n\
         {end_marker}\n\
         \n\
         Beginne direkt mit \"{title_marker}\" gefolgt vom Titel.\n\
         Schließe die Geschichte mit einer eigenen Zeile ab, die nur {end_marker} enthält.\n\
         \n\
         WICHTIG: Schreibe wirklich die vollständige Geschichte mit ca. {max_words} Wörtern. Mache die Geschichte nicht kürzer!",
        laenge = req.laenge,
        min_words = min_words,
        max_words = max_words,
        thema = req.thema,
        personen = req.personen_tiere,
        ort = req.ort,
        stimmung = req.stimmung,
        stil_instruction = stil_instruction,
        difficulty = req.klassenstufe.difficulty(),
        excerpt = excerpt,
        title_marker = TITLE_MARKER,
        end_marker = END_MARKER,
    );

    (system_prompt, user_prompt)
}
