//! Random parameter suggestions for the story form.

use rand::seq::SliceRandom;
use serde::Serialize;

pub const THEMEN: &[&str] = &[
    "Freundschaft",
    "Abenteuer",
    "Zauber",
    "Tiere im Wald",
    "Eine Reise",
    "Ein Geheimnis",
    "Mut",
    "Hilfsbereitschaft",
    "Weihnachten",
    "Sommerferien",
    "Ein verlorener Schatz",
    "Magische Welten",
    "Die vier Jahreszeiten",
    "Ein besonderes Fest",
    "Die Kraft der Fantasie",
];

pub const PERSONEN_TIERE: &[&str] = &[
    "Ein kleiner Hase namens Erwin",
    "Eine mutige Prinzessin namens Helena",
    "Ein frecher Fuchs namens Felix",
    "Eine weise Eule",
    "Eine tapfere Ritterin namens Hannelore",
    "Ein tapferer Ritter namens Siegfried",
    "Ein neugieriges Eichhörnchen",
    "Ein kleines Mädchen namens Juna",
    "Ein junger Drache",
    "Eine zauberhafte Fee",
    "Der fröhliche Bär Klaus",
    "Ein kluger Junge",
    "Eine singende Nachtigall",
];

pub const ORTE: &[&str] = &[
    "im Wald",
    "am See",
    "in einem Schloss",
    "auf einem Bauernhof",
    "in einem verzauberten Garten",
    "in den Bergen",
    "am Meer",
    "in einem Dorf",
    "im Zauberwald",
];

pub const STIMMUNGEN: &[&str] = &[
    "fröhlich",
    "spannend",
    "mysteriös",
    "lustig",
    "abenteuerlich",
    "gemütlich",
    "aufregend",
    "herzlich",
];

pub const STILE: &[&str] = &[
    "Michael Ende",
    "Marc-Uwe Kling",
    "Astrid Lindgren",
    "Janosch",
    "Cornelia Funke",
    "Märchen",
    "Fabel",
    "Moderne Kindergeschichte",
];

/// One random pick per story parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    pub thema: String,
    pub personen_tiere: String,
    pub ort: String,
    pub stimmung: String,
    pub stil: String,
}

impl Suggestions {
    /// Draw a random suggestion for every field.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let mut pick = |pool: &[&str]| {
            pool.choose(&mut rng)
                .copied()
                .unwrap_or_default()
                .to_string()
        };

        Self {
            thema: pick(THEMEN),
            personen_tiere: pick(PERSONEN_TIERE),
            ort: pick(ORTE),
            stimmung: pick(STIMMUNGEN),
            stil: pick(STILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_draws_from_pools() {
        for _ in 0..20 {
            let s = Suggestions::random();
            assert!(THEMEN.contains(&s.thema.as_str()));
            assert!(PERSONEN_TIERE.contains(&s.personen_tiere.as_str()));
            assert!(ORTE.contains(&s.ort.as_str()));
            assert!(STIMMUNGEN.contains(&s.stimmung.as_str()));
            assert!(STILE.contains(&s.stil.as_str()));
        }
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(Suggestions::random()).unwrap();
        assert!(json["thema"].is_string());
        assert!(json["personen_tiere"].is_string());
        assert!(json["stil"].is_string());
    }
}
