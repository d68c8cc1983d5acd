use crate::core_types::{split_pitch_class, KeyContext, Mode};
use crate::error::{CfResult, ChordForgeError};

pub type KeyRow = (&'static str, [&'static str; 7]);

/// Diatonic triads of each supported major key.
pub static MAJOR_KEYS: [KeyRow; 14] = [
    ("C", ["C", "Dm", "Em", "F", "G", "Am", "Bo"]),
    ("C#", ["C#", "D#m", "E#m", "F#", "G#", "A#m", "B#o"]),
    ("Db", ["Db", "Ebm", "Fm", "Gb", "Ab", "Bbm", "Co"]),
    ("D", ["D", "Em", "F#m", "G", "A", "Bm", "C#o"]),
    ("Eb", ["Eb", "Fm", "Gm", "Ab", "Bb", "Cm", "Do"]),
    ("E", ["E", "F#m", "G#m", "A", "B", "C#m", "D#o"]),
    ("F", ["F", "Gm", "Am", "Bb", "C", "Dm", "Eo"]),
    ("F#", ["F#", "G#m", "A#m", "B", "C#", "D#m", "E#o"]),
    ("Gb", ["Gb", "Abm", "Bbm", "Cb", "Db", "Ebm", "Fo"]),
    ("G", ["G", "Am", "Bm", "C", "D", "Em", "F#o"]),
    ("Ab", ["Ab", "Bbm", "Cm", "Db", "Eb", "Fm", "Go"]),
    ("A", ["A", "Bm", "C#m", "D", "E", "F#m", "G#o"]),
    ("Bb", ["Bb", "Cm", "Dm", "Eb", "F", "Gm", "Ao"]),
    ("B", ["B", "C#m", "D#m", "E", "F#", "G#m", "A#o"]),
];

/// Natural-minor triads of each supported minor key, keyed without the "m" suffix.
pub static MINOR_KEYS: [KeyRow; 15] = [
    ("C", ["Cm", "Do", "Eb", "Fm", "Gm", "Ab", "Bb"]),
    ("C#", ["C#m", "D#o", "E", "F#m", "G#m", "A", "B"]),
    ("D", ["Dm", "Eo", "F", "Gm", "Am", "Bb", "C"]),
    ("D#", ["D#m", "E#o", "F#", "G#m", "A#m", "B", "C#"]),
    ("Eb", ["Ebm", "Fo", "Gb", "Abm", "Bbm", "Cb", "Db"]),
    ("E", ["Em", "F#o", "G", "Am", "Bm", "C", "D"]),
    ("F", ["Fm", "Go", "Ab", "Bbm", "Cm", "Db", "Eb"]),
    ("F#", ["F#m", "G#o", "A", "Bm", "C#m", "D", "E"]),
    ("G", ["Gm", "Ao", "Bb", "Cm", "Dm", "Eb", "F"]),
    ("G#", ["G#m", "A#o", "B", "C#m", "D#m", "E", "F#"]),
    ("Ab", ["Abm", "Bbo", "Cb", "Dbm", "Ebm", "Fb", "Gb"]),
    ("A", ["Am", "Bo", "C", "Dm", "Em", "F", "G"]),
    ("A#", ["A#m", "B#o", "C#", "D#m", "E#m", "F#", "G#"]),
    ("Bb", ["Bbm", "Co", "Db", "Ebm", "Fm", "Gb", "Ab"]),
    ("B", ["Bm", "C#o", "D", "Em", "F#m", "G", "A"]),
];

/// Sharp/flat respellings tried when a tonic is not spelled the way the tables are.
static ENHARMONICS: [(&str, &str); 5] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
];

fn respell(tonic: &str) -> Option<&'static str> {
    ENHARMONICS.iter().find_map(|&(sharp, flat)| {
        if tonic == sharp {
            Some(flat)
        } else if tonic == flat {
            Some(sharp)
        } else {
            None
        }
    })
}

/// Chord quality as it appears in label suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

/// Spelling-independent form of a chord label: root pitch class plus quality.
pub type NormalizedLabel = (u8, Quality);

pub fn normalize_label(label: &str) -> Option<NormalizedLabel> {
    let (root, suffix) = split_pitch_class(label.trim())?;
    let quality = match suffix {
        "" | "M" | "maj" => Quality::Major,
        "m" | "min" | "-" => Quality::Minor,
        "o" | "dim" | "°" => Quality::Diminished,
        "+" | "aug" => Quality::Augmented,
        "sus2" => Quality::Sus2,
        "sus4" | "sus" => Quality::Sus4,
        _ => return None,
    };
    Some((root, quality))
}

/// Allowed chord labels for one key.
#[derive(Debug, Clone)]
pub struct KeyVocabulary {
    pub key: KeyContext,
    pub table_tonic: &'static str,
    pub labels: &'static [&'static str; 7],
    normalized: Vec<NormalizedLabel>,
}

impl KeyVocabulary {
    pub fn contains(&self, label: &str) -> bool {
        normalize_label(label)
            .map(|n| self.normalized.contains(&n))
            .unwrap_or(false)
    }
}

/// Read-only view over the static key tables.
pub struct KeyConstraintTable;

impl KeyConstraintTable {
    pub fn rows(mode: Mode) -> &'static [KeyRow] {
        match mode {
            Mode::Major => &MAJOR_KEYS,
            Mode::Minor => &MINOR_KEYS,
        }
    }

    pub fn lookup(key: &KeyContext) -> CfResult<KeyVocabulary> {
        let rows = Self::rows(key.mode);
        let tonic = key.tonic.trim();

        let find = |name: &str| rows.iter().find(|(t, _)| *t == name);
        let row = find(tonic)
            .or_else(|| respell(tonic).and_then(find))
            .ok_or_else(|| {
                ChordForgeError::Data(format!("Unsupported key: {} {}", tonic, key.mode))
            })?;

        Ok(KeyVocabulary {
            key: key.clone(),
            table_tonic: row.0,
            labels: &row.1,
            normalized: row.1.iter().filter_map(|l| normalize_label(l)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_c_major_vocabulary() {
        let v = KeyConstraintTable::lookup(&KeyContext::major("C")).unwrap();
        assert!(v.contains("C"));
        assert!(v.contains("Am"));
        assert!(v.contains("Bo"));
        assert!(!v.contains("Bb"));
        assert!(!v.contains("Cm"));
        assert!(!v.contains("Csus4"));
    }

    #[rstest]
    #[case(KeyContext::major("D#"), "Eb")]
    #[case(KeyContext::major("G#"), "Ab")]
    #[case(KeyContext::major("A#"), "Bb")]
    #[case(KeyContext::minor("Db"), "C#")]
    #[case(KeyContext::minor("Gb"), "F#")]
    #[case(KeyContext::major("F#"), "F#")]
    fn test_enharmonic_tonic(#[case] key: KeyContext, #[case] expected: &str) {
        let v = KeyConstraintTable::lookup(&key).unwrap();
        assert_eq!(v.table_tonic, expected);
    }

    #[test]
    fn test_labels_match_through_respelling() {
        let v = KeyConstraintTable::lookup(&KeyContext::major("Db")).unwrap();
        assert!(v.contains("C#"));
        assert!(v.contains("A#m"));
        assert!(v.contains("Co"));
        assert!(v.contains("B#o"));
    }

    #[rstest]
    #[case("H")]
    #[case("E#")]
    #[case("")]
    fn test_unknown_tonic_is_data_error(#[case] tonic: &str) {
        let res = KeyConstraintTable::lookup(&KeyContext::major(tonic));
        assert!(matches!(res, Err(ChordForgeError::Data(_))));
    }

    #[test]
    fn test_every_pitch_class_has_a_key() {
        for name in ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"] {
            assert!(KeyConstraintTable::lookup(&KeyContext::major(name)).is_ok());
            assert!(KeyConstraintTable::lookup(&KeyContext::minor(name)).is_ok());
        }
    }
}
