use std::collections::HashMap;

/// Dictionary-free approximation of WordNet noun lemmatization.
///
/// Irregular plurals come from a fixed exception table; everything else goes
/// through suffix detachment. Detachment is repeated until the word stops
/// changing, so the output is always its own lemma.
#[derive(Clone, Debug)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

const MAX_PASSES: usize = 8;

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("crises", "crisis"),
    ("diagnoses", "diagnosis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("alumni", "alumnus"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("loaves", "loaf"),
    ("calves", "calf"),
];

// Words that already are their own base form despite a plural-looking suffix.
const INVARIANT: &[&str] = &[
    "news",
    "series",
    "species",
    "means",
    "physics",
    "mathematics",
    "economics",
    "politics",
    "ethics",
    "athletics",
    "gymnastics",
    "always",
    "afterwards",
    "besides",
    "perhaps",
    "whereas",
    "ourselves",
    "themselves",
    "yourselves",
];

const KEEP_ENDINGS: &[&str] = &["ss", "us", "is"];

const DROP_ES_ENDINGS: &[&str] = &["sses", "xes", "ches", "shes", "zzes"];

const MEN_WORDS: &[&str] =
    &["abdomen", "acumen", "amen", "hymen", "omen", "ramen", "regimen", "semen", "specimen", "stamen", "yemen"];

impl Default for Lemmatizer {
    fn default() -> Self {
        Self { exceptions: IRREGULAR_PLURALS.iter().copied().collect() }
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_PASSES {
            let next = self.detach(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn detach(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return (*lemma).to_string();
        }

        if word.chars().count() <= 3
            || INVARIANT.contains(&word)
            || KEEP_ENDINGS.iter().any(|ending| word.ends_with(ending))
        {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.chars().count() >= 2 {
                return format!("{stem}y");
            }
        }

        if DROP_ES_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
            return word[..word.len() - 2].to_string();
        }

        if let Some(stem) = word.strip_suffix("men") {
            if !MEN_WORDS.contains(&word) {
                return format!("{stem}man");
            }
        }

        match word.strip_suffix('s') {
            Some(stem) => stem.to_string(),
            None => word.to_string(),
        }
    }
}
