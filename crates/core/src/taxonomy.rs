//! Declarative rule tables: which keywords point at which category, and in
//! what order they are tried.

use crate::models::CategoryId;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// One ordered entry of a rule table. `include` is a disjunction of evidence
/// for `category`; any `exclude` match vetoes the rule.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub category: CategoryId,
    pub include: Vec<Regex>,
    pub exclude: Vec<Regex>,
}

impl Rule {
    fn new(
        name: &'static str,
        category: CategoryId,
        include: &[&str],
        exclude: &[&str],
    ) -> Self {
        Self {
            name,
            category,
            include: compile(include),
            exclude: compile(exclude),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.include.iter().any(|r| r.is_match(text))
            && !self.exclude.iter().any(|r| r.is_match(text))
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::error!(pattern = %p, error = %e, "Invalid taxonomy pattern, dropping it");
                    None
                }
            }
        })
        .collect()
}

/// File-name rules, highest precedence first. Cymbals are tried before
/// generic hi-hat words, which are tried before kicks, so "808 crash" never
/// lands in bass.
pub static NAME_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "cymbals",
            CategoryId::Hihats,
            &[r"\bcrash(es)?\b", r"\bcymbals?\b", r"\brides?\b", r"\bcr\b"],
            &[r"\bcrowd"],
        ),
        Rule::new(
            "hihats",
            CategoryId::Hihats,
            &[
                r"\bhi\s?hats?\b",
                r"\bhh\b",
                r"\bhats?\b",
                r"\bopen\b",
                r"\bclosed\b",
            ],
            &[r"\bopen\s+loops?\b"],
        ),
        Rule::new(
            "kicks",
            CategoryId::Kicks,
            &[r"\bkicks?\b", r"\bbd\b", r"\bbass\s?drums?\b"],
            &[r"\bsnare", r"\bclap"],
        ),
        Rule::new(
            "snares",
            CategoryId::Snares,
            &[
                r"\bsnares?\b",
                r"\bclaps?\b",
                r"\brimshots?\b",
                r"\bsd\b",
                r"\bsn\b",
            ],
            &[],
        ),
        Rule::new(
            "bass",
            CategoryId::Bass,
            &[r"\bbass\b", r"\bsub\b", r"\b808\b"],
            &[r"\bbass\s?drum", r"\b808\s+(crash|hat|cymbal)"],
        ),
        Rule::new(
            "percussion",
            CategoryId::Percussion,
            &[
                r"\bpercs?\b",
                r"\bpercussion\b",
                r"\bcongas?\b",
                r"\bbongos?\b",
                r"\btoms?\b",
                r"\bshakers?\b",
                r"\btamb(ourine)?s?\b",
                r"\bcajon\b",
                r"\btriangles?\b",
                r"\bdjembe\b",
                r"\btimpani\b",
                r"\btablas?\b",
            ],
            &[],
        ),
        Rule::new(
            "sfx",
            CategoryId::Sfx,
            &[
                r"\bs?fx\b",
                r"\bnoise\b",
                r"\brisers?\b",
                r"\bsweeps?\b",
                r"\bimpacts?\b",
                r"\bwhoosh(es)?\b",
                r"\btextures?\b",
                r"\bambient\b",
                r"\btransitions?\b",
                r"\bfoley\b",
                r"\bhits?\b",
            ],
            &[r"\bhithat"],
        ),
        Rule::new(
            "vocals",
            CategoryId::Vocals,
            &[
                r"\bvocals?\b",
                r"\bvox\b",
                r"\bvoices?\b",
                r"\bsing\b",
                r"\btalk\b",
                r"\bcry\b",
                r"\bspeak\b",
                r"\bscream\b",
                r"\bchant\b",
                r"\bsay\b",
                r"\bwords?\b",
                r"\bshout\b",
            ],
            &[],
        ),
    ]
});

/// Folder-name rules. Patterns only anchor the start of a word so plural
/// folder names ("Kicks", "Snares") still match.
pub static PATH_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            "cymbals",
            CategoryId::Hihats,
            &[r"\bcymbal", r"\bcrash", r"\bride"],
            &[],
        ),
        Rule::new(
            "hihats",
            CategoryId::Hihats,
            &[r"\bhi\s?hat", r"\bhh", r"\bhat"],
            &[],
        ),
        Rule::new(
            "kicks",
            CategoryId::Kicks,
            &[r"\bkick", r"\bkik", r"\bbd", r"\bbass\s?drum"],
            &[r"snare", r"hat", r"cymbal"],
        ),
        Rule::new(
            "snares",
            CategoryId::Snares,
            &[r"\bsnare", r"\bclap", r"\brimshot", r"\bsd", r"\bsn"],
            &[r"kick", r"hat", r"cymbal"],
        ),
        Rule::new(
            "percussion",
            CategoryId::Percussion,
            &[r"\bperc", r"\bconga", r"\bbongo", r"\btom", r"\btabla"],
            &[r"kick", r"snare", r"hat"],
        ),
        Rule::new(
            "bass",
            CategoryId::Bass,
            &[r"\bbass", r"\bsub", r"\b808"],
            &[r"kick", r"drum", r"snare", r"hat", r"cymbal", r"crash"],
        ),
        Rule::new(
            "sfx",
            CategoryId::Sfx,
            &[
                r"\bs?fx",
                r"\beffect",
                r"\bambient",
                r"\btexture",
                r"\bfoley",
                r"\briser",
                r"\bsweep",
            ],
            &[],
        ),
        Rule::new(
            "vocals",
            CategoryId::Vocals,
            &[r"\bvox", r"\bvocal", r"\bvoice", r"\bsing", r"\bchant"],
            &[],
        ),
    ]
});

pub const LOW_FREQUENCY_TERMS: [&str; 7] = ["bass", "sub", "808", "low", "deep", "boom", "rumble"];
pub const HIGH_FREQUENCY_TERMS: [&str; 8] =
    ["hat", "cymbal", "crash", "ride", "sizzle", "high", "hh", "hi"];
pub const PERCUSSIVE_TERMS: [&str; 7] = ["perc", "conga", "bongo", "tom", "tabla", "drum", "hit"];

/// Names matching this go to hi-hats no matter what any other stage said.
pub static OVERRIDE_808_CYMBAL: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"808\s+crash", r"808\s+cymbal"]));

/// Positive and negative name patterns that point at `category`, in
/// precedence order.
pub fn rules_for(category: CategoryId) -> (Vec<&'static Regex>, Vec<&'static Regex>) {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for rule in NAME_RULES.iter().filter(|r| r.category == category) {
        include.extend(rule.include.iter());
        exclude.extend(rule.exclude.iter());
    }
    (include, exclude)
}

/// Same as [`rules_for`] keyed by the string id; unknown ids get empty lists.
pub fn rules_for_id(id: &str) -> (Vec<&'static Regex>, Vec<&'static Regex>) {
    match id.parse::<CategoryId>() {
        Ok(category) => rules_for(category),
        Err(_) => (Vec::new(), Vec::new()),
    }
}

#[derive(Debug, Serialize)]
pub struct RuleView {
    pub name: &'static str,
    pub category: CategoryId,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaxonomyView {
    pub name_rules: Vec<RuleView>,
    pub path_rules: Vec<RuleView>,
    pub low_frequency_terms: Vec<&'static str>,
    pub high_frequency_terms: Vec<&'static str>,
    pub percussive_terms: Vec<&'static str>,
    pub overrides: Vec<String>,
}

/// Serializable snapshot of every table, for auditing the rule order.
pub fn describe() -> TaxonomyView {
    let view = |rules: &[Rule]| -> Vec<RuleView> {
        rules
            .iter()
            .map(|r| RuleView {
                name: r.name,
                category: r.category,
                include: r.include.iter().map(|p| p.as_str().to_string()).collect(),
                exclude: r.exclude.iter().map(|p| p.as_str().to_string()).collect(),
            })
            .collect()
    };
    TaxonomyView {
        name_rules: view(&NAME_RULES),
        path_rules: view(&PATH_RULES),
        low_frequency_terms: LOW_FREQUENCY_TERMS.to_vec(),
        high_frequency_terms: HIGH_FREQUENCY_TERMS.to_vec(),
        percussive_terms: PERCUSSIVE_TERMS.to_vec(),
        overrides: OVERRIDE_808_CYMBAL
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        let expected: [(usize, usize); 8] =
            [(4, 1), (5, 1), (3, 2), (5, 0), (3, 2), (12, 0), (11, 1), (12, 0)];
        for (rule, (inc, exc)) in NAME_RULES.iter().zip(expected) {
            assert_eq!(rule.include.len(), inc, "include of {}", rule.name);
            assert_eq!(rule.exclude.len(), exc, "exclude of {}", rule.name);
        }
        assert_eq!(PATH_RULES.len(), 8);
        assert!(PATH_RULES.iter().all(|r| !r.include.is_empty()));
        assert_eq!(OVERRIDE_808_CYMBAL.len(), 2);
    }

    #[test]
    fn name_rules_follow_precedence() {
        let order: Vec<&str> = NAME_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            order,
            ["cymbals", "hihats", "kicks", "snares", "bass", "percussion", "sfx", "vocals"]
        );
    }

    #[test]
    fn hihats_collects_both_cymbal_and_hat_rules() {
        let (include, exclude) = rules_for(CategoryId::Hihats);
        assert_eq!(include.len(), 9);
        assert_eq!(exclude.len(), 2);
    }

    #[test]
    fn other_and_unknown_have_no_rules() {
        let (include, exclude) = rules_for(CategoryId::Other);
        assert!(include.is_empty() && exclude.is_empty());
        let (include, exclude) = rules_for_id("trombones");
        assert!(include.is_empty() && exclude.is_empty());
        let (include, _) = rules_for_id("kicks");
        assert_eq!(include.len(), 3);
    }

    #[test]
    fn rule_veto_blocks_match() {
        let kicks = &NAME_RULES[2];
        assert!(kicks.matches("kick 01"));
        assert!(!kicks.matches("kick snare layer"));
    }
}
