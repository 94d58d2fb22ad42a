use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::normalize_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DispositionOutcome {
    Convicted,
    Dismissed,
    Nolle,
    Other,
}

impl DispositionOutcome {
    pub const ALL: [DispositionOutcome; 4] = [
        DispositionOutcome::Convicted,
        DispositionOutcome::Dismissed,
        DispositionOutcome::Nolle,
        DispositionOutcome::Other,
    ];
}

impl fmt::Display for DispositionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispositionOutcome::Convicted => write!(f, "CONVICTED"),
            DispositionOutcome::Dismissed => write!(f, "DISMISSED"),
            DispositionOutcome::Nolle => write!(f, "NOLLE"),
            DispositionOutcome::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentenceKind {
    Fine,
    Prison,
    Probation,
    Reformatory,
    Other,
}

impl SentenceKind {
    pub const ALL: [SentenceKind; 5] = [
        SentenceKind::Fine,
        SentenceKind::Prison,
        SentenceKind::Probation,
        SentenceKind::Reformatory,
        SentenceKind::Other,
    ];
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceKind::Fine => write!(f, "FINE"),
            SentenceKind::Prison => write!(f, "PRISON"),
            SentenceKind::Probation => write!(f, "PROBATION"),
            SentenceKind::Reformatory => write!(f, "REFORMATORY"),
            SentenceKind::Other => write!(f, "OTHER"),
        }
    }
}

/// Keyword group: matches when any of its keywords is a substring of the text.
struct Group<T: 'static> {
    outcome: T,
    any: &'static [&'static str],
}

impl<T: Copy> Group<T> {
    fn matches(&self, text: &str) -> bool {
        self.any.iter().any(|k| text.contains(k))
    }
}

const DISPOSITION_GROUPS: &[Group<DispositionOutcome>] = &[
    Group {
        outcome: DispositionOutcome::Convicted,
        any: &["CONVICTED", "GUILTY", "FINE", "PRISON"],
    },
    Group {
        outcome: DispositionOutcome::Dismissed,
        any: &["ACQUITTED", "DISMISSED", "STRUCK", "DISCHARGED"],
    },
    Group {
        outcome: DispositionOutcome::Nolle,
        any: &["WITHDRAWN", "NOLLE"],
    },
];

const SENTENCE_GROUPS: &[Group<SentenceKind>] = &[
    Group {
        outcome: SentenceKind::Fine,
        any: &["FINE", "$"],
    },
    Group {
        outcome: SentenceKind::Prison,
        any: &["PRISON", "IMPRISONMENT", "CONFINEMENT", "MONTHS", "YEARS"],
    },
    Group {
        outcome: SentenceKind::Probation,
        any: &["PROBATION", "BOND"],
    },
    Group {
        outcome: SentenceKind::Reformatory,
        any: &["REFORM", "SCHOOL"],
    },
];

fn first_group<T: Copy>(groups: &[Group<T>], text: &str) -> Option<T> {
    let text = normalize_text(text);
    if text.is_empty() {
        return None;
    }
    groups.iter().find(|g| g.matches(&text)).map(|g| g.outcome)
}

/// Disposition of a charge from its remark text. First matching group wins.
pub fn disposition(remark: &str) -> DispositionOutcome {
    first_group(DISPOSITION_GROUPS, remark).unwrap_or(DispositionOutcome::Other)
}

/// Disposition from the remark, consulting the status text when the remark is inconclusive.
pub fn disposition_of(remark: &str, status: &str) -> DispositionOutcome {
    match disposition(remark) {
        DispositionOutcome::Other => disposition(status),
        outcome => outcome,
    }
}

/// Kind of sentence from further-particulars text. First matching group wins.
pub fn sentence_kind(text: &str) -> SentenceKind {
    first_group(SENTENCE_GROUPS, text).unwrap_or(SentenceKind::Other)
}

/// Sentence kind from the sentence text, or from the remark when no sentence was recorded.
pub fn sentence_of(sentence: &str, remark: &str) -> SentenceKind {
    if sentence.trim().is_empty() {
        sentence_kind(remark)
    } else {
        sentence_kind(sentence)
    }
}
