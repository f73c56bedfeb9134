//! Conversion between an [`Answers`] set and the query string that carries it
//! from one step to the next.
//!
//! The query string is the only state the flow has. Links are written in a
//! canonical order (the vocabulary order, then unknown keys alphabetically) so
//! the same answers always produce the same link.

use tracing::debug;

use crate::{
    answers::{Answers, VOCABULARY, is_known_key, keys},
    error::{FlowError, Result},
};

/// Upstream answers that stop being meaningful when another answer changes.
enum Invalidation {
    /// Changing `trigger` drops `dependent` unless the same update supplies it.
    Changed {
        trigger: &'static str,
        dependent: &'static str,
    },
    /// Setting `trigger` to anything other than `keep_when` drops `dependent`.
    UnlessValue {
        trigger: &'static str,
        keep_when: &'static str,
        dependent: &'static str,
    },
}

const INVALIDATIONS: [Invalidation; 4] = [
    Invalidation::Changed {
        trigger: keys::MAKE,
        dependent: keys::MODEL,
    },
    Invalidation::Changed {
        trigger: keys::PICK,
        dependent: keys::PICK_REF,
    },
    Invalidation::Changed {
        trigger: keys::DROP,
        dependent: keys::DROP_REF,
    },
    Invalidation::UnlessValue {
        trigger: keys::AUCTION,
        keep_when: "auction",
        dependent: keys::SALVAGE,
    },
];

impl Invalidation {
    fn apply(&self, existing: &Answers, update: &Answers, merged: &mut Answers) {
        match *self {
            Invalidation::Changed { trigger, dependent } => {
                let Some(new_value) = update.value(trigger) else {
                    return;
                };
                if existing.value(trigger) != Some(new_value) && !update.has(dependent) {
                    if merged.remove(dependent).is_some() {
                        debug!(trigger, dependent, "cleared stale answer");
                    }
                }
            }
            Invalidation::UnlessValue {
                trigger,
                keep_when,
                dependent,
            } => {
                let Some(new_value) = update.value(trigger) else {
                    return;
                };
                if new_value != keep_when && merged.remove(dependent).is_some() {
                    debug!(trigger, dependent, "cleared stale answer");
                }
            }
        }
    }
}

/// Merge a step's answers into the persisted set.
///
/// Every existing key survives unless `update` overwrites it, clears it with a
/// blank value, or changes an answer it depends on (`make` → `model`,
/// `pick` → `pickRef`, `drop` → `dropRef`, `auction` → `salvage`). Unknown keys
/// pass through untouched. The result never holds blank values.
pub fn merge(existing: &Answers, update: &Answers) -> Answers {
    let mut merged = existing.clone();
    for (key, value) in update.iter() {
        if value.trim().is_empty() {
            merged.remove(key);
        } else {
            merged.set(key, value);
        }
    }

    for rule in &INVALIDATIONS {
        rule.apply(existing, update, &mut merged);
    }

    merged
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

/// Serialize answers into a canonical, percent-encoded query string (no
/// leading `?`). Blank values are skipped.
pub fn to_query(answers: &Answers) -> String {
    let known = VOCABULARY
        .iter()
        .filter_map(|key| answers.value(key).map(|value| (*key, value)));
    let unknown = answers
        .iter()
        .filter(|(key, value)| !is_known_key(key) && !value.trim().is_empty());

    known
        .chain(unknown)
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a query string (with or without the leading `?`).
///
/// Empty values are treated as absent, `+` decodes to a space, and when a key
/// repeats the first non-empty occurrence wins.
pub fn from_query(query: &str) -> Result<Answers> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut answers = Answers::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;

        if key.is_empty() || value.trim().is_empty() || answers.contains_key(&key) {
            continue;
        }
        answers.set(key, value);
    }

    Ok(answers)
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| FlowError::MalformedQuery(format!("{raw}: {e}")))
}

/// Attach the serialized answers to `route`.
pub fn with_query(route: &str, answers: &Answers) -> String {
    let query = to_query(answers);
    if query.is_empty() {
        route.to_string()
    } else {
        format!("{route}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_answers() -> Answers {
        Answers::new()
            .with(keys::PICK, "Sydney, NSW")
            .with(keys::PICK_REF, "sydney-nsw")
            .with(keys::DROP, "Melbourne, VIC")
            .with(keys::DROP_REF, "melbourne-vic")
    }

    #[test]
    fn merge_keeps_earlier_answers() {
        let update = Answers::new().with(keys::MAKE, "toyota").with(keys::MODEL, "camry");
        let merged = merge(&location_answers(), &update);

        assert_eq!(merged.get(keys::PICK), Some("Sydney, NSW"));
        assert_eq!(merged.get(keys::DROP_REF), Some("melbourne-vic"));
        assert_eq!(merged.get(keys::MODEL), Some("camry"));
    }

    #[test]
    fn changing_make_drops_the_old_model() {
        let first = merge(
            &location_answers(),
            &Answers::new().with(keys::MAKE, "toyota").with(keys::MODEL, "camry"),
        );
        let same_make = merge(&first, &Answers::new().with(keys::MAKE, "toyota"));
        assert_eq!(same_make.get(keys::MODEL), Some("camry"));

        let switched = merge(&same_make, &Answers::new().with(keys::MAKE, "ford"));
        assert_eq!(switched.get(keys::MAKE), Some("ford"));
        assert_eq!(switched.get(keys::MODEL), None);

        let with_model = merge(
            &same_make,
            &Answers::new().with(keys::MAKE, "ford").with(keys::MODEL, "ranger"),
        );
        assert_eq!(with_model.get(keys::MODEL), Some("ranger"));
    }

    #[test]
    fn leaving_auction_drops_salvage() {
        let existing = Answers::new()
            .with(keys::AUCTION, "auction")
            .with(keys::SALVAGE, "non-salvage");

        let kept = merge(&existing, &Answers::new().with(keys::AUCTION, "auction"));
        assert_eq!(kept.get(keys::SALVAGE), Some("non-salvage"));

        let cleared = merge(
            &existing,
            &Answers::new()
                .with(keys::AUCTION, "non-auction")
                .with(keys::SALVAGE, "non-salvage"),
        );
        assert_eq!(cleared.get(keys::AUCTION), Some("non-auction"));
        assert_eq!(cleared.get(keys::SALVAGE), None);
    }

    #[test]
    fn retyped_location_drops_its_reference() {
        let merged = merge(&location_answers(), &Answers::new().with(keys::PICK, "Syd"));
        assert_eq!(merged.get(keys::PICK), Some("Syd"));
        assert_eq!(merged.get(keys::PICK_REF), None);
        assert_eq!(merged.get(keys::DROP_REF), Some("melbourne-vic"));
    }

    #[test]
    fn blank_update_clears_and_unknown_keys_pass_through() {
        let existing = location_answers().with("utm_source", "newsletter");
        let merged = merge(&existing, &Answers::new().with(keys::DROP, ""));

        assert_eq!(merged.get(keys::DROP), None);
        assert_eq!(merged.get("utm_source"), Some("newsletter"));
    }

    #[test]
    fn query_is_written_in_canonical_order() {
        let answers = Answers::new()
            .with("zeta", "1")
            .with(keys::MODEL, "camry")
            .with("alpha", "2")
            .with(keys::PICK, "Sydney, NSW");

        assert_eq!(
            to_query(&answers),
            "pick=Sydney%2C%20NSW&model=camry&alpha=2&zeta=1"
        );
    }

    #[test]
    fn query_round_trips_every_known_key() {
        let answers: Answers = VOCABULARY
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, format!("value {i} & more=+ / ü")))
            .collect();

        let parsed = from_query(&to_query(&answers)).unwrap();
        assert_eq!(parsed, answers);

        let subset = answers.restricted_to(&[keys::AGE, keys::CAR_VALUE, keys::DROP]);
        assert_eq!(from_query(&to_query(&subset)).unwrap(), subset);
    }

    #[test]
    fn empty_values_decode_as_absent() {
        let parsed = from_query("?pick=Sydney&pickRef=&drop&make=toyota&make=ford").unwrap();

        assert_eq!(parsed.get(keys::PICK), Some("Sydney"));
        assert!(!parsed.contains_key(keys::PICK_REF));
        assert!(!parsed.contains_key(keys::DROP));
        assert_eq!(parsed.get(keys::MAKE), Some("toyota"));
    }

    #[test]
    fn plus_decodes_to_space() {
        let parsed = from_query("pick=Gold+Coast%2C+QLD").unwrap();
        assert_eq!(parsed.get(keys::PICK), Some("Gold Coast, QLD"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            from_query("pick=%FF%FE"),
            Err(FlowError::MalformedQuery(_))
        ));
    }

    #[test]
    fn with_query_omits_empty_query() {
        assert_eq!(with_query("/quote/location", &Answers::new()), "/quote/location");
        assert_eq!(
            with_query("/quote/vehicle", &Answers::new().with(keys::PICK, "Perth")),
            "/quote/vehicle?pick=Perth"
        );
    }
}
